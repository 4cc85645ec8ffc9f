use serde::{Deserialize, Serialize};

use crate::domain::models::prompt::ChatMessage;

/// Chat-completions request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g. "pixtral-12b-2409")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Requested response format
    pub response_format: ResponseFormat,

    /// Conversation messages
    pub messages: Vec<ChatMessage>,
}

/// Response format selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format: String,
}

impl ResponseFormat {
    pub fn text() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

/// Chat-completions response body, reduced to the fields this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// The first choice's text, if the response has the expected shape.
    pub fn into_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}
