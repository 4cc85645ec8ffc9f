use serde::{Deserialize, Serialize};

/// Who a prompt part or message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One piece of a prompt before it is folded into wire messages.
#[derive(Debug, Clone)]
pub struct PromptPart {
    pub role: Role,
    pub content: PromptContent,
}

/// Content of a single prompt part.
#[derive(Debug, Clone)]
pub enum PromptContent {
    Text(String),
    /// A URL or data URL pointing at an image.
    ImageUrl(String),
}

impl PromptPart {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: PromptContent::Text(text.into()),
        }
    }

    pub fn image_url(role: Role, url: impl Into<String>) -> Self {
        Self {
            role,
            content: PromptContent::ImageUrl(url.into()),
        }
    }
}

/// A chat message on the wire: a role and a list of typed content parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// Tagged content part inside a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: String },
}

impl From<PromptContent> for ContentPart {
    fn from(content: PromptContent) -> Self {
        match content {
            PromptContent::Text(text) => Self::Text { text },
            PromptContent::ImageUrl(image_url) => Self::ImageUrl { image_url },
        }
    }
}

/// Fold prompt parts into wire messages, merging each part into the first
/// message carrying the same role. Part order within a message follows input
/// order.
pub fn build_messages(parts: Vec<PromptPart>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::new();

    for part in parts {
        let content = ContentPart::from(part.content);
        match messages.iter_mut().find(|m| m.role == part.role) {
            Some(message) => message.content.push(content),
            None => messages.push(ChatMessage {
                role: part.role,
                content: vec![content],
            }),
        }
    }

    messages
}
