use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use super::types::{ChatRequest, ChatResponse, ResponseFormat};
use crate::domain::models::config::{ProviderConfig, RetryConfig};
use crate::domain::models::prompt::ChatMessage;
use crate::domain::ports::InferenceProvider;
use crate::infrastructure::http::{ApiError, ResilientClient};

/// Mistral chat-completions client.
///
/// Thin provider over the resilient transport: builds the request body and
/// auth headers, and extracts the first choice's text from the response.
/// Retry, backoff, and error classification happen in the transport.
pub struct MistralClient {
    transport: ResilientClient,
    endpoint: String,
    model: String,
    max_tokens: u32,
    auth_header: HeaderValue,
}

impl MistralClient {
    /// Build a client from provider and retry configuration.
    ///
    /// Fails with [`ApiError::Configuration`] when the API key is missing
    /// (neither configured nor in `MISTRAL_API_KEY`) or not a valid header
    /// value.
    pub fn new(provider: &ProviderConfig, retry: &RetryConfig) -> Result<Self, ApiError> {
        let api_key = provider
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("MISTRAL_API_KEY").ok().filter(|key| !key.is_empty()))
            .ok_or_else(|| {
                ApiError::Configuration(
                    "no API key: set provider.api_key or MISTRAL_API_KEY".to_string(),
                )
            })?;

        let mut auth_header = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ApiError::Configuration(format!("invalid API key: {e}")))?;
        auth_header.set_sensitive(true);

        Ok(Self {
            transport: ResilientClient::new(retry)?,
            endpoint: format!(
                "{}/v1/chat/completions",
                provider.base_url.trim_end_matches('/')
            ),
            model: provider.model.clone(),
            max_tokens: provider.max_tokens,
            auth_header,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }
}

#[async_trait]
impl InferenceProvider for MistralClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::text(),
            messages,
        };
        let payload = serde_json::to_value(&request)
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        let body = self
            .transport
            .post(&self.endpoint, &payload, self.headers())
            .await?;
        debug!(model = %self.model, "completion response received");

        let response: ChatResponse = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        response.into_content().ok_or_else(|| {
            ApiError::InvalidResponse("response has no choices[0].message.content".to_string())
        })
    }
}
