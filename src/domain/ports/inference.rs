use async_trait::async_trait;

use crate::domain::models::prompt::ChatMessage;
use crate::infrastructure::http::ApiError;

/// Seam between the assistant and whichever model backs it.
///
/// A provider performs one completion for a prepared conversation and returns
/// the model's text. Throttling and queueing live outside this trait; retry
/// of transient transport failures lives inside implementations.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ApiError>;
}
