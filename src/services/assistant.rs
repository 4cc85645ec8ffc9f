use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, error};

use crate::dispatch::{DispatchError, DispatchQueue};
use crate::domain::models::prompt::{build_messages, PromptPart, Role};
use crate::domain::ports::InferenceProvider;
use crate::infrastructure::http::ApiError;

const SYSTEM_PROMPT: &str = "You are a chess assistant that analyzes chessboard images and \
suggests the best next move for Player. Your response must always be **only one of the \
following strings**:\n\n\
1. If the position is valid and there is a legal move, return the move in the format: \
'Piece -> Position'.\n\
2. If the image does not contain a recognizable chessboard, return exactly: \
'Failed to recognize the chessboard'.\n\
3. If there are no legal moves because the game is over or the board is set up incorrectly, \
return exactly: 'There isn't any move here'.\n\n\
Return nothing else, only one of these three outputs.";

/// Which side the suggestion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSide {
    White,
    Black,
}

impl fmt::Display for PlayerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

impl FromStr for PlayerSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            other => Err(format!("invalid player side: {other} (expected white or black)")),
        }
    }
}

/// Error surfaced to the assistant's caller.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The dispatch queue was full. Distinct from provider-side failures so
    /// the controller can answer "try again later" (503-style).
    #[error("server is under high load, please try again later")]
    Overloaded,

    /// Classified provider or transport failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<DispatchError<ApiError>> for AssistantError {
    fn from(err: DispatchError<ApiError>) -> Self {
        match err {
            DispatchError::Overloaded => Self::Overloaded,
            DispatchError::Task(api) => Self::Api(api),
            DispatchError::Cancelled => {
                Self::Api(ApiError::NetworkUnreachable("task cancelled".to_string()))
            }
        }
    }
}

/// Suggests chess moves from board images.
///
/// Builds the vision prompt and submits the provider call as one unit of work
/// to the dispatch queue, so all callers share the provider's quota fairly.
pub struct ChessAssistant<P: InferenceProvider> {
    provider: Arc<P>,
    queue: DispatchQueue<String, ApiError>,
}

impl<P: InferenceProvider + 'static> ChessAssistant<P> {
    pub fn new(provider: Arc<P>, queue: DispatchQueue<String, ApiError>) -> Self {
        Self { provider, queue }
    }

    /// Suggest the best next move for `side` from a board image.
    ///
    /// The image is embedded as a JPEG data URL; the provider call runs under
    /// the queue's rate and concurrency limits. Retries of transient network
    /// failures happen inside that single queued execution.
    pub async fn suggest_move(
        &self,
        image: &[u8],
        side: PlayerSide,
    ) -> Result<String, AssistantError> {
        let data_url = format!("data:image/jpeg;base64,{}", BASE64.encode(image));

        let messages = build_messages(vec![
            PromptPart::text(Role::System, SYSTEM_PROMPT),
            PromptPart::text(Role::User, format!("Suggest best move for {side}")),
            PromptPart::image_url(Role::User, data_url),
        ]);

        let provider = Arc::clone(&self.provider);
        let suggestion = self
            .queue
            .submit(async move { provider.complete(messages).await })
            .await
            .map_err(|err| {
                error!(error = %err, "suggestion failed");
                AssistantError::from(err)
            })?;

        debug!(side = %side, "suggestion produced");
        Ok(suggestion)
    }
}
