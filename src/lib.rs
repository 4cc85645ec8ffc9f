//! Gambit - Rate-Limited Resilient Dispatcher
//!
//! Gambit forwards chessboard images with a text prompt to a quota-limited
//! vision inference API and returns a move suggestion. The core is generic:
//! a bounded [`dispatch::DispatchQueue`] that throttles opaque async tasks by
//! interval and concurrency, composed with a retrying
//! [`infrastructure::http::ResilientClient`] that classifies failures and
//! backs off with jitter.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): configuration, prompt shapes, provider port
//! - **Dispatch Layer** (`dispatch`): bounded, throttled task queue
//! - **Service Layer** (`services`): the chess assistant composition
//! - **Infrastructure Layer** (`infrastructure`): config loading, logging,
//!   HTTP transport, the Mistral provider
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gambit::dispatch::DispatchQueue;
//! use gambit::infrastructure::mistral::MistralClient;
//! use gambit::services::{ChessAssistant, PlayerSide};
//!
//! # async fn example(config: gambit::Config, image: Vec<u8>) -> anyhow::Result<()> {
//! let provider = Arc::new(MistralClient::new(&config.provider, &config.retry)?);
//! let queue = DispatchQueue::new(&config.queue);
//! let assistant = ChessAssistant::new(provider, queue);
//! let suggestion = assistant.suggest_move(&image, PlayerSide::White).await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use dispatch::{DispatchError, DispatchQueue};
pub use domain::models::{Config, LoggingConfig, ProviderConfig, QueueConfig, RetryConfig};
pub use domain::ports::InferenceProvider;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::http::ApiError;
pub use infrastructure::mistral::MistralClient;
pub use services::{AssistantError, ChessAssistant, PlayerSide};
