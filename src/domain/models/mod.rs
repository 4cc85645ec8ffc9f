pub mod config;
pub mod prompt;

pub use config::{Config, LoggingConfig, ProviderConfig, QueueConfig, RetryConfig};
pub use prompt::{build_messages, ChatMessage, ContentPart, PromptContent, PromptPart, Role};
