//! Mistral chat-completions provider.

pub mod client;
pub mod types;

pub use client::MistralClient;
pub use types::{ChatRequest, ChatResponse, ResponseFormat};
