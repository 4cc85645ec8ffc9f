//! Business logic coordination.

pub mod assistant;

pub use assistant::{AssistantError, ChessAssistant, PlayerSide};
