//! External integrations: configuration, logging, HTTP transport, provider.

pub mod config;
pub mod http;
pub mod logging;
pub mod mistral;
