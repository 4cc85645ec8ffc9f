use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid queue capacity: {0}. Must be at least 1")]
    InvalidCapacity(usize),

    #[error("Invalid queue concurrency: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Invalid dispatch interval: {0}ms. Must be positive")]
    InvalidInterval(u64),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error("Invalid request timeout: {0}ms. Must be positive")]
    InvalidTimeout(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Provider base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. gambit.yaml in the working directory
    /// 3. Environment variables (GAMBIT_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("gambit.yaml"))
            .merge(Env::prefixed("GAMBIT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("GAMBIT_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.queue.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(config.queue.capacity));
        }
        if config.queue.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(config.queue.concurrency));
        }
        if config.queue.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval(config.queue.interval_ms));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }
        if config.retry.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(config.retry.timeout_ms));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.provider.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if config.provider.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.provider.max_tokens));
        }

        Ok(())
    }
}
