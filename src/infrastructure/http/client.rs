use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::backoff::backoff_delay;
use super::errors::ApiError;
use crate::domain::models::config::RetryConfig;

/// HTTP transport that performs one logical request reliably.
///
/// Wraps a pooled [`reqwest::Client`] with an attempt loop: transient failures
/// (no response, 429, 5xx) are retried with exponential backoff and jitter up
/// to `max_retries` attempts; everything else short-circuits. The caller sees
/// a single [`ApiError`] classified from the last attempt.
#[derive(Clone)]
pub struct ResilientClient {
    http: ReqwestClient,
    max_retries: u32,
    base_delay_ms: u64,
}

impl ResilientClient {
    /// Build a transport from retry configuration.
    ///
    /// The per-attempt timeout (`timeout_ms`) is applied by the underlying
    /// client; a timed-out attempt counts as a network failure and is subject
    /// to the same retry policy.
    pub fn new(config: &RetryConfig) -> Result<Self, ApiError> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            max_retries: config.max_retries.max(1),
            base_delay_ms: config.base_delay_ms,
        })
    }

    /// POST a JSON payload.
    pub async fn post(
        &self,
        url: &str,
        payload: &Value,
        headers: HeaderMap,
    ) -> Result<Value, ApiError> {
        self.execute(Method::POST, url, Some(payload), headers).await
    }

    /// Perform one logical request, retrying transient failures.
    ///
    /// Attempts are numbered `1..=max_retries`. After attempt `k` fails with a
    /// retryable error and `k < max_retries`, sleeps `backoff(k)` and retries;
    /// otherwise returns the classified error of the last attempt.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, ApiError> {
        let mut attempt = 1;

        loop {
            match self.send_once(method.clone(), url, payload, headers.clone()).await {
                Ok(body) => {
                    if attempt > 1 {
                        debug!(attempt, "request succeeded after retries");
                    }
                    return Ok(body);
                }
                Err(err) => {
                    if !err.is_retryable() || attempt >= self.max_retries {
                        return Err(err);
                    }

                    let delay = backoff_delay(self.base_delay_ms, attempt);
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt: send, check status, parse.
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value, ApiError> {
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(ApiError::from_status(status, &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            timeout_ms: 1000,
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_configuration_error() {
        let client = ResilientClient::new(&fast_config()).unwrap();
        let result = client
            .post("not a url", &serde_json::json!({}), HeaderMap::new())
            .await;

        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Reserved TEST-NET-1 address, nothing listens there.
        let config = RetryConfig {
            max_retries: 1,
            base_delay_ms: 10,
            timeout_ms: 200,
        };
        let client = ResilientClient::new(&config).unwrap();
        let result = client
            .post(
                "http://192.0.2.1:9/v1/chat/completions",
                &serde_json::json!({}),
                HeaderMap::new(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::NetworkUnreachable(_))));
    }
}
