use reqwest::StatusCode;
use thiserror::Error;

/// Classified outcome of a failed request to the inference API.
///
/// Exactly one variant per failure. Classification is a pure function of the
/// raw failure: presence or absence of a response, and its status code.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Credential problem (HTTP 401 or 403). Never retried.
    #[error("authentication error: {detail}")]
    Unauthorized { status: StatusCode, detail: String },

    /// Upstream quota exhausted (HTTP 429). Retried internally; fatal to the
    /// caller if still present after exhaustion.
    #[error("rate limit exceeded: {detail}")]
    RateLimited { status: StatusCode, detail: String },

    /// Upstream failure (HTTP 5xx). Retried internally.
    #[error("server error ({status}): {detail}")]
    ServerError { status: StatusCode, detail: String },

    /// Any other response-bearing 4xx. Never retried.
    #[error("{detail}")]
    ClientError { status: StatusCode, detail: String },

    /// No response received: connect failure, DNS, or timeout. Retried.
    #[error("network error: no response received ({0})")]
    NetworkUnreachable(String),

    /// The request could not be constructed at all. Never retried.
    #[error("request configuration error: {0}")]
    Configuration(String),

    /// A 2xx response whose body is not the expected shape. Never retried.
    #[error("invalid response from inference API: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::Unauthorized { status, detail }
            }
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { status, detail },
            s if s.is_server_error() => Self::ServerError { status, detail },
            _ => Self::ClientError { status, detail },
        }
    }

    /// Classify a transport-level failure from reqwest.
    ///
    /// A builder error means the request was never formed; everything else
    /// (connect, DNS, timeout) means no response was received.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            Self::NetworkUnreachable(err.to_string())
        }
    }

    /// Returns true if another attempt may succeed: no response was received,
    /// or the upstream answered 429 or 5xx.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ServerError { .. } | Self::NetworkUnreachable(_)
        )
    }

    /// Upstream status code, where one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. }
            | Self::RateLimited { status, .. }
            | Self::ServerError { status, .. }
            | Self::ClientError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable detail string out of an error body.
///
/// Providers disagree on the field name: `detail` and `error` are both in the
/// wild. Falls back to the serialized body.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
        return value.to_string();
    }

    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_by_status() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(
                ApiError::from_status(status, "{}"),
                ApiError::Unauthorized { .. }
            ));
        }

        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "{}"),
            ApiError::RateLimited { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "{}"),
            ApiError::ServerError { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "{}"),
            ApiError::ServerError { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "{}"),
            ApiError::ClientError { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "{}"),
            ApiError::ClientError { .. }
        ));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "{}").is_retryable());
        assert!(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "{}").is_retryable());
        assert!(ApiError::from_status(StatusCode::GATEWAY_TIMEOUT, "{}").is_retryable());
        assert!(ApiError::NetworkUnreachable("connection refused".into()).is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!ApiError::from_status(StatusCode::BAD_REQUEST, "{}").is_retryable());
        assert!(!ApiError::from_status(StatusCode::UNAUTHORIZED, "{}").is_retryable());
        assert!(!ApiError::from_status(StatusCode::FORBIDDEN, "{}").is_retryable());
        assert!(!ApiError::Configuration("bad url".into()).is_retryable());
        assert!(!ApiError::InvalidResponse("no choices".into()).is_retryable());
    }

    #[test]
    fn test_detail_from_detail_field() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, r#"{"detail":"slow down"}"#);
        assert_eq!(err.to_string(), "rate limit exceeded: slow down");
    }

    #[test]
    fn test_detail_from_error_field() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"bad image"}"#);
        assert_eq!(err.to_string(), "bad image");
    }

    #[test]
    fn test_detail_falls_back_to_body() {
        assert_eq!(extract_detail("plain text failure"), "plain text failure");
        assert_eq!(extract_detail(r#"{"message":"x"}"#), r#"{"message":"x"}"#);
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "{}");
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(ApiError::NetworkUnreachable("x".into()).status(), None);
    }
}
