//! Error types for the model provider client.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while talking to the hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport failed (connect, timeout, TLS, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider rejected the credentials.
    #[error("unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// No access token could be obtained.
    #[error("credential error: {0}")]
    Auth(String),

    /// Quota or rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the provider, if any.
        retry_after: Option<Duration>,
    },

    /// Any other non-success status.
    #[error("API error {status}: {message}")]
    ApiError {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be built from its configuration.
    #[error("client configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Check if this is a quota/rate limit error.
    #[must_use]
    pub const fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Get the retry delay if the provider sent one.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rate_limit() {
        let err = LlmError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert!(err.is_rate_limit());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));

        let err = LlmError::ApiError {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_rate_limit());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_display() {
        let err = LlmError::Unauthorized {
            status: 401,
            message: "bad token".to_string(),
        };
        assert_eq!(err.to_string(), "unauthorized (401): bad token");
    }
}
