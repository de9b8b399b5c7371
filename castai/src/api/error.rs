use std::time::Duration;
use thiserror::Error;
use tfplug::RemoteError;

use super::common::ApiErrorDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed, check the API token")]
    AuthError,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ApiError { status: 404, .. } => RemoteError::NotFound,
            // The API refuses to delete a cluster's default node configuration
            ApiError::ApiError {
                status: 400 | 409 | 422,
                message,
                ..
            } if message.to_ascii_lowercase().contains("default") => {
                RemoteError::Protected(message)
            }
            ApiError::ApiError { status, message, .. } if status >= 500 => {
                RemoteError::Unavailable(format!("HTTP {}: {}", status, message))
            }
            ApiError::ApiError { status, message, .. } => RemoteError::Api { status, message },
            ApiError::Timeout(secs) => RemoteError::Timeout(Duration::from_secs(secs)),
            ApiError::RateLimited | ApiError::ServiceUnavailable => {
                RemoteError::Unavailable(err.to_string())
            }
            ApiError::AuthError => RemoteError::Api {
                status: 401,
                message: err.to_string(),
            },
            ApiError::ParseError(message) => RemoteError::Malformed(message),
            ApiError::InvalidUrl(message) => RemoteError::InvalidRequest(message),
            ApiError::RequestError(e) if e.is_timeout() => {
                RemoteError::Timeout(Duration::default())
            }
            ApiError::RequestError(e) => RemoteError::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: &str) -> ApiError {
        ApiError::ApiError {
            status,
            message: message.to_string(),
            details: None,
        }
    }

    #[test]
    fn not_found_maps_to_absent() {
        assert_eq!(
            RemoteError::from(api_error(404, "node template not found")),
            RemoteError::NotFound
        );
    }

    #[test]
    fn refused_default_deletion_is_protected() {
        let err = RemoteError::from(api_error(
            400,
            "cannot delete default node configuration",
        ));
        assert!(matches!(err, RemoteError::Protected(_)));

        let err = RemoteError::from(api_error(400, "subnets must not be empty"));
        assert!(matches!(err, RemoteError::Api { status: 400, .. }));
    }

    #[test]
    fn transient_failures_are_retryable() {
        assert!(RemoteError::from(ApiError::RateLimited).is_retryable());
        assert!(RemoteError::from(ApiError::ServiceUnavailable).is_retryable());
        assert!(RemoteError::from(ApiError::Timeout(30)).is_retryable());
        assert!(RemoteError::from(api_error(503, "maintenance")).is_retryable());
        assert!(!RemoteError::from(ApiError::AuthError).is_retryable());
    }
}
