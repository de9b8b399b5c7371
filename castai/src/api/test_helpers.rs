//! Test helpers for the CAST AI API

#[allow(dead_code)]
pub fn create_test_client(url: &str) -> super::Client {
    super::Client::new(url, "test-api-token").unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;

    #[tokio::test]
    async fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_client_config_timeout_applies_to_pool() {
        let config = ClientConfig::default().with_timeout_seconds(12);
        assert_eq!(config.retry.timeout_seconds, 12);
        assert_eq!(config.pool.request_timeout.as_secs(), 12);
    }

    #[tokio::test]
    async fn test_connection_pool_config() {
        use pool::ConnectionPoolConfig;

        let config = ConnectionPoolConfig::default();
        assert_eq!(config.max_idle_connections, 10);
        assert_eq!(config.idle_timeout.as_secs(), 90);
        assert_eq!(config.connection_timeout.as_secs(), 10);
        assert_eq!(config.request_timeout.as_secs(), 30);
        assert_eq!(config.tcp_keepalive.unwrap().as_secs(), 30);
    }

    #[test]
    fn test_pool_config_builds_client() {
        let config = pool::ConnectionPoolConfig {
            tcp_keepalive: None,
            ..Default::default()
        };
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_created_client_keeps_base_url() {
        let client = super::create_test_client("https://api.cast.ai/");
        assert_eq!(client.base_url(), "https://api.cast.ai");
    }

    #[test]
    fn test_api_error_formatting() {
        use common::{ApiErrorDetails, FieldViolation};

        let details = ApiErrorDetails {
            message: Some("general error".to_string()),
            field_violations: vec![FieldViolation {
                field: "subnets".to_string(),
                description: "required".to_string(),
            }],
        };

        let error = ApiError::ApiError {
            status: 400,
            message: "Bad Request".to_string(),
            details: Some(Box::new(details)),
        };

        let error_str = error.to_string();
        assert!(error_str.contains("HTTP 400"));
        assert!(error_str.contains("Bad Request"));
    }
}
