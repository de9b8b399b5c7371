use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::common::{ApiErrorDetails, ApiErrorResponse};
use super::error::ApiError;
use super::pool::ConnectionPoolConfig;

const API_KEY_HEADER: &str = "X-API-Key";

/// CAST AI API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl RetryConfig {
    fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        std::cmp::min(
            self.initial_backoff_ms.saturating_mul(factor),
            self.max_backoff_ms,
        )
    }
}

/// HTTP client tuning
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub retry: RetryConfig,
    pub pool: ConnectionPoolConfig,
}

impl ClientConfig {
    /// Config with the given per-request timeout applied to both layers
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.retry.timeout_seconds = seconds;
        self.pool.request_timeout = std::time::Duration::from_secs(seconds);
        self
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(api_url: &str, api_token: &str) -> Result<Self, ApiError> {
        Self::with_config(api_url, api_token, ClientConfig::default())
    }

    /// Create a new API client with custom retry and pool configuration
    pub fn with_config(
        api_url: &str,
        api_token: &str,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", api_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                api_url,
                parsed.scheme()
            )));
        }
        if api_token.trim().is_empty() {
            return Err(ApiError::AuthError);
        }

        let http_client = config.pool.build_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: api_url.trim_end_matches('/').to_string(),
                api_token: api_token.to_string(),
                retry_config: config.retry,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Node template operations
    pub fn node_templates(&self) -> crate::api::node_templates::NodeTemplatesApi<'_> {
        crate::api::node_templates::NodeTemplatesApi::new(self)
    }

    /// Node configuration operations
    pub fn node_configurations(
        &self,
    ) -> crate::api::node_configurations::NodeConfigurationsApi<'_> {
        crate::api::node_configurations::NodeConfigurationsApi::new(self)
    }

    /// Execute a GET request, retried on transient failures
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None::<&()>).await
    }

    /// Execute a POST request. Never retried.
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// Execute a POST request without a body. Never retried.
    pub async fn post_empty<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::POST, path, None::<&()>).await
    }

    /// Execute a PUT request. Never retried.
    pub async fn put<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    /// Execute a DELETE request, retried on transient failures
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<serde_json::Value, ()>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    async fn execute<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize,
    {
        let idempotent = matches!(method, Method::GET | Method::DELETE);
        self.execute_with_retry(
            || {
                let method = method.clone();
                async move {
                    let url = format!("{}{}", self.inner.base_url, path);
                    tracing::debug!("{} request to: {}", method, url);

                    let mut request = self
                        .inner
                        .http_client
                        .request(method, &url)
                        .header(API_KEY_HEADER, &self.inner.api_token);
                    if let Some(body) = body {
                        request = request.json(body);
                    }
                    request.send().await
                }
            },
            path,
            idempotent,
        )
        .await
    }

    /// Execute request, retrying idempotent ones with exponential backoff
    async fn execute_with_retry<F, Fut, T>(
        &self,
        request_fn: F,
        path: &str,
        idempotent: bool,
    ) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
        T: for<'de> Deserialize<'de>,
    {
        let retry = &self.inner.retry_config;
        let max_retries = if idempotent { retry.max_retries } else { 0 };
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= max_retries {
            if attempt > 0 {
                let backoff = retry.backoff_ms(attempt);
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!("Response status: {}", status);

                    if status.is_success() {
                        return self.parse_success_response(response).await;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if !idempotent {
                        return self.handle_error_response(response).await;
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return self.handle_error_response(response).await;
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(retry.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse successful response
    async fn parse_success_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str::<T>(text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let (message, details) = match serde_json::from_str::<ApiErrorResponse>(&text) {
            Ok(err_resp) => (
                err_resp.message.clone().unwrap_or_else(|| text.clone()),
                Some(Box::new(ApiErrorDetails {
                    message: err_resp.message,
                    field_violations: err_resp.field_violations,
                })),
            ),
            Err(_) => (text, None),
        };

        Err(ApiError::ApiError {
            status,
            message,
            details,
        })
    }
}
