//! HTTP client core
//!
//! Thin wrapper over reqwest with bearer-token handling and a uniform error
//! taxonomy. The contract with callers is strict: every failure path is an
//! `Err` — the client never resolves with an error-shaped success value.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// API error taxonomy
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend returned a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body, or the status reason
        message: String,
    },

    /// Transport-level failure (connection, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Success response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the session token was rejected
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether this failure is transient enough to retry
    ///
    /// Transport failures always qualify; for answered requests the
    /// retryable statuses are 408, 425, 429, 500, 502, 503, 504, 522, 524.
    pub fn is_network_error(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => matches!(
                *status,
                408 | 425 | 429 | 500 | 502 | 503 | 504 | 522 | 524
            ),
            ApiError::Decode(_) => false,
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body shape returned by the backend
///
/// The backend answers with `{"message": ...}` for application errors and
/// `{"detail": ...}` for framework-level ones; either field may be present.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.detail)
    }
}

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Lectern/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP client for the dashboard backend
///
/// Cheaply cloneable; clones share the connection pool and the session
/// token.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            config,
            http,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Attach a bearer token to subsequent requests
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Drop the bearer token (e.g., after a 401)
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// Whether a bearer token is currently attached
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// GET a JSON resource
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(path, "GET");
        let mut request = self.http.get(self.url(path)).query(query);
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(path, "POST");
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T>(response: reqwest::Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let fallback = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
            let message = match response.text().await {
                Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(ErrorBody::into_message)
                    .unwrap_or(fallback),
                Err(_) => fallback,
            };
            Err(ApiError::Status { status: status.as_u16(), message })
        }
    }
}

impl Clone for ApiClient {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            http: self.http.clone(),
            token: Arc::clone(&self.token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_accessors() {
        let error = ApiError::Status { status: 404, message: "Not found".to_string() };
        assert_eq!(error.status(), Some(404));
        assert!(!error.is_unauthorized());
        assert!(!error.is_network_error());
        assert_eq!(error.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_error_unauthorized() {
        let error = ApiError::Status { status: 401, message: "Token expired".to_string() };
        assert!(error.is_unauthorized());
    }

    #[test]
    fn test_error_retryable_statuses() {
        for status in [408, 425, 429, 500, 502, 503, 504, 522, 524] {
            let error = ApiError::Status { status, message: "transient".to_string() };
            assert!(error.is_network_error(), "{} should be retryable", status);
        }
        for status in [400, 403, 404, 409, 422] {
            let error = ApiError::Status { status, message: "permanent".to_string() };
            assert!(!error.is_network_error(), "{} should not be retryable", status);
        }
    }

    #[test]
    fn test_error_body_prefers_message_over_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": "bad filter", "detail": "ignored"}"#)
                .unwrap();
        assert_eq!(body.into_message(), Some("bad filter".to_string()));

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "authentication required"}"#).unwrap();
        assert_eq!(body.into_message(), Some("authentication required".to_string()));
    }

    #[test]
    fn test_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("Lectern/"));
    }

    #[test]
    fn test_config_builder() {
        let config = ApiConfig::new("https://campus.example/api")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("Shell/2.0");

        assert_eq!(config.base_url, "https://campus.example/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "Shell/2.0");
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(ApiConfig::new("http://host/api/")).unwrap();
        assert_eq!(client.url("/courses"), "http://host/api/courses");
        assert_eq!(client.url("courses"), "http://host/api/courses");
    }

    #[test]
    fn test_token_lifecycle() {
        let client = ApiClient::new(ApiConfig::default()).unwrap();
        assert!(!client.has_token());

        client.set_token("session-token");
        assert!(client.has_token());

        // Clones share the token
        let clone = client.clone();
        clone.clear_token();
        assert!(!client.has_token());
    }
}
