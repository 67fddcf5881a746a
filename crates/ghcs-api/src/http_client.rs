//! Shared HTTP client for REST and GraphQL requests
//!
//! One `reqwest::Client` is configured per process. Requests are sent exactly
//! once; callers decide what a failed attempt means.

use std::sync::Arc;
use std::time::Duration;

use ghcs_utils::error::ApiError;
use ghcs_utils::redaction::redact_error_message;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::rest::error_message;

/// Default connect timeout (30 seconds)
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("ghcs/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client whose requests each time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the client cannot be constructed
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .use_rustls_tls()
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
            timeout,
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).timeout(self.timeout)
    }

    /// Send once and return the response whatever its status.
    pub async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, ApiError> {
        debug!(operation, timeout_secs = self.timeout.as_secs(), "sending request");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    duration: self.timeout,
                }
            } else {
                ApiError::Transport(format!(
                    "{operation} request failed: {}",
                    redact_error_message(&e.to_string())
                ))
            }
        })?;

        debug!(operation, status = response.status().as_u16(), "received response");
        Ok(response)
    }

    /// Send once; any non-2xx status becomes an [`ApiError`].
    pub async fn send_checked(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Response, ApiError> {
        let response = self.send(request, operation).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        Err(map_status_error(status, &message))
    }
}

/// Decode a JSON body into `T`.
pub async fn decode_json<T: DeserializeOwned>(
    response: Response,
    operation: &str,
) -> Result<T, ApiError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Transport(format!("{operation}: failed to read body: {e}")))?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(format!("{operation}: {e}")))
}

/// Map a non-success status to an [`ApiError`] variant
///
/// - 401 → `Auth`
/// - 403 → `RateLimited` when the message says so, `Auth` otherwise
/// - 404 → `NotFound`, 409 → `Conflict`, 429 → `RateLimited`
/// - 5xx → `Server`
/// - anything else → `Http`
pub fn map_status_error(status: StatusCode, message: &str) -> ApiError {
    let message = redact_error_message(message);
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Auth(format!("{message} ({status})")),
        StatusCode::FORBIDDEN if message.to_ascii_lowercase().contains("rate limit") => {
            ApiError::RateLimited(message)
        }
        StatusCode::FORBIDDEN => ApiError::Auth(format!("{message} ({status})")),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
        s if s.is_server_error() => ApiError::Server(format!("{message} ({status})")),
        s => ApiError::Http {
            status: s.as_u16(),
            message,
        },
    }
}
