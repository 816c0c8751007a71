//! OCR client implementation
//!
//! This module provides the main client for the DotsOCR runner REST API:
//! construction, authentication, request dispatch, and the single place where
//! transport outcomes are classified into error kinds.

use reqwest::{Client as HttpClient, ClientBuilder, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{DotsConfig, DotsCredentials};
use crate::TRACING_TARGET_CLIENT;
use crate::error::{Error, Result};
use crate::models::HealthResponse;

/// Client for the DotsOCR runner REST API.
///
/// The client owns one HTTP connection pool, configured once at construction
/// from a [`DotsConfig`]. It is cheap to clone; clones share the pool.
/// Dropping the last clone releases the pool.
///
/// # Examples
///
/// ```rust,ignore
/// use dotsocr_client::{DotsClient, DotsConfig, DotsCredentials};
/// use std::time::Duration;
///
/// let config = DotsConfig::builder()
///     .with_base_url("http://127.0.0.1:8080")?
///     .with_timeout(Duration::from_secs(30))
///     .build()?;
///
/// let client = DotsClient::new(config, DotsCredentials::bearer_token("your-token"))?;
/// ```
#[derive(Debug, Clone)]
pub struct DotsClient {
    http_client: HttpClient,
    config: DotsConfig,
    credentials: DotsCredentials,
}

impl DotsClient {
    /// Create a new OCR client with the given configuration and credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or if the
    /// configuration is invalid.
    pub fn new(config: DotsConfig, credentials: DotsCredentials) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.base_url,
            "Creating OCR client"
        );

        let http_client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            config,
            credentials,
        })
    }

    /// Create a new OCR client with default configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the DotsOCR runner server
    /// * `credentials` - Authentication credentials
    pub fn with_defaults(
        base_url: impl AsRef<str>,
        credentials: DotsCredentials,
    ) -> Result<Self> {
        let config = DotsConfig::builder()
            .with_base_url(base_url.as_ref())?
            .build()?;

        Self::new(config, credentials)
    }

    /// Perform a health check against the OCR service.
    ///
    /// This method verifies that the service is accessible.
    pub async fn health_check(&self) -> Result<HealthResponse> {
        let request = self.request(Method::GET, "/api/v1/health")?;
        let health: HealthResponse = self.execute_json(request).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            status = %health.status,
            version = %health.version,
            "Health check successful"
        );

        Ok(health)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &DotsConfig {
        &self.config
    }

    /// Get the credentials type (for debugging/logging purposes only).
    pub fn credentials_type(&self) -> &'static str {
        match &self.credentials {
            DotsCredentials::BearerToken(_) => "bearer_token",
            DotsCredentials::None => "none",
        }
    }

    /// Add authentication headers to a request.
    fn add_auth_headers(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            DotsCredentials::BearerToken(token) => {
                request.header("Authorization", format!("Bearer {}", token))
            }
            DotsCredentials::None => request,
        }
    }

    /// Create a new request builder with base configuration.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .config
            .base_url
            .join(path)
            .map_err(|e| Error::invalid_config(format!("Invalid request URL '{}': {}", path, e)))?;

        let request = self.http_client.request(method, url);
        Ok(self.add_auth_headers(request))
    }

    /// Send a request and classify the outcome.
    ///
    /// This is the only place transport failures and error statuses are
    /// mapped to error kinds; callers see the original classification
    /// unchanged.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(Error::timeout(self.config.timeout));
            }
            Err(e) if e.is_connect() => {
                return Err(Error::Connection { source: e });
            }
            Err(e) => return Err(Error::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                "Request rejected: authentication failed"
            );
            return Err(Error::Authentication);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            message = %message,
            "Request failed"
        );

        match status.as_u16() {
            413 => Err(Error::file_too_large(message)),
            code => Err(Error::api(code, message)),
        }
    }

    /// Send a request and decode the JSON response body.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await.map_err(Error::Http)?;
        serde_json::from_slice(&bytes).map_err(Error::from)
    }
}

/// Best-effort extraction of the server's `error.message` field, falling back
/// to the raw body text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
