//! OCR client configuration
//!
//! This module provides configuration structures and builders for the OCR client.

use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::error::{Error, Result};

/// Configuration for the OCR client
///
/// Contains all the settings needed to configure the OCR client behavior,
/// including the server base URL, timeouts, and the user agent. Every client
/// owns exactly one configuration, injected at construction; there is no
/// ambient or global state.
#[derive(Debug, Clone, Builder)]
#[builder(
    name = "DotsBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
pub struct DotsConfig {
    /// Base URL of the DotsOCR runner server
    #[builder(setter(custom), default = "DotsConfig::default_base_url()")]
    pub base_url: Url,
    /// Request timeout duration
    #[builder(default = "Duration::from_secs(30)")]
    pub timeout: Duration,
    /// Connection timeout duration
    #[builder(default = "Duration::from_secs(10)")]
    pub connect_timeout: Duration,
    /// User agent string for requests
    #[builder(default = "DotsConfig::default_user_agent()")]
    pub user_agent: String,
}

impl Default for DotsConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: Self::default_user_agent(),
        }
    }
}

impl DotsConfig {
    /// Create a new configuration builder
    pub fn builder() -> DotsBuilder {
        DotsBuilder::default()
    }

    fn default_base_url() -> Url {
        "http://127.0.0.1:8080".parse().expect("Valid default URL")
    }

    fn default_user_agent() -> String {
        format!("dotsocr-client/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl DotsBuilder {
    /// Set the base URL of the DotsOCR runner server
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        self.base_url =
            Some(url.parse().map_err(|e| {
                Error::invalid_config(format!("Invalid base URL '{}': {}", url, e))
            })?);
        Ok(self)
    }

    fn validate_config(&self) -> std::result::Result<(), String> {
        if let Some(timeout) = &self.timeout {
            if timeout.is_zero() {
                return Err("Timeout must be greater than 0".to_string());
            }
        }

        if let Some(connect_timeout) = &self.connect_timeout {
            if connect_timeout.is_zero() {
                return Err("Connect timeout must be greater than 0".to_string());
            }
        }

        Ok(())
    }
}
