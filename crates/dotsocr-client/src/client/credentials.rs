//! Authentication credentials
//!
//! This module provides authentication credential types for the OCR client.

/// Authentication credentials for the DotsOCR runner service
///
/// The service authenticates with a bearer token; local development servers
/// commonly run without authentication.
#[derive(Debug, Clone)]
pub enum DotsCredentials {
    /// Bearer token authentication
    BearerToken(String),
    /// No authentication (for local development servers)
    None,
}

impl DotsCredentials {
    /// Create bearer token credentials
    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::BearerToken(token.into())
    }

    /// Create credentials with no authentication
    pub fn none() -> Self {
        Self::None
    }
}
