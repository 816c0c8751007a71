//! Error types for dotsocr-client
//!
//! This module provides the unified error handling for the OCR client library.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::TaskStatus;

/// Result type for all OCR operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
/// Most functions in this crate return this type for consistent error handling.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for OCR client operations
///
/// Transport failures are classified exactly once, at the HTTP boundary, and
/// surface to callers unchanged. Local validation failures are raised before
/// any network request is issued.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client errors not otherwise classified
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors when sending or receiving data
    #[error("Invalid response format: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Base64 decoding errors for exported image clips
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Connection to the server failed
    #[error("Failed to connect to server: {source}")]
    Connection {
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Authentication failed (HTTP 401)
    #[error("Authentication failed")]
    Authentication,

    /// API error response
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Task not found (HTTP 404 on a task endpoint)
    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: String },

    /// Task reached the failed state during processing
    #[error("Task '{task_id}' failed during processing")]
    TaskFailed { task_id: String },

    /// Delete precondition violated: only completed tasks can be deleted
    #[error("Task '{task_id}' cannot be deleted in status '{status}'")]
    TaskNotCompleted {
        task_id: String,
        status: TaskStatus,
    },

    /// Server accepted the upload but returned an unusable task handle
    #[error("Task creation failed: {reason}")]
    TaskCreation { reason: String },

    /// File not found or not a regular file
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Reading a local file failed
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not one of the accepted upload formats
    #[error("Invalid file type for '{path}': {reason}")]
    InvalidFileType { path: PathBuf, reason: String },

    /// Upload rejected by the server for size (HTTP 413)
    #[error("File too large: {message}")]
    FileTooLarge { message: String },

    /// Local parameter validation failed before any request was sent
    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    /// A bounded wait ended without the task reaching a terminal state
    #[error("Task '{task_id}' did not reach a terminal state within {waited:?}")]
    DeadlineExceeded { task_id: String, waited: Duration },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The blocking facade could not start its runtime
    #[error("Failed to start blocking runtime: {source}")]
    Runtime {
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a task not found error
    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound {
            task_id: task_id.into(),
        }
    }

    /// Create a task failed error
    pub fn task_failed(task_id: impl Into<String>) -> Self {
        Self::TaskFailed {
            task_id: task_id.into(),
        }
    }

    /// Create a task not completed error
    pub fn task_not_completed(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self::TaskNotCompleted {
            task_id: task_id.into(),
            status,
        }
    }

    /// Create a task creation error
    pub fn task_creation(reason: impl Into<String>) -> Self {
        Self::TaskCreation {
            reason: reason.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a file read error
    pub fn file_read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid file type error
    pub fn invalid_file_type(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::InvalidFileType {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a file too large error
    pub fn file_too_large(message: impl Into<String>) -> Self {
        Self::FileTooLarge {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a deadline exceeded error
    pub fn deadline_exceeded(task_id: impl Into<String>, waited: Duration) -> Self {
        Self::DeadlineExceeded {
            task_id: task_id.into(),
            waited,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a timeout error with the given duration
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { timeout: duration }
    }

    /// Get the HTTP status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Authentication => Some(401),
            Error::TaskNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::Connection { .. } => true,
            Error::Timeout { .. } => true,
            Error::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get suggested retry delay for retryable errors
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Error::Timeout { .. } => Some(Duration::from_secs(1)),
            Error::Connection { .. } => Some(Duration::from_millis(500)),
            Error::Api { status, .. } if *status >= 500 => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

// Import builder error type for From implementation
use crate::client::DotsBuilderError;

impl From<DotsBuilderError> for Error {
    fn from(err: DotsBuilderError) -> Self {
        Error::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
