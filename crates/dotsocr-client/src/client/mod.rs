//! Client module
//!
//! The main client interface for the DotsOCR runner REST API: configuration,
//! credentials, the transport core, and the task and document workflows.

mod config;
mod credentials;
mod documents;
mod ocr_client;
mod tasks;

pub use crate::client::config::{DotsBuilder, DotsBuilderError, DotsConfig};
pub use crate::client::credentials::DotsCredentials;
pub use crate::client::documents::{
    DEFAULT_PAGE_SIZE, DocumentListQuery, DocumentSearchQuery, MAX_PAGE_SIZE,
};
pub use crate::client::ocr_client::DotsClient;
pub use crate::client::tasks::{DPI_RANGE, WaitOptions};
