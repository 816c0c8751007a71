#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client construction and transport-level events.
///
/// Use this target for logging client initialization, request dispatch, and
/// response classification.
pub const TRACING_TARGET_CLIENT: &str = "dotsocr_client::client";

/// Tracing target for task workflow operations (upload, poll, result, delete).
pub const TRACING_TARGET_TASKS: &str = "dotsocr_client::tasks";

/// Tracing target for document catalog operations.
pub const TRACING_TARGET_DOCUMENTS: &str = "dotsocr_client::documents";

pub mod blocking;
mod client;
pub mod error;
pub mod files;
pub mod models;
#[doc(hidden)]
pub mod prelude;

pub use crate::client::{
    DEFAULT_PAGE_SIZE, DPI_RANGE, DocumentListQuery, DocumentSearchQuery, DotsBuilder,
    DotsClient, DotsConfig, DotsCredentials, MAX_PAGE_SIZE, WaitOptions,
};
pub use crate::error::{Error, Result};
