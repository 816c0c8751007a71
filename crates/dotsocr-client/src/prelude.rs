//! Prelude for the dotsocr-client crate
//!
//! This module re-exports the most commonly used types from the crate to
//! provide a convenient single import for users.

pub use crate::client::{
    DocumentListQuery, DocumentSearchQuery, DotsClient, DotsConfig, DotsCredentials, WaitOptions,
};
pub use crate::error::{Error, Result};
pub use crate::models::{
    DocumentType, ExportFormat, MarkdownExportMode, MarkdownExportRequest, OcrResult,
    ProcessingStatus, SearchScope, SortField, SortOrder, TaskResult, TaskStatus,
};
