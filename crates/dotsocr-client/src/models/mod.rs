//! Typed wire records for the DotsOCR runner REST API.
//!
//! Every type in this module is an immutable value record deserialized from
//! one response body (or serialized into one request body) and handed to the
//! caller as-is. The client performs no caching and no mutation; identity
//! lives server-side in the task id and document content hash.

mod document;
mod export;
mod task;

pub use crate::models::document::{
    DocumentContent, DocumentDeleteResponse, DocumentDetails, DocumentListResponse, DocumentMeta,
    DocumentMetadata, DocumentType, ExportFormat, ImageContent, ImagesDocumentMeta, PageContent,
    PaginationInfo, PdfDocumentMeta, ProcessingStatus, SearchScope, SortField, SortOrder,
};
pub use crate::models::export::{
    ExportedFile, MarkdownExportMode, MarkdownExportRequest, MarkdownExportResponse,
};
pub use crate::models::task::{
    BatchImagesResult, FileType, HealthResponse, ImageResult, OcrResult, PageResult, PdfResult,
    TaskDeleteResponse, TaskInfo, TaskMetadata, TaskResult, TaskStatus, TaskStatusResponse,
    TasksListResponse, UploadResponse,
};
