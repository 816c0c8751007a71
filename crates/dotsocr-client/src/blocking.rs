//! Blocking facade over the async client.
//!
//! [`DotsClient`](crate::blocking::DotsClient) mirrors every method of the
//! async [`DotsClient`](crate::DotsClient) with identical contracts. Each
//! blocking client owns a private current-thread tokio runtime and drives the
//! async client to completion one call at a time.
//!
//! Do not use this type from inside an async runtime; blocking a runtime
//! thread deadlocks it. Async programs should use [`crate::DotsClient`]
//! directly.

use std::path::Path;

use tokio::runtime::{Builder as RuntimeBuilder, Runtime};

use crate::client::{DocumentListQuery, DocumentSearchQuery, WaitOptions};
use crate::error::{Error, Result};
use crate::models::{
    DocumentDeleteResponse, DocumentDetails, DocumentListResponse, ExportFormat, ExportedFile,
    HealthResponse, MarkdownExportRequest, MarkdownExportResponse, OcrResult, TaskDeleteResponse,
    TaskStatus, TaskStatusResponse, TasksListResponse, UploadResponse,
};
use crate::{DotsConfig, DotsCredentials};

/// Blocking client for the DotsOCR runner REST API.
///
/// # Examples
///
/// ```rust,ignore
/// use dotsocr_client::blocking;
/// use dotsocr_client::DotsCredentials;
///
/// let client = blocking::DotsClient::with_defaults(
///     "http://127.0.0.1:8080",
///     DotsCredentials::bearer_token("your-token"),
/// )?;
/// let upload = client.upload_pdf("document.pdf", None)?;
/// ```
#[derive(Debug)]
pub struct DotsClient {
    inner: crate::DotsClient,
    runtime: Runtime,
}

impl DotsClient {
    /// Create a new blocking OCR client with the given configuration and
    /// credentials.
    pub fn new(config: DotsConfig, credentials: DotsCredentials) -> Result<Self> {
        let runtime = RuntimeBuilder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| Error::Runtime { source })?;
        let inner = crate::DotsClient::new(config, credentials)?;

        Ok(Self { inner, runtime })
    }

    /// Create a new blocking OCR client with default configuration.
    pub fn with_defaults(
        base_url: impl AsRef<str>,
        credentials: DotsCredentials,
    ) -> Result<Self> {
        let config = DotsConfig::builder()
            .with_base_url(base_url.as_ref())?
            .build()?;

        Self::new(config, credentials)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &DotsConfig {
        self.inner.config()
    }

    /// Perform a health check against the OCR service.
    pub fn health_check(&self) -> Result<HealthResponse> {
        self.runtime.block_on(self.inner.health_check())
    }

    /// Upload a PDF file for OCR processing.
    pub fn upload_pdf(&self, path: impl AsRef<Path>, dpi: Option<u32>) -> Result<UploadResponse> {
        self.runtime.block_on(self.inner.upload_pdf(path, dpi))
    }

    /// Upload a batch of images for OCR processing as a single task.
    pub fn upload_images(
        &self,
        paths: &[impl AsRef<Path>],
        dpi: Option<u32>,
    ) -> Result<UploadResponse> {
        self.runtime.block_on(self.inner.upload_images(paths, dpi))
    }

    /// Get the current status of an OCR task.
    pub fn get_task_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        self.runtime.block_on(self.inner.get_task_status(task_id))
    }

    /// Get the OCR result of a completed task.
    pub fn get_task_result(&self, task_id: &str) -> Result<OcrResult> {
        self.runtime.block_on(self.inner.get_task_result(task_id))
    }

    /// Wait for a task to reach a terminal state and return its result.
    pub fn wait_for_completion(&self, task_id: &str, options: &WaitOptions) -> Result<OcrResult> {
        self.runtime
            .block_on(self.inner.wait_for_completion(task_id, options))
    }

    /// Wait for a task to reach a terminal state, reporting progress.
    pub fn wait_for_completion_with_progress(
        &self,
        task_id: &str,
        options: &WaitOptions,
        progress: impl FnMut(f32, TaskStatus),
    ) -> Result<OcrResult> {
        self.runtime.block_on(
            self.inner
                .wait_for_completion_with_progress(task_id, options, progress),
        )
    }

    /// Delete a completed task and its server-side resources.
    pub fn delete_task(&self, task_id: &str) -> Result<TaskDeleteResponse> {
        self.runtime.block_on(self.inner.delete_task(task_id))
    }

    /// List all tasks known to the server.
    pub fn list_tasks(&self) -> Result<TasksListResponse> {
        self.runtime.block_on(self.inner.list_tasks())
    }

    /// List documents with pagination, filtering, and ordering.
    pub fn list_documents(&self, query: &DocumentListQuery) -> Result<DocumentListResponse> {
        self.runtime.block_on(self.inner.list_documents(query))
    }

    /// Search documents across filenames and OCR content.
    pub fn search_documents(&self, query: &DocumentSearchQuery) -> Result<DocumentListResponse> {
        self.runtime.block_on(self.inner.search_documents(query))
    }

    /// Get a document's metadata and its per-page or per-image content.
    pub fn get_document_details(&self, document_id: &str) -> Result<DocumentDetails> {
        self.runtime
            .block_on(self.inner.get_document_details(document_id))
    }

    /// Delete a document and all associated data.
    pub fn delete_document(&self, document_id: &str) -> Result<DocumentDeleteResponse> {
        self.runtime
            .block_on(self.inner.delete_document(document_id))
    }

    /// Export a document in the given format, returning the body verbatim.
    pub fn export_document(
        &self,
        document_id: &str,
        format: ExportFormat,
    ) -> Result<ExportedFile> {
        self.runtime
            .block_on(self.inner.export_document(document_id, format))
    }

    /// Export a document's content as markdown.
    pub fn export_document_markdown(
        &self,
        request: &MarkdownExportRequest,
    ) -> Result<MarkdownExportResponse> {
        self.runtime
            .block_on(self.inner.export_document_markdown(request))
    }
}
