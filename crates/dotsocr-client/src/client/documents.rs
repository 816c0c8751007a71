//! Document catalog workflow: list, search, details, export, delete.
//!
//! Documents are persisted OCR results identified by content hash, distinct
//! from the tasks that produced them.

use reqwest::Method;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};

use super::DotsClient;
use crate::TRACING_TARGET_DOCUMENTS;
use crate::error::{Error, Result};
use crate::models::{
    DocumentDeleteResponse, DocumentDetails, DocumentListResponse, DocumentType, ExportFormat,
    ExportedFile, MarkdownExportRequest, MarkdownExportResponse, ProcessingStatus, SearchScope,
    SortField, SortOrder,
};

/// Page size applied when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size the server accepts; larger values are clamped before
/// the request is sent.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Minimum length of a trimmed search query.
const MIN_QUERY_LEN: usize = 2;

/// Filters, pagination, and ordering for [`DotsClient::list_documents`].
///
/// Optional filters are omitted from the query string when unset.
#[derive(Debug, Clone)]
pub struct DocumentListQuery {
    pub page: u32,
    pub page_size: u32,
    pub document_type: Option<DocumentType>,
    pub status: Option<ProcessingStatus>,
    /// Earliest creation date to include, ISO 8601
    pub date_start: Option<String>,
    /// Latest creation date to include, ISO 8601
    pub date_end: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for DocumentListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            document_type: None,
            status: None,
            date_start: None,
            date_end: None,
            sort_by: SortField::UpdatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl DocumentListQuery {
    /// Create a query with the default pagination and ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number (1-based).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size; values above [`MAX_PAGE_SIZE`] are clamped when
    /// the request is built.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Only include documents of the given type.
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    /// Only include documents with the given processing status.
    pub fn with_status(mut self, status: ProcessingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only include documents created at or after this ISO 8601 date.
    pub fn with_date_start(mut self, date_start: impl Into<String>) -> Self {
        self.date_start = Some(date_start.into());
        self
    }

    /// Only include documents created at or before this ISO 8601 date.
    pub fn with_date_end(mut self, date_end: impl Into<String>) -> Self {
        self.date_end = Some(date_end.into());
        self
    }

    /// Set the sort key.
    pub fn with_sort_by(mut self, sort_by: SortField) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Set the sort direction.
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.min(MAX_PAGE_SIZE).to_string()),
            ("sort_by", self.sort_by.to_string()),
            ("sort_order", self.sort_order.to_string()),
        ];

        if let Some(document_type) = self.document_type {
            pairs.push(("type", document_type.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(date_start) = &self.date_start {
            pairs.push(("date_start", date_start.clone()));
        }
        if let Some(date_end) = &self.date_end {
            pairs.push(("date_end", date_end.clone()));
        }

        pairs
    }
}

/// Query text, scope, and pagination for [`DotsClient::search_documents`].
#[derive(Debug, Clone)]
pub struct DocumentSearchQuery {
    pub query: String,
    pub scope: SearchScope,
    pub page: u32,
    pub page_size: u32,
}

impl DocumentSearchQuery {
    /// Create a search over filenames with default pagination.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            scope: SearchScope::Filenames,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set which fields the search matches against.
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the page number (1-based).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size; values above [`MAX_PAGE_SIZE`] are clamped when
    /// the request is built.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.query.trim().chars().count() < MIN_QUERY_LEN {
            return Err(Error::validation(format!(
                "search query must be at least {MIN_QUERY_LEN} characters long"
            )));
        }
        Ok(())
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.query.trim().to_string()),
            ("scope", self.scope.to_string()),
            ("page", self.page.to_string()),
            ("page_size", self.page_size.min(MAX_PAGE_SIZE).to_string()),
        ]
    }
}

impl DotsClient {
    /// List documents with pagination, filtering, and ordering.
    pub async fn list_documents(
        &self,
        query: &DocumentListQuery,
    ) -> Result<DocumentListResponse> {
        let request = self
            .request(Method::GET, "/api/v1/documents")?
            .query(&query.query_pairs());
        self.execute_json(request).await
    }

    /// Search documents across filenames and OCR content.
    ///
    /// The trimmed query must be at least two characters long; shorter
    /// queries fail locally without a request.
    pub async fn search_documents(
        &self,
        query: &DocumentSearchQuery,
    ) -> Result<DocumentListResponse> {
        query.validate()?;

        let request = self
            .request(Method::GET, "/api/v1/documents/search")?
            .query(&query.query_pairs());
        self.execute_json(request).await
    }

    /// Get a document's metadata and its per-page or per-image content.
    pub async fn get_document_details(&self, document_id: &str) -> Result<DocumentDetails> {
        let request = self.request(Method::GET, &format!("/api/v1/documents/{document_id}"))?;
        self.execute_json(request).await
    }

    /// Delete a document and all associated data.
    pub async fn delete_document(&self, document_id: &str) -> Result<DocumentDeleteResponse> {
        let request =
            self.request(Method::DELETE, &format!("/api/v1/documents/{document_id}"))?;
        let response: DocumentDeleteResponse = self.execute_json(request).await?;

        tracing::info!(
            target: TRACING_TARGET_DOCUMENTS,
            document_id,
            "Document deleted"
        );

        Ok(response)
    }

    /// Export a document in the given format, returning the body verbatim.
    ///
    /// The filename is taken from the `Content-Disposition` header when
    /// present, otherwise derived from the format.
    pub async fn export_document(
        &self,
        document_id: &str,
        format: ExportFormat,
    ) -> Result<ExportedFile> {
        let request = self
            .request(
                Method::GET,
                &format!("/api/v1/documents/{document_id}/export"),
            )?
            .query(&[("format", format.as_ref())]);
        let response = self.execute(request).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| format!("document.{}", format.as_ref()));
        let content = response.bytes().await.map_err(Error::Http)?;

        tracing::debug!(
            target: TRACING_TARGET_DOCUMENTS,
            document_id,
            format = format.as_ref(),
            size = content.len(),
            "Document exported"
        );

        Ok(ExportedFile {
            content,
            content_type,
            filename,
        })
    }

    /// Export a document's content as markdown.
    ///
    /// The request is validated locally first (PDF documents require a
    /// `file_name`). The response is checked against the mode contract:
    /// separated responses carry parallel `clips`/`image_names` lists,
    /// embedded responses inline their images into the text.
    pub async fn export_document_markdown(
        &self,
        request: &MarkdownExportRequest,
    ) -> Result<MarkdownExportResponse> {
        request.validate()?;

        let http_request = self
            .request(Method::POST, "/api/v1/documents/export")?
            .json(request);
        let response: MarkdownExportResponse = self.execute_json(http_request).await?;
        response.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_DOCUMENTS,
            content_hash = %request.content_hash,
            mode = %response.mode,
            clips = response.clips.as_ref().map_or(0, Vec::len),
            "Markdown export complete"
        );

        Ok(response)
    }
}

/// Pulls the filename out of a `Content-Disposition` header value.
fn filename_from_content_disposition(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("filename=")?;
    let rest = rest.split(';').next().unwrap_or(rest).trim();
    let name = rest.trim_matches('"').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
