//! Document catalog records.
//!
//! A document is a persisted OCR result identified by its content hash,
//! distinct from the task that produced it.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Kind of a catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Images,
}

/// Processing status of a catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingStatus {
    Init,
    Pending,
    Running,
    Completed,
    Error,
}

/// Sort key for document listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Name,
    Status,
}

/// Sort direction for document listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Which fields a document search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SearchScope {
    Filenames,
    Content,
    Both,
}

/// Format for the binary document export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
    Markdown,
}

/// Type-specific document metadata.
///
/// The current server nests the payload under a `Pdf`/`Images` wrapper key;
/// older responses (and the list endpoint) use a flat object whose variant is
/// decided by the record's `type` field. Both shapes decode through named
/// parse paths in [`DocumentMeta::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentMeta {
    Pdf(PdfDocumentMeta),
    Images(ImagesDocumentMeta),
}

/// Metadata recorded for a PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfDocumentMeta {
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub completed_pages: Option<u32>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub completion_rate: Option<f64>,
}

/// Metadata recorded for an image batch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesDocumentMeta {
    #[serde(default)]
    pub image_count: Option<u32>,
    #[serde(default)]
    pub completed_images: Option<u32>,
    #[serde(default)]
    pub completion_rate: Option<f64>,
}

impl DocumentMeta {
    /// Decodes a metadata object, accepting both server shapes.
    ///
    /// The wrapper-tagged shape is tried first; on mismatch the flat legacy
    /// shape is decoded into the variant selected by `document_type`.
    pub(crate) fn from_value(
        document_type: DocumentType,
        value: serde_json::Value,
    ) -> serde_json::Result<Self> {
        Self::from_tagged(value.clone()).or_else(|_| Self::from_flat(document_type, value))
    }

    /// Current shape: `{"Pdf": {...}}` or `{"Images": {...}}`.
    fn from_tagged(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Legacy flat shape, discriminated by the record's `type` field.
    fn from_flat(
        document_type: DocumentType,
        value: serde_json::Value,
    ) -> serde_json::Result<Self> {
        match document_type {
            DocumentType::Pdf => serde_json::from_value(value).map(Self::Pdf),
            DocumentType::Images => serde_json::from_value(value).map(Self::Images),
        }
    }

    /// Fraction of pages or images that completed, when reported.
    pub fn completion_rate(&self) -> Option<f64> {
        match self {
            DocumentMeta::Pdf(meta) => meta.completion_rate,
            DocumentMeta::Images(meta) => meta.completion_rate,
        }
    }
}

/// A catalog document as returned by the list and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    /// Content hash identifying the document
    pub id: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub name: String,
    pub status: ProcessingStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Engine the document was processed with
    pub ocr_engine: String,
    pub metadata: DocumentMeta,
}

/// Shared wire shape for document records; `metadata` (and `content`, where
/// present) need the record's `type` before they can be decoded.
#[derive(Deserialize)]
struct DocumentRecordWire {
    id: String,
    #[serde(rename = "type")]
    document_type: DocumentType,
    name: String,
    status: ProcessingStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
    ocr_engine: String,
    metadata: serde_json::Value,
    #[serde(default)]
    content: Option<serde_json::Value>,
}

impl DocumentRecordWire {
    fn into_parts(self) -> serde_json::Result<(DocumentMetadata, Option<serde_json::Value>)> {
        let metadata = DocumentMeta::from_value(self.document_type, self.metadata)?;
        let document = DocumentMetadata {
            id: self.id,
            document_type: self.document_type,
            name: self.name,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            ocr_engine: self.ocr_engine,
            metadata,
        };
        Ok((document, self.content))
    }
}

impl<'de> Deserialize<'de> for DocumentMetadata {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = DocumentRecordWire::deserialize(deserializer)?;
        let (document, _) = wire.into_parts().map_err(serde::de::Error::custom)?;
        Ok(document)
    }
}

/// Pagination envelope for list and search responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

/// Response from the document list and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentMetadata>,
    pub pagination: PaginationInfo,
}

/// Per-page or per-image content blocks of a document, discriminated by the
/// wrapping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentContent {
    Pages(Vec<PageContent>),
    Images(Vec<ImageContent>),
}

/// Content block for a single PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub page_num: u32,
    pub has_result: bool,
    #[serde(default)]
    pub content: Option<String>,
}

/// Content block for a single image in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    pub id: u32,
    pub file_name: String,
    pub has_result: bool,
    #[serde(default)]
    pub content: Option<String>,
}

/// Response from the document details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDetails {
    pub document: DocumentMetadata,
    /// Ordered content blocks; absent when the server reports none
    pub content: Option<DocumentContent>,
}

impl<'de> Deserialize<'de> for DocumentDetails {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = DocumentRecordWire::deserialize(deserializer)?;
        let (document, content) = wire.into_parts().map_err(serde::de::Error::custom)?;
        let content = parse_content(content).map_err(serde::de::Error::custom)?;
        Ok(Self { document, content })
    }
}

fn parse_content(
    value: Option<serde_json::Value>,
) -> serde_json::Result<Option<DocumentContent>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some),
    }
}

/// Acknowledgement of a document deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDeleteResponse {
    pub id: String,
    pub status: String,
    pub message: String,
}
