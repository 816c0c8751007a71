//! Markdown and binary export records.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{Error, Result};
use crate::models::DocumentType;

/// How exported markdown carries the document's images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkdownExportMode {
    /// Images are inlined in the text as base64 data URLs
    Embedded,
    /// Images are returned separately as base64 clips with placeholder
    /// references in the text
    Separated,
}

/// Request body for the markdown export endpoint.
///
/// Unset optional fields are omitted from the JSON body entirely, letting the
/// server apply its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownExportRequest {
    /// Content hash of the document to export
    pub content_hash: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    /// Source filename; required for PDF documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MarkdownExportMode>,
    /// Page selection for PDFs, e.g. `"1-5,7,9-10"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_range: Option<String>,
    /// Image selection for batches, e.g. `"1-5,7,9-10"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_range: Option<String>,
}

impl MarkdownExportRequest {
    /// Creates a request with the required fields; optional fields start unset.
    pub fn new(content_hash: impl Into<String>, document_type: DocumentType) -> Self {
        Self {
            content_hash: content_hash.into(),
            document_type,
            file_name: None,
            mode: None,
            page_range: None,
            image_range: None,
        }
    }

    /// Sets the source filename (required for PDF documents).
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the export mode.
    pub fn with_mode(mut self, mode: MarkdownExportMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the page selection for PDF documents.
    pub fn with_page_range(mut self, page_range: impl Into<String>) -> Self {
        self.page_range = Some(page_range.into());
        self
    }

    /// Sets the image selection for image batch documents.
    pub fn with_image_range(mut self, image_range: impl Into<String>) -> Self {
        self.image_range = Some(image_range.into());
        self
    }

    /// Local precondition checks, run before the request is sent.
    pub fn validate(&self) -> Result<()> {
        if self.content_hash.trim().is_empty() {
            return Err(Error::validation("content_hash is required"));
        }
        if self.document_type == DocumentType::Pdf
            && self.file_name.as_deref().is_none_or(str::is_empty)
        {
            return Err(Error::validation("file_name is required for PDF documents"));
        }
        Ok(())
    }
}

/// Response from the markdown export endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownExportResponse {
    pub success: bool,
    /// Mode the server actually applied
    pub mode: MarkdownExportMode,
    /// Markdown text; in embedded mode images appear inline as data URLs
    pub text: String,
    /// Base64 image data, present only in separated mode
    #[serde(default)]
    pub clips: Option<Vec<String>>,
    /// Image names parallel to `clips`, present only in separated mode
    #[serde(default)]
    pub image_names: Option<Vec<String>>,
    pub content_type: String,
    pub generated_at: Timestamp,
}

impl MarkdownExportResponse {
    /// Checks the mode/clips contract: separated responses must carry `clips`
    /// and `image_names` of equal length, embedded responses neither.
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            MarkdownExportMode::Separated => match (&self.clips, &self.image_names) {
                (Some(clips), Some(names)) if clips.len() == names.len() => Ok(()),
                (Some(clips), Some(names)) => Err(Error::validation(format!(
                    "separated export returned {} clips but {} image names",
                    clips.len(),
                    names.len()
                ))),
                _ => Err(Error::validation(
                    "separated export must carry both clips and image_names",
                )),
            },
            MarkdownExportMode::Embedded => {
                if self.clips.is_some() || self.image_names.is_some() {
                    Err(Error::validation(
                        "embedded export must not carry clips or image_names",
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Decodes the base64 clips into raw image bytes, paired with their names.
    ///
    /// Returns an empty list for embedded-mode responses.
    pub fn decoded_clips(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let (Some(clips), Some(names)) = (&self.clips, &self.image_names) else {
            return Ok(Vec::new());
        };
        clips
            .iter()
            .zip(names)
            .map(|(clip, name)| Ok((name.clone(), BASE64.decode(clip)?)))
            .collect()
    }
}

/// A document exported through the binary export endpoint, returned verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    /// Raw response body
    pub content: Bytes,
    /// Content type reported by the server
    pub content_type: String,
    /// Filename from `Content-Disposition`, or derived from the format
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_omits_unset_fields() {
        let request = MarkdownExportRequest::new("hash-1", DocumentType::Images);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body, json!({"content_hash": "hash-1", "type": "images"}));
    }

    #[test]
    fn test_request_serializes_set_fields() {
        let request = MarkdownExportRequest::new("hash-1", DocumentType::Pdf)
            .with_file_name("report.pdf")
            .with_mode(MarkdownExportMode::Separated)
            .with_page_range("1-3");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "content_hash": "hash-1",
                "type": "pdf",
                "file_name": "report.pdf",
                "mode": "separated",
                "page_range": "1-3",
            })
        );
    }

    #[test]
    fn test_pdf_request_requires_file_name() {
        let request = MarkdownExportRequest::new("hash-1", DocumentType::Pdf);
        assert!(matches!(request.validate(), Err(Error::Validation { .. })));

        let request = request.with_file_name("report.pdf");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_images_request_needs_no_file_name() {
        let request = MarkdownExportRequest::new("hash-1", DocumentType::Images);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_content_hash_rejected() {
        let request = MarkdownExportRequest::new("  ", DocumentType::Images);
        assert!(matches!(request.validate(), Err(Error::Validation { .. })));
    }

    fn separated_response(clips: Vec<&str>, names: Vec<&str>) -> MarkdownExportResponse {
        serde_json::from_value(json!({
            "success": true,
            "mode": "separated",
            "text": "# Doc\n\n![img](clip_1)",
            "clips": clips,
            "image_names": names,
            "content_type": "text/markdown",
            "generated_at": "2024-01-15T10:30:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_separated_response_contract() {
        let response = separated_response(vec!["aGk=", "eW8="], vec!["a.png", "b.png"]);
        assert!(response.validate().is_ok());

        let clips = response.decoded_clips().unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0], ("a.png".to_string(), b"hi".to_vec()));
        assert_eq!(clips[1], ("b.png".to_string(), b"yo".to_vec()));
    }

    #[test]
    fn test_separated_response_length_mismatch_rejected() {
        let response = separated_response(vec!["aGk="], vec!["a.png", "b.png"]);
        assert!(matches!(response.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_embedded_response_contract() {
        let response: MarkdownExportResponse = serde_json::from_value(json!({
            "success": true,
            "mode": "embedded",
            "text": "![img](data:image/png;base64,aGk=)",
            "content_type": "text/markdown",
            "generated_at": "2024-01-15T10:30:00Z",
        }))
        .unwrap();

        assert!(response.validate().is_ok());
        assert!(response.decoded_clips().unwrap().is_empty());
    }
}
