//! Task lifecycle and OCR result records.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle states of a server-side OCR task.
///
/// Transitions are driven entirely by the server; the client only observes
/// them through status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    /// Queued, not yet picked up by a worker
    Pending,
    /// OCR in progress
    Running,
    /// Finished successfully; results are available
    Completed,
    /// Finished unsuccessfully
    Failed,
}

impl TaskStatus {
    /// Whether the task has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Kind of payload a task was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FileType {
    /// A single PDF document
    Pdf,
    /// A batch of standalone images
    BatchImages,
}

/// Response from the PDF and image upload endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Server-assigned task identifier
    pub task_id: String,
    /// Initial task status (normally `pending`)
    pub status: TaskStatus,
    /// Kind of payload the task was created from
    pub file_type: FileType,
    /// Filename the server recorded for the upload
    pub filename: String,
    /// Server's estimate of the processing duration
    pub estimated_duration: String,
}

/// Response from the task status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: TaskStatus,
    /// Completion percentage in `[0, 100]`
    pub progress: f32,
    #[serde(default)]
    pub filename: String,
}

/// OCR result for a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub task_id: String,
    pub status: TaskStatus,
    /// Per-page or per-image payload, discriminated by the `type` field
    pub result: TaskResult,
    pub metadata: TaskMetadata,
}

/// Result payload, discriminated by the wire-level `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskResult {
    /// Result of a PDF task: one entry per rendered page
    Pdf(PdfResult),
    /// Result of an image batch task: one entry per input image
    BatchImages(BatchImagesResult),
}

/// Detailed result for a PDF OCR task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfResult {
    pub page_count: u32,
    pub file_name: String,
    /// DPI the pages were rendered at
    pub dpi: u32,
    pub pages: Vec<PageResult>,
}

/// Result for a single PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_num: u32,
    pub has_result: bool,
    #[serde(default)]
    pub content: Option<String>,
}

/// Detailed result for a batch images OCR task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchImagesResult {
    pub image_count: u32,
    pub content_hash: String,
    pub images: Vec<ImageResult>,
}

/// Result for a single image in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub id: u32,
    pub file_name: String,
    pub state: String,
    pub width: u32,
    pub height: u32,
    pub has_result: bool,
    #[serde(default)]
    pub content: Option<String>,
}

/// Processing metadata attached to a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub task_id: String,
    pub task_type: String,
    pub status: TaskStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub processing_time_seconds: i64,
    pub processing_time: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub image_count: Option<u32>,
}

impl OcrResult {
    /// Concatenates all recognized text, in page/image order, separated by
    /// blank lines. Pages or images without a result are skipped.
    pub fn all_text(&self) -> String {
        match &self.result {
            TaskResult::Pdf(pdf) => pdf
                .pages
                .iter()
                .filter(|p| p.has_result)
                .filter_map(|p| p.content.as_deref())
                .collect::<Vec<_>>()
                .join("\n\n"),
            TaskResult::BatchImages(batch) => batch
                .images
                .iter()
                .filter(|i| i.has_result)
                .filter_map(|i| i.content.as_deref())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// Recognized text for a specific PDF page, if this is a PDF result and
    /// the page has a result.
    pub fn page_text(&self, page_num: u32) -> Option<&str> {
        match &self.result {
            TaskResult::Pdf(pdf) => pdf
                .pages
                .iter()
                .find(|p| p.page_num == page_num && p.has_result)
                .and_then(|p| p.content.as_deref()),
            TaskResult::BatchImages(_) => None,
        }
    }

    /// Recognized text for a specific image id, if this is a batch result and
    /// the image has a result.
    pub fn image_text(&self, image_id: u32) -> Option<&str> {
        match &self.result {
            TaskResult::BatchImages(batch) => batch
                .images
                .iter()
                .find(|i| i.id == image_id && i.has_result)
                .and_then(|i| i.content.as_deref()),
            TaskResult::Pdf(_) => None,
        }
    }
}

/// Basic task information from the task list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub task_type: String,
    pub status: TaskStatus,
    pub filename: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    pub progress: f32,
}

/// Response from the task list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksListResponse {
    pub tasks: Vec<TaskInfo>,
    pub total_count: u64,
}

/// Acknowledgement of a task deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDeleteResponse {
    pub task_id: String,
    pub status: String,
}

impl TaskDeleteResponse {
    pub(crate) fn deleted(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: "deleted".to_string(),
        }
    }
}

/// Response from the health check endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}
