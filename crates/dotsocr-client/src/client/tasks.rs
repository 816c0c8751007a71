//! Task workflow: upload, poll, fetch results, delete, list.
//!
//! A task is the server-side unit of OCR work created by an upload. The
//! server owns the task lifecycle (pending → running → completed | failed);
//! this module only observes it through status polling.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::multipart::{Form, Part};

use super::DotsClient;
use crate::TRACING_TARGET_TASKS;
use crate::error::{Error, Result};
use crate::files;
use crate::models::{
    OcrResult, TaskDeleteResponse, TaskStatus, TaskStatusResponse, TasksListResponse,
    UploadResponse,
};

/// Accepted DPI range for uploads.
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 72..=200;

/// Controls how [`DotsClient::wait_for_completion`] polls a task.
///
/// The defaults reproduce the service's historical contract: poll every two
/// seconds with no deadline. Set `max_wait` or `max_attempts` to bound the
/// wait; in async code, dropping the future cancels it.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Delay between status polls
    pub poll_interval: Duration,
    /// Overall deadline; `None` waits indefinitely
    pub max_wait: Option<Duration>,
    /// Cap on the number of status polls; `None` is unlimited
    pub max_attempts: Option<u32>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_wait: None,
            max_attempts: None,
        }
    }
}

impl WaitOptions {
    /// Set the delay between status polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set an overall deadline for the wait.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Cap the number of status polls.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl DotsClient {
    /// Upload a PDF file for OCR processing.
    ///
    /// The file is validated locally (extension, MIME guess, `%PDF` header)
    /// and buffered whole into the request body. `dpi`, when given, must lie
    /// in `[72, 200]`; violations fail before any request is sent.
    pub async fn upload_pdf(
        &self,
        path: impl AsRef<Path>,
        dpi: Option<u32>,
    ) -> Result<UploadResponse> {
        let path = path.as_ref();
        validate_dpi(dpi)?;
        files::validate_pdf_file(path)?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::file_read(path, e))?;
        let filename = files::upload_file_name(path);

        tracing::debug!(
            target: TRACING_TARGET_TASKS,
            file = %filename,
            size = data.len(),
            "Uploading PDF"
        );

        let part = Part::bytes(data)
            .file_name(filename.clone())
            .mime_str(mime::APPLICATION_PDF.as_ref())
            .map_err(Error::Http)?;
        let mut form = Form::new().part("file", part);
        if let Some(dpi) = dpi {
            form = form.text("dpi", dpi.to_string());
        }

        let request = self
            .request(Method::POST, "/api/v1/ocr/pdf/upload")?
            .multipart(form);
        let response: UploadResponse = self.execute_json(request).await?;
        check_task_handle(&response)?;

        tracing::info!(
            target: TRACING_TARGET_TASKS,
            task_id = %response.task_id,
            file = %filename,
            "PDF upload accepted"
        );

        Ok(response)
    }

    /// Upload a batch of images for OCR processing as a single task.
    ///
    /// Every file must be a JPEG, PNG, or WebP image, checked locally by
    /// extension, MIME guess, and magic bytes. All files are buffered and
    /// sent in one multipart request.
    pub async fn upload_images(
        &self,
        paths: &[impl AsRef<Path>],
        dpi: Option<u32>,
    ) -> Result<UploadResponse> {
        validate_dpi(dpi)?;
        if paths.is_empty() {
            return Err(Error::validation("at least one image file is required"));
        }

        let loads = paths.iter().map(|path| async move {
            let path = path.as_ref();
            let format = files::validate_image_file(path)?;
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| Error::file_read(path, e))?;
            Ok::<_, Error>((files::upload_file_name(path), format, data))
        });
        let loaded = futures::future::try_join_all(loads).await?;

        tracing::debug!(
            target: TRACING_TARGET_TASKS,
            count = loaded.len(),
            total_size = loaded.iter().map(|(_, _, data)| data.len()).sum::<usize>(),
            "Uploading image batch"
        );

        let mut form = Form::new();
        for (filename, format, data) in loaded {
            let part = Part::bytes(data)
                .file_name(filename)
                .mime_str(format.mime_type())
                .map_err(Error::Http)?;
            form = form.part("files", part);
        }
        if let Some(dpi) = dpi {
            form = form.text("dpi", dpi.to_string());
        }

        let request = self
            .request(Method::POST, "/api/v1/ocr/images/upload")?
            .multipart(form);
        let response: UploadResponse = self.execute_json(request).await?;
        check_task_handle(&response)?;

        tracing::info!(
            target: TRACING_TARGET_TASKS,
            task_id = %response.task_id,
            count = paths.len(),
            "Image batch upload accepted"
        );

        Ok(response)
    }

    /// Get the current status of an OCR task.
    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        let request = self.request(Method::GET, &format!("/api/v1/ocr/status/{task_id}"))?;
        self.execute_json(request)
            .await
            .map_err(|e| map_task_error(task_id, e))
    }

    /// Get the OCR result of a completed task.
    pub async fn get_task_result(&self, task_id: &str) -> Result<OcrResult> {
        let request = self.request(Method::GET, &format!("/api/v1/ocr/result/{task_id}"))?;
        self.execute_json(request)
            .await
            .map_err(|e| map_task_error(task_id, e))
    }

    /// Wait for a task to reach a terminal state and return its result.
    ///
    /// Equivalent to [`wait_for_completion_with_progress`] without a
    /// progress callback.
    ///
    /// [`wait_for_completion_with_progress`]: DotsClient::wait_for_completion_with_progress
    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        options: &WaitOptions,
    ) -> Result<OcrResult> {
        self.wait_for_completion_with_progress(task_id, options, |_, _| {})
            .await
    }

    /// Wait for a task to reach a terminal state, reporting progress.
    ///
    /// Polls the task status every `poll_interval`, invoking `progress` with
    /// the reported percentage and status once per observed status. When the
    /// task completes, the result is fetched and returned; when it fails,
    /// [`Error::TaskFailed`] is returned. Transient errors during polling
    /// (anything other than [`Error::TaskNotFound`], [`Error::TaskFailed`],
    /// and [`Error::Authentication`]) are absorbed and polling continues.
    ///
    /// Exceeding `max_wait` or `max_attempts` yields
    /// [`Error::DeadlineExceeded`]; with the default options the wait is
    /// unbounded. Dropping the future cancels the wait.
    pub async fn wait_for_completion_with_progress(
        &self,
        task_id: &str,
        options: &WaitOptions,
        mut progress: impl FnMut(f32, TaskStatus),
    ) -> Result<OcrResult> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            match self.get_task_status(task_id).await {
                Ok(status) => {
                    progress(status.progress, status.status);

                    match status.status {
                        TaskStatus::Completed => {
                            tracing::info!(
                                target: TRACING_TARGET_TASKS,
                                task_id,
                                waited = ?started.elapsed(),
                                "Task completed; fetching result"
                            );
                            return self.get_task_result(task_id).await;
                        }
                        TaskStatus::Failed => {
                            tracing::warn!(
                                target: TRACING_TARGET_TASKS,
                                task_id,
                                "Task failed during processing"
                            );
                            return Err(Error::task_failed(task_id));
                        }
                        TaskStatus::Pending | TaskStatus::Running => {}
                    }
                }
                Err(
                    err @ (Error::TaskNotFound { .. }
                    | Error::TaskFailed { .. }
                    | Error::Authentication),
                ) => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET_TASKS,
                        task_id,
                        error = %err,
                        "Transient error while polling; continuing"
                    );
                }
            }

            attempts += 1;
            if let Some(max_attempts) = options.max_attempts {
                if attempts >= max_attempts {
                    return Err(Error::deadline_exceeded(task_id, started.elapsed()));
                }
            }
            if let Some(max_wait) = options.max_wait {
                if started.elapsed() + options.poll_interval > max_wait {
                    return Err(Error::deadline_exceeded(task_id, started.elapsed()));
                }
            }

            tokio::time::sleep(options.poll_interval).await;
        }
    }

    /// Delete a completed task and its server-side resources.
    ///
    /// The task's status is checked first; any status other than `completed`
    /// fails with [`Error::TaskNotCompleted`] before a DELETE is issued.
    /// Status check and delete are two separate requests, so a concurrent
    /// server-side status change between them can still make the DELETE fail.
    pub async fn delete_task(&self, task_id: &str) -> Result<TaskDeleteResponse> {
        let status = self.get_task_status(task_id).await?;
        if status.status != TaskStatus::Completed {
            return Err(Error::task_not_completed(task_id, status.status));
        }

        let request = self.request(Method::DELETE, &format!("/api/v1/ocr/task/{task_id}"))?;
        self.execute(request)
            .await
            .map_err(|e| map_task_error(task_id, e))?;

        tracing::info!(target: TRACING_TARGET_TASKS, task_id, "Task deleted");

        Ok(TaskDeleteResponse::deleted(task_id))
    }

    /// List all tasks known to the server.
    pub async fn list_tasks(&self) -> Result<TasksListResponse> {
        let request = self.request(Method::GET, "/api/v1/ocr/tasks")?;
        self.execute_json(request).await
    }
}

fn validate_dpi(dpi: Option<u32>) -> Result<()> {
    match dpi {
        Some(dpi) if !DPI_RANGE.contains(&dpi) => Err(Error::validation(format!(
            "dpi must be between {} and {}",
            DPI_RANGE.start(),
            DPI_RANGE.end()
        ))),
        _ => Ok(()),
    }
}

/// Uploads must hand back a usable task handle.
fn check_task_handle(response: &UploadResponse) -> Result<()> {
    if response.task_id.is_empty() {
        return Err(Error::task_creation("server returned an empty task id"));
    }
    Ok(())
}

/// Task endpoints report unknown ids with a plain 404.
fn map_task_error(task_id: &str, err: Error) -> Error {
    match err {
        Error::Api { status: 404, .. } => Error::task_not_found(task_id),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpi_bounds() {
        assert!(validate_dpi(None).is_ok());
        assert!(validate_dpi(Some(72)).is_ok());
        assert!(validate_dpi(Some(150)).is_ok());
        assert!(validate_dpi(Some(200)).is_ok());
        assert!(matches!(
            validate_dpi(Some(71)),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_dpi(Some(201)),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_task_404_mapping() {
        let mapped = map_task_error("task-9", Error::api(404, "not found"));
        assert!(matches!(mapped, Error::TaskNotFound { ref task_id } if task_id == "task-9"));

        let passthrough = map_task_error("task-9", Error::api(500, "boom"));
        assert!(matches!(passthrough, Error::Api { status: 500, .. }));
    }

    #[test]
    fn test_wait_options_defaults_preserve_unbounded_wait() {
        let options = WaitOptions::default();
        assert_eq!(options.poll_interval, Duration::from_secs(2));
        assert!(options.max_wait.is_none());
        assert!(options.max_attempts.is_none());
    }
}
