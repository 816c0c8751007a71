//! Integration tests driving the client against a loopback mock service.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use serde_json::{Value, json};

use dotsocr_client::models::{
    DocumentMeta, DocumentType, ExportFormat, MarkdownExportMode, MarkdownExportRequest,
    TaskStatus,
};
use dotsocr_client::{
    DocumentListQuery, DocumentSearchQuery, DotsClient, DotsCredentials, Error, WaitOptions,
};

struct MockState {
    statuses: Vec<(&'static str, f32)>,
    status_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    captured_query: Mutex<Option<HashMap<String, String>>>,
    markdown_response: Option<Value>,
}

impl MockState {
    fn with_statuses(statuses: Vec<(&'static str, f32)>) -> Arc<Self> {
        Arc::new(Self {
            statuses,
            status_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            captured_query: Mutex::new(None),
            markdown_response: None,
        })
    }

    fn with_markdown_response(response: Value) -> Arc<Self> {
        Arc::new(Self {
            statuses: vec![("completed", 100.0)],
            status_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            captured_query: Mutex::new(None),
            markdown_response: Some(response),
        })
    }
}

fn mock_router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/ocr/pdf/upload", post(upload_pdf_handler))
        .route("/api/v1/ocr/images/upload", post(upload_images_handler))
        .route("/api/v1/ocr/status/{task_id}", get(status_handler))
        .route("/api/v1/ocr/result/{task_id}", get(result_handler))
        .route("/api/v1/ocr/task/{task_id}", delete(delete_task_handler))
        .route("/api/v1/documents", get(list_documents_handler))
        .route("/api/v1/documents/export", post(markdown_export_handler))
        .route("/api/v1/documents/{id}/export", get(binary_export_handler))
        .with_state(state)
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn client_for(state: Arc<MockState>) -> DotsClient {
    let base_url = serve(mock_router(state)).await;
    DotsClient::with_defaults(&base_url, DotsCredentials::bearer_token("test-token")).unwrap()
}

fn fast_poll() -> WaitOptions {
    WaitOptions::default().with_poll_interval(Duration::from_millis(10))
}

fn temp_pdf() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"%PDF-1.4\n%mock document\n").unwrap();
    file
}

fn temp_png() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0])
        .unwrap();
    file
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": "2024-01-15T10:30:00Z",
        "version": "1.0.0",
    }))
}

async fn upload_pdf_handler() -> Json<Value> {
    Json(json!({
        "task_id": "task-1",
        "status": "pending",
        "file_type": "pdf",
        "filename": "sample.pdf",
        "estimated_duration": "5s",
    }))
}

async fn upload_images_handler() -> Json<Value> {
    Json(json!({
        "task_id": "task-2",
        "status": "pending",
        "file_type": "batch_images",
        "filename": "batch",
        "estimated_duration": "3s",
    }))
}

async fn status_handler(
    State(state): State<Arc<MockState>>,
    Path(task_id): Path<String>,
) -> Json<Value> {
    let call = state.status_calls.fetch_add(1, Ordering::SeqCst);
    let (status, progress) = state.statuses[call.min(state.statuses.len() - 1)];
    Json(json!({
        "task_id": task_id,
        "status": status,
        "progress": progress,
        "filename": "sample.pdf",
    }))
}

async fn result_handler(Path(task_id): Path<String>) -> Json<Value> {
    Json(json!({
        "task_id": task_id,
        "status": "completed",
        "result": {
            "type": "pdf",
            "page_count": 2,
            "file_name": "sample.pdf",
            "dpi": 150,
            "pages": [
                {"page_num": 1, "has_result": true, "content": "Hello"},
                {"page_num": 2, "has_result": true, "content": "World"},
            ],
        },
        "metadata": {
            "task_id": task_id,
            "task_type": "pdf",
            "status": "completed",
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:31:00Z",
            "processing_time_seconds": 60,
            "processing_time": "1m",
            "file_name": "sample.pdf",
            "page_count": 2,
        },
    }))
}

async fn delete_task_handler(
    State(state): State<Arc<MockState>>,
    Path(task_id): Path<String>,
) -> Json<Value> {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"task_id": task_id, "status": "deleted"}))
}

async fn list_documents_handler(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    *state.captured_query.lock().unwrap() = Some(params);
    Json(json!({
        "documents": [
            {
                "id": "hash-1",
                "type": "images",
                "name": "batch",
                "status": "completed",
                "created_at": "2024-01-15T10:30:00Z",
                "updated_at": "2024-01-15T10:35:00Z",
                "ocr_engine": "dots",
                "metadata": {
                    "image_count": 3,
                    "completed_images": 3,
                    "completion_rate": 1.0,
                },
            },
        ],
        "pagination": {"page": 1, "page_size": 100, "total_count": 1, "total_pages": 1},
    }))
}

async fn markdown_export_handler(State(state): State<Arc<MockState>>) -> Json<Value> {
    Json(state.markdown_response.clone().expect("markdown response configured"))
}

async fn binary_export_handler() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"export.json\"",
            ),
        ],
        "{\"pages\":[]}",
    )
}

#[tokio::test]
async fn pdf_upload_poll_and_result_flow() {
    let state = MockState::with_statuses(vec![
        ("pending", 25.0),
        ("running", 60.0),
        ("completed", 100.0),
    ]);
    let client = client_for(state.clone()).await;

    let pdf = temp_pdf();
    let upload = client.upload_pdf(pdf.path(), Some(150)).await.unwrap();
    assert_eq!(upload.task_id, "task-1");

    let mut observed = Vec::new();
    let result = client
        .wait_for_completion_with_progress(&upload.task_id, &fast_poll(), |progress, status| {
            observed.push((progress, status));
        })
        .await
        .unwrap();

    assert_eq!(
        observed,
        vec![
            (25.0, TaskStatus::Pending),
            (60.0, TaskStatus::Running),
            (100.0, TaskStatus::Completed),
        ]
    );
    assert_eq!(state.status_calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.all_text(), "Hello\n\nWorld");
    assert_eq!(result.page_text(2), Some("World"));
}

#[tokio::test]
async fn image_batch_upload_accepted() {
    let state = MockState::with_statuses(vec![("pending", 0.0)]);
    let client = client_for(state).await;

    let first = temp_png();
    let second = temp_png();
    let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let upload = client.upload_images(&paths, None).await.unwrap();

    assert_eq!(upload.task_id, "task-2");
}

#[tokio::test]
async fn wait_reports_task_failure() {
    let state = MockState::with_statuses(vec![("failed", 0.0)]);
    let client = client_for(state).await;

    let result = client.wait_for_completion("task-1", &fast_poll()).await;
    assert!(matches!(result, Err(Error::TaskFailed { .. })));
}

#[tokio::test]
async fn wait_attempt_cap_bounds_polling() {
    let state = MockState::with_statuses(vec![("pending", 0.0)]);
    let client = client_for(state.clone()).await;

    let options = fast_poll().with_max_attempts(3);
    let result = client.wait_for_completion("task-1", &options).await;

    assert!(matches!(result, Err(Error::DeadlineExceeded { .. })));
    assert_eq!(state.status_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn delete_task_requires_completed_status() {
    let state = MockState::with_statuses(vec![("running", 50.0)]);
    let client = client_for(state.clone()).await;

    let result = client.delete_task("task-1").await;
    assert!(matches!(result, Err(Error::TaskNotCompleted { .. })));
    assert_eq!(state.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn delete_task_issues_single_delete_when_completed() {
    let state = MockState::with_statuses(vec![("completed", 100.0)]);
    let client = client_for(state.clone()).await;

    let response = client.delete_task("task-1").await.unwrap();
    assert_eq!(response.status, "deleted");
    assert_eq!(state.delete_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn task_404_maps_to_task_not_found() {
    let app = Router::new().route(
        "/api/v1/ocr/status/{task_id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"message": "task not found"}})),
            )
        }),
    );
    let base_url = serve(app).await;
    let client = DotsClient::with_defaults(&base_url, DotsCredentials::none()).unwrap();

    let result = client.get_task_status("missing").await;
    assert!(matches!(result, Err(Error::TaskNotFound { ref task_id }) if task_id == "missing"));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let app = Router::new().route(
        "/api/v1/ocr/tasks",
        get(|| async { StatusCode::UNAUTHORIZED }),
    );
    let base_url = serve(app).await;
    let client = DotsClient::with_defaults(&base_url, DotsCredentials::none()).unwrap();

    let result = client.list_tasks().await;
    assert!(matches!(result, Err(Error::Authentication)));
}

#[tokio::test]
async fn api_error_message_extracted_from_envelope() {
    let app = Router::new().route(
        "/api/v1/ocr/tasks",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"message": "backend exploded"}})),
            )
        }),
    );
    let base_url = serve(app).await;
    let client = DotsClient::with_defaults(&base_url, DotsCredentials::none()).unwrap();

    match client.list_tasks().await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend exploded");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn page_size_clamped_on_the_wire() {
    let state = MockState::with_statuses(vec![]);
    let client = client_for(state.clone()).await;

    let query = DocumentListQuery::new()
        .with_page_size(500)
        .with_document_type(DocumentType::Images);
    let response = client.list_documents(&query).await.unwrap();

    let captured = state.captured_query.lock().unwrap().clone().unwrap();
    assert_eq!(captured.get("page_size").map(String::as_str), Some("100"));
    assert_eq!(captured.get("type").map(String::as_str), Some("images"));
    assert_eq!(captured.get("sort_by").map(String::as_str), Some("updated_at"));

    assert_eq!(response.documents.len(), 1);
    match &response.documents[0].metadata {
        DocumentMeta::Images(meta) => assert_eq!(meta.image_count, Some(3)),
        other => panic!("expected images metadata, got {other:?}"),
    }
}

#[tokio::test]
async fn search_query_validated_locally() {
    // Unroutable port: a request would fail loudly, but validation fires first.
    let client =
        DotsClient::with_defaults("http://127.0.0.1:9", DotsCredentials::none()).unwrap();

    let result = client
        .search_documents(&DocumentSearchQuery::new(" a "))
        .await;
    assert!(matches!(result, Err(Error::Validation { .. })));
}

#[tokio::test]
async fn dpi_validated_locally() {
    let client =
        DotsClient::with_defaults("http://127.0.0.1:9", DotsCredentials::none()).unwrap();

    let pdf = temp_pdf();
    let result = client.upload_pdf(pdf.path(), Some(300)).await;
    assert!(matches!(result, Err(Error::Validation { .. })));
}

#[tokio::test]
async fn markdown_export_requires_file_name_for_pdf() {
    let client =
        DotsClient::with_defaults("http://127.0.0.1:9", DotsCredentials::none()).unwrap();

    let request = MarkdownExportRequest::new("hash-1", DocumentType::Pdf);
    let result = client.export_document_markdown(&request).await;
    assert!(matches!(result, Err(Error::Validation { .. })));
}

#[tokio::test]
async fn markdown_export_separated_flow() {
    let state = MockState::with_markdown_response(json!({
        "success": true,
        "mode": "separated",
        "text": "# Scan\n\n![clip_1](clip_1)",
        "clips": ["aGk=", "eW8="],
        "image_names": ["clip_1.png", "clip_2.png"],
        "content_type": "text/markdown",
        "generated_at": "2024-01-15T10:30:00Z",
    }));
    let client = client_for(state).await;

    let request = MarkdownExportRequest::new("hash-1", DocumentType::Images)
        .with_mode(MarkdownExportMode::Separated);
    let response = client.export_document_markdown(&request).await.unwrap();

    assert_eq!(response.mode, MarkdownExportMode::Separated);
    let clips = response.decoded_clips().unwrap();
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].1, b"hi");
}

#[tokio::test]
async fn markdown_export_mismatched_clips_rejected() {
    let state = MockState::with_markdown_response(json!({
        "success": true,
        "mode": "separated",
        "text": "# Scan",
        "clips": ["aGk="],
        "image_names": ["clip_1.png", "clip_2.png"],
        "content_type": "text/markdown",
        "generated_at": "2024-01-15T10:30:00Z",
    }));
    let client = client_for(state).await;

    let request = MarkdownExportRequest::new("hash-1", DocumentType::Images);
    let result = client.export_document_markdown(&request).await;
    assert!(matches!(result, Err(Error::Validation { .. })));
}

#[tokio::test]
async fn export_document_parses_content_disposition() {
    let state = MockState::with_statuses(vec![]);
    let client = client_for(state).await;

    let exported = client
        .export_document("hash-1", ExportFormat::Json)
        .await
        .unwrap();

    assert_eq!(exported.filename, "export.json");
    assert_eq!(exported.content_type, "application/json");
    assert_eq!(exported.content.as_ref(), b"{\"pages\":[]}");
}

#[tokio::test]
async fn health_check_returns_typed_response() {
    let state = MockState::with_statuses(vec![]);
    let client = client_for(state).await;

    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}
