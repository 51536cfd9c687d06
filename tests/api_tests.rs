use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use agrirag::api::build_app;
use agrirag::api::handlers::AppState;
use agrirag::config::AppConfig;
use agrirag::embeddings::EmbeddingService;
use agrirag::llm::ChatModel;
use agrirag::llm::Transcriber;
use agrirag::llm::VisionModel;
use agrirag::models::AudioInput;
use agrirag::models::ImageInput;
use agrirag::models::Language;
use agrirag::rag::pipeline::build_index;
use agrirag::rag::AdvisoryService;
use agrirag::rag::FieldExtractor;
use agrirag::rag::SimilarityMatcher;
use agrirag::AgriRagError;
use agrirag::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "agrirag-test-boundary";

/// Collaborator that answers every call with the same text
struct Scripted {
    reply: &'static str,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.to_string())
    }
}

#[async_trait]
impl ChatModel for Scripted {
    async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
        self.answer()
    }
}

#[async_trait]
impl VisionModel for Scripted {
    async fn analyze(&self, _image: &ImageInput, _prompt: &str, _max_tokens: u32) -> Result<String> {
        self.answer()
    }
}

#[async_trait]
impl Transcriber for Scripted {
    async fn transcribe(&self, _audio: &AudioInput, _language: Language) -> Result<String> {
        self.answer()
    }
}

/// Collaborator whose upstream is always down
struct Unavailable;

#[async_trait]
impl ChatModel for Unavailable {
    async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
        Err(AgriRagError::CollaboratorError(
            "chat API error (503 Service Unavailable): overloaded".to_string(),
        ))
    }
}

#[async_trait]
impl VisionModel for Unavailable {
    async fn analyze(&self, _image: &ImageInput, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(AgriRagError::Timeout("vision: operation timed out".to_string()))
    }
}

#[async_trait]
impl Transcriber for Unavailable {
    async fn transcribe(&self, _audio: &AudioInput, _language: Language) -> Result<String> {
        Err(AgriRagError::Timeout("transcription: operation timed out".to_string()))
    }
}

struct Harness {
    app: Router,
    collaborator: Arc<Scripted>,
    _data_dir: tempfile::TempDir,
}

fn write_corpus(dir: &std::path::Path) {
    std::fs::write(
        dir.join("rice_diseases.csv"),
        "Disease,Symptoms,Probable Solution,Date\n\
         Leaf Blight,yellowing leaves,Spray copper fungicide,2023-06-01\n\
         Blast,grey spindle lesions,Use resistant varieties,2023-07-15\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("jute_advice.csv"),
        "Problem,Advice/ solution given\nStem rot,Remove infected plants\n",
    )
    .unwrap();
    std::fs::write(dir.join("broken.csv"), "A,B\n1,2,3\n").unwrap();
}

async fn index_for(dir: &std::path::Path) -> (agrirag::embeddings::EmbeddingIndex, EmbeddingService) {
    let mut config = AppConfig::default();
    config.data.dir = dir.to_path_buf();
    config.embeddings.provider = "hashing".to_string();
    config.embeddings.dimension = 512;
    let embeddings = EmbeddingService::new(&config).unwrap();
    let index = build_index(&config, &embeddings).await.unwrap();
    (index, embeddings)
}

async fn harness(reply: &'static str) -> Harness {
    let data_dir = tempfile::tempdir().unwrap();
    write_corpus(data_dir.path());
    let (index, embeddings) = index_for(data_dir.path()).await;

    let collaborator = Scripted::new(reply);
    let service = AdvisoryService::new(
        SimilarityMatcher::new(Arc::new(index), embeddings),
        FieldExtractor::default(),
        0.5,
        collaborator.clone(),
        collaborator.clone(),
        collaborator.clone(),
    );
    Harness {
        app: build_app(AppState::new(service), 1 << 20, true),
        collaborator,
        _data_dir: data_dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One multipart form part; `file_name` marks file uploads
struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    data: &'a [u8],
}

fn file<'a>(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name,
        file_name: Some(file_name),
        data,
    }
}

fn text<'a>(name: &'a str, value: &'a str) -> Part<'a> {
    Part {
        name,
        file_name: None,
        data: value.as_bytes(),
    }
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                part.name
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                part.name
            ),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_indexed_tables() {
    let h = harness("unused").await;
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    // broken.csv is skipped at load time
    assert_eq!(body["tables"], 2);
    assert_eq!(body["records"], 3);
}

#[tokio::test]
async fn test_stats_lists_tables_in_name_order() {
    let h = harness("unused").await;
    let request = Request::builder()
        .uri("/api/stats")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tables"][0]["name"], "jute_advice.csv");
    assert_eq!(body["tables"][1]["name"], "rice_diseases.csv");
    assert_eq!(body["tables"][1]["records"], 2);
    assert_eq!(body["tables"][1]["dimension"], 512);
    assert_eq!(body["total_records"], 3);
}

#[tokio::test]
async fn test_query_answered_from_dataset() {
    let h = harness("unused").await;
    let (status, body) = send(
        &h.app,
        json_request(
            "/api/query",
            json!({
                "query": "Leaf Blight yellowing leaves Spray copper fungicide 2023-06-01 solution",
                "language": "en"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "dataset");
    assert_eq!(body["data"], json!(["Spray copper fungicide"]));
    assert!(body["confidence"].as_f64().unwrap() >= 0.6);
    assert_eq!(h.collaborator.calls(), 0);
}

#[tokio::test]
async fn test_query_falls_back_to_generative() {
    let h = harness("Apply potash before the monsoon.").await;
    let (status, body) = send(
        &h.app,
        json_request("/api/query", json!({"query": "কখন পটাশ সার দিতে হবে", "language": "bn"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "source": "generative",
            "data": "Apply potash before the monsoon.",
            "confidence": 1.0
        })
    );
    assert_eq!(h.collaborator.calls(), 1);
}

#[tokio::test]
async fn test_query_input_errors() {
    let h = harness("unused").await;

    let (status, body) = send(&h.app, json_request("/api/query", json!({"query": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &h.app,
        json_request("/api/query", json!({"query": "rice", "language": "fr"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));

    assert_eq!(h.collaborator.calls(), 0);
}

#[tokio::test]
async fn test_transcribe_returns_transcript() {
    let h = harness("ধানের পাতা হলুদ হয়ে যাচ্ছে").await;
    let request = multipart_request(
        "/api/transcribe",
        &[file("audio", "clip.webm", b"\x1a\x45\xdf\xa3"), text("language", "bn")],
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"transcript": "ধানের পাতা হলুদ হয়ে যাচ্ছে"}));
}

#[tokio::test]
async fn test_transcribe_without_audio_is_rejected() {
    let h = harness("unused").await;
    let request = multipart_request("/api/transcribe", &[text("language", "en")]);
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no audio provided");
    assert_eq!(h.collaborator.calls(), 0);
}

#[tokio::test]
async fn test_analyze_image_without_image_is_rejected() {
    let h = harness("unused").await;
    let request = multipart_request(
        "/api/analyze-image",
        &[text("prompt", "what is wrong?"), text("language", "en")],
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no image provided");
    assert_eq!(h.collaborator.calls(), 0);
}

#[tokio::test]
async fn test_analyze_image_falls_back_to_analysis() {
    let h = harness("মাটি খুব শুকনো").await;
    let request = multipart_request(
        "/api/analyze-image",
        &[
            file("image", "leaf.jpg", b"\xff\xd8\xff\xe0"),
            text("prompt", "কী করব?"),
            text("language", "bn"),
        ],
    );
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"source": "generative", "analysis": "মাটি খুব শুকনো"}));
    // description, then the fallback answer
    assert_eq!(h.collaborator.calls(), 2);
}

#[tokio::test]
async fn test_collaborator_failure_is_internal_error() {
    let data_dir = tempfile::tempdir().unwrap();
    write_corpus(data_dir.path());
    let (index, embeddings) = index_for(data_dir.path()).await;
    let down = Arc::new(Unavailable);
    let service = AdvisoryService::new(
        SimilarityMatcher::new(Arc::new(index), embeddings),
        FieldExtractor::default(),
        0.5,
        down.clone(),
        down.clone(),
        down,
    );
    let app = build_app(AppState::new(service), 1 << 20, false);

    let (status, body) = send(
        &app,
        json_request("/api/query", json!({"query": "how much urea per bigha"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("503"));

    let request = multipart_request(
        "/api/analyze-image",
        &[file("image", "leaf.jpg", b"\xff\xd8"), text("prompt", "why")],
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_empty_corpus_always_falls_back() {
    let data_dir = tempfile::tempdir().unwrap();
    let (index, embeddings) = index_for(data_dir.path()).await;
    assert!(index.is_empty());

    let collaborator = Scripted::new("Consult the local agriculture office.");
    let service = AdvisoryService::new(
        SimilarityMatcher::new(Arc::new(index), embeddings),
        FieldExtractor::default(),
        0.5,
        collaborator.clone(),
        collaborator.clone(),
        collaborator.clone(),
    );
    let app = build_app(AppState::new(service), 1 << 20, true);

    let (status, body) = send(&app, json_request("/api/query", json!({"query": "rice blast"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "generative");
    assert_eq!(collaborator.calls(), 1);
}
