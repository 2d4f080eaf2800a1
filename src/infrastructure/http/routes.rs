//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/job/submit           POST  提交合成任务
//! - /api/job/submit_file      POST  上传文档并提交合成任务 (multipart)
//! - /api/job/status           POST  查询任务状态
//! - /api/job/result           POST  获取任务产物信息
//! - /api/job/list             GET   列出所有任务
//! - /api/job/estimate         POST  文档分析（不创建任务）
//! - /api/job/estimate_file    POST  上传文档并分析 (multipart)
//! - /api/job/audio/{job_id}   GET   下载拼接后的 WAV
//! - /api/voice/list           GET   列出所有音色
//! - /api/voice/get            POST  获取音色详情
//! - /api/voice/set_default    POST  切换默认音色
//! - /api/voice/register       POST  注册自定义音色
//! - /api/voice/remove         POST  删除自定义音色

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/job", job_routes())
        .nest("/voice", voice_routes())
}

/// Job 路由
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_job))
        .route("/submit_file", post(handlers::submit_job_file))
        .route("/status", post(handlers::get_job_status))
        .route("/result", post(handlers::get_job_result))
        .route("/list", get(handlers::list_jobs))
        .route("/estimate", post(handlers::estimate_job))
        .route("/estimate_file", post(handlers::estimate_job_file))
        .route("/audio/:job_id", get(handlers::get_job_audio))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_voices))
        .route("/get", post(handlers::get_voice))
        .route("/set_default", post(handlers::set_default_voice))
        .route("/register", post(handlers::register_voice))
        .route("/remove", post(handlers::remove_voice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SubmitSettings;
    use crate::domain::job::JobId;
    use crate::infrastructure::adapters::WavArtifactStorage;
    use crate::infrastructure::http::error::errno;
    use crate::infrastructure::memory::{InMemoryJobRegistry, InMemoryVoiceRegistry};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tower::util::ServiceExt;

    struct TestApp {
        router: Router,
        queue: mpsc::Receiver<JobId>,
        _dir: TempDir,
    }

    async fn test_app() -> TestApp {
        let dir = TempDir::new().unwrap();
        let storage = WavArtifactStorage::new(dir.path()).await.unwrap();
        let (tx, rx) = mpsc::channel(8);
        let state = AppState::new(
            Arc::new(InMemoryJobRegistry::new()),
            Arc::new(InMemoryVoiceRegistry::with_builtins().unwrap()),
            Arc::new(storage),
            tx,
            SubmitSettings::default(),
            2000,
        );
        TestApp {
            router: create_routes().with_state(Arc::new(state)),
            queue: rx,
            _dir: dir,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    const BOUNDARY: &str = "voxstitch-test-boundary";

    /// 构造 multipart 表单，`file` 为 (文件名, 内容)
    fn multipart_body(file: Option<(&str, &str)>, fields: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if let Some((file_name, content)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn upload(router: &Router, uri: &str, body: String) -> Value {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn job_status(router: &Router, job_id: &Value) -> Value {
        let (_, body) = send(
            router,
            Method::POST,
            "/api/job/status",
            Some(json!({ "job_id": job_id })),
        )
        .await;
        body
    }

    #[tokio::test]
    async fn test_ping() {
        let app = test_app().await;
        let (status, body) = send(&app.router, Method::GET, "/api/ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_jobs"], 0);
    }

    #[tokio::test]
    async fn test_submit_then_status() {
        let mut app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({ "text": "Hello world. This is a test." })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["status"], "pending");
        let job_id = body["data"]["job_id"].as_str().unwrap().to_string();
        assert_eq!(app.queue.recv().await.unwrap().to_string(), job_id);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/status",
            Some(json!({ "job_id": job_id })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["total_chunks"], 0);
    }

    #[tokio::test]
    async fn test_result_of_pending_job_is_not_ready() {
        let app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({ "text": "Hello." })),
        )
        .await;
        let job_id = body["data"]["job_id"].clone();

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/api/job/result",
            Some(json!({ "job_id": job_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["errno"], errno::NOT_READY);
    }

    #[tokio::test]
    async fn test_empty_text_job_fails_immediately() {
        let mut app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({ "text": "   " })),
        )
        .await;
        assert_eq!(body["data"]["status"], "failed");
        assert!(app.queue.try_recv().is_err());

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/status",
            Some(json!({ "job_id": body["data"]["job_id"] })),
        )
        .await;
        assert_eq!(body["data"]["failure"]["kind"], "input");
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_job_ids() {
        let app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/status",
            Some(json!({ "job_id": JobId::new().to_string() })),
        )
        .await;
        assert_eq!(body["errno"], errno::NOT_FOUND);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/status",
            Some(json!({ "job_id": "not-a-uuid" })),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_structured_document_submission() {
        let mut app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({
                "document": { "segments": [{ "text": "One." }, "Two."] },
                "voice_id": "storyteller"
            })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert!(app.queue.recv().await.is_some());

        let (_, body) = send(&app.router, Method::POST, "/api/job/submit", Some(json!({}))).await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_chunk_size_rejected() {
        let app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({ "text": "Hello.", "chunk_size": 0 })),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let (_, body) = send(&app.router, Method::GET, "/api/job/list", None).await;
        assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_estimate() {
        let app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/estimate",
            Some(json!({ "text": "Hello world. This is a test.", "chunk_size": 15 })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["sentence_count"], 2);
        assert_eq!(body["data"]["estimated_chunks"], 2);
        assert_eq!(body["data"]["requires_stitching"], true);
    }

    #[tokio::test]
    async fn test_voice_lifecycle() {
        let app = test_app().await;
        let (_, body) = send(&app.router, Method::GET, "/api/voice/list", None).await;
        let voices = body["data"]["voices"].as_array().unwrap();
        assert_eq!(voices[0]["voice_id"], "narrator");
        assert_eq!(voices[0]["is_default"], true);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/voice/register",
            Some(json!({ "voice_id": "custom", "name": "Custom", "model": "vits", "speed": 1.2 })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["builtin"], false);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/voice/set_default",
            Some(json!({ "voice_id": "custom" })),
        )
        .await;
        assert_eq!(body["errno"], 0);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/voice/get",
            Some(json!({ "voice_id": "custom" })),
        )
        .await;
        assert_eq!(body["data"]["is_default"], true);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/voice/remove",
            Some(json!({ "voice_id": "narrator" })),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/voice/get",
            Some(json!({ "voice_id": "ghost" })),
        )
        .await;
        assert_eq!(body["errno"], errno::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_text_file_upload() {
        let mut app = test_app().await;
        let body = upload(
            &app.router,
            "/api/job/submit_file",
            multipart_body(
                Some(("chapter.txt", "Hello world. This is a test.")),
                &[("voice_id", "storyteller"), ("speed", "1.2"), ("chunk_size", "15")],
            ),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["status"], "pending");
        assert!(app.queue.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_submit_json_file_with_segments() {
        let mut app = test_app().await;
        let document = r#"{"segments": [{"text": "One.", "voice_id": "coqui"}, {"text": "Two."}]}"#;
        let body = upload(
            &app.router,
            "/api/job/submit_file",
            multipart_body(Some(("script.json", document)), &[]),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert!(app.queue.recv().await.is_some());

        let status = job_status(&app.router, &body["data"]["job_id"]).await;
        assert_eq!(status["data"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_input() {
        let app = test_app().await;

        let body = upload(
            &app.router,
            "/api/job/submit_file",
            multipart_body(Some(("song.mp3", "data")), &[]),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let body = upload(
            &app.router,
            "/api/job/submit_file",
            multipart_body(None, &[("voice_id", "narrator")]),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let body = upload(
            &app.router,
            "/api/job/submit_file",
            multipart_body(Some(("a.txt", "Hello.")), &[("speed", "fast")]),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let body = upload(
            &app.router,
            "/api/job/submit_file",
            multipart_body(Some(("a.txt", "Hello.")), &[("pitch", "9")]),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let (_, body) = send(&app.router, Method::GET, "/api/job/list", None).await;
        assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_estimate_file_upload() {
        let app = test_app().await;
        let body = upload(
            &app.router,
            "/api/job/estimate_file",
            multipart_body(
                Some(("notes.md", "Hello world. This is a test.")),
                &[("chunk_size", "15")],
            ),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["word_count"], 6);
        assert_eq!(body["data"]["estimated_chunks"], 2);
    }

    #[tokio::test]
    async fn test_json_submit_with_speed_override() {
        let app = test_app().await;
        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({ "text": "Hello.", "speed": 0.05 })),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);

        let (_, body) = send(
            &app.router,
            Method::POST,
            "/api/job/submit",
            Some(json!({ "text": "Hello.", "speed": 1.5, "pitch": 0.9 })),
        )
        .await;
        assert_eq!(body["errno"], 0);
    }
}
