//! Ping Handler

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::job::JobStatus;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// 尚未结束的任务数
    pub active_jobs: usize,
}

/// 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let active_jobs = state
        .job_registry
        .list()
        .iter()
        .filter(|j| matches!(j.status, JobStatus::Pending | JobStatus::Processing))
        .count();

    Json(PingResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        active_jobs,
    })
}
