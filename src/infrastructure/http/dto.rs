//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::application::{ChunkStatusInfo, JobResultResponse, JobStatusResponse};
use crate::domain::job::{ArtifactRef, JobFailure, JobSummary};
use crate::domain::voice::VoiceProfile;
use crate::domain::DocumentAnalysis;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }

    /// 错误响应
    #[allow(dead_code)]
    pub fn error(errno: i32, error: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Job DTOs
// ============================================================================

/// 提交任务
///
/// `text` 为纯文本或 JSON 字符串；`document` 为内联的结构化文档，
/// 两者都会经过 `parse_document`
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<serde_json::Value>,
    #[serde(default)]
    pub voice_id: Option<String>,
    /// 覆盖音色语速 (0.1 - 3.0)
    #[serde(default)]
    pub speed: Option<f32>,
    /// 覆盖音色音调 (0.5 - 2.0)
    #[serde(default)]
    pub pitch: Option<f32>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub crossfade_secs: Option<f64>,
}

impl SubmitJobRequest {
    /// 取出待合成的原始输入，`document` 优先
    pub fn raw_input(&mut self) -> Option<String> {
        match self.document.take() {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Null) | None => self.text.take(),
            Some(doc) => Some(doc.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitJobResponseDto {
    pub job_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct JobIdRequest {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChunkDto {
    pub index: usize,
    pub status: String,
    pub char_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ChunkStatusInfo> for ChunkDto {
    fn from(c: ChunkStatusInfo) -> Self {
        Self {
            index: c.index,
            status: c.status.as_str().to_string(),
            char_count: c.char_count,
            duration_secs: c.duration_secs,
            error: c.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureDto {
    pub kind: String,
    pub message: String,
}

impl From<JobFailure> for FailureDto {
    fn from(f: JobFailure) -> Self {
        Self {
            kind: f.kind.as_str().to_string(),
            message: f.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobStatusDto {
    pub job_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub engine: Option<String>,
    pub failure: Option<FailureDto>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub chunks: Vec<ChunkDto>,
}

impl From<JobStatusResponse> for JobStatusDto {
    fn from(r: JobStatusResponse) -> Self {
        Self {
            job_id: r.job_id.to_string(),
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
            started_at: r.started_at,
            completed_at: r.completed_at,
            engine: r.engine,
            failure: r.failure.map(FailureDto::from),
            total_chunks: r.total_chunks,
            completed_chunks: r.completed_chunks,
            chunks: r.chunks.into_iter().map(ChunkDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtifactDto {
    pub path: String,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub size_bytes: u64,
}

impl From<ArtifactRef> for ArtifactDto {
    fn from(a: ArtifactRef) -> Self {
        Self {
            path: a.path.display().to_string(),
            sample_rate: a.sample_rate,
            sample_count: a.sample_count,
            duration_secs: a.duration_secs,
            size_bytes: a.size_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobResultDto {
    pub job_id: String,
    pub artifact: ArtifactDto,
    /// 下载地址
    pub audio_url: String,
}

impl From<JobResultResponse> for JobResultDto {
    fn from(r: JobResultResponse) -> Self {
        Self {
            job_id: r.job_id.to_string(),
            audio_url: format!("/api/job/audio/{}", r.job_id),
            artifact: r.artifact.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobSummaryDto {
    pub job_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
}

impl From<JobSummary> for JobSummaryDto {
    fn from(s: JobSummary) -> Self {
        Self {
            job_id: s.id.to_string(),
            status: s.status.as_str().to_string(),
            created_at: s.created_at,
            completed_at: s.completed_at,
            total_chunks: s.total_chunks,
            completed_chunks: s.completed_chunks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListDto {
    pub jobs: Vec<JobSummaryDto>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub text: String,
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

pub type EstimateDto = DocumentAnalysis;

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VoiceIdRequest {
    pub voice_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterVoiceRequest {
    pub voice_id: String,
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub vocoder: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceDto {
    pub voice_id: String,
    pub name: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocoder: Option<String>,
    pub speed: f32,
    pub pitch: f32,
    pub language: String,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_default: bool,
    pub builtin: bool,
}

impl From<VoiceProfile> for VoiceDto {
    fn from(v: VoiceProfile) -> Self {
        let backend = v.backend();
        Self {
            voice_id: v.id().to_string(),
            name: v.name().as_str().to_string(),
            model: backend.model.clone(),
            vocoder: backend.vocoder.clone(),
            speed: backend.speed,
            pitch: backend.pitch,
            language: v.language().to_string(),
            gender: v.gender().to_string(),
            description: v.description().map(str::to_string),
            is_default: v.is_default(),
            builtin: v.is_builtin(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceListDto {
    pub voices: Vec<VoiceDto>,
}
