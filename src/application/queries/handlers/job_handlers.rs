//! Job Query Handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::error::ApplicationError;
use crate::application::ports::{ArtifactStoragePort, JobRegistryPort};
use crate::application::queries::{
    EstimateDocument, GetJobAudio, GetJobResult, GetJobStatus, ListJobs,
};
use crate::domain::job::{
    ArtifactRef, ChunkDescriptor, ChunkStatus, Job, JobFailure, JobId, JobStatus, JobSummary,
};
use crate::domain::{analyze_document, parse_document_as, DocumentAnalysis, SegmentConfig};

// ============================================================================
// Response DTOs
// ============================================================================

/// 片段状态
#[derive(Debug, Clone)]
pub struct ChunkStatusInfo {
    pub index: usize,
    pub status: ChunkStatus,
    pub char_count: usize,
    pub duration_secs: Option<f64>,
    pub error: Option<String>,
}

impl From<&ChunkDescriptor> for ChunkStatusInfo {
    fn from(chunk: &ChunkDescriptor) -> Self {
        Self {
            index: chunk.index,
            status: chunk.status,
            char_count: chunk.text.chars().count(),
            duration_secs: chunk.audio.map(|a| a.duration_secs),
            error: chunk.error.clone(),
        }
    }
}

/// 任务状态响应
#[derive(Debug, Clone)]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub engine: Option<String>,
    pub failure: Option<JobFailure>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub chunks: Vec<ChunkStatusInfo>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id(),
            status: job.status(),
            created_at: job.created_at(),
            started_at: job.started_at(),
            completed_at: job.completed_at(),
            engine: job.engine().map(str::to_string),
            failure: job.failure().cloned(),
            total_chunks: job.chunks().len(),
            completed_chunks: job.completed_chunks(),
            chunks: job.chunks().iter().map(ChunkStatusInfo::from).collect(),
        }
    }
}

/// 任务结果响应
#[derive(Debug, Clone)]
pub struct JobResultResponse {
    pub job_id: JobId,
    pub artifact: ArtifactRef,
}

/// 任务音频响应
#[derive(Debug, Clone)]
pub struct JobAudioResponse {
    pub audio_data: Vec<u8>,
    pub content_type: String,
}

/// 取已完成任务的产物引用，其他状态一律返回 NotReady，失败任务附带失败详情
fn completed_artifact(job: &Job) -> Result<ArtifactRef, ApplicationError> {
    match job.status() {
        JobStatus::Pending | JobStatus::Processing => Err(ApplicationError::NotReady(format!(
            "job {} is {}",
            job.id(),
            job.status()
        ))),
        JobStatus::Failed => Err(ApplicationError::NotReady(format!(
            "job {} failed: {}",
            job.id(),
            job.failure()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_string())
        ))),
        JobStatus::Completed => job
            .artifact()
            .cloned()
            .ok_or_else(|| ApplicationError::internal("completed job has no artifact")),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetJobStatus Handler
pub struct GetJobStatusHandler {
    job_registry: Arc<dyn JobRegistryPort>,
}

impl GetJobStatusHandler {
    pub fn new(job_registry: Arc<dyn JobRegistryPort>) -> Self {
        Self { job_registry }
    }

    pub fn handle(&self, query: GetJobStatus) -> Result<JobStatusResponse, ApplicationError> {
        self.job_registry
            .get(query.job_id)
            .map(JobStatusResponse::from)
            .ok_or_else(|| ApplicationError::not_found("Job", query.job_id))
    }
}

/// GetJobResult Handler
pub struct GetJobResultHandler {
    job_registry: Arc<dyn JobRegistryPort>,
}

impl GetJobResultHandler {
    pub fn new(job_registry: Arc<dyn JobRegistryPort>) -> Self {
        Self { job_registry }
    }

    pub fn handle(&self, query: GetJobResult) -> Result<JobResultResponse, ApplicationError> {
        let job = self
            .job_registry
            .get(query.job_id)
            .ok_or_else(|| ApplicationError::not_found("Job", query.job_id))?;

        Ok(JobResultResponse {
            job_id: query.job_id,
            artifact: completed_artifact(&job)?,
        })
    }
}

/// GetJobAudio Handler - 读取已完成任务的 WAV 数据
pub struct GetJobAudioHandler {
    job_registry: Arc<dyn JobRegistryPort>,
    artifact_storage: Arc<dyn ArtifactStoragePort>,
}

impl GetJobAudioHandler {
    pub fn new(
        job_registry: Arc<dyn JobRegistryPort>,
        artifact_storage: Arc<dyn ArtifactStoragePort>,
    ) -> Self {
        Self {
            job_registry,
            artifact_storage,
        }
    }

    pub async fn handle(&self, query: GetJobAudio) -> Result<JobAudioResponse, ApplicationError> {
        let job = self
            .job_registry
            .get(query.job_id)
            .ok_or_else(|| ApplicationError::not_found("Job", query.job_id))?;
        completed_artifact(&job)?;

        let audio_data = self.artifact_storage.read_artifact(query.job_id).await?;

        Ok(JobAudioResponse {
            audio_data,
            content_type: "audio/wav".to_string(),
        })
    }
}

/// ListJobs Handler
pub struct ListJobsHandler {
    job_registry: Arc<dyn JobRegistryPort>,
}

impl ListJobsHandler {
    pub fn new(job_registry: Arc<dyn JobRegistryPort>) -> Self {
        Self { job_registry }
    }

    pub fn handle(&self, _query: ListJobs) -> Vec<JobSummary> {
        self.job_registry.list()
    }
}

/// EstimateDocument Handler - 文档分析，不创建任务
pub struct EstimateDocumentHandler {
    default_chunk_size: usize,
    max_chunk_size: usize,
}

impl EstimateDocumentHandler {
    pub fn new(default_chunk_size: usize, max_chunk_size: usize) -> Self {
        Self {
            default_chunk_size,
            max_chunk_size,
        }
    }

    pub fn handle(&self, query: EstimateDocument) -> Result<DocumentAnalysis, ApplicationError> {
        let chunk_size = query.chunk_size.unwrap_or(self.default_chunk_size);
        if chunk_size == 0 {
            return Err(ApplicationError::validation("chunk_size must be positive"));
        }

        let document = parse_document_as(&query.text, query.format);
        let config = SegmentConfig {
            chunk_size,
            max_chunk_size: self.max_chunk_size,
            ..Default::default()
        };
        Ok(analyze_document(&document.text, &config))
    }
}
