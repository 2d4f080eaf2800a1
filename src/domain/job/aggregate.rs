//! Job Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ArtifactRef, ChunkDescriptor, ChunkStatus, JobError, JobFailure, JobId, JobRequest, JobStatus,
};
use crate::domain::audio::AudioMeta;

/// Job 聚合根
///
/// 不变量:
/// - 状态单调迁移，终态（Completed / Failed）之后不再变化
/// - Completed 当且仅当所有片段均 Completed 且已生成产物
/// - 片段只能在任务 Processing 期间更新
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    request: JobRequest,
    chunks: Vec<ChunkDescriptor>,
    engine: Option<String>,
    artifact: Option<ArtifactRef>,
    failure: Option<JobFailure>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

/// 任务摘要（列表查询使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_chunks: usize,
    pub completed_chunks: usize,
}

impl Job {
    /// 创建 Pending 状态的任务
    pub fn new(request: JobRequest) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            request,
            chunks: Vec::new(),
            engine: None,
            artifact: None,
            failure: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), JobError> {
        if !self.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        match next {
            JobStatus::Processing => self.started_at = Some(Utc::now()),
            JobStatus::Completed | JobStatus::Failed => self.completed_at = Some(Utc::now()),
            JobStatus::Pending => {}
        }
        Ok(())
    }

    fn ensure_processing(&self) -> Result<(), JobError> {
        if self.status != JobStatus::Processing {
            return Err(JobError::NotProcessing(self.status));
        }
        Ok(())
    }

    fn chunk_mut(&mut self, index: usize) -> Result<&mut ChunkDescriptor, JobError> {
        let count = self.chunks.len();
        self.chunks
            .get_mut(index)
            .ok_or(JobError::ChunkOutOfRange { index, count })
    }

    /// Pending → Processing
    pub fn start_processing(&mut self) -> Result<(), JobError> {
        self.transition(JobStatus::Processing)
    }

    /// 记录分段结果，序号必须为 0..N-1
    pub fn attach_chunks(&mut self, chunks: Vec<ChunkDescriptor>) -> Result<(), JobError> {
        self.ensure_processing()?;
        if chunks.is_empty() {
            return Err(JobError::NoChunks);
        }
        let count = chunks.len();
        if let Some(chunk) = chunks.iter().enumerate().find(|(i, c)| c.index != *i).map(|(_, c)| c) {
            return Err(JobError::ChunkOutOfRange {
                index: chunk.index,
                count,
            });
        }
        self.chunks = chunks;
        Ok(())
    }

    /// 记录本任务选定的合成引擎
    pub fn set_engine(&mut self, engine: impl Into<String>) -> Result<(), JobError> {
        self.ensure_processing()?;
        self.engine = Some(engine.into());
        Ok(())
    }

    pub fn start_chunk(&mut self, index: usize) -> Result<(), JobError> {
        self.ensure_processing()?;
        let chunk = self.chunk_mut(index)?;
        if !chunk.status.can_transition_to(ChunkStatus::Processing) {
            return Err(JobError::chunk_transition(index, chunk.status, ChunkStatus::Processing));
        }
        chunk.status = ChunkStatus::Processing;
        Ok(())
    }

    pub fn complete_chunk(&mut self, index: usize, audio: AudioMeta) -> Result<(), JobError> {
        self.ensure_processing()?;
        let chunk = self.chunk_mut(index)?;
        if !chunk.status.can_transition_to(ChunkStatus::Completed) {
            return Err(JobError::chunk_transition(index, chunk.status, ChunkStatus::Completed));
        }
        chunk.status = ChunkStatus::Completed;
        chunk.audio = Some(audio);
        Ok(())
    }

    pub fn fail_chunk(&mut self, index: usize, error: impl Into<String>) -> Result<(), JobError> {
        self.ensure_processing()?;
        let chunk = self.chunk_mut(index)?;
        if !chunk.status.can_transition_to(ChunkStatus::Failed) {
            return Err(JobError::chunk_transition(index, chunk.status, ChunkStatus::Failed));
        }
        chunk.status = ChunkStatus::Failed;
        chunk.error = Some(error.into());
        Ok(())
    }

    /// Processing → Completed，要求所有片段已完成
    pub fn complete(&mut self, artifact: ArtifactRef) -> Result<(), JobError> {
        self.ensure_processing()?;
        if self.chunks.is_empty() {
            return Err(JobError::NoChunks);
        }
        let incomplete = self
            .chunks
            .iter()
            .filter(|c| c.status != ChunkStatus::Completed)
            .count();
        if incomplete > 0 {
            return Err(JobError::IncompleteChunks { incomplete });
        }
        self.transition(JobStatus::Completed)?;
        self.artifact = Some(artifact);
        Ok(())
    }

    /// Pending / Processing → Failed
    pub fn fail(&mut self, failure: JobFailure) -> Result<(), JobError> {
        self.transition(JobStatus::Failed)?;
        self.failure = Some(failure);
        Ok(())
    }

    // Getters
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        self.artifact.as_ref()
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        self.failure.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn completed_chunks(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Completed)
            .count()
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            status: self.status,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            total_chunks: self.chunks.len(),
            completed_chunks: self.completed_chunks(),
        }
    }
}
