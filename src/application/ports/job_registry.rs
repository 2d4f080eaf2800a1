//! Job Registry Port - 任务注册表
//!
//! 并发安全的任务存储，任务状态只能通过这里修改。
//! 读取方拿到的都是快照

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::audio::AudioMeta;
use crate::domain::job::{
    ArtifactRef, ChunkDescriptor, Job, JobError, JobFailure, JobId, JobSummary,
};

/// Registry 错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),

    #[error(transparent)]
    Job(#[from] JobError),
}

/// Job Registry Port
///
/// 每个方法对单个任务是原子的，不同任务之间互不阻塞
pub trait JobRegistryPort: Send + Sync {
    /// 登记新任务
    fn insert(&self, job: Job) -> Result<(), RegistryError>;

    /// 获取任务快照
    fn get(&self, id: JobId) -> Option<Job>;

    /// 列出所有任务摘要（按创建时间排序）
    fn list(&self) -> Vec<JobSummary>;

    fn start_processing(&self, id: JobId) -> Result<(), RegistryError>;

    fn attach_chunks(&self, id: JobId, chunks: Vec<ChunkDescriptor>) -> Result<(), RegistryError>;

    fn set_engine(&self, id: JobId, engine: &str) -> Result<(), RegistryError>;

    fn start_chunk(&self, id: JobId, index: usize) -> Result<(), RegistryError>;

    fn complete_chunk(&self, id: JobId, index: usize, audio: AudioMeta)
        -> Result<(), RegistryError>;

    fn fail_chunk(&self, id: JobId, index: usize, error: String) -> Result<(), RegistryError>;

    fn complete(&self, id: JobId, artifact: ArtifactRef) -> Result<(), RegistryError>;

    fn fail(&self, id: JobId, failure: JobFailure) -> Result<(), RegistryError>;

    /// 移除在 cutoff 之前结束的终态任务
    fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> Vec<Job>;
}
