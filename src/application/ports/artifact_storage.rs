//! Artifact Storage Port - 出站端口
//!
//! 拼接结果的持久化

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioBuffer;
use crate::domain::job::{ArtifactRef, JobId};

/// 产物存储错误
#[derive(Debug, Error)]
pub enum ArtifactStorageError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

/// Artifact Storage Port
#[async_trait]
pub trait ArtifactStoragePort: Send + Sync {
    /// 写入任务产物，返回产物引用
    async fn write_artifact(
        &self,
        job_id: JobId,
        audio: &AudioBuffer,
    ) -> Result<ArtifactRef, ArtifactStorageError>;

    /// 读取产物的编码字节
    async fn read_artifact(&self, job_id: JobId) -> Result<Vec<u8>, ArtifactStorageError>;

    /// 删除产物，不存在时视为成功
    async fn delete_artifact(&self, job_id: JobId) -> Result<(), ArtifactStorageError>;
}
