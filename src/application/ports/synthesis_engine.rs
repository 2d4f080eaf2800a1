//! Synthesis Engine Port - 语音合成引擎抽象
//!
//! 核心流程只通过该端口调用合成能力，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioBuffer;
use crate::domain::job::JobId;
use crate::domain::voice::{BackendRef, VoiceId};

/// 合成错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),
}

/// 单个片段的合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 所属任务（用于日志和追踪）
    pub job_id: JobId,
    pub chunk_index: usize,
    pub text: String,
    pub voice_id: VoiceId,
    pub backend: BackendRef,
}

/// Synthesis Engine Port
///
/// 实现必须可被多个任务并发调用，引擎实例在启动时构建一次
#[async_trait]
pub trait SynthesisEnginePort: Send + Sync {
    /// 引擎名称（记录在任务上）
    fn name(&self) -> &str;

    /// 合成单个片段，返回单声道 PCM
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioBuffer, SynthesisError>;

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
