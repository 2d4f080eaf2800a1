//! Job Context - 合成任务限界上下文
//!
//! 职责:
//! - 任务与片段的生命周期（单调状态机）
//! - 失败原因分类
//! - 拼接产物引用

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{Job, JobSummary};
pub use entities::ChunkDescriptor;
pub use errors::JobError;
pub use value_objects::{
    ArtifactRef, ChunkStatus, FailureKind, JobFailure, JobId, JobRequest, JobStatus, TextSection,
    VoiceOverrides,
};
