//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SynthesisEngine、JobRegistry、VoiceRegistry、ArtifactStorage）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        RegisterVoiceHandler, RemoveVoiceHandler, SetDefaultVoiceHandler, SubmitJobHandler,
        SubmitSettings,
    },
    RegisterVoice, RemoveVoice, SetDefaultVoice, SubmitJob, SubmitJobResponse,
};

pub use error::ApplicationError;

pub use ports::{
    ArtifactStorageError, ArtifactStoragePort, JobRegistryPort, RegistryError,
    SynthesisEnginePort, SynthesisError, SynthesisRequest, VoiceRegistryPort,
};

pub use queries::{
    handlers::{
        ChunkStatusInfo, EstimateDocumentHandler, GetJobAudioHandler, GetJobResultHandler,
        GetJobStatusHandler, GetVoiceHandler, JobAudioResponse, JobResultResponse,
        JobStatusResponse, ListJobsHandler, ListVoicesHandler,
    },
    EstimateDocument, GetJobAudio, GetJobResult, GetJobStatus, GetVoice, ListJobs, ListVoices,
};
