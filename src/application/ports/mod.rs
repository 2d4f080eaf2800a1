//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_storage;
mod job_registry;
mod synthesis_engine;
mod voice_registry;

pub use artifact_storage::{ArtifactStorageError, ArtifactStoragePort};
pub use job_registry::{JobRegistryPort, RegistryError};
pub use synthesis_engine::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
pub use voice_registry::VoiceRegistryPort;
