//! VoxStitch - 批量 TTS 任务编排与音频拼接
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Job Context: 任务与片段状态机
//! - Voice Context: 音色管理上下文
//! - 文本分段、文档解析、音频拼接
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SynthesisEngine, JobRegistry, VoiceRegistry, ArtifactStorage）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: JobRegistry, VoiceRegistry 内存实现
//! - Worker: JobWorker 后台任务处理
//! - Adapters: TTS Client, WAV 编解码, 产物存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
