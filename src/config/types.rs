//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::audio::FadeCurve;
use crate::domain::voice::{BackendRef, VoiceError, VoiceId, VoiceName, VoiceProfile};
use crate::domain::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNK_SIZE};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成引擎配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 任务处理配置
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// 产物存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 音色配置
    #[serde(default)]
    pub voices: VoicesConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节）
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit: default_body_limit(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 合成后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 远程 HTTP 推理服务
    Http,
    /// 本地确定性正弦波合成，用于演示与联调
    Tone,
}

/// 单个合成后端
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    pub kind: BackendKind,
    /// Http 类型必填
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_timeout() -> u64 {
    120
}

/// 合成引擎配置
///
/// `backends` 的顺序即引擎优先级
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,

    /// 首个片段选定引擎后，其余片段失败时是否继续尝试后续引擎
    #[serde(default)]
    pub chunk_fallback: bool,
}

fn default_backends() -> Vec<BackendConfig> {
    vec![BackendConfig {
        name: "http".to_string(),
        kind: BackendKind::Http,
        url: Some("http://localhost:8000".to_string()),
        timeout_secs: default_backend_timeout(),
    }]
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            chunk_fallback: false,
        }
    }
}

/// 任务处理配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// 默认分段目标长度（字符）
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// 分段硬上限（字符）
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// 默认交叉淡化时长（秒）
    #[serde(default = "default_crossfade_secs")]
    pub crossfade_secs: f64,

    #[serde(default)]
    pub fade_curve: FadeCurve,

    /// 单个任务文本上限（字符）
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    #[serde(default = "default_max_concurrent_chunks")]
    pub max_concurrent_chunks: usize,

    /// 任务队列容量，队列满时新任务直接失败
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 终态任务保留时长（秒），未设置时永久保留
    #[serde(default)]
    pub job_retention_secs: Option<u64>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_crossfade_secs() -> f64 {
    0.5
}

fn default_max_text_chars() -> usize {
    100_000
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_max_concurrent_chunks() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1000
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
            crossfade_secs: default_crossfade_secs(),
            fade_curve: FadeCurve::default(),
            max_text_chars: default_max_text_chars(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_concurrent_chunks: default_max_concurrent_chunks(),
            queue_capacity: default_queue_capacity(),
            job_retention_secs: None,
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 拼接产物输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// 配置文件中的音色定义
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceProfileConfig {
    pub id: String,
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

impl VoiceProfileConfig {
    /// 转换为领域对象并校验
    pub fn to_profile(&self) -> Result<VoiceProfile, VoiceError> {
        let mut backend = BackendRef::new(self.model.clone());
        if let Some(vocoder) = &self.vocoder {
            backend = backend.with_vocoder(vocoder.clone());
        }
        if let Some(speed) = self.speed {
            backend = backend.with_speed(speed);
        }
        if let Some(pitch) = self.pitch {
            backend.pitch = pitch;
        }

        let mut profile = VoiceProfile::new(
            VoiceId::new(self.id.clone())?,
            VoiceName::new(self.name.clone())?,
            backend,
        )?;
        if let Some(language) = &self.language {
            profile = profile.with_language(language.clone());
        }
        if let Some(gender) = &self.gender {
            profile = profile.with_gender(gender.clone());
        }
        if let Some(description) = &self.description {
            profile = profile.with_description(description.clone());
        }
        Ok(profile)
    }
}

/// 音色配置
///
/// `profiles` 与内置音色按 id 合并，同名时覆盖内置定义
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    #[serde(default = "default_voice")]
    pub default: String,

    #[serde(default)]
    pub profiles: Vec<VoiceProfileConfig>,
}

fn default_voice() -> String {
    crate::domain::voice::DEFAULT_VOICE_ID.to_string()
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            default: default_voice(),
            profiles: Vec::new(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别，RUST_LOG 优先
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
