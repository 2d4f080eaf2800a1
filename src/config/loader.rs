//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, BackendKind};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXSTITCH_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXSTITCH_SERVER__PORT=8080`
/// - `VOXSTITCH_PROCESSING__CHUNK_SIZE=500`
/// - `VOXSTITCH_PROCESSING__FADE_CURVE=equal_power`
/// - `VOXSTITCH_STORAGE__OUTPUT_DIR=/data/output`
///
/// 合成后端列表只能在配置文件中定义
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 标量默认值（最低优先级），列表默认值由 serde 提供
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("synthesis.chunk_fallback", false)?
        .set_default("processing.chunk_size", 1000)?
        .set_default("processing.max_chunk_size", 2000)?
        .set_default("processing.crossfade_secs", 0.5)?
        .set_default("processing.fade_curve", "linear")?
        .set_default("processing.max_text_chars", 100_000)?
        .set_default("processing.max_concurrent_jobs", 2)?
        .set_default("processing.max_concurrent_chunks", 4)?
        .set_default("processing.queue_capacity", 1000)?
        .set_default("storage.output_dir", "data/output")?
        .set_default("voices.default", "narrator")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("VOXSTITCH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("Server port cannot be 0"));
    }

    if config.synthesis.backends.is_empty() {
        return Err(invalid("At least one synthesis backend is required"));
    }
    let mut names = std::collections::HashSet::new();
    for backend in &config.synthesis.backends {
        if backend.name.trim().is_empty() {
            return Err(invalid("Backend name cannot be empty"));
        }
        if !names.insert(backend.name.as_str()) {
            return Err(invalid(format!("Duplicate backend name: {}", backend.name)));
        }
        if backend.kind == BackendKind::Http
            && backend.url.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            return Err(invalid(format!("Backend {} requires a url", backend.name)));
        }
        if backend.timeout_secs == 0 {
            return Err(invalid(format!("Backend {} timeout cannot be 0", backend.name)));
        }
    }

    let p = &config.processing;
    if p.chunk_size == 0 {
        return Err(invalid("processing.chunk_size must be positive"));
    }
    if p.max_chunk_size == 0 {
        return Err(invalid("processing.max_chunk_size must be positive"));
    }
    if !p.crossfade_secs.is_finite() || p.crossfade_secs < 0.0 {
        return Err(invalid("processing.crossfade_secs must be a non-negative number"));
    }
    if p.max_text_chars == 0 {
        return Err(invalid("processing.max_text_chars must be positive"));
    }
    if p.max_concurrent_jobs == 0 || p.max_concurrent_chunks == 0 {
        return Err(invalid("Concurrency limits must be positive"));
    }
    if p.queue_capacity == 0 {
        return Err(invalid("processing.queue_capacity must be positive"));
    }
    if p.job_retention_secs == Some(0) {
        return Err(invalid("processing.job_retention_secs cannot be 0"));
    }

    if config.storage.output_dir.as_os_str().is_empty() {
        return Err(invalid("Output directory cannot be empty"));
    }

    for profile in &config.voices.profiles {
        profile
            .to_profile()
            .map_err(|e| invalid(format!("Voice profile {}: {}", profile.id, e)))?;
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    for (i, backend) in config.synthesis.backends.iter().enumerate() {
        tracing::info!(
            "Backend #{}: {} ({:?}) {}",
            i,
            backend.name,
            backend.kind,
            backend.url.as_deref().unwrap_or("-")
        );
    }
    tracing::info!("Chunk Fallback: {}", config.synthesis.chunk_fallback);
    tracing::info!(
        "Chunk Size: {} (max {})",
        config.processing.chunk_size,
        config.processing.max_chunk_size
    );
    tracing::info!(
        "Crossfade: {}s ({:?})",
        config.processing.crossfade_secs,
        config.processing.fade_curve
    );
    tracing::info!(
        "Concurrency: {} jobs x {} chunks, queue {}",
        config.processing.max_concurrent_jobs,
        config.processing.max_concurrent_chunks,
        config.processing.queue_capacity
    );
    match config.processing.job_retention_secs {
        Some(secs) => tracing::info!("Job Retention: {}s", secs),
        None => tracing::info!("Job Retention: unlimited"),
    }
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Default Voice: {}", config.voices.default);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::BackendConfig;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_default_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_http_backend_without_url() {
        let mut config = AppConfig::default();
        config.synthesis.backends[0].url = None;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_duplicate_backends() {
        let mut config = AppConfig::default();
        let dup = config.synthesis.backends[0].clone();
        config.synthesis.backends.push(dup);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_tone_backend_needs_no_url() {
        let mut config = AppConfig::default();
        config.synthesis.backends = vec![BackendConfig {
            name: "tone".to_string(),
            kind: BackendKind::Tone,
            url: None,
            timeout_secs: 10,
        }];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_bad_processing_values() {
        let mut config = AppConfig::default();
        config.processing.chunk_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.processing.crossfade_secs = -1.0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.processing.job_retention_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[processing]
chunk_size = 300
fade_curve = "equal_power"
job_retention_secs = 3600

[[synthesis.backends]]
name = "primary"
kind = "http"
url = "http://tts:8000"

[[synthesis.backends]]
name = "fallback"
kind = "tone"

[[voices.profiles]]
id = "deep"
name = "Deep"
model = "vits"
speed = 0.8
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.processing.chunk_size, 300);
        assert_eq!(config.processing.max_chunk_size, 2000);
        assert_eq!(
            config.processing.fade_curve,
            crate::domain::audio::FadeCurve::EqualPower
        );
        assert_eq!(config.processing.job_retention_secs, Some(3600));
        assert_eq!(config.synthesis.backends.len(), 2);
        assert_eq!(config.synthesis.backends[1].kind, BackendKind::Tone);
        assert_eq!(config.voices.profiles[0].id, "deep");
    }
}
