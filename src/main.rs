//! VoxStitch - 批量 TTS 任务编排与音频拼接服务

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use voxstitch::application::{SubmitSettings, SynthesisEnginePort};
use voxstitch::config::{load_config, print_config, AppConfig, BackendKind, LogConfig};
use voxstitch::domain::voice::{builtin_profiles, VoiceProfile};
use voxstitch::infrastructure::adapters::{
    HttpTtsClient, HttpTtsClientConfig, ToneSynthesizer, ToneSynthesizerConfig, WavArtifactStorage,
};
use voxstitch::infrastructure::http::{AppState, HttpServer, ServerConfig};
use voxstitch::infrastructure::memory::{InMemoryJobRegistry, InMemoryVoiceRegistry};
use voxstitch::infrastructure::worker::{
    JobWorker, JobWorkerConfig, RetentionSweeper, SynthesisChain,
};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},voxstitch={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置顺序构建合成引擎
fn build_engines(config: &AppConfig) -> anyhow::Result<Vec<Arc<dyn SynthesisEnginePort>>> {
    let mut engines: Vec<Arc<dyn SynthesisEnginePort>> = Vec::new();
    for backend in &config.synthesis.backends {
        match backend.kind {
            BackendKind::Http => {
                let url = backend
                    .url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("Backend {} has no url", backend.name))?;
                let client_config = HttpTtsClientConfig::new(url)
                    .with_name(backend.name.clone())
                    .with_timeout(backend.timeout_secs);
                engines.push(Arc::new(HttpTtsClient::new(client_config)?));
            }
            BackendKind::Tone => {
                engines.push(Arc::new(ToneSynthesizer::new(ToneSynthesizerConfig {
                    name: backend.name.clone(),
                    ..Default::default()
                })));
            }
        }
    }
    Ok(engines)
}

/// 内置音色与配置中的音色合并，同 id 时配置优先
fn build_voice_registry(config: &AppConfig) -> anyhow::Result<InMemoryVoiceRegistry> {
    let mut profiles: Vec<VoiceProfile> = builtin_profiles();
    for cfg in &config.voices.profiles {
        profiles.push(cfg.to_profile()?);
    }
    Ok(InMemoryVoiceRegistry::new(profiles, &config.voices.default)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    tracing::info!("VoxStitch - 批量 TTS 合成与拼接服务");
    print_config(&config);

    // 合成引擎链
    let engines = build_engines(&config)?;
    let chain = Arc::new(
        SynthesisChain::new(engines).with_chunk_fallback(config.synthesis.chunk_fallback),
    );

    // 注册表与存储
    let job_registry = Arc::new(InMemoryJobRegistry::new());
    let voice_registry = Arc::new(build_voice_registry(&config)?);
    let artifact_storage = Arc::new(WavArtifactStorage::new(&config.storage.output_dir).await?);

    // 任务队列
    let (queue_tx, queue_rx) = mpsc::channel(config.processing.queue_capacity);

    let worker_config = JobWorkerConfig {
        max_concurrent_jobs: config.processing.max_concurrent_jobs,
        max_concurrent_chunks: config.processing.max_concurrent_chunks,
        max_chunk_size: config.processing.max_chunk_size,
        fade_curve: config.processing.fade_curve,
    };
    let worker = JobWorker::new(
        worker_config,
        queue_rx,
        job_registry.clone(),
        voice_registry.clone(),
        chain,
        artifact_storage.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    if let Some(secs) = config.processing.job_retention_secs {
        let sweeper = RetentionSweeper::new(
            job_registry.clone(),
            artifact_storage.clone(),
            Duration::from_secs(secs),
        );
        tokio::spawn(sweeper.run());
    }

    // HTTP 服务器
    let settings = SubmitSettings {
        default_chunk_size: config.processing.chunk_size,
        default_crossfade_secs: config.processing.crossfade_secs,
        max_text_chars: config.processing.max_text_chars,
    };
    let state = AppState::new(
        job_registry,
        voice_registry,
        artifact_storage,
        queue_tx,
        settings,
        config.processing.max_chunk_size,
    );
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        body_limit: config.server.body_limit,
    };
    let server = HttpServer::new(server_config, Arc::new(state));

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    // AppState 已随服务器释放，队列发送端关闭后 Worker 处理完剩余任务即退出
    tracing::info!("Waiting for in-flight jobs");
    if let Err(e) = worker_handle.await {
        tracing::error!(error = %e, "JobWorker task panicked");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
