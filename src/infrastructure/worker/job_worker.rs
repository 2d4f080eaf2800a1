//! Job Worker - Background Synthesis Job Processor
//!
//! 从队列消费任务：分段 → 解析音色 → 选择引擎 → 并发合成 → 按序拼接 → 写入产物
//!
//! 分段文档的每一段独立分段并解析各自的音色参数，片段序号在全任务内连续

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::application::ports::{
    ArtifactStoragePort, JobRegistryPort, SynthesisRequest, VoiceRegistryPort,
};
use crate::domain::audio::{stitch, AudioBuffer, FadeCurve, IndexedAudio, StitchConfig};
use crate::domain::job::{
    ArtifactRef, ChunkDescriptor, FailureKind, Job, JobFailure, JobId, VoiceOverrides,
};
use crate::domain::voice::{BackendRef, VoiceId};
use crate::domain::{
    normalize_text, segment_text, SegmentConfig, SegmentError, DEFAULT_MAX_CHUNK_SIZE,
};

use super::SynthesisChain;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct JobWorkerConfig {
    /// 最大并发任务数
    pub max_concurrent_jobs: usize,
    /// 单个任务内最大并发片段数
    pub max_concurrent_chunks: usize,
    /// 分段硬上限
    pub max_chunk_size: usize,
    pub fade_curve: FadeCurve,
}

impl Default for JobWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            max_concurrent_chunks: 4,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            fade_curve: FadeCurve::default(),
        }
    }
}

/// 任务处理依赖，在任务之间共享
#[derive(Clone)]
struct JobContext {
    config: JobWorkerConfig,
    job_registry: Arc<dyn JobRegistryPort>,
    voice_registry: Arc<dyn VoiceRegistryPort>,
    chain: Arc<SynthesisChain>,
    artifact_storage: Arc<dyn ArtifactStoragePort>,
}

/// 合成任务 Worker
///
/// 每个任务只有它自己的处理协程会修改其状态
pub struct JobWorker {
    queue_receiver: mpsc::Receiver<JobId>,
    ctx: JobContext,
}

impl JobWorker {
    pub fn new(
        config: JobWorkerConfig,
        queue_receiver: mpsc::Receiver<JobId>,
        job_registry: Arc<dyn JobRegistryPort>,
        voice_registry: Arc<dyn VoiceRegistryPort>,
        chain: Arc<SynthesisChain>,
        artifact_storage: Arc<dyn ArtifactStoragePort>,
    ) -> Self {
        Self {
            queue_receiver,
            ctx: JobContext {
                config,
                job_registry,
                voice_registry,
                chain,
                artifact_storage,
            },
        }
    }

    /// 启动 Worker，队列关闭后等待进行中的任务结束再返回
    pub async fn run(mut self) {
        let max_jobs = self.ctx.config.max_concurrent_jobs.max(1);
        tracing::info!(
            max_concurrent_jobs = max_jobs,
            max_concurrent_chunks = self.ctx.config.max_concurrent_chunks,
            engines = self.ctx.chain.len(),
            "JobWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(Semaphore::new(max_jobs));
        let mut running = JoinSet::new();

        while let Some(job_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    break;
                }
            };

            let ctx = self.ctx.clone();
            running.spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process_job(&ctx, job_id).await;
            });

            // 回收已结束的任务，避免 JoinSet 无限增长
            while let Some(finished) = running.try_join_next() {
                if let Err(e) = finished {
                    tracing::error!(error = %e, "Job task panicked");
                }
            }
        }

        while let Some(finished) = running.join_next().await {
            if let Err(e) = finished {
                tracing::error!(error = %e, "Job task panicked");
            }
        }

        tracing::info!("JobWorker stopped");
    }

    /// 处理单个任务
    async fn process_job(ctx: &JobContext, job_id: JobId) {
        let job = match ctx.job_registry.get(job_id) {
            Some(job) => job,
            None => {
                tracing::warn!(job_id = %job_id, "Job not found, skipping");
                return;
            }
        };

        if let Err(e) = ctx.job_registry.start_processing(job_id) {
            tracing::warn!(job_id = %job_id, error = %e, "Job cannot start, skipping");
            return;
        }

        let started = std::time::Instant::now();
        let outcome = Self::execute(ctx, &job).await;

        let outcome = match outcome {
            Ok(artifact) => match ctx.job_registry.complete(job_id, artifact.clone()) {
                Ok(()) => Ok(artifact),
                Err(e) => {
                    // 产物已写出但状态无法完成，删除产物避免残留
                    if let Err(de) = ctx.artifact_storage.delete_artifact(job_id).await {
                        tracing::warn!(job_id = %job_id, error = %de, "Failed to delete orphan artifact");
                    }
                    Err(JobFailure::new(FailureKind::Internal, e.to_string()))
                }
            },
            Err(failure) => Err(failure),
        };

        match outcome {
            Ok(artifact) => {
                tracing::info!(
                    job_id = %job_id,
                    path = %artifact.path.display(),
                    duration_secs = artifact.duration_secs,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Job completed"
                );
            }
            Err(failure) => {
                match failure.kind {
                    FailureKind::Internal => tracing::error!(
                        job_id = %job_id,
                        error = %failure,
                        "Job failed: internal invariant violated"
                    ),
                    _ => tracing::warn!(job_id = %job_id, error = %failure, "Job failed"),
                }
                if let Err(e) = ctx.job_registry.fail(job_id, failure) {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to record job failure");
                }
            }
        }
    }

    async fn execute(ctx: &JobContext, job: &Job) -> Result<ArtifactRef, JobFailure> {
        let job_id = job.id();
        let request = job.request();

        // 1. 分段，2. 逐段解析音色
        let segment_config = SegmentConfig {
            chunk_size: request.chunk_size,
            max_chunk_size: ctx.config.max_chunk_size,
            prefer_sentence_boundaries: true,
        };
        let sections = request.resolved_sections();
        let mut descriptors: Vec<ChunkDescriptor> = Vec::new();
        let mut requests: Vec<SynthesisRequest> = Vec::new();
        let mut offset = 0;

        for section in &sections {
            let chunks = match segment_text(&section.text, &segment_config) {
                Ok(chunks) => chunks,
                Err(SegmentError::EmptyInput) => Vec::new(),
                Err(e @ SegmentError::InvalidChunkSize(_)) => {
                    return Err(JobFailure::new(FailureKind::Segmentation, e.to_string()))
                }
            };

            if !chunks.is_empty() {
                let (voice_id, backend) = Self::resolve_voice(ctx, &section.overrides)?;
                for chunk in chunks {
                    let index = descriptors.len();
                    let span = (chunk.span.start + offset)..(chunk.span.end + offset);
                    requests.push(SynthesisRequest {
                        job_id,
                        chunk_index: index,
                        text: chunk.text.clone(),
                        voice_id: voice_id.clone(),
                        backend: backend.clone(),
                    });
                    descriptors.push(ChunkDescriptor::new(index, chunk.text, span));
                }
            }
            offset += normalize_text(&section.text).len() + 1;
        }

        if descriptors.is_empty() {
            return Err(JobFailure::new(
                FailureKind::Input,
                SegmentError::EmptyInput.to_string(),
            ));
        }

        let total = descriptors.len();
        ctx.job_registry
            .attach_chunks(job_id, descriptors)
            .map_err(internal)?;

        tracing::debug!(
            job_id = %job_id,
            chunks = total,
            sections = sections.len(),
            "Job segmented"
        );

        // 3. 用第一个片段选择引擎
        let mut results: BTreeMap<usize, AudioBuffer> = BTreeMap::new();
        let mut requests = requests.into_iter();
        let first_request = requests.next().ok_or_else(|| {
            JobFailure::new(FailureKind::Internal, "segmentation produced no chunks")
        })?;

        ctx.job_registry.start_chunk(job_id, 0).map_err(internal)?;
        let (engine_index, first_audio) = match ctx.chain.select(&first_request).await {
            Ok(selected) => selected,
            Err(e) => {
                Self::record_chunk_failure(ctx, job_id, 0, e.to_string());
                return Err(JobFailure::new(
                    FailureKind::Synthesis,
                    format!("chunk 0: {e}"),
                ));
            }
        };
        let engine_name = ctx.chain.engine_name(engine_index).unwrap_or("unknown");
        ctx.job_registry
            .set_engine(job_id, engine_name)
            .map_err(internal)?;
        ctx.job_registry
            .complete_chunk(job_id, 0, first_audio.meta())
            .map_err(internal)?;
        results.insert(0, first_audio);

        tracing::debug!(job_id = %job_id, engine = engine_name, "Engine selected");

        // 4. 其余片段并发合成
        let chunk_permits = Arc::new(Semaphore::new(ctx.config.max_concurrent_chunks.max(1)));
        let mut tasks: JoinSet<(usize, Result<AudioBuffer, JobFailure>)> = JoinSet::new();

        for request in requests {
            let index = request.chunk_index;
            let permits = chunk_permits.clone();
            let registry = ctx.job_registry.clone();
            let chain = ctx.chain.clone();

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            index,
                            Err(JobFailure::new(FailureKind::Internal, "chunk semaphore closed")),
                        )
                    }
                };
                if let Err(e) = registry.start_chunk(job_id, index) {
                    return (index, Err(internal(e)));
                }
                let result = chain
                    .synthesize_with(engine_index, &request)
                    .await
                    .map_err(|e| {
                        JobFailure::new(FailureKind::Synthesis, format!("chunk {index}: {e}"))
                    });
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(audio))) => {
                    ctx.job_registry
                        .complete_chunk(job_id, index, audio.meta())
                        .map_err(internal)?;
                    results.insert(index, audio);
                }
                Ok((index, Err(failure))) => {
                    tasks.abort_all();
                    Self::record_chunk_failure(ctx, job_id, index, failure.message.clone());
                    return Err(failure);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(JobFailure::new(
                        FailureKind::Internal,
                        format!("chunk task failed: {e}"),
                    ));
                }
            }
        }

        if results.len() != total {
            return Err(JobFailure::new(
                FailureKind::Internal,
                format!("expected {} chunk results, got {}", total, results.len()),
            ));
        }

        // 5. 按序拼接（CPU 密集，放到阻塞线程池）
        let segments: Vec<IndexedAudio> = results
            .into_iter()
            .map(|(index, audio)| IndexedAudio::new(index, audio))
            .collect();
        let stitch_config = StitchConfig {
            crossfade_secs: request.crossfade_secs,
            curve: ctx.config.fade_curve,
        };
        let stitched = tokio::task::spawn_blocking(move || stitch(segments, &stitch_config))
            .await
            .map_err(|e| JobFailure::new(FailureKind::Internal, format!("stitch task failed: {e}")))?
            .map_err(|e| JobFailure::new(FailureKind::Internal, format!("stitch failed: {e}")))?;

        tracing::debug!(
            job_id = %job_id,
            samples = stitched.len(),
            peak = stitched.peak(),
            "Audio stitched"
        );

        // 6. 写入产物
        ctx.artifact_storage
            .write_artifact(job_id, &stitched)
            .await
            .map_err(|e| JobFailure::new(FailureKind::Storage, e.to_string()))
    }

    /// 解析音色并应用语速、音调覆盖
    fn resolve_voice(
        ctx: &JobContext,
        overrides: &VoiceOverrides,
    ) -> Result<(VoiceId, BackendRef), JobFailure> {
        let voice = ctx
            .voice_registry
            .resolve(overrides.voice_id.as_deref())
            .map_err(|e| JobFailure::new(FailureKind::Voice, e.to_string()))?;
        let backend = voice
            .backend()
            .clone()
            .with_overrides(overrides.speed, overrides.pitch);
        backend
            .validate()
            .map_err(|e| JobFailure::new(FailureKind::Voice, e.to_string()))?;
        Ok((voice.id().clone(), backend))
    }

    fn record_chunk_failure(ctx: &JobContext, job_id: JobId, index: usize, message: String) {
        if let Err(e) = ctx.job_registry.fail_chunk(job_id, index, message) {
            tracing::warn!(
                job_id = %job_id,
                chunk_index = index,
                error = %e,
                "Failed to record chunk failure"
            );
        }
    }
}

fn internal(e: impl std::fmt::Display) -> JobFailure {
    JobFailure::new(FailureKind::Internal, e.to_string())
}
