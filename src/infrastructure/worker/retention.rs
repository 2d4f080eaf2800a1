//! Retention Sweeper - 定期清理过期的终态任务及其产物

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::application::ports::{ArtifactStoragePort, JobRegistryPort};
use crate::domain::job::JobStatus;

pub struct RetentionSweeper {
    job_registry: Arc<dyn JobRegistryPort>,
    artifact_storage: Arc<dyn ArtifactStoragePort>,
    retention: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    /// 扫描间隔取保留时长的十分之一，限制在 [1s, 10min]
    pub fn new(
        job_registry: Arc<dyn JobRegistryPort>,
        artifact_storage: Arc<dyn ArtifactStoragePort>,
        retention: Duration,
    ) -> Self {
        let interval = (retention / 10).clamp(Duration::from_secs(1), Duration::from_secs(600));
        Self {
            job_registry,
            artifact_storage,
            retention,
            interval,
        }
    }

    /// 移除 `cutoff` 之前结束的任务，返回移除数量
    pub async fn sweep_before(&self, cutoff: DateTime<Utc>) -> usize {
        let evicted = self.job_registry.evict_finished_before(cutoff);
        for job in &evicted {
            if job.status() != JobStatus::Completed {
                continue;
            }
            if let Err(e) = self.artifact_storage.delete_artifact(job.id()).await {
                tracing::warn!(job_id = %job.id(), error = %e, "Failed to delete expired artifact");
            }
        }
        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "Expired jobs evicted");
        }
        evicted.len()
    }

    pub async fn run(self) {
        let retention = match chrono::Duration::from_std(self.retention) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Invalid retention duration, sweeper disabled");
                return;
            }
        };
        tracing::info!(
            retention_secs = self.retention.as_secs(),
            interval_secs = self.interval.as_secs(),
            "RetentionSweeper started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sweep_before(Utc::now() - retention).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::AudioBuffer;
    use crate::domain::job::{
        ChunkDescriptor, FailureKind, Job, JobFailure, JobRequest,
    };
    use crate::infrastructure::adapters::WavArtifactStorage;
    use crate::infrastructure::memory::InMemoryJobRegistry;
    use tempfile::TempDir;

    fn request() -> JobRequest {
        JobRequest {
            text: "Hello.".to_string(),
            voice_id: None,
            speed: None,
            pitch: None,
            sections: Vec::new(),
            chunk_size: 100,
            crossfade_secs: 0.0,
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_finished_jobs_and_artifacts() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(WavArtifactStorage::new(dir.path()).await.unwrap());
        let registry = Arc::new(InMemoryJobRegistry::new());

        // 已完成任务，带产物
        let done = Job::new(request());
        let done_id = done.id();
        registry.insert(done).unwrap();
        registry.start_processing(done_id).unwrap();
        registry
            .attach_chunks(done_id, vec![ChunkDescriptor::new(0, "Hello.", 0..6)])
            .unwrap();
        registry.start_chunk(done_id, 0).unwrap();
        let audio = AudioBuffer::new(vec![0.1; 1600], 16000);
        registry.complete_chunk(done_id, 0, audio.meta()).unwrap();
        let artifact = storage.write_artifact(done_id, &audio).await.unwrap();
        let path = artifact.path.clone();
        registry.complete(done_id, artifact).unwrap();

        // 失败任务
        let failed = Job::new(request());
        let failed_id = failed.id();
        registry.insert(failed).unwrap();
        registry
            .fail(failed_id, JobFailure::new(FailureKind::Input, "empty"))
            .unwrap();

        // 进行中的任务不受影响
        let pending = Job::new(request());
        let pending_id = pending.id();
        registry.insert(pending).unwrap();

        let sweeper = RetentionSweeper::new(
            registry.clone(),
            storage.clone(),
            Duration::from_secs(60),
        );
        let removed = sweeper
            .sweep_before(Utc::now() + chrono::Duration::seconds(1))
            .await;

        assert_eq!(removed, 2);
        assert!(registry.get(done_id).is_none());
        assert!(registry.get(failed_id).is_none());
        assert!(registry.get(pending_id).is_some());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_recent_jobs_are_kept() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(WavArtifactStorage::new(dir.path()).await.unwrap());
        let registry = Arc::new(InMemoryJobRegistry::new());

        let job = Job::new(request());
        let id = job.id();
        registry.insert(job).unwrap();
        registry
            .fail(id, JobFailure::new(FailureKind::Input, "empty"))
            .unwrap();

        let sweeper = RetentionSweeper::new(registry.clone(), storage, Duration::from_secs(3600));
        let removed = sweeper
            .sweep_before(Utc::now() - chrono::Duration::seconds(3600))
            .await;
        assert_eq!(removed, 0);
        assert!(registry.get(id).is_some());
    }
}
