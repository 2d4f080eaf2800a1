//! In-Memory Job Registry Implementation

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::application::ports::{JobRegistryPort, RegistryError};
use crate::domain::audio::AudioMeta;
use crate::domain::job::{
    ArtifactRef, ChunkDescriptor, Job, JobError, JobFailure, JobId, JobSummary,
};

/// 内存任务注册表
///
/// 每个任务一个 DashMap 分片锁，任务之间的更新互不阻塞
pub struct InMemoryJobRegistry {
    /// job_id -> Job
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// 在任务锁内执行一次状态修改
    fn update<F>(&self, id: JobId, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Job) -> Result<(), JobError>,
    {
        let mut job = self.jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        f(job.value_mut())?;
        Ok(())
    }
}

impl Default for InMemoryJobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistryPort for InMemoryJobRegistry {
    fn insert(&self, job: Job) -> Result<(), RegistryError> {
        match self.jobs.entry(job.id()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyExists(job.id())),
            Entry::Vacant(slot) => {
                tracing::debug!(job_id = %job.id(), "Job registered");
                slot.insert(job);
                Ok(())
            }
        }
    }

    fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.get(&id).map(|j| j.clone())
    }

    fn list(&self) -> Vec<JobSummary> {
        let mut summaries: Vec<JobSummary> = self.jobs.iter().map(|j| j.summary()).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    fn start_processing(&self, id: JobId) -> Result<(), RegistryError> {
        self.update(id, |job| job.start_processing())?;
        tracing::debug!(job_id = %id, "Job processing");
        Ok(())
    }

    fn attach_chunks(&self, id: JobId, chunks: Vec<ChunkDescriptor>) -> Result<(), RegistryError> {
        self.update(id, |job| job.attach_chunks(chunks))
    }

    fn set_engine(&self, id: JobId, engine: &str) -> Result<(), RegistryError> {
        self.update(id, |job| job.set_engine(engine))
    }

    fn start_chunk(&self, id: JobId, index: usize) -> Result<(), RegistryError> {
        self.update(id, |job| job.start_chunk(index))
    }

    fn complete_chunk(
        &self,
        id: JobId,
        index: usize,
        audio: AudioMeta,
    ) -> Result<(), RegistryError> {
        self.update(id, |job| job.complete_chunk(index, audio))
    }

    fn fail_chunk(&self, id: JobId, index: usize, error: String) -> Result<(), RegistryError> {
        self.update(id, |job| job.fail_chunk(index, error))
    }

    fn complete(&self, id: JobId, artifact: ArtifactRef) -> Result<(), RegistryError> {
        self.update(id, |job| job.complete(artifact))?;
        tracing::debug!(job_id = %id, "Job completed");
        Ok(())
    }

    fn fail(&self, id: JobId, failure: JobFailure) -> Result<(), RegistryError> {
        self.update(id, |job| job.fail(failure))?;
        tracing::debug!(job_id = %id, "Job failed");
        Ok(())
    }

    fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> Vec<Job> {
        let expired: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|j| j.status().is_terminal())
            .filter(|j| j.completed_at().is_some_and(|t| t < cutoff))
            .map(|j| j.id())
            .collect();

        let evicted: Vec<Job> = expired
            .into_iter()
            .filter_map(|id| self.jobs.remove(&id).map(|(_, job)| job))
            .collect();

        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "Finished jobs evicted");
        }
        evicted
    }
}
