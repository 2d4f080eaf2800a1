//! Job Context - Errors

use thiserror::Error;

use super::{ChunkStatus, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Invalid chunk {index} transition: {from} -> {to}")]
    InvalidChunkTransition {
        index: usize,
        from: &'static str,
        to: &'static str,
    },

    #[error("Chunk index {index} out of range (job has {count} chunks)")]
    ChunkOutOfRange { index: usize, count: usize },

    #[error("Cannot complete job: {incomplete} chunk(s) not completed")]
    IncompleteChunks { incomplete: usize },

    #[error("Job has no chunks")]
    NoChunks,

    #[error("Job is not processing (status: {0})")]
    NotProcessing(JobStatus),
}

impl JobError {
    pub(crate) fn chunk_transition(index: usize, from: ChunkStatus, to: ChunkStatus) -> Self {
        Self::InvalidChunkTransition {
            index,
            from: from.as_str(),
            to: to.as_str(),
        }
    }
}
