//! Worker Layer - Background Job Processing
//!
//! 实现 JobWorker、SynthesisChain 与过期任务清理

mod job_worker;
mod retention;
mod synthesis_chain;

pub use job_worker::{JobWorker, JobWorkerConfig};
pub use retention::RetentionSweeper;
pub use synthesis_chain::SynthesisChain;
