//! Job Queries

use crate::domain::job::JobId;
use crate::domain::DocumentFormat;

/// 查询任务状态
#[derive(Debug, Clone)]
pub struct GetJobStatus {
    pub job_id: JobId,
}

/// 获取任务产物引用
#[derive(Debug, Clone)]
pub struct GetJobResult {
    pub job_id: JobId,
}

/// 获取任务产物音频
#[derive(Debug, Clone)]
pub struct GetJobAudio {
    pub job_id: JobId,
}

/// 列出所有任务
#[derive(Debug, Clone)]
pub struct ListJobs;

/// 预估文档的分段与朗读时长
#[derive(Debug, Clone)]
pub struct EstimateDocument {
    pub text: String,
    pub format: DocumentFormat,
    pub chunk_size: Option<usize>,
}
