//! Job Commands

use crate::domain::job::{JobId, JobStatus};
use crate::domain::DocumentFormat;

/// 提交合成任务命令
///
/// `text` 可以是纯文本或结构化 JSON 文档，`format` 为 `PlainText` 时不做 JSON 解析
#[derive(Debug, Clone, Default)]
pub struct SubmitJob {
    pub text: String,
    pub format: DocumentFormat,
    pub voice_id: Option<String>,
    /// 覆盖音色语速
    pub speed: Option<f32>,
    /// 覆盖音色音调
    pub pitch: Option<f32>,
    pub chunk_size: Option<usize>,
    pub crossfade_secs: Option<f64>,
}

/// 提交响应
#[derive(Debug, Clone)]
pub struct SubmitJobResponse {
    pub job_id: JobId,
    /// 输入无效或入队失败时为 Failed
    pub status: JobStatus,
}
