//! Job Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// 任务唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 任务状态
///
/// 单调迁移：Pending → Processing → {Completed | Failed}，
/// Pending 也可直接进入 Failed（输入校验或入队失败）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 片段状态，语义与任务状态一致但作用于单个片段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ChunkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStatus::Pending => "pending",
            ChunkStatus::Processing => "processing",
            ChunkStatus::Completed => "completed",
            ChunkStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChunkStatus::Completed | ChunkStatus::Failed)
    }

    pub fn can_transition_to(&self, next: ChunkStatus) -> bool {
        matches!(
            (self, next),
            (ChunkStatus::Pending, ChunkStatus::Processing)
                | (ChunkStatus::Pending, ChunkStatus::Failed)
                | (ChunkStatus::Processing, ChunkStatus::Completed)
                | (ChunkStatus::Processing, ChunkStatus::Failed)
        )
    }
}

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 输入为空或无效，未进行任何合成
    Input,
    /// 分段失败
    Segmentation,
    /// 音色无法解析
    Voice,
    /// 片段合成失败
    Synthesis,
    /// 内部不变量被破坏（排序、采样率等）
    Internal,
    /// 产物写入失败
    Storage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Input => "input",
            FailureKind::Segmentation => "segmentation",
            FailureKind::Voice => "voice",
            FailureKind::Synthesis => "synthesis",
            FailureKind::Internal => "internal",
            FailureKind::Storage => "storage",
        }
    }
}

/// 任务失败详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind.as_str(), self.message)
    }
}

/// 音色参数覆盖，未指定的字段沿用外层设置或音色配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceOverrides {
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
}

impl VoiceOverrides {
    pub fn is_empty(&self) -> bool {
        self.voice_id.is_none() && self.speed.is_none() && self.pitch.is_none()
    }

    /// 以自身为准，缺失的字段取 `outer`
    pub fn or(&self, outer: &VoiceOverrides) -> VoiceOverrides {
        VoiceOverrides {
            voice_id: self.voice_id.clone().or_else(|| outer.voice_id.clone()),
            speed: self.speed.or(outer.speed),
            pitch: self.pitch.or(outer.pitch),
        }
    }
}

/// 带独立音色参数的一段文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSection {
    pub text: String,
    #[serde(default)]
    pub overrides: VoiceOverrides,
}

/// 任务提交参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// 全文，`sections` 非空时为各段文本以空格连接
    pub text: String,
    /// 未指定时使用默认音色
    pub voice_id: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
    /// 分段文档的各段，为空时整篇 `text` 使用请求级参数
    #[serde(default)]
    pub sections: Vec<TextSection>,
    pub chunk_size: usize,
    pub crossfade_secs: f64,
}

impl JobRequest {
    /// 请求级音色参数
    pub fn overrides(&self) -> VoiceOverrides {
        VoiceOverrides {
            voice_id: self.voice_id.clone(),
            speed: self.speed,
            pitch: self.pitch,
        }
    }

    /// 待合成的各段，段内参数已与请求级参数合并
    pub fn resolved_sections(&self) -> Vec<TextSection> {
        let outer = self.overrides();
        if self.sections.is_empty() {
            return vec![TextSection {
                text: self.text.clone(),
                overrides: outer,
            }];
        }
        self.sections
            .iter()
            .map(|section| TextSection {
                text: section.text.clone(),
                overrides: section.overrides.or(&outer),
            })
            .collect()
    }
}

/// 拼接产物引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sections: Vec<TextSection>) -> JobRequest {
        JobRequest {
            text: "One. Two.".to_string(),
            voice_id: Some("narrator".to_string()),
            speed: Some(1.2),
            pitch: None,
            sections,
            chunk_size: 100,
            crossfade_secs: 0.0,
        }
    }

    #[test]
    fn test_plain_request_is_one_section() {
        let sections = request(Vec::new()).resolved_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "One. Two.");
        assert_eq!(sections[0].overrides.voice_id.as_deref(), Some("narrator"));
        assert_eq!(sections[0].overrides.speed, Some(1.2));
    }

    #[test]
    fn test_section_overrides_win_over_request() {
        let sections = request(vec![
            TextSection {
                text: "One.".to_string(),
                overrides: VoiceOverrides::default(),
            },
            TextSection {
                text: "Two.".to_string(),
                overrides: VoiceOverrides {
                    voice_id: Some("storyteller".to_string()),
                    speed: None,
                    pitch: Some(0.8),
                },
            },
        ])
        .resolved_sections();

        assert_eq!(sections[0].overrides.voice_id.as_deref(), Some("narrator"));
        assert_eq!(sections[1].overrides.voice_id.as_deref(), Some("storyteller"));
        assert_eq!(sections[1].overrides.speed, Some(1.2));
        assert_eq!(sections[1].overrides.pitch, Some(0.8));
    }
}
