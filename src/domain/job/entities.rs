//! Job Context - Entities

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::ChunkStatus;
use crate::domain::audio::AudioMeta;
use crate::domain::TextChunk;

/// 片段描述
///
/// `index` 从 0 开始且连续，决定最终拼接顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub text: String,
    /// 在归一化文本中的字节区间
    pub span: Range<usize>,
    pub status: ChunkStatus,
    /// 合成结果的元信息，合成完成前为 None
    pub audio: Option<AudioMeta>,
    pub error: Option<String>,
}

impl ChunkDescriptor {
    pub fn new(index: usize, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            index,
            text: text.into(),
            span,
            status: ChunkStatus::Pending,
            audio: None,
            error: None,
        }
    }
}

impl From<TextChunk> for ChunkDescriptor {
    fn from(chunk: TextChunk) -> Self {
        Self::new(chunk.index, chunk.text, chunk.span)
    }
}
