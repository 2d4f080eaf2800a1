//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Job Context: 合成任务与片段状态
//! - Voice Context: 音色管理
//! - Audio: 音频缓冲与拼接
//!
//! 以及与上下文无关的文本分割、文档解析

pub mod audio;
pub mod job;
pub mod voice;

mod document;
mod text_segmenter;

pub use document::{
    analyze_document, decode_document_bytes, parse_document, parse_document_as, DocumentAnalysis,
    DocumentFormat, ParsedDocument,
};
pub use text_segmenter::{
    count_sentences, normalize_text, segment_text, SegmentConfig, SegmentError, TextChunk,
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNK_SIZE,
};
