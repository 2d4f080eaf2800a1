//! 文档解析与分析
//!
//! 提交的文本可以是纯文本，也可以是以下 JSON 结构之一:
//! - `{"text": "...", "voice_id": "...", "speed": 1.0, "pitch": 1.0}`
//! - `{"segments": [{"text": "...", "voice_id": "...", "speed": 1.0, "pitch": 1.0}, ...]}`
//! - `["...", "..."]`
//!
//! 无法识别的 JSON 按纯文本处理

use serde::{Deserialize, Serialize};

use super::job::{TextSection, VoiceOverrides};
use super::text_segmenter::{count_sentences, segment_text, SegmentConfig};

/// 平均朗读速度（词/分钟）
const WORDS_PER_MINUTE: f64 = 150.0;

/// 输入格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    /// 以 `{` 或 `[` 开头时尝试按 JSON 解析
    #[default]
    Auto,
    /// 原样作为纯文本
    PlainText,
}

impl DocumentFormat {
    /// 上传文件支持的扩展名
    pub const SUPPORTED_EXTENSIONS: [&'static str; 4] = ["txt", "md", "text", "json"];

    /// 按文件名推断格式，不支持的扩展名返回 None
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)?;
        match ext.as_str() {
            "json" => Some(DocumentFormat::Auto),
            "txt" | "md" | "text" => Some(DocumentFormat::PlainText),
            _ => None,
        }
    }
}

/// 解析后的文档
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// 全文，分段文档为各段以空格连接
    pub text: String,
    /// 文档级音色参数，请求未指定时使用
    pub overrides: VoiceOverrides,
    /// 至少一段带有独立参数时才非空
    pub sections: Vec<TextSection>,
}

impl ParsedDocument {
    fn plain(text: String) -> Self {
        Self {
            text,
            overrides: VoiceOverrides::default(),
            sections: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StructuredDocument {
    Text {
        text: String,
        #[serde(default)]
        voice_id: Option<String>,
        #[serde(default)]
        speed: Option<f32>,
        #[serde(default)]
        pitch: Option<f32>,
    },
    Segments {
        segments: Vec<SegmentEntry>,
    },
    Lines(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentEntry {
    Object {
        text: String,
        #[serde(default)]
        voice_id: Option<String>,
        #[serde(default)]
        speed: Option<f32>,
        #[serde(default)]
        pitch: Option<f32>,
    },
    Plain(String),
}

impl From<SegmentEntry> for TextSection {
    fn from(entry: SegmentEntry) -> Self {
        match entry {
            SegmentEntry::Object {
                text,
                voice_id,
                speed,
                pitch,
            } => TextSection {
                text,
                overrides: VoiceOverrides {
                    voice_id,
                    speed,
                    pitch,
                },
            },
            SegmentEntry::Plain(text) => TextSection {
                text,
                overrides: VoiceOverrides::default(),
            },
        }
    }
}

/// 解析文档
pub fn parse_document(raw: &str) -> ParsedDocument {
    parse_document_as(raw, DocumentFormat::Auto)
}

/// 按指定格式解析文档
pub fn parse_document_as(raw: &str, format: DocumentFormat) -> ParsedDocument {
    let trimmed = raw.trim_start();
    if format == DocumentFormat::PlainText
        || !(trimmed.starts_with('{') || trimmed.starts_with('['))
    {
        return ParsedDocument::plain(raw.to_string());
    }

    match serde_json::from_str::<StructuredDocument>(raw) {
        Ok(StructuredDocument::Text {
            text,
            voice_id,
            speed,
            pitch,
        }) => ParsedDocument {
            text,
            overrides: VoiceOverrides {
                voice_id,
                speed,
                pitch,
            },
            sections: Vec::new(),
        },
        Ok(StructuredDocument::Segments { segments }) => {
            let sections: Vec<TextSection> = segments.into_iter().map(TextSection::from).collect();
            let text = sections
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            // 没有任何段级参数时按整篇分段
            let sections = if sections.iter().all(|s| s.overrides.is_empty()) {
                Vec::new()
            } else {
                sections
            };
            ParsedDocument {
                text,
                overrides: VoiceOverrides::default(),
                sections,
            }
        }
        Ok(StructuredDocument::Lines(lines)) => ParsedDocument::plain(lines.join(" ")),
        Err(e) => {
            tracing::debug!(error = %e, "Document is not structured JSON, treating as plain text");
            ParsedDocument::plain(raw.to_string())
        }
    }
}

/// 解码上传的文本文件
///
/// 依次尝试 UTF-8（去除 BOM），失败时按 Latin-1 逐字节映射
pub fn decode_document_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// 文档分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub character_count: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    /// 按 150 词/分钟估算，保留一位小数
    pub estimated_reading_minutes: f64,
    pub estimated_chunks: usize,
    pub requires_stitching: bool,
}

/// 分析文档
pub fn analyze_document(text: &str, config: &SegmentConfig) -> DocumentAnalysis {
    let word_count = text.split_whitespace().count();
    let estimated_chunks = segment_text(text, config).map(|c| c.len()).unwrap_or(0);
    let minutes = word_count as f64 / WORDS_PER_MINUTE;

    DocumentAnalysis {
        character_count: text.chars().count(),
        word_count,
        sentence_count: count_sentences(text),
        estimated_reading_minutes: (minutes * 10.0).round() / 10.0,
        estimated_chunks,
        requires_stitching: estimated_chunks > 1,
    }
}
