//! 文本分割器
//!
//! 将文档切分为有界的合成片段（chunk）：
//! - 先做空白归一化
//! - 按句子边界打包，尽量不在句内切分
//! - 单句超过硬上限时才回退到硬切分

use std::ops::Range;

use thiserror::Error;

/// 默认目标片段长度（字符数）
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// 默认硬上限（字符数），超过此长度的单句才会被硬切分
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2000;

/// 分割错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("Input text is empty after normalization")]
    EmptyInput,

    #[error("Chunk size must be positive, got {0}")]
    InvalidChunkSize(usize),
}

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 目标片段长度（字符数），多个句子打包时不超过该值
    pub chunk_size: usize,
    /// 硬上限（字符数）
    pub max_chunk_size: usize,
    /// 是否优先按句子边界切分（否则按单词打包）
    pub prefer_sentence_boundaries: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            prefer_sentence_boundaries: true,
        }
    }
}

impl SegmentConfig {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Default::default()
        }
    }

    /// 实际生效的硬上限，不会小于 chunk_size
    fn hard_limit(&self) -> usize {
        self.max_chunk_size.max(self.chunk_size)
    }
}

/// 分割后的文本片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 序号（从 0 开始，连续），决定拼接顺序
    pub index: usize,
    /// 去除首尾空白后的片段文本
    pub text: String,
    /// 在归一化文本中的字节区间（包含尾随空格）
    pub span: Range<usize>,
}

impl TextChunk {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// 句末标点（英文标点需后接空白或文本结尾才算句末）
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!')
}

/// 中文句末标点，无需后接空白
#[inline]
fn is_cjk_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！')
}

/// 句末标点之后可能紧跟的闭合符号
#[inline]
fn is_closing_mark(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '\u{201D}' | '\u{2019}' | ')' | ']' | '」' | '』'
    )
}

/// 空白归一化
///
/// 去除控制字符，将连续空白折叠为单个空格，并去除首尾空白
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }

    out
}

/// 统计句子数（先归一化）
pub fn count_sentences(text: &str) -> usize {
    let normalized = normalize_text(text);
    split_sentences(&normalized).len()
}

#[inline]
fn trimmed_len(text: &str, span: &Range<usize>) -> usize {
    text[span.clone()].trim_end().chars().count()
}

/// 按句子切分归一化文本，返回覆盖全文的连续区间（句后空格归属前一句）
fn split_sentences(text: &str) -> Vec<Range<usize>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (_, ch) = chars[i];
        if !is_strong_delimiter(ch) {
            i += 1;
            continue;
        }

        // 吸收连续的句末标点和闭合符号，如 `?!"`
        let mut j = i + 1;
        while j < chars.len() && is_strong_delimiter(chars[j].1) {
            j += 1;
        }
        while j < chars.len() && is_closing_mark(chars[j].1) {
            j += 1;
        }

        let at_end = j == chars.len();
        let followed_by_space = !at_end && chars[j].1 == ' ';

        if at_end || followed_by_space || is_cjk_delimiter(ch) {
            let mut end = if at_end { text.len() } else { chars[j].0 };
            if followed_by_space {
                end += 1;
            }
            spans.push(start..end);
            start = end;
            i = if followed_by_space { j + 1 } else { j };
        } else {
            // 如 "3.14" 或 "a.b"，不是句末
            i = j;
        }
    }

    if start < text.len() {
        spans.push(start..text.len());
    }

    spans
}

/// 按单词切分（单词后的空格归属该单词）
fn split_words(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if ch == ' ' {
            spans.push(start..i + 1);
            start = i + 1;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }

    spans
}

/// 硬切分：优先在上限内最后一个空格处断开，否则正好在上限处断开
fn hard_split(text: &str, span: Range<usize>, limit: usize) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = span.start;

    while start < span.end {
        let rest = &text[start..span.end];
        if rest.trim_end().chars().count() <= limit {
            pieces.push(start..span.end);
            break;
        }

        let cut = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        let end = if rest[cut..].starts_with(' ') {
            cut + 1
        } else {
            match rest[..cut].rfind(' ') {
                Some(ws) if ws > 0 => ws + 1,
                _ => cut,
            }
        };

        pieces.push(start..start + end);
        start += end;
    }

    pieces
}

/// 贪心打包：在不超过 chunk_size 的前提下合并相邻单元
fn pack_units(text: &str, units: Vec<Range<usize>>, chunk_size: usize, limit: usize) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut current: Option<Range<usize>> = None;

    for unit in units {
        if trimmed_len(text, &unit) > limit {
            if let Some(open) = current.take() {
                spans.push(open);
            }
            spans.extend(hard_split(text, unit, limit));
            continue;
        }

        current = match current.take() {
            Some(open) if trimmed_len(text, &(open.start..unit.end)) <= chunk_size => {
                Some(open.start..unit.end)
            }
            Some(open) => {
                spans.push(open);
                Some(unit)
            }
            None => Some(unit),
        };
    }

    if let Some(open) = current {
        spans.push(open);
    }

    spans
}

/// 对文本进行分段
///
/// 分段策略：
/// 1. 空白归一化；归一化后为空则返回 `EmptyInput`
/// 2. 按句子（或单词）切分为单元
/// 3. 贪心打包，单个片段不超过 `chunk_size`；单句超过 `chunk_size` 时独立成段
/// 4. 单句超过硬上限时硬切分
///
/// 所有片段的 `span` 首尾相接，完整覆盖归一化文本。
pub fn segment_text(text: &str, config: &SegmentConfig) -> Result<Vec<TextChunk>, SegmentError> {
    if config.chunk_size == 0 {
        return Err(SegmentError::InvalidChunkSize(0));
    }

    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Err(SegmentError::EmptyInput);
    }

    let (units, limit) = if config.prefer_sentence_boundaries {
        (split_sentences(&normalized), config.hard_limit())
    } else {
        (split_words(&normalized), config.chunk_size)
    };

    let chunks = pack_units(&normalized, units, config.chunk_size, limit)
        .into_iter()
        .enumerate()
        .map(|(index, span)| TextChunk {
            index,
            text: normalized[span.clone()].trim().to_string(),
            span,
        })
        .collect();

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat_spans(text: &str, chunks: &[TextChunk]) -> String {
        let normalized = normalize_text(text);
        chunks
            .iter()
            .map(|c| &normalized[c.span.clone()])
            .collect()
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  Hello \n\n\t world.  "), "Hello world.");
        assert_eq!(normalize_text("a\u{0007}b"), "ab");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn test_single_chunk_when_text_fits() {
        let config = SegmentConfig::with_chunk_size(1000);
        let chunks = segment_text("Hello world. This is a test.", &config).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world. This is a test.");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_splits_at_sentence_boundary() {
        let config = SegmentConfig::with_chunk_size(10);
        let chunks = segment_text("Hello world. This is a test.", &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Hello world.");
        assert_eq!(chunks[1].text, "This is a test.");
    }

    #[test]
    fn test_empty_input_rejected() {
        let config = SegmentConfig::default();
        assert_eq!(segment_text("", &config), Err(SegmentError::EmptyInput));
        assert_eq!(segment_text(" \n \t", &config), Err(SegmentError::EmptyInput));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = SegmentConfig::with_chunk_size(0);
        assert_eq!(
            segment_text("Hello.", &config),
            Err(SegmentError::InvalidChunkSize(0))
        );
    }

    #[test]
    fn test_sentences_packed_up_to_chunk_size() {
        let config = SegmentConfig::with_chunk_size(20);
        let chunks = segment_text("One. Two. Three. Four. Five. Six.", &config).unwrap();

        for chunk in &chunks {
            assert!(chunk.char_count() <= 20, "chunk too long: {:?}", chunk.text);
        }
        assert_eq!(chunks[0].text, "One. Two. Three.");
        assert_eq!(
            concat_spans("One. Two. Three. Four. Five. Six.", &chunks),
            "One. Two. Three. Four. Five. Six."
        );
    }

    #[test]
    fn test_decimal_point_is_not_sentence_end() {
        let config = SegmentConfig::with_chunk_size(5);
        let chunks = segment_text("Pi is 3.14 exactly. Yes.", &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Pi is 3.14 exactly.");
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let config = SegmentConfig::with_chunk_size(5);
        let chunks = segment_text("He said \"stop!\" Then left.", &config).unwrap();

        assert_eq!(chunks[0].text, "He said \"stop!\"");
        assert_eq!(chunks[1].text, "Then left.");
    }

    #[test]
    fn test_cjk_sentences() {
        let config = SegmentConfig::with_chunk_size(4);
        let chunks = segment_text("第一句。第二句！", &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "第一句。");
        assert_eq!(chunks[1].text, "第二句！");
    }

    #[test]
    fn test_oversized_sentence_hard_split_at_word_boundary() {
        let config = SegmentConfig {
            chunk_size: 5,
            max_chunk_size: 12,
            prefer_sentence_boundaries: true,
        };
        let text = "alpha beta gamma delta epsilon.";
        let chunks = segment_text(text, &config).unwrap();

        for chunk in &chunks {
            assert!(chunk.char_count() <= 12, "chunk too long: {:?}", chunk.text);
        }
        assert_eq!(chunks[0].text, "alpha beta");
        assert_eq!(concat_spans(text, &chunks), normalize_text(text));
    }

    #[test]
    fn test_hard_split_without_whitespace() {
        let config = SegmentConfig {
            chunk_size: 4,
            max_chunk_size: 4,
            prefer_sentence_boundaries: true,
        };
        let chunks = segment_text("abcdefghij", &config).unwrap();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_word_mode_respects_chunk_size() {
        let config = SegmentConfig {
            chunk_size: 11,
            max_chunk_size: 2000,
            prefer_sentence_boundaries: false,
        };
        let text = "Hello world. This is a test.";
        let chunks = segment_text(text, &config).unwrap();

        for chunk in &chunks {
            assert!(chunk.char_count() <= 11);
        }
        assert_eq!(chunks[0].text, "Hello");
        assert_eq!(concat_spans(text, &chunks), normalize_text(text));
    }

    #[test]
    fn test_coverage_and_contiguity() {
        let text = "  The quick brown fox.  Jumps over\nthe lazy dog!  Again?\n\nAnd again... done";
        for size in [1, 3, 7, 15, 40, 1000] {
            let config = SegmentConfig::with_chunk_size(size);
            let chunks = segment_text(text, &config).unwrap();

            assert_eq!(concat_spans(text, &chunks), normalize_text(text));
            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.index, i);
                assert!(!chunk.text.is_empty());
            }
            for pair in chunks.windows(2) {
                assert_eq!(pair[0].span.end, pair[1].span.start);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let config = SegmentConfig::with_chunk_size(12);
        let text = "First sentence here. Second one. Third!";
        assert_eq!(
            segment_text(text, &config).unwrap(),
            segment_text(text, &config).unwrap()
        );
    }

    #[test]
    fn test_count_sentences() {
        assert_eq!(count_sentences("Hello world. This is a test."), 2);
        assert_eq!(count_sentences("Pi is 3.14 exactly."), 1);
        assert_eq!(count_sentences("你好。世界！"), 2);
        assert_eq!(count_sentences("   "), 0);
    }
}
