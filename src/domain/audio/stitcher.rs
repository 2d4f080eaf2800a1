//! 音频拼接器
//!
//! 将按序号排列的音频片段拼接为一段连续音频，可选在相邻片段间做交叉淡化。

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AudioBuffer;

/// 拼接错误
///
/// `Ordering` 与 `SampleRateMismatch` 属于内部不变量被破坏，不可重试
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StitchError {
    #[error("No audio segments to stitch")]
    EmptyJob,

    #[error("Segment ordering violated: expected index {expected}, found {found}")]
    Ordering { expected: usize, found: usize },

    #[error("Sample rate mismatch at segment {index}: expected {expected} Hz, found {found} Hz")]
    SampleRateMismatch {
        index: usize,
        expected: u32,
        found: u32,
    },

    #[error("Invalid crossfade duration: {0}")]
    InvalidCrossfade(f64),
}

/// 淡入淡出曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// 线性：淡出增益 + 淡入增益 = 1
    #[default]
    Linear,
    /// 等功率：淡出增益² + 淡入增益² = 1
    EqualPower,
}

impl FadeCurve {
    /// 返回 (淡出增益, 淡入增益)，`t` ∈ [0, 1]
    fn gains(&self, t: f64) -> (f32, f32) {
        match self {
            FadeCurve::Linear => ((1.0 - t) as f32, t as f32),
            FadeCurve::EqualPower => {
                let angle = t * FRAC_PI_2;
                (angle.cos() as f32, angle.sin() as f32)
            }
        }
    }
}

/// 拼接配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchConfig {
    /// 交叉淡化时长（秒），0 表示直接拼接
    pub crossfade_secs: f64,
    pub curve: FadeCurve,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            crossfade_secs: 0.0,
            curve: FadeCurve::Linear,
        }
    }
}

impl StitchConfig {
    pub fn with_crossfade(crossfade_secs: f64) -> Self {
        Self {
            crossfade_secs,
            ..Default::default()
        }
    }
}

/// 带序号的音频片段
#[derive(Debug, Clone)]
pub struct IndexedAudio {
    pub index: usize,
    pub audio: AudioBuffer,
}

impl IndexedAudio {
    pub fn new(index: usize, audio: AudioBuffer) -> Self {
        Self { index, audio }
    }
}

/// 交叉淡化的重叠样本数
pub fn crossfade_samples(crossfade_secs: f64, sample_rate: u32) -> usize {
    (crossfade_secs * sample_rate as f64).round() as usize
}

/// 校验序号连续（0..N-1，无空缺无重复），返回按序号排列的片段
fn ordered(mut segments: Vec<IndexedAudio>) -> Result<Vec<AudioBuffer>, StitchError> {
    segments.sort_by_key(|s| s.index);

    for (expected, segment) in segments.iter().enumerate() {
        if segment.index != expected {
            return Err(StitchError::Ordering {
                expected,
                found: segment.index,
            });
        }
    }

    Ok(segments.into_iter().map(|s| s.audio).collect())
}

/// 拼接音频片段
///
/// - 片段按 `index` 排序后必须恰好为 0..N-1
/// - 所有片段采样率必须一致
/// - 单个片段原样返回
/// - 输出样本限制在 [-1, 1]，发生削波时记录警告
pub fn stitch(segments: Vec<IndexedAudio>, config: &StitchConfig) -> Result<AudioBuffer, StitchError> {
    if !config.crossfade_secs.is_finite() || config.crossfade_secs < 0.0 {
        return Err(StitchError::InvalidCrossfade(config.crossfade_secs));
    }

    let mut buffers = ordered(segments)?;
    let first = match buffers.first() {
        Some(first) => first,
        None => return Err(StitchError::EmptyJob),
    };

    let sample_rate = first.sample_rate();
    for (index, buffer) in buffers.iter().enumerate() {
        if buffer.sample_rate() != sample_rate {
            return Err(StitchError::SampleRateMismatch {
                index,
                expected: sample_rate,
                found: buffer.sample_rate(),
            });
        }
    }

    if buffers.len() == 1 {
        return Ok(buffers.remove(0));
    }

    let overlap = crossfade_samples(config.crossfade_secs, sample_rate);
    let total: usize = buffers.iter().map(|b| b.len()).sum();
    let mut output: Vec<f32> = Vec::with_capacity(total);
    let mut previous_len = 0usize;

    for buffer in &buffers {
        let samples = buffer.samples();

        // 重叠长度不超过相邻两段中较短者
        let n = overlap.min(previous_len).min(samples.len());
        if n > 0 {
            let tail_start = output.len() - n;
            for k in 0..n {
                // 采样点位于重叠区间中点，保证两端增益对称
                let t = (k as f64 + 0.5) / n as f64;
                let (fade_out, fade_in) = config.curve.gains(t);
                let mixed = output[tail_start + k] * fade_out + samples[k] * fade_in;
                output[tail_start + k] = mixed;
            }
        }
        output.extend_from_slice(&samples[n..]);
        previous_len = samples.len();
    }

    let clipped = clamp_samples(&mut output);
    if clipped > 0 {
        tracing::warn!(
            clipped_samples = clipped,
            total_samples = output.len(),
            "Stitched audio exceeded [-1, 1], samples clamped"
        );
    }

    Ok(AudioBuffer::new(output, sample_rate))
}

/// 将样本限制在 [-1, 1]，非有限值置 0，返回被修正的样本数
fn clamp_samples(samples: &mut [f32]) -> usize {
    let mut clipped = 0;
    for sample in samples.iter_mut() {
        if !sample.is_finite() {
            *sample = 0.0;
            clipped += 1;
        } else if *sample > 1.0 || *sample < -1.0 {
            *sample = sample.clamp(-1.0, 1.0);
            clipped += 1;
        }
    }
    clipped
}
