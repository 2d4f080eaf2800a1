//! Audio Buffer - 单声道 PCM 缓冲区

use serde::{Deserialize, Serialize};

/// 单声道浮点 PCM 缓冲区
///
/// 样本取值范围约定为 [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 时长（秒）
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// 峰值幅度
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }

    pub fn meta(&self) -> AudioMeta {
        AudioMeta {
            sample_rate: self.sample_rate,
            sample_count: self.samples.len(),
            duration_secs: self.duration_secs(),
        }
    }
}

/// 音频元信息（不含样本数据）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioMeta {
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::new(vec![0.0; 22050], 22050);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
        assert_eq!(buffer.meta().sample_count, 22050);
    }

    #[test]
    fn test_peak() {
        let buffer = AudioBuffer::new(vec![0.2, -0.7, 0.5], 16000);
        assert!((buffer.peak() - 0.7).abs() < f32::EPSILON);
    }
}
