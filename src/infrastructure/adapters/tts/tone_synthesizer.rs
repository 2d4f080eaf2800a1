//! Tone Synthesizer - 确定性正弦波合成器
//!
//! 不依赖外部服务，时长与文本长度成正比。用于本地运行和测试

use async_trait::async_trait;
use std::f32::consts::TAU;
use std::time::Duration;

use crate::application::ports::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
use crate::domain::audio::AudioBuffer;

/// Tone Synthesizer 配置
#[derive(Debug, Clone)]
pub struct ToneSynthesizerConfig {
    pub name: String,
    pub sample_rate: u32,
    /// 每个字符对应的时长（秒），实际时长再除以语速
    pub secs_per_char: f64,
    /// 基础频率（Hz），乘以音色的 pitch
    pub base_frequency: f32,
    pub amplitude: f32,
    /// 模拟推理延迟
    pub latency_ms: u64,
}

impl Default for ToneSynthesizerConfig {
    fn default() -> Self {
        Self {
            name: "tone".to_string(),
            sample_rate: 22050,
            secs_per_char: 0.06,
            base_frequency: 220.0,
            amplitude: 0.3,
            latency_ms: 0,
        }
    }
}

/// Tone Synthesizer
pub struct ToneSynthesizer {
    config: ToneSynthesizerConfig,
}

impl ToneSynthesizer {
    pub fn new(config: ToneSynthesizerConfig) -> Self {
        tracing::info!(
            name = %config.name,
            sample_rate = config.sample_rate,
            "ToneSynthesizer initialized"
        );
        Self { config }
    }

    fn render(&self, chars: usize, speed: f32, pitch: f32) -> Vec<f32> {
        let sr = self.config.sample_rate as f64;
        let secs = chars.max(1) as f64 * self.config.secs_per_char / speed.max(0.1) as f64;
        let len = (secs * sr).round().max(1.0) as usize;
        let freq = self.config.base_frequency * pitch;
        // 5ms 淡入淡出，避免首尾爆音
        let ramp = ((0.005 * sr) as usize).min(len / 2).max(1);

        (0..len)
            .map(|n| {
                let t = n as f32 / self.config.sample_rate as f32;
                let edge = n.min(len - 1 - n);
                let envelope = if edge < ramp {
                    edge as f32 / ramp as f32
                } else {
                    1.0
                };
                self.config.amplitude * envelope * (TAU * freq * t).sin()
            })
            .collect()
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new(ToneSynthesizerConfig::default())
    }
}

#[async_trait]
impl SynthesisEnginePort for ToneSynthesizer {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioBuffer, SynthesisError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        let chars = request.text.chars().count();
        let samples = self.render(chars, request.backend.speed, request.backend.pitch);

        tracing::debug!(
            job_id = %request.job_id,
            chunk_index = request.chunk_index,
            chars,
            samples = samples.len(),
            "Tone synthesized"
        );

        Ok(AudioBuffer::new(samples, self.config.sample_rate))
    }
}
