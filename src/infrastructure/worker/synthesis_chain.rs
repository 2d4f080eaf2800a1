//! Synthesis Chain - 有序的合成引擎列表
//!
//! 每个任务用第一个片段依次试探引擎，选中后该任务的其余片段都使用同一引擎，
//! 保证同一任务内音色一致

use std::sync::Arc;

use crate::application::ports::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
use crate::domain::audio::AudioBuffer;

pub struct SynthesisChain {
    engines: Vec<Arc<dyn SynthesisEnginePort>>,
    /// 片段失败时是否依次重试后续引擎
    chunk_fallback: bool,
}

impl SynthesisChain {
    pub fn new(engines: Vec<Arc<dyn SynthesisEnginePort>>) -> Self {
        Self {
            engines,
            chunk_fallback: false,
        }
    }

    pub fn with_chunk_fallback(mut self, enabled: bool) -> Self {
        self.chunk_fallback = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn engine_name(&self, index: usize) -> Option<&str> {
        self.engines.get(index).map(|e| e.name())
    }

    /// 按顺序试探引擎，返回首个成功的引擎下标及其合成结果
    ///
    /// 全部失败时返回最后一个错误
    pub async fn select(
        &self,
        request: &SynthesisRequest,
    ) -> Result<(usize, AudioBuffer), SynthesisError> {
        self.try_from_index(0, request).await
    }

    /// 使用已选中的引擎合成，开启 chunk_fallback 时失败后尝试后续引擎
    pub async fn synthesize_with(
        &self,
        selected: usize,
        request: &SynthesisRequest,
    ) -> Result<AudioBuffer, SynthesisError> {
        if self.chunk_fallback {
            return self
                .try_from_index(selected, request)
                .await
                .map(|(_, audio)| audio);
        }

        let engine = self.engines.get(selected).ok_or_else(|| {
            SynthesisError::Service(format!("no synthesis engine at position {selected}"))
        })?;
        engine.synthesize(request).await
    }

    async fn try_from_index(
        &self,
        start: usize,
        request: &SynthesisRequest,
    ) -> Result<(usize, AudioBuffer), SynthesisError> {
        let mut last_error =
            SynthesisError::Service("no synthesis engine configured".to_string());

        for (index, engine) in self.engines.iter().enumerate().skip(start) {
            match engine.synthesize(request).await {
                Ok(audio) => {
                    if index != start {
                        tracing::info!(
                            job_id = %request.job_id,
                            chunk_index = request.chunk_index,
                            engine = engine.name(),
                            "Fallback engine succeeded"
                        );
                    }
                    return Ok((index, audio));
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %request.job_id,
                        chunk_index = request.chunk_index,
                        engine = engine.name(),
                        error = %e,
                        "Synthesis engine failed"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
