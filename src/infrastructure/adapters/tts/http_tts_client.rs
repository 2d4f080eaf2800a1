//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 SynthesisEnginePort trait，通过 HTTP 调用外部 TTS 服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/infer
//! Request: {"text": "...", "voice_id": "...", "model": "...", "vocoder": "...", "speed": 1.0, "pitch": 1.0}
//! Response: audio/wav binary

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SynthesisEnginePort, SynthesisError, SynthesisRequest};
use crate::domain::audio::AudioBuffer;
use crate::infrastructure::adapters::codec::decode_wav;

/// TTS 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    vocoder: Option<&'a str>,
    speed: f32,
    pitch: f32,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 引擎名称（记录在任务上）
    pub name: String,
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            name: "http".to_string(),
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
///
/// 客户端在启动时构建一次，内部连接池可被多个任务共享
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取推理 URL
    fn infer_url(&self) -> String {
        format!("{}/api/tts/infer", self.config.base_url.trim_end_matches('/'))
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }
}

/// 在阻塞线程池中解码响应的 WAV 数据
async fn decode_response<B>(data: B) -> Result<AudioBuffer, SynthesisError>
where
    B: AsRef<[u8]> + Send + 'static,
{
    let audio = tokio::task::spawn_blocking(move || decode_wav(data.as_ref()))
        .await
        .map_err(|e| SynthesisError::InvalidResponse(format!("decode task failed: {}", e)))?
        .map_err(|e| SynthesisError::InvalidResponse(e.to_string()))?;
    if audio.is_empty() {
        return Err(SynthesisError::InvalidResponse(
            "TTS service returned empty audio".to_string(),
        ));
    }
    Ok(audio)
}

#[async_trait]
impl SynthesisEnginePort for HttpTtsClient {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioBuffer, SynthesisError> {
        let http_request = TtsHttpRequest {
            text: &request.text,
            voice_id: request.voice_id.as_str(),
            model: &request.backend.model,
            vocoder: request.backend.vocoder.as_deref(),
            speed: request.backend.speed,
            pitch: request.backend.pitch,
        };

        tracing::debug!(
            url = %self.infer_url(),
            job_id = %request.job_id,
            chunk_index = request.chunk_index,
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            "Sending TTS infer request"
        );

        let response = self
            .client
            .post(self.infer_url())
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::Network(format!("Cannot connect to TTS service: {}", e))
                } else {
                    SynthesisError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SynthesisError::VoiceNotFound(request.voice_id.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Service(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                SynthesisError::Timeout
            } else {
                SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e))
            }
        })?;

        let audio_size = audio_data.len();
        let audio = decode_response(audio_data).await?;

        tracing::debug!(
            job_id = %request.job_id,
            chunk_index = request.chunk_index,
            sample_rate = audio.sample_rate(),
            duration_secs = audio.duration_secs(),
            audio_size,
            "TTS inference completed"
        );

        Ok(audio)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobId;
    use crate::domain::voice::{BackendRef, VoiceId};

    #[test]
    fn test_config_default() {
        let config = HttpTtsClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsClientConfig::new("http://example.com:9000/")
            .with_name("remote")
            .with_timeout(60);
        let client = HttpTtsClient::new(config).unwrap();
        assert_eq!(client.name(), "remote");
        assert_eq!(client.infer_url(), "http://example.com:9000/api/tts/infer");
    }

    #[test]
    fn test_request_body_shape() {
        let backend = BackendRef::new("speecht5").with_vocoder("hifigan");
        let voice_id = VoiceId::new("narrator").unwrap();
        let body = TtsHttpRequest {
            text: "Hi.",
            voice_id: voice_id.as_str(),
            model: &backend.model,
            vocoder: backend.vocoder.as_deref(),
            speed: backend.speed,
            pitch: backend.pitch,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "speecht5");
        assert_eq!(json["vocoder"], "hifigan");
        assert_eq!(json["voice_id"], "narrator");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // 端口 9 (discard) 通常无服务监听
        let client = HttpTtsClient::new(
            HttpTtsClientConfig::new("http://127.0.0.1:9").with_timeout(2),
        )
        .unwrap();
        let request = SynthesisRequest {
            job_id: JobId::new(),
            chunk_index: 0,
            text: "Hello.".to_string(),
            voice_id: VoiceId::new("narrator").unwrap(),
            backend: BackendRef::new("m"),
        };
        let result = client.synthesize(&request).await;
        assert!(matches!(
            result,
            Err(SynthesisError::Network(_)) | Err(SynthesisError::Timeout)
        ));
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_decode_response() {
        use crate::infrastructure::adapters::codec::encode_wav;

        let wav = encode_wav(&AudioBuffer::new(vec![0.5; 320], 16000)).unwrap();
        let audio = decode_response(wav).await.unwrap();
        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(audio.len(), 320);

        let empty = encode_wav(&AudioBuffer::new(Vec::new(), 16000)).unwrap();
        assert!(matches!(
            decode_response(empty).await,
            Err(SynthesisError::InvalidResponse(_))
        ));
        assert!(matches!(
            decode_response(b"not a wav".to_vec()).await,
            Err(SynthesisError::InvalidResponse(_))
        ));
    }
}
