//! TTS Adapter - 合成引擎实现

mod http_tts_client;
mod tone_synthesizer;

pub use http_tts_client::{HttpTtsClient, HttpTtsClientConfig};
pub use tone_synthesizer::{ToneSynthesizer, ToneSynthesizerConfig};
