//! Voice Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{BackendRef, VoiceError, VoiceId, VoiceName};

/// 内置音色 ID，不可删除
pub const BUILTIN_VOICE_IDS: [&str; 4] = ["narrator", "storyteller", "speecht5", "coqui"];

/// 未配置时的默认音色
pub const DEFAULT_VOICE_ID: &str = "narrator";

/// VoiceProfile 聚合根
///
/// 不变量:
/// - backend 参数始终通过校验
/// - `is_default` 由注册表在读取时派生，全局只有一个音色为默认
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    id: VoiceId,
    name: VoiceName,
    backend: BackendRef,
    language: String,
    gender: String,
    description: Option<String>,
    is_default: bool,
}

impl VoiceProfile {
    pub fn new(id: VoiceId, name: VoiceName, backend: BackendRef) -> Result<Self, VoiceError> {
        backend.validate()?;
        Ok(Self {
            id,
            name,
            backend,
            language: "en-US".to_string(),
            gender: "neutral".to_string(),
            description: None,
            is_default: false,
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 由注册表调用，返回带默认标记的快照
    pub fn with_default_flag(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn is_builtin(&self) -> bool {
        is_builtin(self.id.as_str())
    }

    // Getters
    pub fn id(&self) -> &VoiceId {
        &self.id
    }

    pub fn name(&self) -> &VoiceName {
        &self.name
    }

    pub fn backend(&self) -> &BackendRef {
        &self.backend
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

pub fn is_builtin(id: &str) -> bool {
    BUILTIN_VOICE_IDS.contains(&id)
}

/// 内置音色
pub fn builtin_profiles() -> Vec<VoiceProfile> {
    const SPEECHT5: &str = "microsoft/speecht5_tts";
    const HIFIGAN: &str = "microsoft/speecht5_hifigan";

    let specs = [
        (
            "narrator",
            "Narrator",
            BackendRef::new(SPEECHT5).with_vocoder(HIFIGAN).with_speed(0.9),
            "en-US",
            "male",
            "Professional narrator voice",
        ),
        (
            "storyteller",
            "Storyteller",
            BackendRef::new(SPEECHT5).with_vocoder(HIFIGAN).with_speed(0.85),
            "en-US",
            "female",
            "Engaging storytelling voice",
        ),
        (
            "speecht5",
            "Microsoft SpeechT5",
            BackendRef::new(SPEECHT5).with_vocoder(HIFIGAN),
            "en-US",
            "neutral",
            "High-quality neural TTS model",
        ),
        (
            "coqui",
            "Coqui TTS",
            BackendRef::new("tts_models/en/ljspeech/tacotron2-DDC")
                .with_vocoder("vocoder_models/en/ljspeech/hifigan_v2"),
            "en",
            "neutral",
            "Open-source TTS model",
        ),
    ];

    specs
        .into_iter()
        .filter_map(|(id, name, backend, language, gender, description)| {
            let id = VoiceId::new(id).ok()?;
            let name = VoiceName::new(name).ok()?;
            VoiceProfile::new(id, name, backend).ok().map(|p| {
                p.with_language(language)
                    .with_gender(gender)
                    .with_description(description)
            })
        })
        .collect()
}
