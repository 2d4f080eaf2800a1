//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

use super::VoiceError;

/// 音色唯一标识
///
/// 仅允许小写字母、数字、`_` 与 `-`，长度 1..=64
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Result<Self, VoiceError> {
        let id = id.into();
        if id.is_empty() || id.len() > 64 {
            return Err(VoiceError::InvalidConfig(format!(
                "音色 ID 长度必须在 1 到 64 之间: {id:?}"
            )));
        }
        let valid = id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            return Err(VoiceError::InvalidConfig(format!(
                "音色 ID 只能包含 [a-z0-9_-]: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for VoiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VoiceId {
    type Error = VoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoiceId> for String {
    fn from(id: VoiceId) -> Self {
        id.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 音色名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceName(String);

impl VoiceName {
    pub fn new(name: impl Into<String>) -> Result<Self, VoiceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(VoiceError::InvalidConfig("音色名称不能为空".into()));
        }
        if name.chars().count() > 100 {
            return Err(VoiceError::InvalidConfig(
                "音色名称长度不能超过100字符".into(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 合成后端参数
///
/// 透传给合成引擎，核心流程不解释其含义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRef {
    /// 模型标识
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocoder: Option<String>,
    /// 语速 (0.1 - 3.0)
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// 音调倍率 (0.5 - 2.0)
    #[serde(default = "default_pitch")]
    pub pitch: f32,
}

fn default_speed() -> f32 {
    1.0
}

fn default_pitch() -> f32 {
    1.0
}

impl BackendRef {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            vocoder: None,
            speed: default_speed(),
            pitch: default_pitch(),
        }
    }

    pub fn with_vocoder(mut self, vocoder: impl Into<String>) -> Self {
        self.vocoder = Some(vocoder.into());
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// 应用任务或文档段指定的语速、音调
    pub fn with_overrides(mut self, speed: Option<f32>, pitch: Option<f32>) -> Self {
        if let Some(speed) = speed {
            self.speed = speed;
        }
        if let Some(pitch) = pitch {
            self.pitch = pitch;
        }
        self
    }

    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.model.trim().is_empty() {
            return Err(VoiceError::InvalidConfig(
                "模型标识不能为空".into(),
            ));
        }
        validate_speed(self.speed)?;
        validate_pitch(self.pitch)
    }
}

/// 语速范围 0.1 - 3.0
pub fn validate_speed(speed: f32) -> Result<(), VoiceError> {
    if !(0.1..=3.0).contains(&speed) {
        return Err(VoiceError::InvalidConfig(format!(
            "语速必须在 0.1 到 3.0 之间: {speed}"
        )));
    }
    Ok(())
}

/// 音调范围 0.5 - 2.0
pub fn validate_pitch(pitch: f32) -> Result<(), VoiceError> {
    if !(0.5..=2.0).contains(&pitch) {
        return Err(VoiceError::InvalidConfig(format!(
            "音调必须在 0.5 到 2.0 之间: {pitch}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_id_charset() {
        assert!(VoiceId::new("narrator").is_ok());
        assert!(VoiceId::new("my-voice_2").is_ok());
        assert!(VoiceId::new("").is_err());
        assert!(VoiceId::new("Has Space").is_err());
        assert!(VoiceId::new("x".repeat(65)).is_err());
    }

    #[test]
    fn test_voice_id_deserialize_validates() {
        let ok: Result<VoiceId, _> = serde_json::from_str("\"coqui\"");
        assert!(ok.is_ok());
        let bad: Result<VoiceId, _> = serde_json::from_str("\"../etc\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_backend_validation() {
        assert!(BackendRef::new("speecht5").validate().is_ok());
        assert!(BackendRef::new("").validate().is_err());
        assert!(BackendRef::new("m").with_speed(3.5).validate().is_err());

        let mut backend = BackendRef::new("m");
        backend.pitch = 0.4;
        assert!(backend.validate().is_err());
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let backend = BackendRef::new("m")
            .with_speed(0.9)
            .with_overrides(None, Some(1.5));
        assert_eq!(backend.speed, 0.9);
        assert_eq!(backend.pitch, 1.5);

        let backend = backend.with_overrides(Some(4.0), None);
        assert!(backend.validate().is_err());
    }
}
