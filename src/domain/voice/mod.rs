//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色配置（后端模型、语速、音调）
//! - 内置音色

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{
    builtin_profiles, is_builtin, VoiceProfile, BUILTIN_VOICE_IDS, DEFAULT_VOICE_ID,
};
pub use errors::VoiceError;
pub use value_objects::{validate_pitch, validate_speed, BackendRef, VoiceId, VoiceName};
