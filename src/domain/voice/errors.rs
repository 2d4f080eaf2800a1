//! Voice Context - Errors

use thiserror::Error;

use super::VoiceId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoiceError {
    #[error("音色不存在: {0}")]
    NotFound(String),

    #[error("音色已存在: {0}")]
    AlreadyExists(VoiceId),

    #[error("无效的配置: {0}")]
    InvalidConfig(String),

    #[error("内置音色不可删除: {0}")]
    BuiltIn(VoiceId),
}
