//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ArtifactStorageError, RegistryError};
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 结果尚未就绪
    #[error("Not ready: {0}")]
    NotReady(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RegistryError> for ApplicationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => Self::not_found("Job", id),
            RegistryError::AlreadyExists(_) => Self::InternalError(err.to_string()),
            RegistryError::Job(e) => Self::InvalidState(e.to_string()),
        }
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::NotFound(id) => Self::not_found("Voice", id),
            VoiceError::AlreadyExists(_) | VoiceError::InvalidConfig(_) | VoiceError::BuiltIn(_) => {
                Self::ValidationError(err.to_string())
            }
        }
    }
}

impl From<ArtifactStorageError> for ApplicationError {
    fn from(err: ArtifactStorageError) -> Self {
        match err {
            ArtifactStorageError::NotFound(id) => Self::not_found("Artifact", id),
            other => Self::StorageError(other.to_string()),
        }
    }
}
