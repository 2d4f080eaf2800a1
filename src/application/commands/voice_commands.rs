//! Voice Commands

use crate::domain::voice::BackendRef;

/// 设置默认音色
#[derive(Debug, Clone)]
pub struct SetDefaultVoice {
    pub voice_id: String,
}

/// 注册自定义音色
#[derive(Debug, Clone)]
pub struct RegisterVoice {
    pub voice_id: String,
    pub name: String,
    pub backend: BackendRef,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub description: Option<String>,
}

/// 删除音色
#[derive(Debug, Clone)]
pub struct RemoveVoice {
    pub voice_id: String,
}
