//! Voice Registry Port - 音色注册表

use crate::domain::voice::{VoiceError, VoiceId, VoiceProfile};

/// Voice Registry Port
///
/// 全局只有一个默认音色，返回的 profile 带有派生的 `is_default` 标记
pub trait VoiceRegistryPort: Send + Sync {
    /// 列出所有音色（默认音色在前，其余按名称排序）
    fn list(&self) -> Vec<VoiceProfile>;

    fn get(&self, id: &str) -> Option<VoiceProfile>;

    /// 解析音色，未指定时返回默认音色
    fn resolve(&self, id: Option<&str>) -> Result<VoiceProfile, VoiceError>;

    fn default_id(&self) -> VoiceId;

    fn set_default(&self, id: &str) -> Result<(), VoiceError>;

    fn register(&self, profile: VoiceProfile) -> Result<(), VoiceError>;

    /// 删除音色，内置音色与当前默认音色不可删除
    fn remove(&self, id: &str) -> Result<VoiceProfile, VoiceError>;
}
