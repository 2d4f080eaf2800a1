//! In-Memory Voice Registry Implementation

use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::application::ports::VoiceRegistryPort;
use crate::domain::voice::{
    builtin_profiles, is_builtin, VoiceError, VoiceId, VoiceProfile, DEFAULT_VOICE_ID,
};

struct VoiceTable {
    profiles: BTreeMap<VoiceId, VoiceProfile>,
    /// 默认音色，与 profiles 在同一把锁下修改
    default: VoiceId,
}

/// 内存音色注册表
pub struct InMemoryVoiceRegistry {
    table: RwLock<VoiceTable>,
}

impl InMemoryVoiceRegistry {
    /// 从音色列表构建，`default` 必须在列表中
    ///
    /// 同 ID 的音色后出现的覆盖先出现的
    pub fn new(profiles: Vec<VoiceProfile>, default: &str) -> Result<Self, VoiceError> {
        let profiles: BTreeMap<VoiceId, VoiceProfile> = profiles
            .into_iter()
            .map(|p| (p.id().clone(), p.with_default_flag(false)))
            .collect();

        let default = profiles
            .get_key_value(default)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| VoiceError::NotFound(default.to_string()))?;

        Ok(Self {
            table: RwLock::new(VoiceTable { profiles, default }),
        })
    }

    /// 仅包含内置音色
    pub fn with_builtins() -> Result<Self, VoiceError> {
        Self::new(builtin_profiles(), DEFAULT_VOICE_ID)
    }

    fn snapshot(table: &VoiceTable, profile: &VoiceProfile) -> VoiceProfile {
        profile
            .clone()
            .with_default_flag(*profile.id() == table.default)
    }
}

impl VoiceRegistryPort for InMemoryVoiceRegistry {
    fn list(&self) -> Vec<VoiceProfile> {
        let table = self.table.read();
        let mut voices: Vec<VoiceProfile> = table
            .profiles
            .values()
            .map(|p| Self::snapshot(&table, p))
            .collect();
        voices.sort_by(|a, b| {
            b.is_default()
                .cmp(&a.is_default())
                .then_with(|| a.name().as_str().cmp(b.name().as_str()))
        });
        voices
    }

    fn get(&self, id: &str) -> Option<VoiceProfile> {
        let table = self.table.read();
        table
            .profiles
            .get(id)
            .map(|p| Self::snapshot(&table, p))
    }

    fn resolve(&self, id: Option<&str>) -> Result<VoiceProfile, VoiceError> {
        let table = self.table.read();
        let wanted = id.unwrap_or(table.default.as_str());
        table
            .profiles
            .get(wanted)
            .map(|p| Self::snapshot(&table, p))
            .ok_or_else(|| VoiceError::NotFound(wanted.to_string()))
    }

    fn default_id(&self) -> VoiceId {
        self.table.read().default.clone()
    }

    fn set_default(&self, id: &str) -> Result<(), VoiceError> {
        let mut table = self.table.write();
        let new_default = table
            .profiles
            .get_key_value(id)
            .map(|(k, _)| k.clone())
            .ok_or_else(|| VoiceError::NotFound(id.to_string()))?;
        table.default = new_default;
        Ok(())
    }

    fn register(&self, profile: VoiceProfile) -> Result<(), VoiceError> {
        let mut table = self.table.write();
        if table.profiles.contains_key(profile.id()) {
            return Err(VoiceError::AlreadyExists(profile.id().clone()));
        }
        table
            .profiles
            .insert(profile.id().clone(), profile.with_default_flag(false));
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<VoiceProfile, VoiceError> {
        let mut table = self.table.write();
        let key = table
            .profiles
            .get_key_value(id)
            .map(|(k, _)| k.clone())
            .ok_or_else(|| VoiceError::NotFound(id.to_string()))?;

        if is_builtin(key.as_str()) {
            return Err(VoiceError::BuiltIn(key));
        }
        if key == table.default {
            return Err(VoiceError::InvalidConfig(format!(
                "默认音色不可删除: {key}"
            )));
        }

        table
            .profiles
            .remove(&key)
            .ok_or_else(|| VoiceError::NotFound(id.to_string()))
    }
}
