//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::VoiceRegistryPort;
use crate::application::queries::{GetVoice, ListVoices};
use crate::domain::voice::VoiceProfile;

/// GetVoice Handler
pub struct GetVoiceHandler {
    voice_registry: Arc<dyn VoiceRegistryPort>,
}

impl GetVoiceHandler {
    pub fn new(voice_registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { voice_registry }
    }

    pub fn handle(&self, query: GetVoice) -> Result<VoiceProfile, ApplicationError> {
        self.voice_registry
            .get(&query.voice_id)
            .ok_or_else(|| ApplicationError::not_found("Voice", &query.voice_id))
    }
}

/// ListVoices Handler
pub struct ListVoicesHandler {
    voice_registry: Arc<dyn VoiceRegistryPort>,
}

impl ListVoicesHandler {
    pub fn new(voice_registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { voice_registry }
    }

    pub fn handle(&self, _query: ListVoices) -> Vec<VoiceProfile> {
        self.voice_registry.list()
    }
}
