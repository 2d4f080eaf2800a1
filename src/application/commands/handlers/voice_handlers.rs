//! Voice Command Handlers

use std::sync::Arc;

use crate::application::commands::{RegisterVoice, RemoveVoice, SetDefaultVoice};
use crate::application::error::ApplicationError;
use crate::application::ports::VoiceRegistryPort;
use crate::domain::voice::{VoiceId, VoiceName, VoiceProfile};

// ============================================================================
// SetDefaultVoice
// ============================================================================

/// SetDefaultVoice Handler
pub struct SetDefaultVoiceHandler {
    voice_registry: Arc<dyn VoiceRegistryPort>,
}

impl SetDefaultVoiceHandler {
    pub fn new(voice_registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { voice_registry }
    }

    pub fn handle(&self, command: SetDefaultVoice) -> Result<(), ApplicationError> {
        self.voice_registry.set_default(&command.voice_id)?;
        tracing::info!(voice_id = %command.voice_id, "Default voice changed");
        Ok(())
    }
}

// ============================================================================
// RegisterVoice
// ============================================================================

/// RegisterVoice Handler
pub struct RegisterVoiceHandler {
    voice_registry: Arc<dyn VoiceRegistryPort>,
}

impl RegisterVoiceHandler {
    pub fn new(voice_registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { voice_registry }
    }

    pub fn handle(&self, command: RegisterVoice) -> Result<VoiceProfile, ApplicationError> {
        let id = VoiceId::new(command.voice_id)?;
        let name = VoiceName::new(command.name)?;

        let mut profile = VoiceProfile::new(id, name, command.backend)?;
        if let Some(language) = command.language {
            profile = profile.with_language(language);
        }
        if let Some(gender) = command.gender {
            profile = profile.with_gender(gender);
        }
        if let Some(description) = command.description {
            profile = profile.with_description(description);
        }

        self.voice_registry.register(profile.clone())?;

        tracing::info!(
            voice_id = %profile.id(),
            name = %profile.name(),
            model = %profile.backend().model,
            "Voice registered"
        );

        Ok(profile)
    }
}

// ============================================================================
// RemoveVoice
// ============================================================================

/// RemoveVoice Handler
pub struct RemoveVoiceHandler {
    voice_registry: Arc<dyn VoiceRegistryPort>,
}

impl RemoveVoiceHandler {
    pub fn new(voice_registry: Arc<dyn VoiceRegistryPort>) -> Self {
        Self { voice_registry }
    }

    pub fn handle(&self, command: RemoveVoice) -> Result<(), ApplicationError> {
        let removed = self.voice_registry.remove(&command.voice_id)?;

        tracing::info!(
            voice_id = %removed.id(),
            name = %removed.name(),
            "Voice removed"
        );

        Ok(())
    }
}
