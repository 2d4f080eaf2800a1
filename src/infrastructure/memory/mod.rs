//! Memory Layer - In-Memory State Management
//!
//! 实现 JobRegistry 和 VoiceRegistry，管理任务与音色的内存状态

mod job_registry;
mod voice_registry;

pub use job_registry::InMemoryJobRegistry;
pub use voice_registry::InMemoryVoiceRegistry;
