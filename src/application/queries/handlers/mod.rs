//! Query Handlers 实现

mod job_handlers;
mod voice_handlers;

pub use job_handlers::*;
pub use voice_handlers::*;
