//! HTTP Handlers

mod job;
mod ping;
mod voice;

pub use job::*;
pub use ping::*;
pub use voice::*;
