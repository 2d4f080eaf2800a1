//! Audio - 音频缓冲区与拼接算法

mod buffer;
mod stitcher;

pub use buffer::{AudioBuffer, AudioMeta};
pub use stitcher::{crossfade_samples, stitch, FadeCurve, IndexedAudio, StitchConfig, StitchError};
