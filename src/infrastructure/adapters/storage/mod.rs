//! Storage Adapter - 产物存储实现

mod wav_storage;

pub use wav_storage::WavArtifactStorage;
