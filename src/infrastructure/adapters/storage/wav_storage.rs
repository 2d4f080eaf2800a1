//! WAV Artifact Storage - 文件系统产物存储实现
//!
//! 实现 ArtifactStoragePort trait，产物路径为 `{output_dir}/{job_id}.wav`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ArtifactStorageError, ArtifactStoragePort};
use crate::domain::audio::AudioBuffer;
use crate::domain::job::{ArtifactRef, JobId};
use crate::infrastructure::adapters::codec::encode_wav;

/// 文件系统 WAV 产物存储
pub struct WavArtifactStorage {
    /// 输出目录
    output_dir: PathBuf,
}

impl WavArtifactStorage {
    /// 创建存储，确保输出目录存在
    pub async fn new(output_dir: impl AsRef<Path>) -> Result<Self, ArtifactStorageError> {
        let output_dir = output_dir.as_ref().to_path_buf();

        fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| ArtifactStorageError::Io(e.to_string()))?;

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, job_id: JobId) -> PathBuf {
        self.output_dir.join(format!("{}.wav", job_id))
    }
}

#[async_trait]
impl ArtifactStoragePort for WavArtifactStorage {
    async fn write_artifact(
        &self,
        job_id: JobId,
        audio: &AudioBuffer,
    ) -> Result<ArtifactRef, ArtifactStorageError> {
        let data = encode_wav(audio).map_err(|e| ArtifactStorageError::Encode(e.to_string()))?;

        let path = self.artifact_path(job_id);
        let tmp_path = path.with_extension("wav.tmp");

        // 先写临时文件再重命名，读取方不会看到半个文件
        let written = match fs::write(&tmp_path, &data).await {
            Ok(()) => fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(re) = fs::remove_file(&tmp_path).await {
                if re.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %tmp_path.display(),
                        error = %re,
                        "Failed to remove temporary artifact"
                    );
                }
            }
            return Err(ArtifactStorageError::Io(e.to_string()));
        }

        tracing::debug!(
            job_id = %job_id,
            path = %path.display(),
            size = data.len(),
            "Artifact written"
        );

        Ok(ArtifactRef {
            path,
            sample_rate: audio.sample_rate(),
            sample_count: audio.len(),
            duration_secs: audio.duration_secs(),
            size_bytes: data.len() as u64,
        })
    }

    async fn read_artifact(&self, job_id: JobId) -> Result<Vec<u8>, ArtifactStorageError> {
        let path = self.artifact_path(job_id);

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                ArtifactStorageError::NotFound(path.to_string_lossy().to_string()),
            ),
            Err(e) => Err(ArtifactStorageError::Io(e.to_string())),
        }
    }

    async fn delete_artifact(&self, job_id: JobId) -> Result<(), ArtifactStorageError> {
        let path = self.artifact_path(job_id);

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(job_id = %job_id, "Artifact deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ArtifactStorageError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = WavArtifactStorage::new(temp_dir.path()).await.unwrap();
        let job_id = JobId::new();
        let audio = AudioBuffer::new(vec![0.1; 16000], 16000);

        let artifact = storage.write_artifact(job_id, &audio).await.unwrap();
        assert_eq!(artifact.path, temp_dir.path().join(format!("{job_id}.wav")));
        assert_eq!(artifact.sample_count, 16000);
        assert_eq!(artifact.size_bytes, 44 + 32000);
        assert!((artifact.duration_secs - 1.0).abs() < 1e-9);
        assert!(!artifact.path.with_extension("wav.tmp").exists());

        let data = storage.read_artifact(job_id).await.unwrap();
        assert_eq!(data.len() as u64, artifact.size_bytes);

        storage.delete_artifact(job_id).await.unwrap();
        assert!(matches!(
            storage.read_artifact(job_id).await,
            Err(ArtifactStorageError::NotFound(_))
        ));
        // 重复删除不报错
        storage.delete_artifact(job_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_creates_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let storage = WavArtifactStorage::new(&nested).await.unwrap();
        assert!(storage.output_dir().is_dir());
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_tmp_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = WavArtifactStorage::new(temp_dir.path()).await.unwrap();
        let job_id = JobId::new();
        let path = storage.artifact_path(job_id);

        // 目标位置被非空目录占用，重命名失败
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let audio = AudioBuffer::new(vec![0.1; 160], 16000);
        let result = storage.write_artifact(job_id, &audio).await;
        assert!(matches!(result, Err(ArtifactStorageError::Io(_))));
        assert!(!path.with_extension("wav.tmp").exists());
    }
}
