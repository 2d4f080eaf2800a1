//! Job Command Handlers

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::commands::{SubmitJob, SubmitJobResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::JobRegistryPort;
use crate::domain::job::{
    FailureKind, Job, JobFailure, JobId, JobRequest, JobStatus, VoiceOverrides,
};
use crate::domain::voice::{validate_pitch, validate_speed};
use crate::domain::{normalize_text, parse_document_as, DEFAULT_CHUNK_SIZE};

/// 提交参数的默认值与上限
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub default_chunk_size: usize,
    pub default_crossfade_secs: f64,
    /// 归一化后文本的最大字符数
    pub max_text_chars: usize,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            default_crossfade_secs: 0.5,
            max_text_chars: 100_000,
        }
    }
}

/// SubmitJob Handler - 登记任务并投递到队列
///
/// 不阻塞调用方：队列已满时任务直接失败
pub struct SubmitJobHandler {
    job_registry: Arc<dyn JobRegistryPort>,
    queue_sender: mpsc::Sender<JobId>,
    settings: SubmitSettings,
}

impl SubmitJobHandler {
    pub fn new(
        job_registry: Arc<dyn JobRegistryPort>,
        queue_sender: mpsc::Sender<JobId>,
        settings: SubmitSettings,
    ) -> Self {
        Self {
            job_registry,
            queue_sender,
            settings,
        }
    }

    pub fn handle(&self, cmd: SubmitJob) -> Result<SubmitJobResponse, ApplicationError> {
        let chunk_size = cmd.chunk_size.unwrap_or(self.settings.default_chunk_size);
        if chunk_size == 0 {
            return Err(ApplicationError::validation("chunk_size must be positive"));
        }

        let crossfade_secs = cmd
            .crossfade_secs
            .unwrap_or(self.settings.default_crossfade_secs);
        if !crossfade_secs.is_finite() || crossfade_secs < 0.0 {
            return Err(ApplicationError::validation(format!(
                "crossfade_secs must be a non-negative number, got {crossfade_secs}"
            )));
        }

        let document = parse_document_as(&cmd.text, cmd.format);
        let overrides = VoiceOverrides {
            voice_id: cmd.voice_id,
            speed: cmd.speed,
            pitch: cmd.pitch,
        }
        .or(&document.overrides);
        check_overrides(&overrides)?;
        for section in &document.sections {
            check_overrides(&section.overrides)?;
        }
        let normalized_chars = normalize_text(&document.text).chars().count();

        let job = Job::new(JobRequest {
            text: document.text,
            voice_id: overrides.voice_id,
            speed: overrides.speed,
            pitch: overrides.pitch,
            sections: document.sections,
            chunk_size,
            crossfade_secs,
        });
        let job_id = job.id();
        self.job_registry.insert(job)?;

        if normalized_chars == 0 {
            return self.reject(job_id, FailureKind::Input, "text is empty");
        }
        if normalized_chars > self.settings.max_text_chars {
            return self.reject(
                job_id,
                FailureKind::Input,
                format!(
                    "text has {} characters, limit is {}",
                    normalized_chars, self.settings.max_text_chars
                ),
            );
        }

        match self.queue_sender.try_send(job_id) {
            Ok(()) => {
                tracing::info!(
                    job_id = %job_id,
                    chars = normalized_chars,
                    chunk_size,
                    crossfade_secs,
                    "Job submitted"
                );
                Ok(SubmitJobResponse {
                    job_id,
                    status: JobStatus::Pending,
                })
            }
            Err(TrySendError::Full(_)) => {
                self.reject(job_id, FailureKind::Internal, "job queue is full")
            }
            Err(TrySendError::Closed(_)) => {
                self.reject(job_id, FailureKind::Internal, "job worker is not running")
            }
        }
    }

    fn reject(
        &self,
        job_id: JobId,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Result<SubmitJobResponse, ApplicationError> {
        let failure = JobFailure::new(kind, message);
        tracing::warn!(job_id = %job_id, error = %failure, "Job rejected");
        self.job_registry.fail(job_id, failure)?;
        Ok(SubmitJobResponse {
            job_id,
            status: JobStatus::Failed,
        })
    }
}

/// 语速与音调须在音色允许的范围内
fn check_overrides(overrides: &VoiceOverrides) -> Result<(), ApplicationError> {
    if let Some(speed) = overrides.speed {
        validate_speed(speed)?;
    }
    if let Some(pitch) = overrides.pitch {
        validate_pitch(pitch)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentFormat;
    use crate::infrastructure::memory::InMemoryJobRegistry;

    fn setup(capacity: usize) -> (SubmitJobHandler, Arc<InMemoryJobRegistry>, mpsc::Receiver<JobId>) {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let (tx, rx) = mpsc::channel(capacity);
        let handler = SubmitJobHandler::new(registry.clone(), tx, SubmitSettings::default());
        (handler, registry, rx)
    }

    fn submit(text: &str) -> SubmitJob {
        SubmitJob {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_enqueues_pending_job() {
        let (handler, registry, mut rx) = setup(4);
        let resp = handler.handle(submit("Hello world.")).unwrap();

        assert_eq!(resp.status, JobStatus::Pending);
        assert_eq!(rx.recv().await, Some(resp.job_id));
        let job = registry.get(resp.job_id).unwrap();
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.request().chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[tokio::test]
    async fn test_empty_text_fails_without_enqueue() {
        let (handler, registry, mut rx) = setup(4);
        let resp = handler.handle(submit("   \n\t ")).unwrap();

        assert_eq!(resp.status, JobStatus::Failed);
        let job = registry.get(resp.job_id).unwrap();
        assert_eq!(job.failure().unwrap().kind, FailureKind::Input);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_parameters_create_no_job() {
        let (handler, registry, _rx) = setup(4);

        let err = handler
            .handle(SubmitJob {
                chunk_size: Some(0),
                ..submit("Hello.")
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        let err = handler
            .handle(SubmitJob {
                crossfade_secs: Some(-1.0),
                ..submit("Hello.")
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        assert!(registry.list().is_empty());
    }

    #[tokio::test]
    async fn test_full_queue_fails_job() {
        let (handler, registry, _rx) = setup(1);
        let first = handler.handle(submit("One.")).unwrap();
        let second = handler.handle(submit("Two.")).unwrap();

        assert_eq!(first.status, JobStatus::Pending);
        assert_eq!(second.status, JobStatus::Failed);
        let job = registry.get(second.job_id).unwrap();
        assert_eq!(job.failure().unwrap().kind, FailureKind::Internal);
    }

    #[tokio::test]
    async fn test_text_limit() {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let (tx, _rx) = mpsc::channel(4);
        let handler = SubmitJobHandler::new(
            registry.clone(),
            tx,
            SubmitSettings {
                max_text_chars: 5,
                ..Default::default()
            },
        );

        let resp = handler.handle(submit("This is too long.")).unwrap();
        assert_eq!(resp.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_document_voice_is_used_when_request_has_none() {
        let (handler, registry, _rx) = setup(4);
        let resp = handler
            .handle(submit(r#"{"text": "Hi.", "voice_id": "storyteller"}"#))
            .unwrap();

        let job = registry.get(resp.job_id).unwrap();
        assert_eq!(job.request().voice_id.as_deref(), Some("storyteller"));
        assert_eq!(job.request().text, "Hi.");
    }

    #[tokio::test]
    async fn test_request_overrides_win_over_document() {
        let (handler, registry, _rx) = setup(4);
        let resp = handler
            .handle(SubmitJob {
                speed: Some(1.3),
                ..submit(r#"{"text": "Hi.", "speed": 0.8, "pitch": 1.2}"#)
            })
            .unwrap();

        let request = registry.get(resp.job_id).unwrap().request().clone();
        assert_eq!(request.speed, Some(1.3));
        assert_eq!(request.pitch, Some(1.2));
    }

    #[tokio::test]
    async fn test_out_of_range_overrides_create_no_job() {
        let (handler, registry, _rx) = setup(4);

        let err = handler
            .handle(SubmitJob {
                speed: Some(3.5),
                ..submit("Hello.")
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        let err = handler
            .handle(submit(
                r#"{"segments": [{"text": "One."}, {"text": "Two.", "pitch": 0.1}]}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        assert!(registry.list().is_empty());
    }

    #[tokio::test]
    async fn test_segment_sections_are_stored() {
        let (handler, registry, _rx) = setup(4);
        let resp = handler
            .handle(submit(
                r#"{"segments": [{"text": "One.", "voice_id": "storyteller"}, "Two."]}"#,
            ))
            .unwrap();

        let request = registry.get(resp.job_id).unwrap().request().clone();
        assert_eq!(request.text, "One. Two.");
        assert_eq!(request.sections.len(), 2);
        assert_eq!(
            request.sections[0].overrides.voice_id.as_deref(),
            Some("storyteller")
        );
    }

    #[tokio::test]
    async fn test_plain_text_format_keeps_brackets() {
        let (handler, registry, _rx) = setup(4);
        let resp = handler
            .handle(SubmitJob {
                format: DocumentFormat::PlainText,
                ..submit(r#"{"text": "Hi."}"#)
            })
            .unwrap();

        let job = registry.get(resp.job_id).unwrap();
        assert_eq!(job.request().text, r#"{"text": "Hi."}"#);
    }
}
