//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::{
    // Command handlers
    RegisterVoiceHandler, RemoveVoiceHandler, SetDefaultVoiceHandler, SubmitJobHandler,
    SubmitSettings,
    // Query handlers
    EstimateDocumentHandler, GetJobAudioHandler, GetJobResultHandler, GetJobStatusHandler,
    GetVoiceHandler, ListJobsHandler, ListVoicesHandler,
    // Ports
    ArtifactStoragePort, JobRegistryPort, VoiceRegistryPort,
};
use crate::domain::job::JobId;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub job_registry: Arc<dyn JobRegistryPort>,
    pub voice_registry: Arc<dyn VoiceRegistryPort>,
    pub artifact_storage: Arc<dyn ArtifactStoragePort>,

    // ========== Command Handlers ==========
    pub submit_job_handler: SubmitJobHandler,
    pub set_default_voice_handler: SetDefaultVoiceHandler,
    pub register_voice_handler: RegisterVoiceHandler,
    pub remove_voice_handler: RemoveVoiceHandler,

    // ========== Query Handlers ==========
    pub get_job_status_handler: GetJobStatusHandler,
    pub get_job_result_handler: GetJobResultHandler,
    pub get_job_audio_handler: GetJobAudioHandler,
    pub list_jobs_handler: ListJobsHandler,
    pub estimate_document_handler: EstimateDocumentHandler,
    pub get_voice_handler: GetVoiceHandler,
    pub list_voices_handler: ListVoicesHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// `queue_sender` 为 JobWorker 的任务队列
    pub fn new(
        job_registry: Arc<dyn JobRegistryPort>,
        voice_registry: Arc<dyn VoiceRegistryPort>,
        artifact_storage: Arc<dyn ArtifactStoragePort>,
        queue_sender: mpsc::Sender<JobId>,
        settings: SubmitSettings,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            // Command handlers
            submit_job_handler: SubmitJobHandler::new(
                job_registry.clone(),
                queue_sender,
                settings.clone(),
            ),
            set_default_voice_handler: SetDefaultVoiceHandler::new(voice_registry.clone()),
            register_voice_handler: RegisterVoiceHandler::new(voice_registry.clone()),
            remove_voice_handler: RemoveVoiceHandler::new(voice_registry.clone()),

            // Query handlers
            get_job_status_handler: GetJobStatusHandler::new(job_registry.clone()),
            get_job_result_handler: GetJobResultHandler::new(job_registry.clone()),
            get_job_audio_handler: GetJobAudioHandler::new(
                job_registry.clone(),
                artifact_storage.clone(),
            ),
            list_jobs_handler: ListJobsHandler::new(job_registry.clone()),
            estimate_document_handler: EstimateDocumentHandler::new(
                settings.default_chunk_size,
                max_chunk_size,
            ),
            get_voice_handler: GetVoiceHandler::new(voice_registry.clone()),
            list_voices_handler: ListVoicesHandler::new(voice_registry.clone()),

            // Ports
            job_registry,
            voice_registry,
            artifact_storage,
        }
    }
}
