//! Job Handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{
    EstimateDocument, GetJobAudio, GetJobResult, GetJobStatus, ListJobs, SubmitJob,
};
use crate::domain::job::JobId;
use crate::domain::{decode_document_bytes, DocumentFormat};
use crate::infrastructure::http::dto::{
    ApiResponse, EstimateDto, EstimateRequest, JobIdRequest, JobListDto, JobResultDto,
    JobStatusDto, JobSummaryDto, SubmitJobRequest, SubmitJobResponseDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::parse(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid job id: {}", raw)))
}

/// 提交合成任务
///
/// 空文本同样返回 job_id，任务状态直接为 failed
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<SubmitJobRequest>,
) -> Result<Json<ApiResponse<SubmitJobResponseDto>>, ApiError> {
    let text = req
        .raw_input()
        .ok_or_else(|| ApiError::BadRequest("Either text or document is required".to_string()))?;
    let cmd = SubmitJob {
        text,
        format: DocumentFormat::Auto,
        voice_id: req.voice_id,
        speed: req.speed,
        pitch: req.pitch,
        chunk_size: req.chunk_size,
        crossfade_secs: req.crossfade_secs,
    };

    let result = state.submit_job_handler.handle(cmd)?;

    Ok(Json(ApiResponse::success(SubmitJobResponseDto {
        job_id: result.job_id.to_string(),
        status: result.status.as_str().to_string(),
    })))
}

/// 上传文档并提交合成任务
///
/// 表单字段: file (.txt/.md/.text/.json), voice_id, speed, pitch, chunk_size, crossfade_secs
pub async fn submit_job_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<SubmitJobResponseDto>>, ApiError> {
    let upload = read_document_upload(multipart).await?;
    let cmd = SubmitJob {
        text: upload.text,
        format: upload.format,
        voice_id: upload.voice_id,
        speed: upload.speed,
        pitch: upload.pitch,
        chunk_size: upload.chunk_size,
        crossfade_secs: upload.crossfade_secs,
    };

    let result = state.submit_job_handler.handle(cmd)?;

    tracing::info!(
        job_id = %result.job_id,
        file_name = %upload.file_name,
        "Document uploaded"
    );

    Ok(Json(ApiResponse::success(SubmitJobResponseDto {
        job_id: result.job_id.to_string(),
        status: result.status.as_str().to_string(),
    })))
}

/// 上传文档并分析，不创建任务
pub async fn estimate_job_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<EstimateDto>>, ApiError> {
    let upload = read_document_upload(multipart).await?;
    let analysis = state.estimate_document_handler.handle(EstimateDocument {
        text: upload.text,
        format: upload.format,
        chunk_size: upload.chunk_size,
    })?;
    Ok(Json(ApiResponse::success(analysis)))
}

/// 查询任务状态
pub async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobIdRequest>,
) -> Result<Json<ApiResponse<JobStatusDto>>, ApiError> {
    let job_id = parse_job_id(&req.job_id)?;
    let result = state.get_job_status_handler.handle(GetJobStatus { job_id })?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// 查询任务结果（仅已完成任务）
pub async fn get_job_result(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobIdRequest>,
) -> Result<Json<ApiResponse<JobResultDto>>, ApiError> {
    let job_id = parse_job_id(&req.job_id)?;
    let result = state.get_job_result_handler.handle(GetJobResult { job_id })?;
    Ok(Json(ApiResponse::success(result.into())))
}

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<JobListDto>>, ApiError> {
    let jobs = state.list_jobs_handler.handle(ListJobs);
    Ok(Json(ApiResponse::success(JobListDto {
        jobs: jobs.into_iter().map(JobSummaryDto::from).collect(),
    })))
}

/// 文档分析，不创建任务
pub async fn estimate_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<ApiResponse<EstimateDto>>, ApiError> {
    let analysis = state.estimate_document_handler.handle(EstimateDocument {
        text: req.text,
        format: DocumentFormat::Auto,
        chunk_size: req.chunk_size,
    })?;
    Ok(Json(ApiResponse::success(analysis)))
}

/// 下载拼接后的 WAV
pub async fn get_job_audio(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let result = state.get_job_audio_handler.handle(GetJobAudio { job_id }).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_LENGTH, result.audio_data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.wav\"", job_id),
        )
        .body(Body::from(result.audio_data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 上传的文档及表单参数
struct DocumentUpload {
    text: String,
    format: DocumentFormat,
    file_name: String,
    voice_id: Option<String>,
    speed: Option<f32>,
    pitch: Option<f32>,
    chunk_size: Option<usize>,
    crossfade_secs: Option<f64>,
}

async fn read_document_upload(mut multipart: Multipart) -> Result<DocumentUpload, ApiError> {
    let mut document: Option<(String, DocumentFormat, String)> = None;
    let mut voice_id: Option<String> = None;
    let mut speed: Option<f32> = None;
    let mut pitch: Option<f32> = None;
    let mut chunk_size: Option<usize> = None;
    let mut crossfade_secs: Option<f64> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name == "file" {
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?;

            // 验证文件类型
            let format = DocumentFormat::from_file_name(&file_name).ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Unsupported file type. Supported: {}",
                    DocumentFormat::SUPPORTED_EXTENSIONS.join(", ")
                ))
            })?;

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            document = Some((decode_document_bytes(&bytes), format, file_name));
            continue;
        }

        let value = field.text().await.map_err(|e| {
            ApiError::BadRequest(format!("Failed to read {}: {}", field_name, e))
        })?;
        match field_name.as_str() {
            "voice_id" => {
                let value = value.trim();
                voice_id = (!value.is_empty()).then(|| value.to_string());
            }
            "speed" => speed = parse_form_value("speed", &value)?,
            "pitch" => pitch = parse_form_value("pitch", &value)?,
            "chunk_size" => chunk_size = parse_form_value("chunk_size", &value)?,
            "crossfade_secs" => crossfade_secs = parse_form_value("crossfade_secs", &value)?,
            _ => {}
        }
    }

    let (text, format, file_name) =
        document.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;

    Ok(DocumentUpload {
        text,
        format,
        file_name,
        voice_id,
        speed,
        pitch,
        chunk_size,
        crossfade_secs,
    })
}

/// 解析表单数值，空字符串视为未填写
fn parse_form_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<Option<T>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", name, value)))
}
