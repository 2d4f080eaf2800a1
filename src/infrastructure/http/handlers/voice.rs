//! Voice HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetVoice, ListVoices, RegisterVoice, RemoveVoice, SetDefaultVoice};
use crate::domain::voice::BackendRef;
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, RegisterVoiceRequest, VoiceDto, VoiceIdRequest, VoiceListDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 获取音色列表，默认音色排在首位
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<VoiceListDto>>, ApiError> {
    let voices = state.list_voices_handler.handle(ListVoices);
    Ok(Json(ApiResponse::success(VoiceListDto {
        voices: voices.into_iter().map(VoiceDto::from).collect(),
    })))
}

pub async fn get_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<VoiceDto>>, ApiError> {
    let voice = state.get_voice_handler.handle(GetVoice {
        voice_id: req.voice_id,
    })?;
    Ok(Json(ApiResponse::success(voice.into())))
}

/// 切换默认音色
pub async fn set_default_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.set_default_voice_handler.handle(SetDefaultVoice {
        voice_id: req.voice_id,
    })?;
    Ok(Json(ApiResponse::ok()))
}

/// 注册自定义音色
pub async fn register_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterVoiceRequest>,
) -> Result<Json<ApiResponse<VoiceDto>>, ApiError> {
    let mut backend = BackendRef::new(req.model);
    if let Some(vocoder) = req.vocoder {
        backend = backend.with_vocoder(vocoder);
    }
    if let Some(speed) = req.speed {
        backend = backend.with_speed(speed);
    }
    if let Some(pitch) = req.pitch {
        backend.pitch = pitch;
    }

    let voice = state.register_voice_handler.handle(RegisterVoice {
        voice_id: req.voice_id,
        name: req.name,
        backend,
        language: req.language,
        gender: req.gender,
        description: req.description,
    })?;
    Ok(Json(ApiResponse::success(voice.into())))
}

/// 删除自定义音色（内置音色与当前默认音色不可删除）
pub async fn remove_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceIdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.remove_voice_handler.handle(RemoveVoice {
        voice_id: req.voice_id,
    })?;
    Ok(Json(ApiResponse::ok()))
}
