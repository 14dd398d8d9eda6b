//! Axum route handlers for the Assist API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::assist::chat::run_chat;
use crate::assist::models::{
    ChatRequest, ChatResponse, SynthesisRequest, SynthesisResponse, TranscriptionResponse,
};
use crate::assist::speech::AudioUpload;
use crate::errors::{AppError, AppJson};
use crate::state::AppState;
use crate::upload::read_upload;

/// POST /api/assist/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let pool = state.completions()?;
    let response = run_chat(pool, &state.speech, request).await?;
    Ok(Json(response))
}

/// POST /api/assist/tts
pub async fn handle_text_to_speech(
    State(state): State<AppState>,
    AppJson(request): AppJson<SynthesisRequest>,
) -> Result<Json<SynthesisResponse>, AppError> {
    let audio_base64 = state
        .speech
        .synthesize(&request.text, request.voice_id.as_deref())
        .await?;
    Ok(Json(SynthesisResponse { audio_base64 }))
}

/// POST /api/assist/stt
pub async fn handle_speech_to_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResponse>, AppError> {
    let upload = read_upload(multipart?, "file")
        .await?
        .filter(|u| !u.content.is_empty())
        .ok_or_else(|| AppError::Validation("Uploaded audio is empty.".to_string()))?;

    let text = state
        .speech
        .transcribe(AudioUpload {
            file_name: upload.file_name,
            content_type: upload.content_type,
            content: upload.content.to_vec(),
        })
        .await?;

    Ok(Json(TranscriptionResponse { text }))
}
