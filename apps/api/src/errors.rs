use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assist::speech::SpeechError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Each variant is one failure class. Callers match on the variant to decide
/// whether to propagate or degrade (fallback analysis, no audio).
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing credential or capability. Always surfaced, never degraded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A remote service answered with a failure or could not be reached.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A remote service answered successfully but the body had the wrong shape.
    #[error("Malformed upstream response: {0}")]
    MalformedUpstream(String),

    /// Bad client input: empty upload, undecodable content.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            e @ (LlmError::Parse(_) | LlmError::EmptyChoices) => {
                AppError::MalformedUpstream(format!("Unexpected response from completion service: {e}"))
            }
            LlmError::Worker(msg) => AppError::Internal(anyhow::anyhow!("completion worker failed: {msg}")),
            other => AppError::Upstream(format!("Completion request failed: {other}")),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(format!("Invalid multipart body: {}", rejection.body_text()))
    }
}

/// `Json` extractor whose rejections are reported as `AppError`, so malformed
/// bodies get the same error envelope as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<SpeechError> for AppError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::NotConfigured(key) => AppError::Configuration(format!("{key} not configured.")),
            SpeechError::Upstream(message) => AppError::Upstream(message),
            SpeechError::Malformed(message) => AppError::MalformedUpstream(message),
            SpeechError::Http(e) => AppError::Upstream(format!("Speech service request failed: {e}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::MalformedUpstream(msg) => {
                tracing::warn!("Malformed upstream response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_UPSTREAM_RESPONSE",
                    msg.clone(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": message,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
