//! Axum route handlers for the Proposals API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::{AppError, AppJson};
use crate::proposals::extract::extract_text;
use crate::proposals::models::{DraftAnalysis, ProposalPayload, ProposalResponse};
use crate::state::AppState;
use crate::upload::read_upload;

/// POST /api/proposals/analyze
///
/// Extracts text from the uploaded draft and returns one finding per section.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<DraftAnalysis>>, AppError> {
    let upload = read_upload(multipart?, "file")
        .await?
        .filter(|u| !u.content.is_empty())
        .ok_or_else(|| AppError::Validation("Uploaded file is empty.".to_string()))?;

    let file_name = upload.file_name.as_deref().unwrap_or("uploaded draft");
    info!(
        "Analyzing {} ({:.1} KB) with {} backend",
        file_name,
        upload.content.len() as f64 / 1024.0,
        state.analyzer.backend()
    );

    let text = extract_text(upload.content).await?;
    let sections = state.analyzer.analyze(&text).await?;

    Ok(Json(sections))
}

/// POST /api/proposals
///
/// Accepts a structured proposal and returns its derived identifier. Nothing is stored.
pub async fn handle_create_proposal(
    AppJson(payload): AppJson<ProposalPayload>,
) -> (StatusCode, Json<ProposalResponse>) {
    let proposal_id = payload.proposal_id();
    info!(
        "Accepted proposal {} from {} (submission date {}, {} narrative fields, {} objectives, {} milestones)",
        proposal_id,
        payload.organization_name,
        payload.submission_date.as_deref().unwrap_or("unspecified"),
        payload.narrative_field_count(),
        payload.objectives.len(),
        payload.milestones.len()
    );

    (
        StatusCode::CREATED,
        Json(ProposalResponse {
            message: "Proposal accepted for processing.".to_string(),
            proposal_id,
        }),
    )
}
