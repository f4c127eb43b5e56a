use axum::{Json, extract::State};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::ResumeResponse;
use crate::state::AppState;

pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ResumeResponse>, AppError> {
    let content = state
        .documents
        .read_document()
        .await
        .map_err(|e| AppError::document(e, "Failed to read resume file"))?;

    Ok(Json(ResumeResponse { content }))
}
