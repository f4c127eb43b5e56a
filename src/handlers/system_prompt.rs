use axum::{Json, extract::State};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::SystemPromptResponse;
use crate::prompt::assemble;
use crate::state::AppState;

pub async fn system_prompt_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemPromptResponse>, AppError> {
    let system_prompt = assemble(&state.config.system_prompt, &state.documents)
        .await
        .map_err(|e| AppError::document(e, "Failed to read system prompt"))?;

    Ok(Json(SystemPromptResponse { system_prompt }))
}
