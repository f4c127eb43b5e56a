use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;
use crate::metrics::CHAT_REQUESTS_TOTAL;
use crate::models::ChatReply;
use crate::state::AppState;

// Runs behind the rate limit middleware
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    CHAT_REQUESTS_TOTAL.inc();

    let Json(payload) = payload.map_err(|rejection| {
        debug!("Rejected chat body: {rejection}");
        AppError::InvalidRequest("messages array required".to_string())
    })?;

    state.proxy.handle_chat(&payload).await.map(Json)
}
