use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::document::DocumentError;
use crate::upstream::UpstreamError;

pub const NOT_FOUND_MESSAGE: &str = "Resume file not found";
pub const CHAT_FAILED_MESSAGE: &str = "Failed to process chat request";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded. Try again in {retry_after} seconds.")]
    RateLimited { retry_after: u64 },

    #[error("Resume file not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    // Map a document failure onto the boundary taxonomy, tagging I/O
    // failures with the endpoint specific message shown to the client
    pub fn document(err: DocumentError, context: &'static str) -> Self {
        match err {
            DocumentError::NotFound(_) => AppError::NotFound,
            DocumentError::Io { source, .. } => AppError::Io { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::InvalidRequest(_) => (status, Json(json!({ "error": self.to_string() }))).into_response(),
            AppError::RateLimited { retry_after } => {
                let body = json!({
                    "error": "Too many requests",
                    "message": self.to_string(),
                    "retryAfter": retry_after,
                });
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            AppError::NotFound => (status, Json(json!({ "error": NOT_FOUND_MESSAGE }))).into_response(),
            AppError::Upstream(err) => {
                error!("Upstream chat completion failed: {err}");
                let body = json!({
                    "error": CHAT_FAILED_MESSAGE,
                    "message": err.to_string(),
                });
                (status, Json(body)).into_response()
            }
            AppError::Io { context, source } => {
                error!("{context}: {source}");
                (status, Json(json!({ "error": context }))).into_response()
            }
        }
    }
}
