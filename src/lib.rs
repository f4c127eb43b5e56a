//! Backend for a single page "chat with my resume" site.
//!
//! Three endpoints sit in front of an OpenAI compatible model API:
//! - `GET /api/system-prompt` returns the base instruction with the resume
//!   document embedded, for the front end to prepend to its conversation.
//! - `POST /api/chat` forwards the caller supplied history upstream, behind a
//!   per-client fixed window rate limiter (10 requests / 60s by default).
//! - `GET /api/resume` returns the raw document.
//!
//! Nothing is persisted; the front end sends the full history on each call.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod rate_limit;
pub mod state;
pub mod upstream;

use config::Config;
use handlers::{chat_handler, health_handler, metrics_handler, resume_handler, system_prompt_handler};
use rate_limit::{rate_limit_middleware, spawn_sweeper};
use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // only the chat endpoint is rate limited
    let chat = post(chat_handler).route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_middleware,
    ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/system-prompt", get(system_prompt_handler))
        .route("/api/chat", chat)
        .route("/api/resume", get(resume_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: Config) -> Result<(), BoxError> {
    info!("Starting with {:?}", config);

    let state = Arc::new(AppState::new(config)?);
    let config = &state.config;

    spawn_sweeper(state.rate_limiter.clone(), config.sweep_interval());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Gateway running on http://localhost:{}", config.port);
    info!("Forwarding to {} (model {})", config.upstream_url, config.model);
    info!("Serving document {}", config.document.display());
    info!(
        "Rate limit: {} requests per {} seconds",
        config.rate_limit, config.rate_window
    );

    let app = app(state.clone());
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
