use clap::Parser;
use resume_chat_gateway::{config::Config, serve};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    // .env is optional, real environment variables win
    let _ = dotenvy::dotenv();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    if let Err(e) = serve(config).await {
        error!("Gateway failed: {e}");
        std::process::exit(1);
    }
}
