use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// CLI / environment configuration, built once and handed to AppState
#[derive(Parser, Clone)]
#[command(name = "resume-chat-gateway")]
#[command(about = "Rate limited chat proxy that grounds answers in a resume document")]
pub struct Config {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    // Upstream API key (sent as a bearer token, never logged)
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: String,

    // OpenAI compatible base URL of the upstream model API
    #[arg(long, env = "UPSTREAM_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    pub upstream_url: String,

    #[arg(long, env = "UPSTREAM_MODEL", default_value = "openai/gpt-oss-120b")]
    pub model: String,

    #[arg(long, env = "UPSTREAM_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    #[arg(long, env = "UPSTREAM_MAX_TOKENS", default_value_t = 1024)]
    pub max_tokens: u32,

    // Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 60)]
    pub upstream_timeout: u64,

    // Base instruction placed ahead of the document in the system prompt
    #[arg(long, env = "SYSTEM_PROMPT", default_value = "You are a helpful assistant.")]
    pub system_prompt: String,

    // Document injected into the system prompt and served by /api/resume
    #[arg(short, long, env = "RESUME_PATH", default_value = "resume.md")]
    pub document: PathBuf,

    // Reuse the document content while its mtime is unchanged
    #[arg(long, env = "CACHE_DOCUMENT", default_value_t = false)]
    pub cache_document: bool,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW_SECS", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub rate_window: u64,

    // Interval between sweeps of expired rate limit entries, in seconds
    #[arg(long, env = "RATE_SWEEP_SECS", default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub sweep_interval: u64,
}

impl Config {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("document", &self.document)
            .field("cache_document", &self.cache_document)
            .field("rate_limit", &self.rate_limit)
            .field("rate_window", &self.rate_window)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}
