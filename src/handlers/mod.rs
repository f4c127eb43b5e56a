mod chat;
mod health;
mod metrics;
mod resume;
mod system_prompt;

pub use chat::chat_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use resume::resume_handler;
pub use system_prompt::system_prompt_handler;
