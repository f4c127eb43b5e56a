use std::sync::Arc;

use crate::config::Config;
use crate::document::DocumentStore;
use crate::rate_limit::RateLimiter;
use crate::upstream::ChatProxy;

// app's shared state
pub struct AppState {
    pub config: Config,
    pub documents: DocumentStore,
    pub rate_limiter: Arc<RateLimiter>, // shared with the sweeper task
    pub proxy: ChatProxy,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let client = ChatProxy::client(&config)?;

        let documents = if config.cache_document {
            DocumentStore::new(&config.document).with_cache()
        } else {
            DocumentStore::new(&config.document)
        };

        Ok(Self {
            documents,
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit, config.rate_window())),
            proxy: ChatProxy::new(client, &config),
            config,
        })
    }
}
