use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref CHAT_REQUESTS_TOTAL: Counter =
        register_counter!("chat_requests_total", "Total number of admitted chat requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("chat_rate_limited_total", "Chat requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_ERRORS_TOTAL: Counter =
        register_counter!("chat_upstream_errors_total", "Failed upstream chat completions").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "chat_upstream_latency_seconds",
        "Upstream chat completion latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("rate_limit_entries", "Current number of tracked rate limit clients").unwrap();
}
