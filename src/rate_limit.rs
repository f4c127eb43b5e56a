use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::metrics::{RATE_LIMITED_TOTAL, RATE_LIMIT_ENTRIES};
use crate::state::AppState;

// Shared bucket for callers whose address cannot be determined. Lenient,
// not a security control: all such callers share one window.
pub const UNKNOWN_CLIENT: &str = "unknown";

// Rate limit entry - tracks requests per client within one fixed window
#[derive(Clone, Copy, Debug)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateLimitEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.window_reset_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected { retry_after_secs: u64 },
}

// Fixed window limiter keyed by client address
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    // The whole read-check-update happens under the shard write guard held
    // by `entry`, so two racing requests from one client cannot both see
    // room under the ceiling.
    pub fn admit(&self, client_id: &str, now: Instant) -> Admission {
        let mut entry = self
            .entries
            .entry(client_id.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_reset_at: now + self.window,
            });

        // window expired (or brand new entry)..? start a fresh one
        if entry.count == 0 || entry.is_expired(now) {
            entry.count = 1;
            entry.window_reset_at = now + self.window;
            return Admission::Allowed;
        }

        if entry.count >= self.limit {
            let remaining = entry.window_reset_at.saturating_duration_since(now);
            return Admission::Rejected {
                retry_after_secs: remaining.as_nanos().div_ceil(1_000_000_000) as u64,
            };
        }

        entry.count += 1;
        Admission::Allowed
    }

    // Drop every entry whose window has passed. Memory housekeeping only,
    // admit() already treats expired entries as absent.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        RATE_LIMIT_ENTRIES.set(self.entries.len() as f64);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Client key from the peer address, or the shared sentinel
pub fn client_key(addr: Option<SocketAddr>) -> String {
    addr.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

// Sweep expired entries on a fixed interval
pub async fn sweeper(limiter: Arc<RateLimiter>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);
    info!("Rate limit sweeper started (interval: {:?})", sweep_interval);

    loop {
        interval.tick().await;
        let removed = limiter.sweep(Instant::now());
        debug!(
            "Swept {} expired rate limit entries ({} remaining)",
            removed,
            limiter.len()
        );
    }
}

pub fn spawn_sweeper(limiter: Arc<RateLimiter>, sweep_interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(sweeper(limiter, sweep_interval))
}

// Axum middleware guarding POST /api/chat
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(addr);

    match state.rate_limiter.admit(&client, Instant::now()) {
        Admission::Allowed => {
            RATE_LIMIT_ENTRIES.set(state.rate_limiter.len() as f64);
            Ok(next.run(request).await)
        }
        Admission::Rejected { retry_after_secs } => {
            RATE_LIMITED_TOTAL.inc();
            warn!("Rate limit exceeded for {client}, retry in {retry_after_secs}s");
            Err(AppError::RateLimited {
                retry_after: retry_after_secs,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::thread;

    fn limiter() -> RateLimiter {
        RateLimiter::new(10, Duration::from_secs(60))
    }

    #[test]
    fn eleventh_request_in_window_is_rejected() {
        let limiter = limiter();
        let start = Instant::now();

        for i in 0..10 {
            let now = start + Duration::from_secs(i);
            assert_eq!(limiter.admit("10.0.0.1", now), Admission::Allowed);
        }

        match limiter.admit("10.0.0.1", start + Duration::from_secs(10)) {
            Admission::Rejected { retry_after_secs } => assert_eq!(retry_after_secs, 50),
            Admission::Allowed => panic!("11th request should be rejected"),
        }
    }

    #[test]
    fn retry_after_rounds_up_and_stays_positive() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        limiter.admit("a", start);
        let just_before_reset = start + Duration::from_secs(60) - Duration::from_nanos(1);

        assert_eq!(
            limiter.admit("a", just_before_reset),
            Admission::Rejected { retry_after_secs: 1 }
        );
        assert_eq!(
            limiter.admit("a", start + Duration::from_millis(500)),
            Admission::Rejected { retry_after_secs: 60 }
        );
    }

    #[test]
    fn expired_window_resets_count() {
        let limiter = limiter();
        let start = Instant::now();

        for _ in 0..10 {
            limiter.admit("10.0.0.1", start);
        }
        assert!(matches!(
            limiter.admit("10.0.0.1", start),
            Admission::Rejected { .. }
        ));

        let reset = start + Duration::from_secs(60);
        assert_eq!(limiter.admit("10.0.0.1", reset), Admission::Allowed);
        assert_eq!(limiter.entries.get("10.0.0.1").unwrap().count, 1);

        // the fresh window has the full budget again
        for _ in 0..9 {
            assert_eq!(limiter.admit("10.0.0.1", reset), Admission::Allowed);
        }
        assert!(matches!(
            limiter.admit("10.0.0.1", reset),
            Admission::Rejected { .. }
        ));
    }

    #[test]
    fn clients_have_independent_windows() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..10 {
            limiter.admit("10.0.0.1", now);
        }

        assert_eq!(limiter.admit("10.0.0.2", now), Admission::Allowed);
        assert!(matches!(
            limiter.admit("10.0.0.1", now),
            Admission::Rejected { .. }
        ));
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let limiter = limiter();
        let start = Instant::now();

        limiter.admit("old", start);
        limiter.admit("new", start + Duration::from_secs(30));

        let removed = limiter.sweep(start + Duration::from_secs(61));

        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);
        assert!(limiter.entries.contains_key("new"));

        limiter.sweep(start + Duration::from_secs(91));
        assert!(limiter.is_empty());
    }

    #[test]
    fn concurrent_requests_never_exceed_ceiling() {
        let limiter = Arc::new(limiter());
        let now = Instant::now();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || limiter.admit("10.0.0.1", now))
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| *a == Admission::Allowed)
            .count();

        assert_eq!(allowed, 10);
    }

    #[test]
    fn missing_address_falls_back_to_sentinel() {
        assert_eq!(client_key(None), UNKNOWN_CLIENT);

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7)), 51234);
        assert_eq!(client_key(Some(addr)), "192.168.1.7");
    }
}
