use clipsesh_errors::AppError;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_LIMIT_PER_MINUTE: u32 = 100;
const WINDOW: Duration = Duration::from_secs(60);
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct RequestRecord {
    count: u32,
    window_start: Instant,
}

impl Default for RequestRecord {
    fn default() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// Fixed one-minute window counter per client address.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<String, RequestRecord>>,
    last_cleanup: Arc<std::sync::Mutex<Instant>>,
    max_per_minute: u32,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(std::sync::Mutex::new(Instant::now())),
            max_per_minute,
        }
    }

    pub fn check(&self, client: &str) -> Result<(), AppError> {
        self.maybe_cleanup();

        let now = Instant::now();
        let mut record = self.requests.entry(client.to_string()).or_default();

        if now.duration_since(record.window_start) > WINDOW {
            record.count = 0;
            record.window_start = now;
        }

        if record.count >= self.max_per_minute {
            let wait_secs = WINDOW
                .as_secs()
                .saturating_sub(now.duration_since(record.window_start).as_secs());
            return Err(AppError::TooManyRequests(wait_secs));
        }

        record.count += 1;
        Ok(())
    }

    fn maybe_cleanup(&self) {
        let Ok(mut last_cleanup) = self.last_cleanup.lock() else {
            return;
        };
        if last_cleanup.elapsed() > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            let cutoff = Instant::now() - WINDOW;
            self.requests.retain(|_, v| v.window_start > cutoff);
            *last_cleanup = Instant::now();
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_LIMIT_PER_MINUTE)
    }
}
