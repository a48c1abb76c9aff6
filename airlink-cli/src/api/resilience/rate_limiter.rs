//! Token bucket rate limiter
//!
//! Tokens refill continuously at `requests_per_second`; at most
//! `burst_capacity` tokens accumulate while idle.

use super::config::RateLimitConfig;
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, config: &RateLimitConfig) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let refilled = elapsed * config.requests_per_second as f64;
        self.tokens = (self.tokens + refilled).min(config.burst_capacity as f64);
        self.last_refill = now;
    }

    /// Time until one full token is available
    fn wait_time(&self, config: &RateLimitConfig) -> Duration {
        let missing = (1.0 - self.tokens).max(0.0);
        Duration::from_secs_f64(missing / config.requests_per_second.max(1) as f64)
    }
}

/// Shared limiter; clones share the same bucket
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    config: RateLimitConfig,
    requests_allowed: Arc<AtomicU64>,
    requests_delayed: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: config.burst_capacity as f64,
                last_refill: Instant::now(),
            })),
            config,
            requests_allowed: Arc::new(AtomicU64::new(0)),
            requests_delayed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wait until a request may be sent
    pub async fn acquire(&self) {
        if !self.config.enabled {
            self.requests_allowed.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut delayed = false;
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                bucket.refill(&self.config);
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    None
                } else {
                    Some(bucket.wait_time(&self.config))
                }
            };

            match wait {
                None => break,
                Some(wait) => {
                    if !delayed {
                        delayed = true;
                        self.requests_delayed.fetch_add(1, Ordering::Relaxed);
                    }
                    debug!("Rate limiter: waiting {:?} for a token", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }

        self.requests_allowed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a token if one is available right now
    pub async fn try_acquire(&self) -> bool {
        if !self.config.enabled {
            self.requests_allowed.fetch_add(1, Ordering::Relaxed);
            return true;
        }

        let mut bucket = self.bucket.lock().await;
        bucket.refill(&self.config);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            self.requests_allowed.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            requests_allowed: self.requests_allowed.load(Ordering::Relaxed),
            requests_delayed: self.requests_delayed.load(Ordering::Relaxed),
            requests_per_second: self.config.requests_per_second,
            enabled: self.config.enabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub requests_allowed: u64,
    pub requests_delayed: u64,
    pub requests_per_second: u32,
    pub enabled: bool,
}
