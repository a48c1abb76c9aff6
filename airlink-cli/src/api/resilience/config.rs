//! Client-side view of the `[resilience]` settings

use super::retry::RetryConfig;
use crate::config::ResilienceSettings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub rate_limit: RateLimitConfig,
    pub concurrency: ConcurrencyConfig,
}

/// Token bucket
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_capacity: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ConcurrencyConfig {
    pub max_concurrent_requests: usize,
    pub enabled: bool,
}

impl ResilienceConfig {
    /// One attempt, no throttling
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::none(),
            rate_limit: RateLimitConfig {
                requests_per_second: u32::MAX,
                burst_capacity: u32::MAX,
                enabled: false,
            },
            concurrency: ConcurrencyConfig {
                max_concurrent_requests: 1,
                enabled: false,
            },
        }
    }

    pub fn from_settings(settings: &ResilienceSettings) -> Self {
        let max_attempts = if settings.retry_enabled {
            settings.max_attempts.max(1)
        } else {
            1
        };

        Self {
            retry: RetryConfig {
                max_attempts,
                base_delay: Duration::from_millis(settings.base_delay_ms),
                max_delay: Duration::from_millis(settings.max_delay_ms),
                backoff_multiplier: settings.backoff_multiplier,
                jitter: settings.jitter,
            },
            // Zero would stall every request forever
            rate_limit: RateLimitConfig {
                requests_per_second: settings.requests_per_second.max(1),
                burst_capacity: settings.burst_capacity.max(1),
                enabled: settings.rate_limit_enabled,
            },
            concurrency: ConcurrencyConfig {
                max_concurrent_requests: settings.max_concurrent_requests.max(1),
                enabled: settings.concurrency_enabled,
            },
        }
    }
}
