//! Resilience around Airtable REST calls
//!
//! Airtable allows 5 requests per second per base and answers 429 beyond that.

pub mod concurrency;
pub mod config;
pub mod rate_limiter;
pub mod retry;

pub use concurrency::ConcurrencyLimiter;
pub use config::{ConcurrencyConfig, RateLimitConfig, ResilienceConfig};
pub use rate_limiter::RateLimiter;
pub use retry::{RetryConfig, RetryPolicy, RetryableError};
