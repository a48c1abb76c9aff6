//! Cap on in-flight Airtable requests
//!
//! Several HTTP handlers can run at once and they all share one client.

use super::config::ConcurrencyConfig;
use log::debug;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    /// `None` when limiting is switched off
    semaphore: Option<Arc<Semaphore>>,
    max_in_flight: usize,
}

impl ConcurrencyLimiter {
    pub fn new(config: ConcurrencyConfig) -> Self {
        Self {
            semaphore: config
                .enabled
                .then(|| Arc::new(Semaphore::new(config.max_concurrent_requests))),
            max_in_flight: config.max_concurrent_requests,
        }
    }

    /// Wait for a slot; it is released when the returned guard drops
    pub async fn acquire(&self) -> Result<Option<OwnedSemaphorePermit>, AcquireError> {
        let Some(semaphore) = &self.semaphore else {
            return Ok(None);
        };

        if semaphore.available_permits() == 0 {
            debug!(
                "All {} Airtable request slots busy, waiting",
                self.max_in_flight
            );
        }
        semaphore.clone().acquire_owned().await.map(Some)
    }

    /// Requests currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.semaphore
            .as_ref()
            .map(|s| self.max_in_flight.saturating_sub(s.available_permits()))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(max: usize, enabled: bool) -> ConcurrencyLimiter {
        ConcurrencyLimiter::new(ConcurrencyConfig {
            max_concurrent_requests: max,
            enabled,
        })
    }

    #[tokio::test]
    async fn test_disabled_never_blocks() {
        let limiter = limiter(1, false);
        let mut guards = Vec::new();
        for _ in 0..20 {
            guards.push(limiter.acquire().await.unwrap());
        }
        assert!(guards.iter().all(Option::is_none));
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_second_request_waits_for_first() {
        let limiter = limiter(1, true);
        let first = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_flight(), 1);

        let waiter = limiter.clone();
        let handle = tokio::spawn(async move { waiter.acquire().await.map(|p| p.is_some()) });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        drop(first);
        let acquired = tokio::time::timeout(Duration::from_millis(200), handle).await;
        assert!(matches!(acquired, Ok(Ok(Ok(true)))));
    }
}
