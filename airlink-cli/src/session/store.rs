//! Keyed session store with idle eviction

use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::action::Action;
use super::reducer::{ReducerError, reduce};
use super::state::{LinkedRecordIdsToPrimaryValues, PublicExtensionState, ScreenState};

#[derive(Debug, Default)]
struct StoreInner {
    state: PublicExtensionState,
    last_touched: HashMap<String, Instant>,
}

/// Sessions are created by `setScreenStateForSession` and dropped once idle
/// for longer than `idle_timeout`
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<StoreInner>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            idle_timeout,
        }
    }

    /// Apply an action atomically. Returns the targeted session's state
    /// afterwards, if the action targets a session.
    pub async fn apply(&self, action: Action) -> Result<Option<ScreenState>, ReducerError> {
        let session_id = action.session_id().map(str::to_string);
        let mut inner = self.inner.lock().await;
        reduce(&mut inner.state, action)?;

        let Some(session_id) = session_id else {
            return Ok(None);
        };
        inner.last_touched.insert(session_id.clone(), Instant::now());
        Ok(inner
            .state
            .session_ids_to_screen_states
            .get(&session_id)
            .cloned())
    }

    /// Current screen of a session; reading counts as activity
    pub async fn screen_state(&self, session_id: &str) -> Option<ScreenState> {
        let mut inner = self.inner.lock().await;
        let screen = inner
            .state
            .session_ids_to_screen_states
            .get(session_id)
            .cloned()?;
        inner
            .last_touched
            .insert(session_id.to_string(), Instant::now());
        Some(screen)
    }

    pub async fn primary_values(&self) -> LinkedRecordIdsToPrimaryValues {
        self.inner
            .lock()
            .await
            .state
            .linked_record_ids_to_primary_values
            .clone()
    }

    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.state.session_ids_to_screen_states.len()
    }

    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now()).await
    }

    /// Drop sessions not touched within the idle timeout as of `now`
    pub async fn evict_idle_at(&self, now: Instant) -> usize {
        let mut inner = self.inner.lock().await;
        let idle_timeout = self.idle_timeout;
        let expired: Vec<String> = inner
            .last_touched
            .iter()
            .filter(|(_, touched)| now.saturating_duration_since(**touched) > idle_timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            inner.last_touched.remove(id);
            inner.state.session_ids_to_screen_states.remove(id);
        }
        if !expired.is_empty() {
            info!("Evicted {} idle sessions", expired.len());
        }
        expired.len()
    }

    /// Periodically evict idle sessions until the task is aborted
    pub fn spawn_eviction_task(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle().await;
                debug!("Eviction pass removed {} sessions", evicted);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(session_id: &str, screen_state: ScreenState) -> Action {
        Action::SetScreenStateForSession {
            extension_session_id: session_id.to_string(),
            screen_state,
        }
    }

    #[tokio::test]
    async fn test_apply_returns_session_snapshot() {
        let store = SessionStore::new(Duration::from_secs(60));
        let snapshot = store.apply(set("s1", ScreenState::Loading)).await.unwrap();
        assert_eq!(snapshot, Some(ScreenState::Loading));
        assert_eq!(store.screen_state("s1").await, Some(ScreenState::Loading));
        assert_eq!(store.screen_state("s2").await, None);
    }

    #[tokio::test]
    async fn test_failed_action_leaves_store_unchanged() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.apply(set("s1", ScreenState::Loading)).await.unwrap();

        let err = store
            .apply(Action::UpdateHasUnsavedChanges {
                extension_session_id: "s1".to_string(),
                has_unsaved_changes: true,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ReducerError::InvalidScreen(_)));
        assert_eq!(store.screen_state("s1").await, Some(ScreenState::Loading));
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new(Duration::from_secs(3600));
        store.apply(set("s1", ScreenState::Loading)).await.unwrap();
        store.apply(set("s2", ScreenState::PasswordRequired)).await.unwrap();

        assert_eq!(store.evict_idle().await, 0);
        assert_eq!(store.session_count().await, 2);

        let later = Instant::now() + Duration::from_secs(3601);
        assert_eq!(store.evict_idle_at(later).await, 2);
        assert_eq!(store.session_count().await, 0);
        assert_eq!(store.screen_state("s1").await, None);
    }

    #[tokio::test]
    async fn test_cache_survives_eviction() {
        let store = SessionStore::new(Duration::from_secs(1));
        store.apply(set("s1", ScreenState::Loading)).await.unwrap();
        store
            .apply(Action::LinkedRecordIdsToPrimaryValuesFailed {
                message: "timeout".to_string(),
            })
            .await
            .unwrap();

        store
            .evict_idle_at(Instant::now() + Duration::from_secs(5))
            .await;

        assert!(matches!(
            store.primary_values().await,
            LinkedRecordIdsToPrimaryValues::Failed { .. }
        ));
    }
}
