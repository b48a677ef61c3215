//! In-memory registry of wizard sessions.
//!
//! Each session owns one [`FormWizard`] behind its own async mutex so events
//! for a session are applied one at a time while different sessions proceed
//! independently. The map lock is only held long enough to clone a handle.
//! Sessions nobody has looked up for a while are dropped by [`run_eviction`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use onboard_core::{FormWizard, PreviewEditPolicy};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Shared handle to one session's wizard.
pub type SessionHandle = Arc<Mutex<FormWizard>>;

/// How often idle sessions are swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh wizard and return its id and handle.
    pub async fn create(&self, edit_policy: PreviewEditPolicy) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(FormWizard::with_edit_policy(edit_policy)));
        let entry = SessionEntry {
            handle: Arc::clone(&handle),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        (id, handle)
    }

    /// Fetch a session and mark it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.handle))
    }

    /// Drop a session. Returns `false` if it did not exist.
    ///
    /// Tasks still holding the handle (an upload in flight) finish against
    /// the detached wizard.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop every session not fetched within `max_idle`. Returns how many
    /// were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Periodically discard sessions idle for longer than `max_idle`.
///
/// Runs until the task is aborted.
pub async fn run_eviction(store: Arc<SessionStore>, max_idle: Duration) {
    tracing::info!(
        max_idle_secs = max_idle.as_secs(),
        interval_secs = EVICTION_INTERVAL.as_secs(),
        "Session eviction job started"
    );

    let mut interval = tokio::time::interval(EVICTION_INTERVAL);
    loop {
        interval.tick().await;
        let evicted = store.evict_idle(max_idle).await;
        if evicted > 0 {
            tracing::info!(evicted, "Discarded idle wizard sessions");
        } else {
            tracing::debug!("No idle wizard sessions to discard");
        }
    }
}

#[cfg(test)]
mod tests {
    use onboard_core::{FieldName, WizardStep};

    use super::*;

    #[tokio::test]
    async fn create_get_remove() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let (id, handle) = store.create(PreviewEditPolicy::Trusted).await;
        handle.lock().await.set_field(FieldName::City, "Pune");

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.lock().await.field(FieldName::City), Some("Pune"));
        assert_eq!(store.len().await, 1);

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = SessionStore::new();
        let (a, _) = store.create(PreviewEditPolicy::Trusted).await;
        let (b, _) = store.create(PreviewEditPolicy::RevalidateOwningStep).await;
        assert_ne!(a, b);

        let a = store.get(a).await.unwrap();
        let b = store.get(b).await.unwrap();
        assert_eq!(a.lock().await.edit_policy(), PreviewEditPolicy::Trusted);
        assert_eq!(
            b.lock().await.edit_policy(),
            PreviewEditPolicy::RevalidateOwningStep
        );
        assert_eq!(a.lock().await.current_step(), WizardStep::BasicInfo);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let store = SessionStore::new();
        let (stale, _) = store.create(PreviewEditPolicy::Trusted).await;
        let (active, _) = store.create(PreviewEditPolicy::Trusted).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.get(active).await.is_some());

        assert_eq!(store.evict_idle(Duration::from_millis(40)).await, 1);
        assert!(store.get(stale).await.is_none());
        assert!(store.get(active).await.is_some());
    }

    #[tokio::test]
    async fn fresh_sessions_survive_eviction() {
        let store = SessionStore::new();
        store.create(PreviewEditPolicy::Trusted).await;
        assert_eq!(store.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn evicted_handle_stays_usable_by_its_holder() {
        let store = SessionStore::new();
        let (id, handle) = store.create(PreviewEditPolicy::Trusted).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(store.evict_idle(Duration::ZERO).await, 1);
        assert!(store.get(id).await.is_none());
        handle.lock().await.set_field(FieldName::City, "Pune");
        assert_eq!(handle.lock().await.field(FieldName::City), Some("Pune"));
    }
}
