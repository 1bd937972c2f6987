//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the settings, the optional completion client, and the session
//! store. Each session owns a private `FormState` behind its own mutex, so
//! sessions never contend with each other beyond the brief map lookup.
//! Session mutexes are never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Settings;
use crate::form::FormState;
use crate::llm::LlmChat;

// =============================================================================
// SESSION
// =============================================================================

/// Per-browser-session state.
#[derive(Debug)]
pub struct Session {
    pub form: FormState,
    last_seen: Instant,
}

impl Session {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self { form: FormState::new(), last_seen: now }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Lock a session, recovering the state if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// SESSION STORE
// =============================================================================

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Look up `id`, or create a fresh session under a new id when it is
    /// absent or unknown. The flag is `true` when a session was created.
    /// Either way the session counts as seen now.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SessionHandle, bool) {
        if let Some(id) = id {
            if let Some(handle) = self.get(id).await {
                lock_session(&handle).touch(Instant::now());
                return (id, handle, false);
            }
        }

        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(Instant::now())));
        self.sessions.write().await.insert(id, handle.clone());
        tracing::info!(session_id = %id, "session created");
        (id, handle, true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `ttl`. Sessions with a request in
    /// flight are kept. Returns the number removed.
    pub async fn evict_idle(&self, ttl: Duration, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| {
            let session = lock_session(handle);
            session.form.is_pending() || session.idle_for(now) <= ttl
        });
        before - sessions.len()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// `None` when no credential was configured at startup.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub sessions: SessionStore,
}

impl AppState {
    #[must_use]
    pub fn new(settings: Settings, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self { settings: Arc::new(settings), llm, sessions: SessionStore::new() }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
