// File: admitbot-core/src/cache/session_store.rs

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::survey::Session;

/// Handle to one user's session. Hold the lock for a whole survey step.
pub type SessionHandle = Arc<Mutex<Session>>;

/// All live sessions, keyed by the user's chat id.
///
/// The map itself is only touched long enough to clone a handle out; the
/// per-session mutex is what serializes one user's events.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<i64, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn get(&self, user_id: i64) -> Option<SessionHandle> {
        self.sessions.get(&user_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Existing session for `user_id`, or a fresh one at the first question.
    pub fn get_or_create(&self, user_id: i64) -> SessionHandle {
        let entry = self
            .sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())));
        Arc::clone(entry.value())
    }

    pub fn remove(&self, user_id: i64) -> Option<SessionHandle> {
        self.sessions.remove(&user_id).map(|(_, handle)| handle)
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.sessions.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::SurveyState;

    #[tokio::test]
    async fn handles_are_shared_per_user() {
        let store = SessionStore::new();
        let a = store.get_or_create(1);
        a.lock().await.state = SurveyState::Verdict;

        let again = store.get_or_create(1);
        assert_eq!(again.lock().await.state, SurveyState::Verdict);

        let other = store.get_or_create(2);
        assert_eq!(other.lock().await.state, SurveyState::Name);
        assert_eq!(store.len(), 2);

        assert!(store.remove(1).is_some());
        assert!(!store.contains(1));
        assert!(store.get(1).is_none());
    }
}
