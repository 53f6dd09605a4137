//! In-memory session storage, one record per user

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::session::VibeSession;

/// Shared map of user id to vibe session
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, VibeSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session for `user`, creating a fresh one for unknown users and
    /// starting over once the stored deadline has passed.
    pub async fn current(&self, user: &str, now_ms: i64) -> VibeSession {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(user) {
            Some(session) if session.is_expired(now_ms) => {
                tracing::info!(user, "resetting vibe after deadline");
                *session = VibeSession::default();
                session.clone()
            }
            Some(session) => session.clone(),
            None => {
                tracing::info!(user, "initialising new vibe");
                let session = VibeSession::default();
                sessions.insert(user.to_string(), session.clone());
                session
            }
        }
    }

    /// Replace the stored session for `user`
    pub async fn update(&self, user: &str, session: VibeSession) -> VibeSession {
        let mut sessions = self.sessions.write().await;
        sessions.insert(user.to_string(), session.clone());
        session
    }

    /// Look up without creating or resetting
    pub async fn get(&self, user: &str) -> Option<VibeSession> {
        self.sessions.read().await.get(user).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_gets_fresh_session() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let session = store.current("u1", 0).await;
        assert_eq!(session, VibeSession::default());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_then_current_returns_stored() {
        let store = SessionStore::new();
        let mut session = VibeSession::default();
        session.begin_reveal(1_000);
        session.complete_reveal("Be still.".into());

        store.update("u1", session.clone()).await;
        assert_eq!(store.current("u1", 2_000).await, session);
        assert_eq!(store.get("u2").await, None);
    }

    #[tokio::test]
    async fn test_expired_session_is_reset() {
        let store = SessionStore::new();
        let mut session = VibeSession::default();
        let deadline = session.begin_reveal(0);
        session.complete_reveal("Soon.".into());
        store.update("u1", session).await;

        let before = store.current("u1", deadline).await;
        assert_eq!(before.fortune, "Soon.");

        let after = store.current("u1", deadline + 1).await;
        assert_eq!(after, VibeSession::default());
        assert_eq!(store.get("u1").await, Some(VibeSession::default()));
    }
}
