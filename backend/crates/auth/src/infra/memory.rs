//! In-Memory Session Store
//!
//! Process-local session records with an idle timeout. Each record is
//! replaced as a whole on commit, so readers never see half of a write.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::entity::auth_session::{AuthSession, SessionData};
use crate::domain::repository::SessionStore;
use crate::domain::value_object::session_id::SessionId;
use crate::error::AuthResult;

#[derive(Debug, Clone)]
struct StoredSession {
    data: SessionData,
    expires_at: Instant,
}

impl StoredSession {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, StoredSession>>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Drop every expired record
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_expired(now));
        let deleted = before - sessions.len();

        if deleted > 0 {
            tracing::debug!(sessions_deleted = deleted, "Cleaned up expired sessions");
        }
        deleted
    }

    /// Number of live records
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|stored| !stored.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl SessionStore for MemorySessionStore {
    async fn get_session(&self, session_id: Option<SessionId>) -> AuthResult<AuthSession> {
        if let Some(session_id) = session_id {
            let now = Instant::now();
            let sessions = self.sessions.read().await;
            if let Some(stored) = sessions.get(&session_id) {
                if !stored.is_expired(now) {
                    return Ok(AuthSession::restore(session_id, stored.data.clone()));
                }
            }
        }

        Ok(AuthSession::new(SessionId::new()))
    }

    async fn regenerate(&self, session: &mut AuthSession) -> AuthResult<()> {
        let old_id = session.id();
        let new_id = SessionId::new();

        {
            let mut sessions = self.sessions.write().await;
            sessions.remove(&old_id);
            sessions.insert(
                new_id,
                StoredSession {
                    data: session.data().clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }

        session.assign_id(new_id);
        tracing::debug!(old_session_id = %old_id, session_id = %new_id, "Session id regenerated");
        Ok(())
    }

    async fn commit(&self, session: &AuthSession) -> AuthResult<()> {
        self.sessions.write().await.insert(
            session.id(),
            StoredSession {
                data: session.data().clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn destroy(&self, session: AuthSession) -> AuthResult<()> {
        self.sessions.write().await.remove(&session.id());
        tracing::debug!(session_id = %session.id(), "Session destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::return_url::ReturnUrl;

    #[tokio::test]
    async fn test_unknown_id_yields_fresh_session() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let presented = SessionId::new();

        let session = store.get_session(Some(presented)).await.unwrap();

        assert_ne!(session.id(), presented);
        assert!(session.needs_cookie());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_commit_then_load() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let mut session = store.get_session(None).await.unwrap();
        session.set_csrf_token("token".to_string());
        store.commit(&session).await.unwrap();

        let loaded = store.get_session(Some(session.id())).await.unwrap();
        assert_eq!(loaded.id(), session.id());
        assert_eq!(loaded.csrf_token(), Some("token"));
        assert!(!loaded.needs_cookie());
    }

    #[tokio::test]
    async fn test_regenerate_moves_data_and_retires_old_id() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let mut session = store.get_session(None).await.unwrap();
        session.begin_signin("v".into(), "s".into(), ReturnUrl::default());
        store.commit(&session).await.unwrap();
        let old_id = session.id();

        store.regenerate(&mut session).await.unwrap();

        assert_ne!(session.id(), old_id);
        let stale = store.get_session(Some(old_id)).await.unwrap();
        assert!(stale.auth_state().is_none());
        let moved = store.get_session(Some(session.id())).await.unwrap();
        assert_eq!(moved.auth_state(), Some("s"));
    }

    #[tokio::test]
    async fn test_destroy_and_expiry() {
        let store = MemorySessionStore::new(Duration::from_millis(0));
        let session = store.get_session(None).await.unwrap();
        store.commit(&session).await.unwrap();

        let expired = store.get_session(Some(session.id())).await.unwrap();
        assert_ne!(expired.id(), session.id());
        assert_eq!(store.cleanup_expired().await, 1);

        let store = MemorySessionStore::new(Duration::from_secs(60));
        let session = store.get_session(None).await.unwrap();
        store.commit(&session).await.unwrap();
        let id = session.id();
        store.destroy(session).await.unwrap();
        assert_ne!(store.get_session(Some(id)).await.unwrap().id(), id);
    }
}
