//! Repository Traits
//!
//! Interfaces for session and audit persistence. Implementations live in the
//! infrastructure layer.

use crate::domain::entity::{audit_event::AuditEvent, auth_session::AuthSession};
use crate::domain::value_object::session_id::SessionId;
use crate::error::AuthResult;

/// Server-side session store
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Load the session for the id the browser presented.
    ///
    /// Unknown, expired or absent ids yield a new empty session under a
    /// freshly generated id. The presented id is never adopted.
    async fn get_session(&self, session_id: Option<SessionId>) -> AuthResult<AuthSession>;

    /// Move the session under a new id, carrying its data over.
    /// The old id stops resolving immediately.
    async fn regenerate(&self, session: &mut AuthSession) -> AuthResult<()>;

    /// Persist the whole record in one write.
    async fn commit(&self, session: &AuthSession) -> AuthResult<()>;

    /// Remove the record entirely.
    async fn destroy(&self, session: AuthSession) -> AuthResult<()>;
}

/// Audit log
#[trait_variant::make(AuditRepository: Send)]
pub trait LocalAuditRepository {
    async fn create_audit(&self, event: &AuditEvent) -> AuthResult<()>;
}
