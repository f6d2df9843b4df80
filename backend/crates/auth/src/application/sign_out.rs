//! Sign Out Use Case
//!
//! Ends the local session and hands the browser to the provider's
//! RP-initiated signout.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::audit_event::{AuditEvent, AuditEventName};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{AuditRepository, SessionStore};
use crate::domain::value_object::locale::Locale;
use crate::error::AuthResult;

/// Sign out output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutOutput {
    /// Never signed in locally; straight to the downstream logout page
    Unauthenticated { redirect_url: String },
    /// Session destroyed; continue with the provider signout
    SignedOut { redirect_url: String },
}

impl SignOutOutput {
    pub fn redirect_url(&self) -> &str {
        match self {
            SignOutOutput::Unauthenticated { redirect_url }
            | SignOutOutput::SignedOut { redirect_url } => redirect_url,
        }
    }
}

/// Sign out use case
pub struct SignOutUseCase<S, A>
where
    S: SessionStore,
    A: AuditRepository,
{
    session_store: Arc<S>,
    audit_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<S, A> SignOutUseCase<S, A>
where
    S: SessionStore,
    A: AuditRepository,
{
    pub fn new(session_store: Arc<S>, audit_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_store,
            audit_repo,
            config,
        }
    }

    pub async fn execute(&self, session: AuthSession, locale: Locale) -> AuthResult<SignOutOutput> {
        let Some(id_token) = session.id_token() else {
            tracing::info!(session_id = %session.id(), "Logout without a local login");
            return Ok(SignOutOutput::Unauthenticated {
                redirect_url: self.config.rascl_logout_url.clone(),
            });
        };

        let signout_url = self.config.raoidc.signout_url(&id_token.sid, locale);
        let sub = id_token.sub.clone();

        self.audit_repo
            .create_audit(&AuditEvent::new(AuditEventName::SessionDestroyed, sub.clone()))
            .await?;

        let session_id = session.id();
        self.session_store.destroy(session).await?;

        tracing::info!(session_id = %session_id, sub = %sub, "User signed out");

        Ok(SignOutOutput::SignedOut {
            redirect_url: signout_url.to_string(),
        })
    }
}
