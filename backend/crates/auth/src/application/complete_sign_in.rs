//! Complete Sign In Use Case
//!
//! Handles the provider callback: validates and redeems the code, then
//! moves the session to a new id and stores both tokens in one commit.

use std::sync::Arc;

use crate::application::callback_handler::{CallbackHandler, CallbackRequest};
use crate::application::config::AuthConfig;
use crate::domain::entity::audit_event::{AuditEvent, AuditEventName};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{AuditRepository, SessionStore};
use crate::domain::service::IdentityProvider;
use crate::domain::value_object::{provider::Provider, return_url::ReturnUrl};
use crate::error::AuthResult;

/// Complete sign in output
pub struct CompleteSignInOutput {
    /// Where to send the browser
    pub return_url: ReturnUrl,
    /// Subject of the new login
    pub sub: String,
}

pub struct CompleteSignInUseCase<S, P, A>
where
    S: SessionStore,
    P: IdentityProvider,
    A: AuditRepository,
{
    session_store: Arc<S>,
    callback_handler: CallbackHandler<P>,
    audit_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<S, P, A> CompleteSignInUseCase<S, P, A>
where
    S: SessionStore,
    P: IdentityProvider,
    A: AuditRepository,
{
    pub fn new(
        session_store: Arc<S>,
        provider: Arc<P>,
        audit_repo: Arc<A>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            session_store,
            callback_handler: CallbackHandler::new(provider),
            audit_repo,
            config,
        }
    }

    /// Handler failures propagate untouched and leave the session as it was.
    pub async fn execute(
        &self,
        session: &mut AuthSession,
        provider: Provider,
        query: Option<&str>,
    ) -> AuthResult<CompleteSignInOutput> {
        let return_url = session.auth_return_url().cloned().unwrap_or_default();
        let redirect_uri = self.config.redirect_uri(provider);

        let tokens = self
            .callback_handler
            .handle_callback(CallbackRequest {
                query,
                code_verifier: session.auth_code_verifier(),
                expected_state: session.auth_state(),
                redirect_uri: &redirect_uri,
            })
            .await?;

        let sub = tokens.id_token().sub.clone();

        self.session_store.regenerate(session).await?;
        session.establish(tokens);
        self.session_store.commit(session).await?;

        self.audit_repo
            .create_audit(&AuditEvent::new(AuditEventName::SessionCreated, sub.clone()))
            .await?;

        tracing::info!(
            session_id = %session.id(),
            sub = %sub,
            provider = %provider,
            "Session created"
        );

        Ok(CompleteSignInOutput { return_url, sub })
    }
}
