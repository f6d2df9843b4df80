//! Sign In Use Case
//!
//! Starts a signin: validates where to return, regenerates the session id
//! and stores the PKCE material before the browser leaves for the provider.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::signin_request::SigninRequestGenerator;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::{provider::Provider, return_url::ReturnUrl};
use crate::error::AuthResult;

/// Sign in input
pub struct SignInInput<'a> {
    pub provider: Provider,
    /// Raw `returnto` query value
    pub return_to: Option<&'a str>,
}

/// Sign in output
pub struct SignInOutput {
    /// Provider authorization URL to redirect to
    pub auth_url: String,
}

/// Sign in use case
pub struct SignInUseCase<S>
where
    S: SessionStore,
{
    session_store: Arc<S>,
    generator: SigninRequestGenerator,
    config: Arc<AuthConfig>,
}

impl<S> SignInUseCase<S>
where
    S: SessionStore,
{
    pub fn new(session_store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_store,
            generator: SigninRequestGenerator::new(Arc::new(config.raoidc.clone())),
            config,
        }
    }

    pub async fn execute(
        &self,
        session: &mut AuthSession,
        input: SignInInput<'_>,
    ) -> AuthResult<SignInOutput> {
        // Rejected before anything is generated or stored.
        let return_url = ReturnUrl::parse_optional(input.return_to)?;

        let redirect_uri = self.config.redirect_uri(input.provider);
        let request = self.generator.generate_signin_request(&redirect_uri);

        self.session_store.regenerate(session).await?;
        session.begin_signin(request.code_verifier, request.state, return_url);
        self.session_store.commit(session).await?;

        tracing::info!(
            session_id = %session.id(),
            provider = %input.provider,
            "Signin started"
        );

        Ok(SignInOutput {
            auth_url: request.auth_url,
        })
    }
}
