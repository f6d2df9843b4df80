//! Security Handler
//!
//! Entry points used by every protected route: session validation, CSRF
//! validation and feature gating.

use std::sync::Arc;

use crate::application::check_session::RaoidcSessionValidator;
use crate::application::config::AuthConfig;
use crate::application::csrf::CsrfTokenValidator;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::service::IdentityProvider;
use crate::error::{AuthError, AuthResult};

/// Path of the login entry point.
pub const LOGIN_PATH: &str = "/auth/login";

/// What a protected route should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityOutcome {
    /// Proceed to the route
    Continue,
    /// Send the browser to login, coming back to the original URL afterwards
    RedirectToLogin { location: String },
    /// Reject with the CSRF 403
    Forbidden,
}

/// Login URL that returns to `path_and_query` after signin.
pub fn login_redirect_location(path_and_query: &str) -> String {
    format!("{LOGIN_PATH}?returnto={}", urlencoding::encode(path_and_query))
}

pub struct SecurityHandler<P>
where
    P: IdentityProvider,
{
    session_validator: RaoidcSessionValidator<P>,
    csrf_validator: CsrfTokenValidator,
    config: Arc<AuthConfig>,
}

impl<P> SecurityHandler<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_validator: RaoidcSessionValidator::new(provider),
            csrf_validator: CsrfTokenValidator::new(),
            config,
        }
    }

    /// Validate the session loaded for this request.
    ///
    /// An invalid session becomes a redirect to login. Validator errors are
    /// returned unchanged and never turned into a redirect.
    pub async fn validate_auth_session(
        &self,
        session: &AuthSession,
        path_and_query: &str,
    ) -> AuthResult<SecurityOutcome> {
        match self.session_validator.validate_raoidc_session(session).await {
            Ok(result) if result.is_valid => Ok(SecurityOutcome::Continue),
            Ok(result) => {
                tracing::info!(
                    session_id = %session.id(),
                    reason = result.error_message.as_deref().unwrap_or_default(),
                    "Session invalid; redirecting to login"
                );
                Ok(SecurityOutcome::RedirectToLogin {
                    location: login_redirect_location(path_and_query),
                })
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session.id(),
                    error = %e,
                    "Session validation failed unexpectedly"
                );
                Err(e)
            }
        }
    }

    /// Validate the CSRF token submitted with a state-changing request.
    pub fn validate_csrf_token(
        &self,
        session: &AuthSession,
        submitted: Option<&str>,
    ) -> AuthResult<SecurityOutcome> {
        match self.csrf_validator.validate_csrf_token(submitted, session) {
            Ok(()) => Ok(SecurityOutcome::Continue),
            Err(AuthError::CsrfTokenInvalid(reason)) => {
                tracing::warn!(session_id = %session.id(), reason = %reason, "CSRF validation failed");
                Ok(SecurityOutcome::Forbidden)
            }
            Err(e) => {
                tracing::error!(error = %e, "CSRF validation failed unexpectedly");
                Err(e)
            }
        }
    }

    /// Token to embed in forms, issuing one if the session has none.
    pub fn ensure_csrf_token(&self, session: &mut AuthSession) -> (String, bool) {
        self.csrf_validator.ensure_token(session)
    }

    /// Gate a route on a feature flag; a disabled feature looks like a 404.
    pub fn validate_feature_enabled(&self, feature: &str) -> AuthResult<()> {
        if self.config.feature_enabled(feature) {
            Ok(())
        } else {
            tracing::debug!(feature = %feature, "Feature disabled");
            Err(AuthError::FeatureDisabled(feature.to_string()))
        }
    }
}
