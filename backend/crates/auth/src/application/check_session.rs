//! Check Session Use Case
//!
//! Decides whether a session still represents a live RAOIDC login.

use std::sync::Arc;

use crate::domain::entity::auth_session::{AuthSession, SessionKey, SessionValue};
use crate::domain::service::IdentityProvider;
use crate::error::AuthResult;

/// Outcome of a session check. Expected failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
        }
    }
}

/// Value stored under `key`, if any. No validation is performed.
fn extract_value_from_session(session: &AuthSession, key: SessionKey) -> Option<SessionValue<'_>> {
    let value = session.value(key);
    if value.is_none() {
        tracing::trace!(session_id = %session.id(), key = %key, "Session key absent");
    }
    value
}

/// RAOIDC session validator
pub struct RaoidcSessionValidator<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> RaoidcSessionValidator<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Check the session's tokens and, unless the identity is mocked, ask the
    /// provider whether its session is still alive.
    ///
    /// Only transport failures of the upstream check surface as `Err`.
    pub async fn validate_raoidc_session(&self, session: &AuthSession) -> AuthResult<ValidationResult> {
        let session_id = session.id();

        let Some(SessionValue::IdToken(id_token)) =
            extract_value_from_session(session, SessionKey::IdToken)
        else {
            return Ok(ValidationResult::invalid(format!(
                "RAOIDC session validation failed: idToken not found in session [{session_id}]"
            )));
        };

        let Some(SessionValue::UserinfoToken(userinfo_token)) =
            extract_value_from_session(session, SessionKey::UserinfoToken)
        else {
            return Ok(ValidationResult::invalid(format!(
                "RAOIDC session validation failed: userInfoToken not found in session [{session_id}]"
            )));
        };

        if userinfo_token.mocked {
            tracing::info!(
                session_id = %session_id,
                sub = %userinfo_token.sub,
                "Mocked identity; skipping upstream session check"
            );
            return Ok(ValidationResult::valid());
        }

        let sid = &id_token.sid;
        if self.provider.validate_session(sid).await? {
            tracing::debug!(session_id = %session_id, sid = %sid, "RAOIDC session is valid");
            Ok(ValidationResult::valid())
        } else {
            Ok(ValidationResult::invalid(format!(
                "RAOIDC session validation failed: session [{sid}] has expired"
            )))
        }
    }
}
