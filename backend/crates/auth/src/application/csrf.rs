//! CSRF Token Validation
//!
//! Synchronizer-token check for state-changing requests. Which requests are
//! checked is decided by the routes, not here.

use platform::crypto;

use crate::domain::entity::auth_session::AuthSession;
use crate::error::{AuthError, AuthResult};

/// Random bytes behind an issued CSRF token.
const CSRF_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfTokenValidator;

impl CsrfTokenValidator {
    pub fn new() -> Self {
        Self
    }

    /// Compare the submitted token with the one stored in the session.
    ///
    /// Absence of either side is a mismatch.
    pub fn validate_csrf_token(&self, submitted: Option<&str>, session: &AuthSession) -> AuthResult<()> {
        let expected = session
            .csrf_token()
            .ok_or(AuthError::CsrfTokenInvalid("no token in session"))?;
        let submitted = submitted
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::CsrfTokenInvalid("no token submitted"))?;

        if crypto::constant_time_eq(submitted.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::CsrfTokenInvalid("token mismatch"))
        }
    }

    /// Token stored in the session, generating one if there is none yet.
    /// Returns whether the session changed and must be committed.
    pub fn ensure_token(&self, session: &mut AuthSession) -> (String, bool) {
        if let Some(token) = session.csrf_token() {
            return (token.to_string(), false);
        }
        let token = crypto::random_token(CSRF_TOKEN_BYTES);
        session.set_csrf_token(token.clone());
        (token, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::session_id::SessionId;

    fn session_with_token() -> (AuthSession, String) {
        let mut session = AuthSession::new(SessionId::new());
        let (token, changed) = CsrfTokenValidator::new().ensure_token(&mut session);
        assert!(changed);
        (session, token)
    }

    #[test]
    fn test_matching_token_passes() {
        let (session, token) = session_with_token();
        assert!(CsrfTokenValidator::new().validate_csrf_token(Some(&token), &session).is_ok());
    }

    #[test]
    fn test_mismatch_and_absence_fail() {
        let validator = CsrfTokenValidator::new();
        let (session, token) = session_with_token();

        let tampered = format!("{token}x");
        for submitted in [None, Some(""), Some(tampered.as_str())] {
            assert!(matches!(
                validator.validate_csrf_token(submitted, &session),
                Err(AuthError::CsrfTokenInvalid(_))
            ));
        }

        let empty = AuthSession::new(SessionId::new());
        assert!(matches!(
            validator.validate_csrf_token(Some(&token), &empty),
            Err(AuthError::CsrfTokenInvalid("no token in session"))
        ));
    }

    #[test]
    fn test_ensure_token_is_stable() {
        let validator = CsrfTokenValidator::new();
        let (mut session, token) = session_with_token();
        let (again, changed) = validator.ensure_token(&mut session);
        assert_eq!(again, token);
        assert!(!changed);
    }
}
