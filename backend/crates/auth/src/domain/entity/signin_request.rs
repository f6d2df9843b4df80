//! Signin Request Entity

/// A freshly generated authorization request.
///
/// `code_verifier` and `state` must be stored in the session before the
/// browser is sent to `auth_url`; neither is ever sent anywhere else.
#[derive(Debug, Clone)]
pub struct SigninRequest {
    pub auth_url: String,
    pub code_verifier: String,
    pub state: String,
}
