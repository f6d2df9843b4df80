//! Callback Handler
//!
//! Validates the provider's redirect back to us and redeems the code.
//! The session is never touched here; the caller commits the returned tokens.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::domain::entity::token_set::TokenSet;
use crate::domain::service::IdentityProvider;
use crate::error::{AuthError, AuthResult};

/// Inputs of a single callback.
pub struct CallbackRequest<'a> {
    /// Raw query string of the callback request
    pub query: Option<&'a str>,
    /// Verifier stored at signin
    pub code_verifier: Option<&'a str>,
    /// State stored at signin
    pub expected_state: Option<&'a str>,
    pub redirect_uri: &'a str,
}

#[derive(Debug, Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            // first occurrence wins
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

pub struct CallbackHandler<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> CallbackHandler<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Steps run strictly in order: read parameters, compare state, exchange
    /// the code, return the tokens. Any failure stops the sequence.
    pub async fn handle_callback(&self, request: CallbackRequest<'_>) -> AuthResult<TokenSet> {
        let params = CallbackParams::parse(request.query);

        if let Some(error) = params.error {
            let reason = match params.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            };
            return Err(AuthError::ProviderRejected(reason));
        }

        let code = params
            .code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AuthError::MalformedCallback("missing code".to_string()))?;
        let state = params
            .state
            .ok_or_else(|| AuthError::MalformedCallback("missing state".to_string()))?;

        // No signin in progress counts as a mismatch.
        let expected_state = request.expected_state.ok_or(AuthError::AuthStateMismatch)?;
        if !constant_time_eq(state.as_bytes(), expected_state.as_bytes()) {
            return Err(AuthError::AuthStateMismatch);
        }

        let code_verifier = request.code_verifier.ok_or_else(|| {
            AuthError::Internal("code verifier missing from session".to_string())
        })?;

        let tokens = self
            .provider
            .exchange_code(&code, code_verifier, request.redirect_uri)
            .await?;

        tracing::debug!(sid = %tokens.id_token().sid, "Authorization code exchanged");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_parse() {
        let params = CallbackParams::parse(Some("code=abc&state=xyz%20y&state=second"));
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("xyz y"));
        assert!(params.error.is_none());
    }

    #[test]
    fn test_params_parse_empty() {
        let params = CallbackParams::parse(None);
        assert!(params.code.is_none() && params.state.is_none());
    }
}
