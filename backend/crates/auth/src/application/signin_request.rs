//! Signin Request Generator
//!
//! Builds the PKCE authorization request sent to the identity provider.

use std::sync::Arc;

use platform::crypto;

use crate::application::config::RaoidcConfig;
use crate::domain::entity::signin_request::SigninRequest;

/// Random bytes behind the code verifier (64 base64url chars).
const CODE_VERIFIER_BYTES: usize = 48;
/// Random bytes behind the state parameter.
const STATE_BYTES: usize = 32;
const SCOPE: &str = "openid profile";

pub struct SigninRequestGenerator {
    config: Arc<RaoidcConfig>,
}

impl SigninRequestGenerator {
    pub fn new(config: Arc<RaoidcConfig>) -> Self {
        Self { config }
    }

    /// Fresh verifier, state and authorization URL. Nothing is reused across
    /// calls.
    pub fn generate_signin_request(&self, redirect_uri: &str) -> SigninRequest {
        let code_verifier = crypto::random_token(CODE_VERIFIER_BYTES);
        let code_challenge = crypto::to_base64url(&crypto::sha256(code_verifier.as_bytes()));
        let state = crypto::random_token(STATE_BYTES);

        let mut auth_url = self.config.authorize_url();
        auth_url
            .query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPE)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", &state);

        tracing::debug!(redirect_uri = %redirect_uri, "Generated signin request");

        SigninRequest {
            auth_url: auth_url.to_string(),
            code_verifier,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use url::Url;

    fn generator() -> SigninRequestGenerator {
        SigninRequestGenerator::new(Arc::new(RaoidcConfig::new(
            Url::parse("https://idp.example/oauth2").unwrap(),
            "portal",
        )))
    }

    fn query(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_auth_url_carries_pkce_parameters() {
        let request = generator().generate_signin_request("https://portal.example/auth/callback/raoidc");
        assert!(request.auth_url.starts_with("https://idp.example/oauth2/authorize?"));

        let params = query(&request.auth_url);
        assert_eq!(params["client_id"], "portal");
        assert_eq!(params["redirect_uri"], "https://portal.example/auth/callback/raoidc");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid profile");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["state"], request.state);
        assert!(!request.auth_url.contains(&request.code_verifier));
    }

    #[test]
    fn test_challenge_is_s256_of_verifier() {
        let request = generator().generate_signin_request("https://portal.example/cb");
        let params = query(&request.auth_url);
        let expected = crypto::to_base64url(&crypto::sha256(request.code_verifier.as_bytes()));
        assert_eq!(params["code_challenge"], expected);
    }

    #[test]
    fn test_verifier_length_and_alphabet() {
        let request = generator().generate_signin_request("https://portal.example/cb");
        assert!((43..=128).contains(&request.code_verifier.len()));
        assert!(
            request
                .code_verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_every_call_is_fresh() {
        let generator = generator();
        let a = generator.generate_signin_request("https://portal.example/cb");
        let b = generator.generate_signin_request("https://portal.example/cb");
        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.state, b.state);
    }
}
