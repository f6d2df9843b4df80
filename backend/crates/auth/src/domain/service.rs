//! Identity Provider Port
//!
//! What the auth flows need from the OIDC provider. The HTTP implementation
//! is `infra::raoidc::RaoidcClient`.

use crate::domain::entity::token_set::TokenSet;
use crate::error::AuthResult;

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Redeem an authorization code for the ID and userinfo tokens.
    ///
    /// Authorization codes are single-use; callers must not retry.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> AuthResult<TokenSet>;

    /// Ask the provider whether its session `sid` is still alive.
    async fn validate_session(&self, sid: &str) -> AuthResult<bool>;
}
