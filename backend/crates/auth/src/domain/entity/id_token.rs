//! ID Token Entity
//!
//! Claims of the OIDC ID token issued by the identity provider. Held only
//! server-side in the session and replaced wholesale on re-authentication.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::audience::Audience;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdToken {
    /// Issuer
    pub iss: String,
    /// Token ID
    pub jti: String,
    /// Not before (Unix seconds)
    pub nbf: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Audience (contains our client id)
    pub aud: Audience,
    /// Identity provider session id
    pub sid: String,
    /// Authenticated subject
    pub sub: String,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}
