//! Userinfo Token Entity

use serde::{Deserialize, Serialize};

use crate::domain::value_object::audience::Audience;

/// Profile claims returned by the userinfo endpoint.
///
/// `mocked` marks non-production test identities; sessions holding a mocked
/// token skip the upstream validity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserinfoToken {
    pub iss: String,
    pub jti: String,
    pub nbf: i64,
    pub exp: i64,
    pub iat: i64,
    pub aud: Audience,
    pub sid: String,
    pub sub: String,
    /// Social insurance number
    #[serde(default)]
    pub sin: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub mocked: bool,
}
