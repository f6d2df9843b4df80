//! Token Set Entity
//!
//! The pair of tokens produced by a successful code exchange. The two are
//! only ever constructed, stored and replaced together.

use crate::domain::entity::{id_token::IdToken, userinfo_token::UserinfoToken};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    id_token: IdToken,
    userinfo_token: UserinfoToken,
}

impl TokenSet {
    /// Pair the tokens, requiring both to describe the same provider session.
    pub fn new(id_token: IdToken, userinfo_token: UserinfoToken) -> AuthResult<Self> {
        if id_token.sid != userinfo_token.sid {
            return Err(AuthError::TokenExchange(
                "id token and userinfo token belong to different sessions".to_string(),
            ));
        }
        Ok(Self {
            id_token,
            userinfo_token,
        })
    }

    pub fn id_token(&self) -> &IdToken {
        &self.id_token
    }

    pub fn userinfo_token(&self) -> &UserinfoToken {
        &self.userinfo_token
    }

    pub fn into_parts(self) -> (IdToken, UserinfoToken) {
        (self.id_token, self.userinfo_token)
    }
}
