//! ReturnUrl Value Object
//!
//! Where the user lands after a completed signin. Only root-relative paths
//! on this origin are accepted, so `returnto` can never become an open
//! redirect.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::return_url::ReturnUrl;
//!
//! let url = ReturnUrl::parse("/fr/dashboard?tab=1").unwrap();
//! assert_eq!(url.as_str(), "/fr/dashboard?tab=1");
//!
//! assert!(ReturnUrl::parse("https://evil.example").is_err());
//! assert_eq!(ReturnUrl::default().as_str(), "/");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnUrl(String);

impl ReturnUrl {
    /// Parse a user-supplied `returnto` value.
    ///
    /// Must start with `/`. Protocol-relative forms (`//host`, `/\host`) are
    /// rejected as well since browsers resolve them to another origin.
    pub fn parse(value: &str) -> AuthResult<Self> {
        if !value.starts_with('/') {
            return Err(AuthError::InvalidReturnUrl);
        }
        if value.starts_with("//") || value.starts_with("/\\") {
            return Err(AuthError::InvalidReturnUrl);
        }
        if value.chars().any(char::is_control) {
            return Err(AuthError::InvalidReturnUrl);
        }
        Ok(Self(value.to_string()))
    }

    /// Parse an optional `returnto`; absent means `/`.
    pub fn parse_optional(value: Option<&str>) -> AuthResult<Self> {
        match value {
            Some(value) => Self::parse(value),
            None => Ok(Self::default()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReturnUrl {
    fn default() -> Self {
        Self("/".to_string())
    }
}

impl std::fmt::Display for ReturnUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
