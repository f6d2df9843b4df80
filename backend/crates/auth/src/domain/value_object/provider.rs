use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity providers the portal can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Raoidc,
}

impl Provider {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Provider::Raoidc => "raoidc",
        }
    }

    /// `None` for providers this deployment does not know about.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "raoidc" => Some(Provider::Raoidc),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        assert_eq!(Provider::from_code("raoidc"), Some(Provider::Raoidc));
        assert_eq!(Provider::Raoidc.to_string(), "raoidc");
    }

    #[test]
    fn test_unknown_and_case_sensitive() {
        assert_eq!(Provider::from_code("RAOIDC"), None);
        assert_eq!(Provider::from_code("github"), None);
    }
}
