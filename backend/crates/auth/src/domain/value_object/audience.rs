//! Audience Value Object
//!
//! The `aud` claim of an OIDC token: a single client id or a list of them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Whether `client_id` is one of the intended audiences
    pub fn contains(&self, client_id: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == client_id,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == client_id),
        }
    }
}

impl From<&str> for Audience {
    fn from(aud: &str) -> Self {
        Audience::Single(aud.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_string_and_array_forms() {
        let single: Audience = serde_json::from_str(r#""portal""#).unwrap();
        assert_eq!(single, Audience::from("portal"));
        assert!(single.contains("portal"));

        let multiple: Audience = serde_json::from_str(r#"["portal", "rascl"]"#).unwrap();
        assert!(multiple.contains("rascl"));
        assert!(!multiple.contains("other"));
    }

    #[test]
    fn test_serializes_back_to_the_same_shape() {
        let multiple = Audience::Multiple(vec!["portal".into()]);
        assert_eq!(serde_json::to_string(&multiple).unwrap(), r#"["portal"]"#);
        assert_eq!(serde_json::to_string(&Audience::from("portal")).unwrap(), r#""portal""#);
    }
}
