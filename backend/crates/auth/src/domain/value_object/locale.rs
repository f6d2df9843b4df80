use derive_more::Display;
use serde::{Deserialize, Serialize};

/// UI language of the portal.
///
/// Passed to the identity provider as `ui_locales` on signout so its pages
/// match the language the user was browsing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    #[display("en")]
    En,
    #[display("fr")]
    Fr,
}

impl Locale {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    /// Accepts `en`, `fr` and regional variants such as `fr-CA`.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            _ => None,
        }
    }

    /// First supported language in an `Accept-Language` header, ignoring weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .find_map(Self::from_code)
    }

    /// Resolve the current locale: explicit `lang` parameter first, then the
    /// browser's `Accept-Language`, then English.
    pub fn resolve(lang: Option<&str>, accept_language: Option<&str>) -> Self {
        lang.and_then(Self::from_code)
            .or_else(|| accept_language.and_then(Self::from_accept_language))
            .unwrap_or_default()
    }
}
