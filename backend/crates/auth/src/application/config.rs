//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::collections::HashSet;
use std::time::Duration;

use platform::cookie::CookieConfig;
use url::Url;

use crate::domain::value_object::{locale::Locale, provider::Provider};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// RAOIDC identity provider settings
#[derive(Debug, Clone)]
pub struct RaoidcConfig {
    /// Base URL; endpoints are resolved beneath it
    pub base_url: Url,
    pub client_id: String,
    /// Expected `iss` claim of every token the provider hands out
    pub issuer: String,
    /// Upper bound on every call to the provider
    pub http_timeout: Duration,
}

impl RaoidcConfig {
    pub fn new(base_url: Url, client_id: impl Into<String>) -> Self {
        Self {
            issuer: base_url.as_str().trim_end_matches('/').to_string(),
            base_url,
            client_id: client_id.into(),
            http_timeout: Duration::from_secs(10),
        }
    }

    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }

    pub fn authorize_url(&self) -> Url {
        self.endpoint("authorize")
    }

    pub fn token_url(&self) -> Url {
        self.endpoint("token")
    }

    pub fn userinfo_url(&self) -> Url {
        self.endpoint("userinfo")
    }

    pub fn validate_session_url(&self) -> Url {
        self.endpoint("validatesession")
    }

    /// RP-initiated signout URL for the provider session `sid`.
    pub fn signout_url(&self, sid: &str, locale: Locale) -> Url {
        let mut url = self.endpoint("logout");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("shared_session_id", sid)
            .append_pair("ui_locales", locale.code());
        url
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Public origin of this portal, used to build callback URLs
    pub app_base_url: Url,
    pub raoidc: RaoidcConfig,
    /// Provider used by the bare `login` route
    pub default_provider: Provider,
    /// Where unauthenticated logouts are sent
    pub rascl_logout_url: String,
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Idle timeout of a session
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Feature flags switched on for this deployment
    pub enabled_features: HashSet<String>,
}

impl AuthConfig {
    pub fn new(app_base_url: Url, raoidc: RaoidcConfig, rascl_logout_url: impl Into<String>) -> Self {
        Self {
            app_base_url,
            raoidc,
            default_provider: Provider::Raoidc,
            rascl_logout_url: rascl_logout_url.into(),
            session_cookie_name: "SESSION".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(20 * 60),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            enabled_features: HashSet::new(),
        }
    }

    /// Replace the session secret with fresh random bytes
    pub fn with_random_secret(mut self) -> Self {
        self.session_secret
            .copy_from_slice(&platform::crypto::random_bytes(32));
        self
    }

    /// Config for development (insecure cookie, random secret)
    pub fn development(app_base_url: Url, raoidc: RaoidcConfig, rascl_logout_url: &str) -> Self {
        Self {
            cookie_secure: false,
            ..Self::new(app_base_url, raoidc, rascl_logout_url).with_random_secret()
        }
    }

    /// Absolute callback URL registered with the provider.
    pub fn redirect_uri(&self, provider: Provider) -> String {
        let mut url = self.app_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["auth", "callback", provider.code()]);
        }
        url.to_string()
    }

    pub fn feature_enabled(&self, feature: &str) -> bool {
        self.enabled_features.contains(feature)
    }

    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raoidc() -> RaoidcConfig {
        RaoidcConfig::new(
            Url::parse("https://idp.example/oauth2/").unwrap(),
            "portal",
        )
    }

    #[test]
    fn test_endpoints_resolve_under_base() {
        let config = raoidc();
        assert_eq!(
            config.authorize_url().as_str(),
            "https://idp.example/oauth2/authorize"
        );
        assert_eq!(config.token_url().as_str(), "https://idp.example/oauth2/token");

        let no_slash = RaoidcConfig::new(Url::parse("https://idp.example/oauth2").unwrap(), "p");
        assert_eq!(
            no_slash.userinfo_url().as_str(),
            "https://idp.example/oauth2/userinfo"
        );
    }

    #[test]
    fn test_issuer_defaults_to_base_without_trailing_slash() {
        assert_eq!(raoidc().issuer, "https://idp.example/oauth2");
    }

    #[test]
    fn test_signout_url() {
        let url = raoidc().signout_url("s1", Locale::Fr);
        assert_eq!(
            url.as_str(),
            "https://idp.example/oauth2/logout?client_id=portal&shared_session_id=s1&ui_locales=fr"
        );
    }

    #[test]
    fn test_redirect_uri() {
        let config = AuthConfig::new(
            Url::parse("https://portal.example").unwrap(),
            raoidc(),
            "https://rascl.example/logout",
        );
        assert_eq!(
            config.redirect_uri(Provider::Raoidc),
            "https://portal.example/auth/callback/raoidc"
        );
    }

    #[test]
    fn test_development_config() {
        let config = AuthConfig::development(
            Url::parse("http://localhost:3000").unwrap(),
            raoidc(),
            "/",
        );
        assert!(!config.cookie_secure);
        assert_ne!(config.session_secret, [0u8; 32]);
        assert!(!config.feature_enabled("anything"));
    }
}
