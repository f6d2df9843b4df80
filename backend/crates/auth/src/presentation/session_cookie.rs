//! Session Cookie
//!
//! The cookie carries `<session id>.<base64url HMAC-SHA256(session id)>`.
//! Anything that fails verification is treated as no cookie at all.

use axum::http::{HeaderMap, HeaderValue};
use platform::cookie::{self, CookieConfig};
use platform::crypto;

use crate::application::config::AuthConfig;
use crate::domain::value_object::session_id::SessionId;

#[derive(Clone)]
pub struct SessionCookie {
    cookie: CookieConfig,
    secret: [u8; 32],
}

impl SessionCookie {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            cookie: config.session_cookie(),
            secret: config.session_secret,
        }
    }

    /// Signed cookie value for `session_id`
    pub fn encode(&self, session_id: SessionId) -> Option<String> {
        let id = session_id.to_string();
        let tag = match crypto::hmac_sha256(&self.secret, id.as_bytes()) {
            Ok(tag) => tag,
            Err(e) => {
                tracing::error!(error = %e, "Failed to sign session cookie");
                return None;
            }
        };
        Some(format!("{id}.{}", crypto::to_base64url(&tag)))
    }

    /// Verify a cookie value and return the session id it names
    pub fn decode(&self, value: &str) -> Option<SessionId> {
        let (id, tag) = value.split_once('.')?;
        let tag = crypto::from_base64url(tag).ok()?;
        if !crypto::verify_hmac_sha256(&self.secret, id.as_bytes(), &tag) {
            return None;
        }
        id.parse().ok()
    }

    /// Session id presented by the browser, if it carries a valid signature
    pub fn session_id(&self, headers: &HeaderMap) -> Option<SessionId> {
        let value = cookie::extract_cookie(headers, &self.cookie.name)?;
        let session_id = self.decode(&value);
        if session_id.is_none() {
            tracing::debug!("Ignoring session cookie with invalid signature");
        }
        session_id
    }

    pub fn set_cookie(&self, session_id: SessionId) -> Option<HeaderValue> {
        cookie::to_header_value(&self.cookie.build_set_cookie(&self.encode(session_id)?))
    }

    pub fn clear_cookie(&self) -> Option<HeaderValue> {
        cookie::to_header_value(&self.cookie.build_delete_cookie())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use url::Url;

    use crate::application::config::RaoidcConfig;

    fn session_cookie() -> SessionCookie {
        let config = AuthConfig::development(
            Url::parse("http://localhost:3000").unwrap(),
            RaoidcConfig::new(Url::parse("https://idp.example").unwrap(), "portal"),
            "/",
        );
        SessionCookie::new(&config)
    }

    #[test]
    fn test_encode_decode() {
        let cookie = session_cookie();
        let id = SessionId::new();
        assert_eq!(cookie.decode(&cookie.encode(id).unwrap()), Some(id));
    }

    #[test]
    fn test_tampered_values_rejected() {
        let cookie = session_cookie();
        let id = SessionId::new();
        let value = cookie.encode(id).unwrap();

        let other = SessionId::new();
        let (_, tag) = value.split_once('.').unwrap();
        assert_eq!(cookie.decode(&format!("{other}.{tag}")), None);
        assert_eq!(cookie.decode(&id.to_string()), None);
        assert_eq!(cookie.decode("garbage"), None);

        // different secret
        assert_eq!(session_cookie().decode(&value), None);
    }

    #[test]
    fn test_session_id_from_headers() {
        let cookie = session_cookie();
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("SESSION={}", cookie.encode(id).unwrap())).unwrap(),
        );
        assert_eq!(cookie.session_id(&headers), Some(id));
    }

    #[test]
    fn test_set_cookie_attributes() {
        let cookie = session_cookie();
        let value = cookie.set_cookie(SessionId::new()).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("SESSION="));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));

        let cleared = cookie.clear_cookie().unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
