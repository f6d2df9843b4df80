//! API DTOs (Data Transfer Objects)

use serde::Serialize;

use crate::domain::value_object::provider::Provider;

// ============================================================================
// Auth Routes
// ============================================================================

/// Operation selected by the suffix after `/auth/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRoute {
    Login,
    ProviderLogin(Provider),
    Callback(Provider),
    Logout,
    Unknown,
}

impl AuthRoute {
    pub fn parse(route: &str) -> Self {
        let route = route.trim_start_matches('/');
        match route.split_once('/') {
            None => match route {
                "login" => AuthRoute::Login,
                "logout" => AuthRoute::Logout,
                _ => AuthRoute::Unknown,
            },
            Some(("login", provider)) => Provider::from_code(provider)
                .map(AuthRoute::ProviderLogin)
                .unwrap_or(AuthRoute::Unknown),
            Some(("callback", provider)) => Provider::from_code(provider)
                .map(AuthRoute::Callback)
                .unwrap_or(AuthRoute::Unknown),
            Some(_) => AuthRoute::Unknown,
        }
    }
}

/// First value of `name` in a raw query string.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub sub: Option<String>,
    pub locale: Option<String>,
    pub mocked: bool,
    pub client_number: Option<String>,
    /// Token to submit with state-changing requests
    pub csrf_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse() {
        assert_eq!(AuthRoute::parse("login"), AuthRoute::Login);
        assert_eq!(AuthRoute::parse("logout"), AuthRoute::Logout);
        assert_eq!(
            AuthRoute::parse("login/raoidc"),
            AuthRoute::ProviderLogin(Provider::Raoidc)
        );
        assert_eq!(
            AuthRoute::parse("callback/raoidc"),
            AuthRoute::Callback(Provider::Raoidc)
        );
    }

    #[test]
    fn test_route_parse_unknown() {
        for route in [
            "",
            "signin",
            "login/github",
            "callback/",
            "logout/raoidc",
            "login/raoidc/extra",
        ] {
            assert_eq!(AuthRoute::parse(route), AuthRoute::Unknown, "{route}");
        }
    }

    #[test]
    fn test_query_param() {
        let query = Some("lang=fr&returnto=%2Fen%2Fhome%3Fa%3D1");
        assert_eq!(query_param(query, "returnto").as_deref(), Some("/en/home?a=1"));
        assert_eq!(query_param(query, "lang").as_deref(), Some("fr"));
        assert_eq!(query_param(query, "missing"), None);
        assert_eq!(query_param(None, "lang"), None);
    }
}
