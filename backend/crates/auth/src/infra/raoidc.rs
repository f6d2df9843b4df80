//! RAOIDC HTTP Client
//!
//! Talks to the identity provider's token, userinfo and session-validation
//! endpoints. Token signatures are not verified here: tokens arrive over a
//! TLS back channel straight from the provider, which is the trust anchor.
//! Issuer, audience and lifetime claims are still checked on every token.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::config::RaoidcConfig;
use crate::domain::entity::{
    id_token::IdToken, token_set::TokenSet, userinfo_token::UserinfoToken,
};
use crate::domain::service::IdentityProvider;
use crate::error::{AuthError, AuthResult};

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    id_token: String,
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Claim checks applied to every token from `config`'s provider.
fn token_validation(config: &RaoidcConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_audience(&[config.client_id.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss", "aud"]);
    validation.validate_nbf = true;
    validation
}

/// Claims of a compact JWS that passes `validation`.
fn decode_claims<T: DeserializeOwned>(jwt: &str, validation: &Validation) -> Result<T, String> {
    jsonwebtoken::decode::<T>(jwt, &DecodingKey::from_secret(&[]), validation)
        .map(|data| data.claims)
        .map_err(|e| format!("token rejected: {e}"))
}

#[derive(Clone)]
pub struct RaoidcClient {
    http: reqwest::Client,
    config: Arc<RaoidcConfig>,
    validation: Validation,
}

impl RaoidcClient {
    pub fn new(config: Arc<RaoidcConfig>) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {e}")))?;
        let validation = token_validation(&config);
        Ok(Self {
            http,
            config,
            validation,
        })
    }

    async fn fetch_userinfo(&self, access_token: &str) -> AuthResult<UserinfoToken> {
        let response = self
            .http
            .get(self.config.userinfo_url())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("userinfo request: {e}")))?;

        let response = ensure_success(response, "userinfo request")
            .await
            .map_err(AuthError::TokenExchange)?;
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("userinfo body: {e}")))?;

        // Plain JSON or a signed JWT, depending on client registration
        let body = body.trim();
        if !body.starts_with('{') {
            return decode_claims(body, &self.validation).map_err(AuthError::TokenExchange);
        }

        let claims: UserinfoToken = serde_json::from_str(body)
            .map_err(|e| AuthError::TokenExchange(format!("userinfo claims are invalid: {e}")))?;
        if claims.iss != self.config.issuer || !claims.aud.contains(&self.config.client_id) {
            return Err(AuthError::TokenExchange(format!(
                "userinfo issued by {} was not meant for this client",
                claims.iss
            )));
        }
        Ok(claims)
    }
}

impl IdentityProvider for RaoidcClient {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> AuthResult<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(self.config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("token request: {e}")))?;

        let response = ensure_success(response, "token exchange")
            .await
            .map_err(AuthError::TokenExchange)?;
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("token response: {e}")))?;

        if let Some(token_type) = tokens.token_type.as_deref() {
            if !token_type.eq_ignore_ascii_case("bearer") {
                return Err(AuthError::TokenExchange(format!(
                    "unexpected token type {token_type}"
                )));
            }
        }

        let id_token: IdToken =
            decode_claims(&tokens.id_token, &self.validation).map_err(AuthError::TokenExchange)?;
        let userinfo_token = self.fetch_userinfo(&tokens.access_token).await?;

        TokenSet::new(id_token, userinfo_token)
    }

    async fn validate_session(&self, sid: &str) -> AuthResult<bool> {
        let mut url = self.config.validate_session_url();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("sid", sid);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("session validation request: {e}")))?;

        let response = ensure_success(response, "session validation")
            .await
            .map_err(AuthError::Upstream)?;
        response
            .json::<bool>()
            .await
            .map_err(|e| AuthError::Upstream(format!("session validation response: {e}")))
    }
}

/// Returns the response on 2xx, otherwise a description of the failure.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(format!("{operation} returned {status}: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ISSUER: &str = "https://idp.example/oauth2";

    fn jwt(claims: serde_json::Value) -> String {
        let header = platform::crypto::to_base64url(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = platform::crypto::to_base64url(claims.to_string().as_bytes());
        format!("{header}.{payload}.signature")
    }

    fn claims(iss: &str, sid: &str) -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": iss,
            "jti": "j",
            "nbf": now - 5, "exp": now + 300, "iat": now - 5,
            "aud": "portal",
            "sid": sid,
            "sub": "u1",
            "locale": "fr"
        })
    }

    fn config(base: &str) -> RaoidcConfig {
        RaoidcConfig::new(Url::parse(base).unwrap(), "portal")
    }

    fn validation() -> Validation {
        token_validation(&config(ISSUER))
    }

    fn client(server: &MockServer) -> RaoidcClient {
        let config = config(&format!("{}/oauth2", server.uri()));
        RaoidcClient::new(Arc::new(config)).unwrap()
    }

    fn issuer(server: &MockServer) -> String {
        format!("{}/oauth2", server.uri())
    }

    async fn mount_token(server: &MockServer, id_token: String, token_type: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": id_token,
                "access_token": "at-1",
                "token_type": token_type,
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_decode_id_token_claims() {
        let claims: IdToken = decode_claims(&jwt(claims(ISSUER, "s1")), &validation()).unwrap();
        assert_eq!(claims.sid, "s1");
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.locale.as_deref(), Some("fr"));
        assert!(claims.nonce.is_none());
    }

    #[test]
    fn test_decode_userinfo_defaults_mocked_false() {
        let mut body = claims(ISSUER, "s1");
        body["sin"] = json!("800000002");
        let claims: UserinfoToken = decode_claims(&jwt(body), &validation()).unwrap();
        assert!(!claims.mocked);
        assert_eq!(claims.sin.as_deref(), Some("800000002"));
    }

    #[test]
    fn test_decode_accepts_audience_array() {
        let mut body = claims(ISSUER, "s1");
        body["aud"] = json!(["rascl", "portal"]);
        let claims: IdToken = decode_claims(&jwt(body), &validation()).unwrap();
        assert!(claims.aud.contains("portal"));
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let mut body = claims(ISSUER, "s1");
        body["exp"] = json!(2);
        body["nbf"] = json!(1);
        body["iat"] = json!(1);
        assert!(decode_claims::<IdToken>(&jwt(body), &validation()).is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_issuer() {
        let body = claims("https://evil.example", "s1");
        assert!(decode_claims::<IdToken>(&jwt(body), &validation()).is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_audience() {
        let mut body = claims(ISSUER, "s1");
        body["aud"] = json!("someone-else");
        assert!(decode_claims::<IdToken>(&jwt(body.clone()), &validation()).is_err());

        body["aud"] = json!(["someone-else", "another"]);
        assert!(decode_claims::<IdToken>(&jwt(body), &validation()).is_err());
    }

    #[test]
    fn test_decode_rejects_token_not_yet_valid() {
        let mut body = claims(ISSUER, "s1");
        body["nbf"] = json!(Utc::now().timestamp() + 3600);
        assert!(decode_claims::<IdToken>(&jwt(body), &validation()).is_err());
    }

    #[test]
    fn test_decode_rejects_missing_expiry() {
        let mut body = claims(ISSUER, "s1");
        body.as_object_mut().unwrap().remove("exp");
        assert!(decode_claims::<UserinfoToken>(&jwt(body), &validation()).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_claims::<IdToken>("not-a-jwt", &validation()).is_err());
        assert!(decode_claims::<IdToken>("a.%%%.c", &validation()).is_err());
        let missing_claims = jwt(json!({ "sub": "u1" }));
        assert!(decode_claims::<IdToken>(&missing_claims, &validation()).is_err());
    }

    #[tokio::test]
    async fn test_exchange_code_with_json_userinfo() {
        let server = MockServer::start().await;
        let iss = issuer(&server);
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=code-1"))
            .and(body_string_contains("code_verifier=verifier-1"))
            .and(body_string_contains("client_id=portal"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": jwt(claims(&iss, "s1")),
                "access_token": "at-1",
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth2/userinfo"))
            .and(header("authorization", "Bearer at-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(claims(&iss, "s1")))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/auth/callback/raoidc")
            .await
            .unwrap();
        assert_eq!(tokens.id_token().sid, "s1");
        assert_eq!(tokens.userinfo_token().sub, "u1");
    }

    #[tokio::test]
    async fn test_exchange_code_with_jwt_userinfo() {
        let server = MockServer::start().await;
        let iss = issuer(&server);
        mount_token(&server, jwt(claims(&iss, "s1")), "bearer").await;
        let mut userinfo = claims(&iss, "s1");
        userinfo["mocked"] = json!(true);
        Mock::given(method("GET"))
            .and(path("/oauth2/userinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/jwt")
                    .set_body_string(jwt(userinfo)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap();
        assert!(tokens.userinfo_token().mocked);
    }

    #[tokio::test]
    async fn test_token_endpoint_error_stops_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth2/userinfo"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(ref m) if m.contains("400")));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_bearer_token_type_is_rejected() {
        let server = MockServer::start().await;
        mount_token(&server, jwt(claims(&issuer(&server), "s1")), "mac").await;

        let err = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(ref m) if m.contains("mac")));
    }

    #[tokio::test]
    async fn test_foreign_id_token_is_rejected() {
        let server = MockServer::start().await;
        mount_token(&server, jwt(claims("https://evil.example", "s1")), "bearer").await;

        let err = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(_)));
    }

    #[tokio::test]
    async fn test_json_userinfo_for_another_client_is_rejected() {
        let server = MockServer::start().await;
        let iss = issuer(&server);
        mount_token(&server, jwt(claims(&iss, "s1")), "bearer").await;
        let mut userinfo = claims(&iss, "s1");
        userinfo["aud"] = json!("someone-else");
        Mock::given(method("GET"))
            .and(path("/oauth2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(userinfo))
            .mount(&server)
            .await;

        let err = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(_)));
    }

    #[tokio::test]
    async fn test_mismatched_sids_are_rejected() {
        let server = MockServer::start().await;
        let iss = issuer(&server);
        mount_token(&server, jwt(claims(&iss, "s1")), "bearer").await;
        Mock::given(method("GET"))
            .and(path("/oauth2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(claims(&iss, "s2")))
            .mount(&server)
            .await;

        let err = client(&server)
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails_exchange() {
        let base = {
            let server = MockServer::start().await;
            format!("{}/oauth2", server.uri())
        };
        let client = RaoidcClient::new(Arc::new(config(&base))).unwrap();

        let err = client
            .exchange_code("code-1", "verifier-1", "https://portal.example/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExchange(_)));
    }

    #[tokio::test]
    async fn test_validate_session_mirrors_provider_answer() {
        for alive in [true, false] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/oauth2/validatesession"))
                .and(query_param("client_id", "portal"))
                .and(query_param("sid", "s1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(alive))
                .expect(1)
                .mount(&server)
                .await;

            assert_eq!(client(&server).validate_session("s1").await.unwrap(), alive);
        }
    }

    #[tokio::test]
    async fn test_validate_session_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/validatesession"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).validate_session("s1").await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream(_)));
    }
}
