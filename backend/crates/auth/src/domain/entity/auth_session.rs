//! Auth Session Entity
//!
//! Server-side session record keyed by an opaque session id. The browser
//! only ever holds the signed id; everything below lives in the store.
//!
//! Auth keys are never removed one by one. Signin writes the PKCE material,
//! the callback writes both tokens at once, and logout destroys the whole
//! record through the store.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    id_token::IdToken, token_set::TokenSet, userinfo_token::UserinfoToken,
};
use crate::domain::value_object::{return_url::ReturnUrl, session_id::SessionId};

/// Names of the keys persisted in a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionKey {
    #[display("idToken")]
    IdToken,
    #[display("userInfoToken")]
    UserinfoToken,
    #[display("csrfToken")]
    CsrfToken,
    #[display("authCodeVerifier")]
    AuthCodeVerifier,
    #[display("authState")]
    AuthState,
    #[display("authReturnUrl")]
    AuthReturnUrl,
    #[display("clientNumber")]
    ClientNumber,
}

/// A borrowed session value, typed by the key it was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionValue<'a> {
    IdToken(&'a IdToken),
    UserinfoToken(&'a UserinfoToken),
    ReturnUrl(&'a ReturnUrl),
    Text(&'a str),
}

/// Persisted session values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<IdToken>,
    #[serde(
        rename = "userInfoToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    userinfo_token: Option<UserinfoToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    csrf_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_code_verifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_return_url: Option<ReturnUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_number: Option<String>,
}

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    id: SessionId,
    data: SessionData,
    /// Set when the id is new to the browser and a cookie must be issued.
    cookie_pending: bool,
}

impl AuthSession {
    /// A brand-new, empty session that the browser does not know yet.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            data: SessionData::default(),
            cookie_pending: true,
        }
    }

    /// A session loaded from the store under the id the browser presented.
    pub fn restore(id: SessionId, data: SessionData) -> Self {
        Self {
            id,
            data,
            cookie_pending: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Move the record under a new id. Only session stores call this.
    pub fn assign_id(&mut self, id: SessionId) {
        self.id = id;
        self.cookie_pending = true;
    }

    /// Whether the response must carry a `Set-Cookie` for this session.
    pub fn needs_cookie(&self) -> bool {
        self.cookie_pending
    }

    pub fn id_token(&self) -> Option<&IdToken> {
        self.data.id_token.as_ref()
    }

    pub fn userinfo_token(&self) -> Option<&UserinfoToken> {
        self.data.userinfo_token.as_ref()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.data.csrf_token.as_deref()
    }

    pub fn auth_code_verifier(&self) -> Option<&str> {
        self.data.auth_code_verifier.as_deref()
    }

    pub fn auth_state(&self) -> Option<&str> {
        self.data.auth_state.as_deref()
    }

    pub fn auth_return_url(&self) -> Option<&ReturnUrl> {
        self.data.auth_return_url.as_ref()
    }

    pub fn client_number(&self) -> Option<&str> {
        self.data.client_number.as_deref()
    }

    /// Value stored under `key`, if any.
    pub fn value(&self, key: SessionKey) -> Option<SessionValue<'_>> {
        match key {
            SessionKey::IdToken => self.id_token().map(SessionValue::IdToken),
            SessionKey::UserinfoToken => self.userinfo_token().map(SessionValue::UserinfoToken),
            SessionKey::CsrfToken => self.csrf_token().map(SessionValue::Text),
            SessionKey::AuthCodeVerifier => self.auth_code_verifier().map(SessionValue::Text),
            SessionKey::AuthState => self.auth_state().map(SessionValue::Text),
            SessionKey::AuthReturnUrl => self.auth_return_url().map(SessionValue::ReturnUrl),
            SessionKey::ClientNumber => self.client_number().map(SessionValue::Text),
        }
    }

    pub fn contains(&self, key: SessionKey) -> bool {
        self.value(key).is_some()
    }

    /// Both tokens present.
    pub fn is_authenticated(&self) -> bool {
        self.data.id_token.is_some() && self.data.userinfo_token.is_some()
    }

    /// Record the PKCE verifier, state and return URL of a signin in progress.
    pub fn begin_signin(&mut self, code_verifier: String, state: String, return_url: ReturnUrl) {
        self.data.auth_code_verifier = Some(code_verifier);
        self.data.auth_state = Some(state);
        self.data.auth_return_url = Some(return_url);
    }

    /// Store both tokens of a completed exchange.
    pub fn establish(&mut self, tokens: TokenSet) {
        let (id_token, userinfo_token) = tokens.into_parts();
        self.data.id_token = Some(id_token);
        self.data.userinfo_token = Some(userinfo_token);
    }

    pub fn set_csrf_token(&mut self, token: String) {
        self.data.csrf_token = Some(token);
    }
}
