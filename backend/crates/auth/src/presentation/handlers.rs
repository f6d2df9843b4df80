//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, RawQuery, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CompleteSignInUseCase, SecurityHandler, SignInInput, SignInUseCase, SignOutOutput,
    SignOutUseCase,
};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{AuditRepository, SessionStore};
use crate::domain::service::IdentityProvider;
use crate::domain::value_object::{locale::Locale, provider::Provider};
use crate::error::{AuthError, AuthResult};
use crate::infra::metrics::{AuthCounter, AuthMetrics};
use crate::presentation::dto::{AuthRoute, SessionStatusResponse, query_param};
use crate::presentation::middleware::{CsrfToken, CurrentSession};
use crate::presentation::session_cookie::SessionCookie;

/// Feature flag guarding `POST /api/session/extend`
pub const EXTEND_SESSION_FEATURE: &str = "session-extend";

/// Shared state for auth handlers
pub struct AuthAppState<S, P, A> {
    pub sessions: Arc<S>,
    pub provider: Arc<P>,
    pub audit: Arc<A>,
    pub config: Arc<AuthConfig>,
    pub metrics: Arc<AuthMetrics>,
    pub cookie: Arc<SessionCookie>,
}

impl<S, P, A> Clone for AuthAppState<S, P, A> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            provider: self.provider.clone(),
            audit: self.audit.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            cookie: self.cookie.clone(),
        }
    }
}

impl<S, P, A> AuthAppState<S, P, A>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    pub fn new(sessions: S, provider: P, audit: A, config: AuthConfig, metrics: AuthMetrics) -> Self {
        let cookie = SessionCookie::new(&config);
        Self {
            sessions: Arc::new(sessions),
            provider: Arc::new(provider),
            audit: Arc::new(audit),
            config: Arc::new(config),
            metrics: Arc::new(metrics),
            cookie: Arc::new(cookie),
        }
    }

    /// Session for the presented cookie, or a new one
    pub async fn load_session(&self, headers: &HeaderMap) -> AuthResult<AuthSession> {
        self.sessions
            .get_session(self.cookie.session_id(headers))
            .await
    }

    pub fn security_handler(&self) -> SecurityHandler<P> {
        SecurityHandler::new(self.provider.clone(), self.config.clone())
    }

    /// `Set-Cookie` value if the session id is new to the browser
    pub fn pending_cookie(&self, session: &AuthSession) -> Option<HeaderValue> {
        if session.needs_cookie() {
            self.cookie.set_cookie(session.id())
        } else {
            None
        }
    }
}

// ============================================================================
// Auth Routes
// ============================================================================

/// GET /auth/{*route}
///
/// Dispatches `login`, `login/<provider>`, `callback/<provider>` and
/// `logout`. Anything else is a 404.
pub async fn auth_route<S, P, A>(
    State(state): State<AuthAppState<S, P, A>>,
    Path(route): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    let query = query.as_deref();
    let result = match AuthRoute::parse(&route) {
        AuthRoute::Login => login(&state, query),
        AuthRoute::ProviderLogin(provider) => provider_login(&state, provider, query, &headers).await,
        AuthRoute::Callback(provider) => callback(&state, provider, query, &headers).await,
        AuthRoute::Logout => logout(&state, query, &headers).await,
        AuthRoute::Unknown => {
            state.metrics.add(AuthCounter::UnknownRoute);
            tracing::warn!(route = %route, "Unknown auth route");
            Err(AuthError::UnknownRoute(route.clone()))
        }
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

/// Bare `login`: forward to the default provider, keeping the query verbatim.
fn login<S, P, A>(state: &AuthAppState<S, P, A>, query: Option<&str>) -> AuthResult<Response> {
    state.metrics.add(AuthCounter::Login);

    let mut location = format!("/auth/login/{}", state.config.default_provider);
    if let Some(query) = query {
        location.push('?');
        location.push_str(query);
    }
    redirect(&location, None)
}

async fn provider_login<S, P, A>(
    state: &AuthAppState<S, P, A>,
    provider: Provider,
    query: Option<&str>,
    headers: &HeaderMap,
) -> AuthResult<Response>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    state.metrics.add(AuthCounter::ProviderLogin);

    let return_to = query_param(query, "returnto");
    let mut session = state.load_session(headers).await?;

    let use_case = SignInUseCase::new(state.sessions.clone(), state.config.clone());
    let output = use_case
        .execute(
            &mut session,
            SignInInput {
                provider,
                return_to: return_to.as_deref(),
            },
        )
        .await?;

    redirect(&output.auth_url, state.pending_cookie(&session))
}

async fn callback<S, P, A>(
    state: &AuthAppState<S, P, A>,
    provider: Provider,
    query: Option<&str>,
    headers: &HeaderMap,
) -> AuthResult<Response>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    state.metrics.add(AuthCounter::Callback);

    let mut session = state.load_session(headers).await?;

    let use_case = CompleteSignInUseCase::new(
        state.sessions.clone(),
        state.provider.clone(),
        state.audit.clone(),
        state.config.clone(),
    );
    let output = use_case.execute(&mut session, provider, query).await?;

    redirect(output.return_url.as_str(), state.pending_cookie(&session))
}

async fn logout<S, P, A>(
    state: &AuthAppState<S, P, A>,
    query: Option<&str>,
    headers: &HeaderMap,
) -> AuthResult<Response>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    let locale = Locale::resolve(
        query_param(query, "lang").as_deref(),
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    );
    let session = state.load_session(headers).await?;

    let use_case = SignOutUseCase::new(
        state.sessions.clone(),
        state.audit.clone(),
        state.config.clone(),
    );

    match use_case.execute(session, locale).await? {
        SignOutOutput::Unauthenticated { redirect_url } => {
            state.metrics.add(AuthCounter::UnauthenticatedLogout);
            redirect(&redirect_url, None)
        }
        SignOutOutput::SignedOut { redirect_url } => {
            state.metrics.add(AuthCounter::Logout);
            redirect(&redirect_url, state.cookie.clear_cookie())
        }
    }
}

/// 302 with `Location`, never cached. A full-page navigation so the browser
/// re-sends its cookies to the target.
fn redirect(location: &str, cookie: Option<HeaderValue>) -> AuthResult<Response> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| AuthError::Internal(format!("Invalid redirect location: {location}")))?;

    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Some(cookie) = cookie {
        headers.append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

// ============================================================================
// Session
// ============================================================================

/// GET /api/session
pub async fn session_status(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    csrf: Option<Extension<CsrfToken>>,
) -> Json<SessionStatusResponse> {
    let userinfo = session.userinfo_token();
    Json(SessionStatusResponse {
        authenticated: session.is_authenticated(),
        sub: session.id_token().map(|token| token.sub.clone()),
        locale: session.id_token().and_then(|token| token.locale.clone()),
        mocked: userinfo.is_some_and(|token| token.mocked),
        client_number: session.client_number().map(str::to_string),
        csrf_token: csrf.map(|Extension(CsrfToken(token))| token),
    })
}

/// POST /api/session/extend
///
/// Re-commits the session so its idle timeout starts over.
pub async fn extend_session<S, P, A>(
    State(state): State<AuthAppState<S, P, A>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> AuthResult<StatusCode>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    state
        .security_handler()
        .validate_feature_enabled(EXTEND_SESSION_FEATURE)?;

    state.sessions.commit(&session).await?;
    tracing::debug!(session_id = %session.id(), "Session extended");

    Ok(StatusCode::NO_CONTENT)
}
