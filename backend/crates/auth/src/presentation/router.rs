//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::{AuditRepository, SessionStore};
use crate::domain::service::IdentityProvider;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_auth_session, require_csrf_token};

/// Login, callback and logout under `/auth`
pub fn auth_router<S, P, A>(state: AuthAppState<S, P, A>) -> Router
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/{*route}", get(handlers::auth_route::<S, P, A>))
        .with_state(state)
}

/// Protected session endpoints under `/api/session`
///
/// Session validation runs first, then CSRF enforcement.
pub fn session_router<S, P, A>(state: AuthAppState<S, P, A>) -> Router
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/api/session", get(handlers::session_status))
        .route(
            "/api/session/extend",
            post(handlers::extend_session::<S, P, A>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_csrf_token::<S, P, A>,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth_session::<S, P, A>,
        ))
        .with_state(state)
}
