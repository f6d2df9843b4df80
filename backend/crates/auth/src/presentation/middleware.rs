//! Auth Middleware
//!
//! Session and CSRF enforcement for protected routes.

use axum::body::{Body, Bytes};
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;

use crate::application::SecurityOutcome;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{AuditRepository, SessionStore};
use crate::domain::service::IdentityProvider;
use crate::error::csrf_rejection;
use crate::presentation::handlers::AuthAppState;

/// Header carrying the CSRF token on script-initiated requests
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Form field carrying the CSRF token on form posts.
///
/// Only `application/x-www-form-urlencoded` bodies are searched for it.
/// Multipart uploads must send the token in [`CSRF_HEADER`] instead.
pub const CSRF_FORM_FIELD: &str = "_csrf";
/// Largest form body buffered while looking for the CSRF field
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Validated session, stored in request extensions
#[derive(Clone, Debug)]
pub struct CurrentSession(pub AuthSession);

/// CSRF token issued for the session, stored in request extensions
#[derive(Clone, Debug)]
pub struct CsrfToken(pub String);

/// Middleware that requires a valid auth session
///
/// Invalid sessions are redirected to login and come back to the same URL.
pub async fn require_auth_session<S, P, A>(
    State(state): State<AuthAppState<S, P, A>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    let session = state
        .load_session(req.headers())
        .await
        .map_err(IntoResponse::into_response)?;

    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone());
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let outcome = state
        .security_handler()
        .validate_auth_session(&session, path_and_query)
        .await
        .map_err(IntoResponse::into_response)?;

    match outcome {
        SecurityOutcome::Continue => {
            req.extensions_mut().insert(CurrentSession(session));
            Ok(next.run(req).await)
        }
        SecurityOutcome::RedirectToLogin { location } => Err((
            axum::http::StatusCode::FOUND,
            [(header::LOCATION, location)],
        )
            .into_response()),
        SecurityOutcome::Forbidden => Err(csrf_rejection()),
    }
}

/// Middleware that enforces the CSRF token on state-changing requests
///
/// Safe methods pass through and get a token issued (and committed) if the
/// session has none yet, exposed as the [`CsrfToken`] extension.
pub async fn require_csrf_token<S, P, A>(
    State(state): State<AuthAppState<S, P, A>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    S: SessionStore + Send + Sync + 'static,
    P: IdentityProvider + Send + Sync + 'static,
    A: AuditRepository + Send + Sync + 'static,
{
    let (mut parts, body) = req.into_parts();

    let mut session = match parts.extensions.remove::<CurrentSession>() {
        Some(CurrentSession(session)) => session,
        None => state
            .load_session(&parts.headers)
            .await
            .map_err(IntoResponse::into_response)?,
    };
    let handler = state.security_handler();

    if is_safe_method(&parts.method) {
        let (token, changed) = handler.ensure_csrf_token(&mut session);
        if changed {
            state
                .sessions
                .commit(&session)
                .await
                .map_err(IntoResponse::into_response)?;
        }
        let cookie = state.pending_cookie(&session);

        parts.extensions.insert(CsrfToken(token));
        parts.extensions.insert(CurrentSession(session));

        let mut response = next.run(Request::from_parts(parts, body)).await;
        if let Some(cookie) = cookie {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        return Ok(response);
    }

    let (submitted, body) = submitted_token(&parts.headers, body).await?;

    match handler
        .validate_csrf_token(&session, submitted.as_deref())
        .map_err(IntoResponse::into_response)?
    {
        SecurityOutcome::Continue => {
            parts.extensions.insert(CurrentSession(session));
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        _ => Err(csrf_rejection()),
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Token from the CSRF header, or from the `_csrf` field of a urlencoded
/// form. A buffered form body is handed back for the downstream handler.
async fn submitted_token(headers: &HeaderMap, body: Body) -> Result<(Option<String>, Body), Response> {
    if let Some(token) = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        return Ok((Some(token.to_string()), body));
    }

    if !is_form(headers) {
        return Ok((None, body));
    }

    let bytes: Bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Unreadable form body");
            AppError::bad_request("Unreadable request body").into_response()
        })?;

    let token = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value.into_owned());

    Ok((token, Body::from(bytes)))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}
