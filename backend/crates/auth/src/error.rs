//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Body of every CSRF rejection.
pub const CSRF_REJECTION_BODY: &str = "Invalid CSRF token";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Callback `state` does not match the one stored at signin
    #[error("Callback state does not match the signin request")]
    AuthStateMismatch,

    /// Code exchange or token parsing failed
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Callback query lacks `code` or `state`
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    /// The identity provider returned an `error` on the callback
    #[error("Identity provider rejected the signin: {0}")]
    ProviderRejected(String),

    /// `returnto` is not a root-relative path
    #[error("Invalid returnto parameter")]
    InvalidReturnUrl,

    /// No such auth route or provider
    #[error("Unknown auth route: {0}")]
    UnknownRoute(String),

    /// Submitted CSRF token is missing or wrong
    #[error("Invalid CSRF token: {0}")]
    CsrfTokenInvalid(&'static str),

    /// Feature flag is off
    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    /// Session store failure
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// Identity provider unreachable or answered unexpectedly
    #[error("Identity provider request failed: {0}")]
    Upstream(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthStateMismatch
            | AuthError::MalformedCallback(_)
            | AuthError::InvalidReturnUrl => StatusCode::BAD_REQUEST,
            AuthError::ProviderRejected(_) | AuthError::CsrfTokenInvalid(_) => {
                StatusCode::FORBIDDEN
            }
            AuthError::UnknownRoute(_) | AuthError::FeatureDisabled(_) => StatusCode::NOT_FOUND,
            AuthError::TokenExchange(_) | AuthError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AuthError::SessionStore(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AuthStateMismatch
            | AuthError::MalformedCallback(_)
            | AuthError::InvalidReturnUrl => ErrorKind::BadRequest,
            AuthError::ProviderRejected(_) | AuthError::CsrfTokenInvalid(_) => ErrorKind::Forbidden,
            AuthError::UnknownRoute(_) | AuthError::FeatureDisabled(_) => ErrorKind::NotFound,
            AuthError::TokenExchange(_) | AuthError::Upstream(_) => ErrorKind::BadGateway,
            AuthError::SessionStore(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures get a generic message; the detail only goes to
    /// the log.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::TokenExchange(_) => {
                AppError::bad_gateway("Sign in could not be completed")
                    .with_action("Please try signing in again")
            }
            AuthError::Upstream(_) => AppError::bad_gateway("Identity provider unavailable"),
            AuthError::SessionStore(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            AuthError::UnknownRoute(_) | AuthError::FeatureDisabled(_) => {
                AppError::not_found("Not found")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::SessionStore(msg) => {
                tracing::error!(message = %msg, "Session store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::TokenExchange(msg) => {
                tracing::error!(message = %msg, "Token exchange failed");
            }
            AuthError::Upstream(msg) => {
                tracing::error!(message = %msg, "Identity provider request failed");
            }
            AuthError::AuthStateMismatch => {
                tracing::warn!("Callback state mismatch");
            }
            AuthError::ProviderRejected(reason) => {
                tracing::warn!(reason = %reason, "Identity provider rejected signin");
            }
            AuthError::CsrfTokenInvalid(reason) => {
                tracing::warn!(reason = %reason, "CSRF token rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        if let AuthError::CsrfTokenInvalid(_) = self {
            return csrf_rejection();
        }
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Plain-text 403 returned when a mutating request fails CSRF validation.
pub fn csrf_rejection() -> Response {
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        CSRF_REJECTION_BODY,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::AuthStateMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InvalidReturnUrl.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::TokenExchange("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AuthError::UnknownRoute("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::CsrfTokenInvalid("missing").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_kind_matches_status() {
        for err in [
            AuthError::AuthStateMismatch,
            AuthError::MalformedCallback("code".into()),
            AuthError::ProviderRejected("access_denied".into()),
            AuthError::FeatureDisabled("x".into()),
            AuthError::Upstream("x".into()),
            AuthError::SessionStore("x".into()),
        ] {
            assert_eq!(err.kind().status_code(), err.status_code().as_u16());
        }
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let app = AuthError::TokenExchange("upstream said secret".into()).to_app_error();
        assert!(!app.message().contains("secret"));
        let app = AuthError::Internal("stack".into()).to_app_error();
        assert_eq!(app.message(), "Internal server error");
    }

    #[tokio::test]
    async fn test_csrf_rejection_is_plain_text() {
        let response = AuthError::CsrfTokenInvalid("mismatch").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], CSRF_REJECTION_BODY.as_bytes());
    }
}
