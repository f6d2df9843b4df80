//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and provider traits
//! - `application/` - Use cases and application services
//! - `infra/` - Session store, audit sinks, RAOIDC client, metrics
//! - `presentation/` - HTTP handlers, middleware, router
//!
//! ## Features
//! - OIDC authorization-code signin against RAOIDC with PKCE (S256)
//! - Server-side sessions referenced by a signed cookie
//! - Upstream session-validity checks on every protected request
//! - Synchronizer-token CSRF protection for state-changing requests
//! - RP-initiated signout
//!
//! ## Security Model
//! - Callback `state` must match the value stored at signin, or it fails closed
//! - Session id regenerated before the provider redirect and again after the
//!   code exchange
//! - ID and userinfo tokens are written to the session together or not at all
//! - `returnto` only accepts root-relative paths
//! - Session create/destroy events go to the audit log

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, RaoidcConfig};
pub use error::{AuthError, AuthResult};
pub use infra::{
    AuthMetrics, MemorySessionStore, PgAuditRepository, RaoidcClient, TracingAuditRepository,
};
pub use presentation::router::{auth_router, session_router};
pub use presentation::AuthAppState;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::MemorySessionStore as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
