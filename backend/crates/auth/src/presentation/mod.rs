//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, middleware and the session cookie.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod session_cookie;

pub use handlers::AuthAppState;
pub use middleware::{CsrfToken, CurrentSession, require_auth_session, require_csrf_token};
pub use router::{auth_router, session_router};
pub use session_cookie::SessionCookie;
