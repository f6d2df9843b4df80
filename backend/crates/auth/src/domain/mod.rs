//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the identity
//! provider port.

pub mod entity;
pub mod repository;
pub mod service;
pub mod value_object;

// Re-exports
pub use entity::{
    audit_event::{AuditEvent, AuditEventName},
    auth_session::{AuthSession, SessionData, SessionKey},
    id_token::IdToken,
    signin_request::SigninRequest,
    token_set::TokenSet,
    userinfo_token::UserinfoToken,
};
pub use repository::{AuditRepository, SessionStore};
pub use service::IdentityProvider;
