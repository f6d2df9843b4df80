//! Shared Kernel - cross-crate vocabulary
//!
//! The smallest core every backend crate agrees on:
//! - the unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - typed identifiers ([`id::Id`]) such as session ids
//!
//! Nothing here knows about OIDC, sessions or HTTP routing.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
