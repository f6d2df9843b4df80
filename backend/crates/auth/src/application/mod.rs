//! Application Layer
//!
//! Use cases and application services.

pub mod callback_handler;
pub mod check_session;
pub mod complete_sign_in;
pub mod config;
pub mod csrf;
pub mod security;
pub mod sign_in;
pub mod sign_out;
pub mod signin_request;

// Re-exports
pub use callback_handler::{CallbackHandler, CallbackRequest};
pub use check_session::{RaoidcSessionValidator, ValidationResult};
pub use complete_sign_in::{CompleteSignInOutput, CompleteSignInUseCase};
pub use config::{AuthConfig, RaoidcConfig};
pub use csrf::CsrfTokenValidator;
pub use security::{SecurityHandler, SecurityOutcome};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::{SignOutOutput, SignOutUseCase};
pub use signin_request::SigninRequestGenerator;
