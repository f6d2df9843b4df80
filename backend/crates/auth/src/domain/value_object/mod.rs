//! Value Object Module

pub mod audience;
pub mod locale;
pub mod provider;
pub mod return_url;
pub mod session_id;
