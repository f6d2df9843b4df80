//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256, HMAC, Base64url)
//! - Cookie parsing and `Set-Cookie` construction

pub mod cookie;
pub mod crypto;
