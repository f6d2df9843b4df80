//! Infrastructure Layer
//!
//! Session storage, audit sinks, the identity provider client and metrics.

pub mod audit_log;
pub mod memory;
pub mod metrics;
pub mod postgres;
pub mod raoidc;

pub use audit_log::TracingAuditRepository;
pub use memory::MemorySessionStore;
pub use metrics::{AuthCounter, AuthMetrics};
pub use postgres::PgAuditRepository;
pub use raoidc::RaoidcClient;
