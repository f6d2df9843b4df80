//! Tracing Audit Log
//!
//! Audit sink for deployments without a database: events become structured
//! log lines on the `audit` target.

use crate::domain::entity::audit_event::AuditEvent;
use crate::domain::repository::AuditRepository;
use crate::error::AuthResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditRepository;

impl AuditRepository for TracingAuditRepository {
    async fn create_audit(&self, event: &AuditEvent) -> AuthResult<()> {
        tracing::info!(
            target: "audit",
            audit_event_id = %event.id,
            event_name = %event.event_name,
            user_id = %event.user_id,
            created_at = %event.created_at.to_rfc3339(),
            "Audit event"
        );
        Ok(())
    }
}
