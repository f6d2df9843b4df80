//! PostgreSQL Repository Implementations

use sqlx::PgPool;

use crate::domain::entity::audit_event::AuditEvent;
use crate::domain::repository::AuditRepository;
use crate::error::AuthResult;

/// PostgreSQL-backed audit log
#[derive(Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AuditRepository for PgAuditRepository {
    async fn create_audit(&self, event: &AuditEvent) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_audit_events (
                audit_event_id,
                event_name,
                user_id,
                created_at
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event.id.into_uuid())
        .bind(event.event_name.code())
        .bind(&event.user_id)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            event_name = %event.event_name,
            user_id = %event.user_id,
            "Audit event recorded"
        );

        Ok(())
    }
}
