//! Audit Event Entity

use chrono::{DateTime, Utc};
use derive_more::Display;
use kernel::id::AuditEventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuditEventName {
    #[display("auth.session-created")]
    SessionCreated,
    #[display("auth.session-destroyed")]
    SessionDestroyed,
}

impl AuditEventName {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            AuditEventName::SessionCreated => "auth.session-created",
            AuditEventName::SessionDestroyed => "auth.session-destroyed",
        }
    }
}

/// Security event keyed by the subject of the ID token.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub event_name: AuditEventName,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(event_name: AuditEventName, user_id: impl Into<String>) -> Self {
        Self {
            id: AuditEventId::new(),
            event_name,
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(AuditEventName::SessionCreated.code(), "auth.session-created");
        assert_eq!(
            AuditEventName::SessionDestroyed.to_string(),
            "auth.session-destroyed"
        );
    }

    #[test]
    fn test_new_event() {
        let event = AuditEvent::new(AuditEventName::SessionCreated, "u1");
        assert_eq!(event.user_id, "u1");
        assert_eq!(event.event_name, AuditEventName::SessionCreated);
    }
}
