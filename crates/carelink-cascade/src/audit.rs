//! Audit reporting for completed cascades.
//!
//! The engine does not write audit logs itself; after a successful execute it
//! hands a [`CascadeAuditEvent`] to whatever [`AuditSink`] the deployment
//! wired in. A sink failure is logged by the facade and never fails the
//! outcome; the deletion already happened.

use crate::domain::{ActionDescription, EntityRef};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened, to what, on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeAuditEvent {
    /// Id of the user who confirmed the deletion.
    pub acting_user: String,

    /// The removed root.
    pub root: EntityRef,

    /// Display name of the removed root.
    pub root_name: String,

    /// Steps that were performed.
    pub actions: Vec<ActionDescription>,

    /// When the cascade completed.
    pub occurred_at: DateTime<Utc>,
}

/// Collaborator that records completed cascades.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one completed cascade.
    async fn record(&self, event: CascadeAuditEvent) -> Result<()>;
}

/// Default sink: one structured log line per cascade.
pub struct LogAuditSink;

#[async_trait]
impl AuditSink for LogAuditSink {
    async fn record(&self, event: CascadeAuditEvent) -> Result<()> {
        tracing::info!(
            actor = %event.acting_user,
            root = %event.root,
            root_name = %event.root_name,
            actions = event.actions.len(),
            "cascade deletion completed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActionDescription, CascadePolicy, EntityType};

    #[tokio::test]
    async fn log_sink_accepts_events() {
        let sink = LogAuditSink;
        let event = CascadeAuditEvent {
            acting_user: "admin-7".to_string(),
            root: EntityRef::new(EntityType::Hospital, "H1"),
            root_name: "General North".to_string(),
            actions: vec![ActionDescription::new(
                "alerts",
                2,
                CascadePolicy::CascadeDelete,
            )],
            occurred_at: Utc::now(),
        };
        sink.record(event).await.unwrap();
    }

    #[test]
    fn event_serializes_camel_case() {
        let event = CascadeAuditEvent {
            acting_user: "admin-7".to_string(),
            root: EntityRef::new(EntityType::Hospital, "H1"),
            root_name: "General North".to_string(),
            actions: vec![],
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["actingUser"], "admin-7");
        assert_eq!(json["rootName"], "General North");
        assert!(json["occurredAt"].is_string());
    }
}
