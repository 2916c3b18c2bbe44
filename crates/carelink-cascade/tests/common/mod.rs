//! Common test utilities shared across integration tests.

use async_trait::async_trait;
use carelink_cascade::audit::{AuditSink, CascadeAuditEvent, LogAuditSink};
use carelink_cascade::catalog::{RelationCatalog, RelationDescriptor};
use carelink_cascade::config::EngineConfig;
use carelink_cascade::domain::{EntityId, EntityRef, EntityType, RootEntity};
use carelink_cascade::error::{Error, Result};
use carelink_cascade::service::CascadeService;
use carelink_cascade::store::in_memory::InMemoryStore;
use carelink_cascade::store::{CascadePlan, DependentStore};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Service over the given store with the production catalog, a log audit
/// sink, and default config.
pub fn service_over(store: &InMemoryStore) -> CascadeService {
    CascadeService::new(
        Arc::new(store.clone()),
        Arc::new(RelationCatalog::carelink()),
        Arc::new(LogAuditSink),
        EngineConfig::default(),
    )
}

/// Service over an arbitrary store and audit sink.
pub fn service_with(
    store: Arc<dyn DependentStore>,
    audit: Arc<dyn AuditSink>,
) -> CascadeService {
    CascadeService::new(
        store,
        Arc::new(RelationCatalog::carelink()),
        audit,
        EngineConfig::default(),
    )
}

/// Canonical fixture: hospital H1 with 3 coordinators (BLOCK) and
/// 5 case records reachable only through the coordinators.
pub async fn seed_h1(store: &InMemoryStore) -> EntityRef {
    let hospital = store
        .insert(EntityType::Hospital, "H1", "General North")
        .await;

    let mut coordinators = Vec::new();
    for i in 1..=3 {
        let coordinator = store
            .insert(
                EntityType::Coordinator,
                format!("C{i}"),
                format!("Coordinator {i}"),
            )
            .await;
        store
            .link(&coordinator, &hospital, "coordinators")
            .await
            .unwrap();
        coordinators.push(coordinator);
    }

    // 5 case records spread over the coordinators: 2 + 2 + 1.
    let spread = [0, 0, 1, 1, 2];
    for (i, owner) in spread.iter().enumerate() {
        let case = store
            .insert(
                EntityType::CaseRecord,
                format!("CR{}", i + 1),
                format!("Case {}", i + 1),
            )
            .await;
        store
            .link(&case, &coordinators[*owner], "case_records")
            .await
            .unwrap();
    }

    hospital
}

/// Audit sink that remembers every event it receives.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<CascadeAuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<CascadeAuditEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: CascadeAuditEvent) -> Result<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// Store whose reads fail the way a timed-out database does.
pub struct UnavailableStore;

#[async_trait]
impl DependentStore for UnavailableStore {
    async fn fetch_root(
        &self,
        _entity_type: EntityType,
        id: &EntityId,
    ) -> Result<Option<RootEntity>> {
        // The root read succeeds so the failure surfaces mid-walk.
        Ok(Some(RootEntity {
            id: id.clone(),
            name: "General North".to_string(),
        }))
    }

    async fn find_dependents(
        &self,
        _owner: &EntityRef,
        _relation: &RelationDescriptor,
    ) -> Result<Vec<EntityId>> {
        Err(Error::StoreUnavailable("connection timed out".to_string()))
    }

    async fn apply(&self, _plan: CascadePlan) -> Result<()> {
        Err(Error::StoreUnavailable("connection timed out".to_string()))
    }
}
