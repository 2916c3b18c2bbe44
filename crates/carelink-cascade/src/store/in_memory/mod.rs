//! In-memory reference backend using HashMap and petgraph.
//!
//! All data is held in RAM and lost when the process exits. It is suitable
//! for tests and development, and it pins down the behavior a production
//! backend must match: stable dependent ordering, atomic plan application,
//! and conflict detection under concurrent executes.
//!
//! # Thread Safety
//!
//! State lives behind `Arc<tokio::sync::Mutex<_>>`. Every trait operation
//! acquires the lock once; `apply` validates and mutates under a single
//! acquisition, which is what makes the plan atomic and lets the loser of a
//! concurrent-execute race observe a conflict instead of a double delete.

mod inner;
mod trait_impl;

use crate::domain::{EntityId, EntityRef, EntityType};
use crate::error::Result;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory store handle.
///
/// Cloning is cheap and clones share the same underlying state. Seeding and
/// inspection methods live on the concrete type; the engine itself only sees
/// the [`crate::store::DependentStore`] trait.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryStoreInner::new())),
        }
    }

    /// Insert a record and return its reference.
    pub async fn insert(
        &self,
        entity_type: EntityType,
        id: impl Into<EntityId>,
        name: impl Into<String>,
    ) -> EntityRef {
        let entity = EntityRef::new(entity_type, id);
        let mut inner = self.inner.lock().await;
        inner.insert(entity.clone(), name.into());
        entity
    }

    /// Link `dependent` to `owner` under a relation name.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint does not exist.
    pub async fn link(
        &self,
        dependent: &EntityRef,
        owner: &EntityRef,
        relation: &'static str,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.link(dependent, owner, relation)
    }

    /// Whether a record exists.
    pub async fn contains(&self, entity: &EntityRef) -> bool {
        let inner = self.inner.lock().await;
        inner.records.contains_key(entity)
    }

    /// Number of records of the given type.
    pub async fn count_of(&self, entity_type: EntityType) -> usize {
        let inner = self.inner.lock().await;
        inner
            .records
            .keys()
            .filter(|entity| entity.entity_type == entity_type)
            .count()
    }

    /// Whether any relation edge links `dependent` to `owner`.
    pub async fn is_linked(&self, dependent: &EntityRef, owner: &EntityRef) -> bool {
        let inner = self.inner.lock().await;
        match (inner.node_map.get(dependent), inner.node_map.get(owner)) {
            (Some(&from), Some(&to)) => inner.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Snapshot of every record, sorted, for before/after comparisons.
    pub async fn export_all(&self) -> Vec<(EntityRef, String)> {
        let inner = self.inner.lock().await;
        let mut all: Vec<_> = inner
            .records
            .iter()
            .map(|(entity, record)| (entity.clone(), record.name.clone()))
            .collect();
        all.sort();
        all
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
