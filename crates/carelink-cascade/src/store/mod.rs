//! Data-access abstraction consumed by the engine.
//!
//! The engine never talks to a database directly; it walks and mutates
//! through [`DependentStore`]. The trait is async and object-safe so the
//! facade can hold `Arc<dyn DependentStore>` over whatever backend the
//! deployment wires in (the bundled [`in_memory`] reference backend, or a
//! SQL-backed one in production).
//!
//! # Atomicity
//!
//! [`DependentStore::apply`] is the engine's single transactional boundary:
//! the whole ordered [`CascadePlan`] either applies completely or not at all.
//! Implementations own the transaction primitive; the planner owns ordering
//! and refusal, never atomicity itself.
//!
//! # Method receivers
//!
//! All methods take `&self`: one store instance is shared across concurrent
//! request handlers, so implementations synchronize internally (the reference
//! backend wraps its state in `Arc<tokio::sync::Mutex<_>>`).

use crate::catalog::RelationDescriptor;
use crate::domain::{EntityId, EntityRef, EntityType, RootEntity};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

pub mod in_memory;

/// Read and mutate operations the engine needs from a backend.
///
/// # Error Handling
///
/// Implementations map their transport/timeout failures to
/// `Error::StoreUnavailable` and conflicting applies to
/// `Error::ConcurrentModification`. Reads of absent records are not errors:
/// `fetch_root` returns `None` and `find_dependents` returns an empty list.
#[async_trait]
pub trait DependentStore: Send + Sync {
    /// Fetch the root entity targeted for deletion.
    ///
    /// Returns `None` if no record of that type and id exists.
    async fn fetch_root(
        &self,
        entity_type: EntityType,
        id: &EntityId,
    ) -> Result<Option<RootEntity>>;

    /// Ids of the records that reference `owner` through `relation`.
    ///
    /// The returned order must be stable for unchanged state, so that
    /// repeated analyses produce identical reports.
    async fn find_dependents(
        &self,
        owner: &EntityRef,
        relation: &RelationDescriptor,
    ) -> Result<Vec<EntityId>>;

    /// Apply a cascade plan as a single atomic unit.
    ///
    /// Ops are applied in plan order, the root is removed last. If the root
    /// or any planned record no longer exists, the whole plan fails with
    /// `Error::ConcurrentModification` and no mutation becomes visible.
    async fn apply(&self, plan: CascadePlan) -> Result<()>;
}

/// An ordered, fully resolved deletion/detach sequence for one root.
///
/// Built by the planner from a fresh traversal; never persisted or reused
/// across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    /// The root entity, removed after all ops have applied.
    pub root: EntityRef,

    /// Deletes and detaches, deepest dependents first.
    pub ops: Vec<PlannedOp>,
}

impl CascadePlan {
    /// Every record this plan removes, including the root.
    ///
    /// Stores use this to resolve detaches: a detach severs the links between
    /// a surviving record and the records being deleted.
    pub fn deleted_set(&self) -> HashSet<EntityRef> {
        let mut deleted = HashSet::new();
        for op in &self.ops {
            if let PlannedOp::DeleteMany { entity_type, ids } = op {
                for id in ids {
                    deleted.insert(EntityRef::new(*entity_type, id.clone()));
                }
            }
        }
        deleted.insert(self.root.clone());
        deleted
    }

    /// Total number of records the plan touches, excluding the root.
    pub fn record_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                PlannedOp::DeleteMany { ids, .. } | PlannedOp::DetachMany { ids, .. } => ids.len(),
            })
            .sum()
    }
}

/// One batched step of a cascade plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedOp {
    /// Delete the given records outright.
    DeleteMany {
        /// Entity type of every id in the batch.
        entity_type: EntityType,
        /// Records to delete.
        ids: Vec<EntityId>,
    },

    /// Sever the given records' links to the deleted subtree; the records
    /// themselves survive.
    DetachMany {
        /// The relation whose links are severed.
        relation: RelationDescriptor,
        /// Records to detach.
        ids: Vec<EntityId>,
    },
}
