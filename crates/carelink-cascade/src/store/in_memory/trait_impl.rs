//! `DependentStore` trait implementation for the in-memory backend.

use super::InMemoryStore;
use crate::catalog::RelationDescriptor;
use crate::domain::{EntityId, EntityRef, EntityType, RootEntity};
use crate::error::{Error, Result};
use crate::store::{CascadePlan, DependentStore, PlannedOp};
use async_trait::async_trait;

#[async_trait]
impl DependentStore for InMemoryStore {
    async fn fetch_root(
        &self,
        entity_type: EntityType,
        id: &EntityId,
    ) -> Result<Option<RootEntity>> {
        let inner = self.inner.lock().await;
        let entity = EntityRef::new(entity_type, id.clone());
        Ok(inner.records.get(&entity).map(|record| RootEntity {
            id: id.clone(),
            name: record.name.clone(),
        }))
    }

    async fn find_dependents(
        &self,
        owner: &EntityRef,
        relation: &RelationDescriptor,
    ) -> Result<Vec<EntityId>> {
        let inner = self.inner.lock().await;
        Ok(inner.dependents_of(owner, relation.entity_type, relation.name))
    }

    async fn apply(&self, plan: CascadePlan) -> Result<()> {
        let mut inner = self.inner.lock().await;

        // === Phase 1: validate against current state (no mutations) ===
        // Anything the plan references that has vanished since the planner's
        // traversal means another cascade won the race.
        if !inner.records.contains_key(&plan.root) {
            return Err(Error::ConcurrentModification(format!(
                "root {} already removed",
                plan.root
            )));
        }
        for op in &plan.ops {
            let (entity_type, ids) = match op {
                PlannedOp::DeleteMany { entity_type, ids } => (*entity_type, ids),
                PlannedOp::DetachMany { relation, ids } => (relation.entity_type, ids),
            };
            for id in ids {
                let entity = EntityRef::new(entity_type, id.clone());
                if !inner.records.contains_key(&entity) {
                    return Err(Error::ConcurrentModification(format!(
                        "{entity} removed since analysis"
                    )));
                }
            }
        }

        // === Phase 2: apply in plan order, root last ===
        let deleted = plan.deleted_set();
        for op in &plan.ops {
            match op {
                PlannedOp::DeleteMany { entity_type, ids } => {
                    for id in ids {
                        inner.remove_entity(&EntityRef::new(*entity_type, id.clone()));
                    }
                }
                PlannedOp::DetachMany { relation, ids } => {
                    for id in ids {
                        inner.detach(
                            &EntityRef::new(relation.entity_type, id.clone()),
                            relation.name,
                            &deleted,
                        );
                    }
                }
            }
        }
        inner.remove_entity(&plan.root);

        Ok(())
    }
}
