//! Ordering and execution of a confirmed cascade.
//!
//! The planner never trusts a report handed back by the caller: state may
//! have changed between analyze and execute (a second administrator, new
//! alerts). Every execute re-runs the walk and the classification against
//! current state, refuses if unresolved blocks remain, and only then builds
//! the ordered plan and hands it to the store's atomic apply.

use crate::catalog::{RelationCatalog, RelationDescriptor};
use crate::classify::classify;
use crate::domain::{
    ActionDescription, CascadeOptions, CascadePolicy, EntityId, EntityRef, EntityType, RootEntity,
};
use crate::error::{Error, Result};
use crate::store::{CascadePlan, DependentStore, PlannedOp};
use crate::walker::{DependencyNode, DependencyWalker};

/// A successfully applied cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCascade {
    /// The root entity as it was read just before removal.
    pub root: RootEntity,

    /// Steps performed, the root's own removal last.
    pub actions: Vec<ActionDescription>,
}

/// Re-validates and executes cascades against a [`DependentStore`].
pub struct ExecutionPlanner<'a> {
    catalog: &'a RelationCatalog,
    store: &'a dyn DependentStore,
    max_depth: usize,
}

impl<'a> ExecutionPlanner<'a> {
    /// Create a planner sharing the walker's depth bound.
    pub fn new(
        catalog: &'a RelationCatalog,
        store: &'a dyn DependentStore,
        max_depth: usize,
    ) -> Self {
        Self {
            catalog,
            store,
            max_depth,
        }
    }

    /// Execute the cascade for `root_id`.
    ///
    /// # Errors
    ///
    /// - `Error::RootNotFound` when the root no longer exists
    /// - `Error::BlockedByDependencies` when unresolved BLOCK relations
    ///   remain under the given options
    /// - `Error::ConcurrentModification` when the store detects that the
    ///   re-validated dependency set changed before the plan could apply
    /// - `Error::StoreUnavailable` / `Error::DependencyCycleSuspected`
    ///   propagated from the walk
    pub async fn execute(
        &self,
        root_type: EntityType,
        root_id: &EntityId,
        options: &CascadeOptions,
    ) -> Result<ExecutedCascade> {
        let root_entity = self
            .store
            .fetch_root(root_type, root_id)
            .await?
            .ok_or_else(|| Error::RootNotFound(root_id.clone()))?;
        let root = EntityRef::new(root_type, root_entity.id.clone());

        // Fresh traversal and classification; never the caller's copy.
        let walker = DependencyWalker::new(self.catalog, self.store, self.max_depth);
        let nodes = walker.walk(&root, options).await?;
        let report = classify(root_id, &nodes, options);

        if report.has_blocking_dependencies {
            return Err(Error::BlockedByDependencies {
                blocking: report
                    .actions
                    .into_iter()
                    .filter(|action| action.policy == CascadePolicy::Block)
                    .collect(),
            });
        }

        let plan = build_plan(&root, &nodes, options);
        self.store.apply(plan).await?;

        let mut actions = report.actions;
        actions.push(root_action(root_type, &root_entity));
        Ok(ExecutedCascade {
            root: root_entity,
            actions,
        })
    }
}

/// Order the discovered nodes into a plan: deepest dependents first, the
/// root last, detaches ahead of deletes within a depth.
fn build_plan(
    root: &EntityRef,
    nodes: &[DependencyNode],
    options: &CascadeOptions,
) -> CascadePlan {
    let deepest = nodes.iter().map(|node| node.depth).max().unwrap_or(0);

    let mut ops = Vec::new();
    for depth in (1..=deepest).rev() {
        let mut detaches: Vec<(RelationDescriptor, Vec<EntityId>)> = Vec::new();
        let mut deletes: Vec<(EntityType, Vec<EntityId>)> = Vec::new();

        for node in nodes.iter().filter(|node| node.depth == depth) {
            match node.relation.effective_policy(options) {
                CascadePolicy::CascadeDelete => {
                    let entity_type = node.entity.entity_type;
                    match deletes.iter_mut().find(|(t, _)| *t == entity_type) {
                        Some((_, ids)) => ids.push(node.entity.id.clone()),
                        None => deletes.push((entity_type, vec![node.entity.id.clone()])),
                    }
                }
                CascadePolicy::ReParent => {
                    match detaches
                        .iter_mut()
                        .find(|(relation, _)| relation.name == node.relation.name)
                    {
                        Some((_, ids)) => ids.push(node.entity.id.clone()),
                        None => detaches.push((node.relation, vec![node.entity.id.clone()])),
                    }
                }
                // Unresolved blocks were refused before planning; ignored
                // relations are never walked.
                CascadePolicy::Block | CascadePolicy::Ignore => continue,
            }
        }

        ops.extend(
            detaches
                .into_iter()
                .map(|(relation, ids)| PlannedOp::DetachMany { relation, ids }),
        );
        ops.extend(
            deletes
                .into_iter()
                .map(|(entity_type, ids)| PlannedOp::DeleteMany { entity_type, ids }),
        );
    }

    CascadePlan {
        root: root.clone(),
        ops,
    }
}

fn root_action(root_type: EntityType, root: &RootEntity) -> ActionDescription {
    ActionDescription {
        relation: root_type.to_string(),
        count: 1,
        policy: CascadePolicy::CascadeDelete,
        description: format!("delete {root_type} {}", root.name),
    }
}
