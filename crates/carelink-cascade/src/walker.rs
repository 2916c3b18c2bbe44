//! Breadth-first discovery of every record affected by a root deletion.
//!
//! The walk starts at the root and visits each of its relation descriptors in
//! catalog order. Dependents found through CASCADE_DELETE or RE_PARENT
//! relations are recursed into with their own descriptors, which is how
//! second-order records (a case record owned by a coordinator owned by the
//! hospital) are found. BLOCK relations are fetched so their counts are
//! visible, but never recursed into: a block halts the cascade at that edge
//! regardless of what lies beneath. IGNORE relations are skipped outright.
//!
//! Deduplication is by (type, id): a record reachable through two paths is
//! reported once. Traversal depth is bounded; exceeding the bound means the
//! catalog is misconfigured into a cycle and the walk fails rather than
//! looping.

use crate::catalog::{RelationCatalog, RelationDescriptor};
use crate::domain::{CascadeOptions, CascadePolicy, EntityRef};
use crate::error::{Error, Result};
use crate::store::DependentStore;
use futures::future;
use std::collections::{HashSet, VecDeque};

/// One discovered record, annotated with how the walk reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    /// The discovered record.
    pub entity: EntityRef,

    /// The descriptor the record was discovered through.
    pub relation: RelationDescriptor,

    /// Relation names from the root down to this record.
    pub path: Vec<&'static str>,

    /// Distance from the root (direct dependents are at depth 1).
    pub depth: usize,
}

/// Frontier entry: a record whose own descriptors are still to be expanded.
struct Pending {
    entity: EntityRef,
    path: Vec<&'static str>,
    depth: usize,
}

/// Catalog-driven breadth-first walker over a [`DependentStore`].
pub struct DependencyWalker<'a> {
    catalog: &'a RelationCatalog,
    store: &'a dyn DependentStore,
    max_depth: usize,
}

impl<'a> DependencyWalker<'a> {
    /// Create a walker with the given traversal depth bound.
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

    /// Discover all records affected by deleting `root`.
    ///
    /// The per-descriptor fetches for one frontier record are issued
    /// concurrently; they touch disjoint record sets and the results are
    /// merged by deduplication, so ordering stays deterministic.
    ///
    /// # Errors
    ///
    /// - `Error::StoreUnavailable` if the backing store cannot be reached
    /// - `Error::DependencyCycleSuspected` if the depth bound is exceeded
    pub async fn walk(
        &self,
        root: &EntityRef,
        options: &CascadeOptions,
    ) -> Result<Vec<DependencyNode>> {
        let mut discovered = Vec::new();
        let mut visited: HashSet<EntityRef> = HashSet::from([root.clone()]);
        let mut queue: VecDeque<Pending> = VecDeque::from([Pending {
            entity: root.clone(),
            path: Vec::new(),
            depth: 0,
        }]);

        while let Some(current) = queue.pop_front() {
            let descriptors = self.catalog.descriptors_for(current.entity.entity_type);
            if descriptors.is_empty() {
                continue;
            }

            let owner = &current.entity;
            let fetched = future::try_join_all(
                descriptors
                    .iter()
                    .filter(|descriptor| descriptor.policy != CascadePolicy::Ignore)
                    .map(|descriptor| async move {
                        let ids = self.store.find_dependents(owner, descriptor).await?;
                        Ok::<_, Error>((descriptor, ids))
                    }),
            )
            .await?;

            for (descriptor, ids) in fetched {
                let effective = descriptor.effective_policy(options);
                for id in ids {
                    let entity = EntityRef::new(descriptor.entity_type, id);
                    if !visited.insert(entity.clone()) {
                        continue;
                    }

                    let depth = current.depth + 1;
                    if depth > self.max_depth {
                        return Err(Error::DependencyCycleSuspected {
                            relation: descriptor.name,
                            max_depth: self.max_depth,
                        });
                    }

                    let mut path = current.path.clone();
                    path.push(descriptor.name);

                    // An unresolved BLOCK halts the cascade at this edge, so
                    // there is nothing actionable beneath it.
                    if matches!(
                        effective,
                        CascadePolicy::CascadeDelete | CascadePolicy::ReParent
                    ) {
                        queue.push_back(Pending {
                            entity: entity.clone(),
                            path: path.clone(),
                            depth,
                        });
                    }

                    discovered.push(DependencyNode {
                        entity,
                        relation: *descriptor,
                        path,
                        depth,
                    });
                }
            }
        }

        Ok(discovered)
    }
}
