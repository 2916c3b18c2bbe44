//! The relation catalog: a declarative table of every dependent relation.
//!
//! The catalog replaces per-entity branching with data. Each owning entity
//! type maps to an ordered list of [`RelationDescriptor`]s; the rest of the
//! engine iterates that list and never names a concrete entity type. Adding a
//! dependent entity type is a one-row change here.
//!
//! Catalogs are built once at process start and shared immutably (wrap in
//! `Arc`); there is no mutable singleton.

use crate::domain::{CascadeOptions, CascadePolicy, EntityType};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// How dependent records reference their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// The dependent carries a foreign key to a single owner.
    OneToMany,

    /// Dependents link to owners through a join table.
    ManyToMany {
        /// Name of the join table.
        join_table: &'static str,
    },
}

/// Caller option capable of overriding a BLOCK policy.
///
/// A descriptor names the flag that unlocks it, so the walk and the
/// classifier stay data-driven; widening the options record later is a
/// catalog change, not a control-flow change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOverride {
    /// `includeCoordinatorCascade`: permits deleting coordinators and,
    /// transitively, the records they own.
    CoordinatorCascade,
}

/// Static metadata for one dependent relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Relation name, also the `type` field of emitted actions.
    pub name: &'static str,

    /// Entity type of the dependent records.
    pub entity_type: EntityType,

    /// Foreign-key path back to the owner (informational for join tables).
    pub foreign_key: &'static str,

    /// One-to-many or many-to-many.
    pub cardinality: Cardinality,

    /// What the engine does with dependents found through this relation.
    pub policy: CascadePolicy,

    /// The caller option (if any) that downgrades a BLOCK to a cascade.
    pub block_override: Option<BlockOverride>,
}

impl RelationDescriptor {
    /// The policy after applying any caller-granted override.
    ///
    /// A BLOCK whose override flag is set behaves exactly like
    /// CASCADE_DELETE: it is recursed into and its dependents are deleted.
    pub fn effective_policy(&self, options: &CascadeOptions) -> CascadePolicy {
        let overridden = match self.block_override {
            Some(BlockOverride::CoordinatorCascade) => options.include_coordinator_cascade,
            None => false,
        };
        if self.policy == CascadePolicy::Block && overridden {
            CascadePolicy::CascadeDelete
        } else {
            self.policy
        }
    }
}

/// Immutable, ordered mapping from owning entity type to its dependent
/// relations.
///
/// Order matters: it fixes traversal order and, through it, deletion order.
#[derive(Debug, Clone)]
pub struct RelationCatalog {
    by_owner: HashMap<EntityType, Vec<RelationDescriptor>>,
}

impl RelationCatalog {
    /// Build a catalog from an explicit table.
    pub fn new(table: Vec<(EntityType, Vec<RelationDescriptor>)>) -> Self {
        Self {
            by_owner: table.into_iter().collect(),
        }
    }

    /// The CareLink production catalog.
    pub fn carelink() -> Self {
        Self::new(vec![
            (
                EntityType::Hospital,
                vec![
                    RelationDescriptor {
                        name: "coordinators",
                        entity_type: EntityType::Coordinator,
                        foreign_key: "hospital_id",
                        cardinality: Cardinality::OneToMany,
                        policy: CascadePolicy::Block,
                        block_override: Some(BlockOverride::CoordinatorCascade),
                    },
                    RelationDescriptor {
                        name: "case_records",
                        entity_type: EntityType::CaseRecord,
                        foreign_key: "hospital_id",
                        cardinality: Cardinality::OneToMany,
                        policy: CascadePolicy::CascadeDelete,
                        block_override: None,
                    },
                    RelationDescriptor {
                        name: "alerts",
                        entity_type: EntityType::Alert,
                        foreign_key: "hospital_id",
                        cardinality: Cardinality::OneToMany,
                        policy: CascadePolicy::CascadeDelete,
                        block_override: None,
                    },
                    RelationDescriptor {
                        name: "communications",
                        entity_type: EntityType::CommunicationThread,
                        foreign_key: "hospital_id",
                        cardinality: Cardinality::ManyToMany {
                            join_table: "hospital_communications",
                        },
                        policy: CascadePolicy::ReParent,
                        block_override: None,
                    },
                    RelationDescriptor {
                        name: "audit_entries",
                        entity_type: EntityType::AuditEntry,
                        foreign_key: "hospital_id",
                        cardinality: Cardinality::OneToMany,
                        policy: CascadePolicy::Ignore,
                        block_override: None,
                    },
                ],
            ),
            (
                EntityType::Coordinator,
                vec![
                    RelationDescriptor {
                        name: "case_records",
                        entity_type: EntityType::CaseRecord,
                        foreign_key: "coordinator_id",
                        cardinality: Cardinality::OneToMany,
                        policy: CascadePolicy::CascadeDelete,
                        block_override: None,
                    },
                    RelationDescriptor {
                        name: "alerts",
                        entity_type: EntityType::Alert,
                        foreign_key: "coordinator_id",
                        cardinality: Cardinality::OneToMany,
                        policy: CascadePolicy::CascadeDelete,
                        block_override: None,
                    },
                ],
            ),
        ])
    }

    /// Ordered descriptors for the given owning entity type.
    ///
    /// Pure and deterministic; owners without dependents yield an empty
    /// slice.
    pub fn descriptors_for(&self, owner: EntityType) -> &[RelationDescriptor] {
        self.by_owner.get(&owner).map_or(&[], Vec::as_slice)
    }

    /// Check catalog invariants.
    ///
    /// Each owner must list a dependent (entity type, foreign key) pair at
    /// most once, and override flags only make sense on BLOCK policies.
    pub fn validate(&self) -> Result<()> {
        for (owner, descriptors) in &self.by_owner {
            let mut seen: Vec<(EntityType, &'static str)> = Vec::new();
            for descriptor in descriptors {
                let key = (descriptor.entity_type, descriptor.foreign_key);
                if seen.contains(&key) {
                    return Err(Error::Catalog(format!(
                        "duplicate descriptor for {} -> {} via '{}'",
                        owner, descriptor.entity_type, descriptor.foreign_key
                    )));
                }
                seen.push(key);

                if descriptor.block_override.is_some()
                    && descriptor.policy != CascadePolicy::Block
                {
                    return Err(Error::Catalog(format!(
                        "relation '{}' declares a block override but its policy is not BLOCK",
                        descriptor.name
                    )));
                }
            }
        }
        Ok(())
    }
}
