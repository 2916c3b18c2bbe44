//! Domain types for cascade deletion and impact analysis.
//!
//! These are the wire-visible and traversal-visible value types. Everything
//! here is transient: reports, actions, and outcomes are created inside one
//! `analyze` or `execute` call and dropped at the response boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a stored record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create a new entity ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Every record kind the engine can encounter while walking away from a
/// hospital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// The root entity targeted for deletion.
    Hospital,

    /// Staff coordinator attached to a hospital.
    Coordinator,

    /// Patient case record, owned by a hospital or a coordinator.
    CaseRecord,

    /// Operational alert raised against a hospital or coordinator.
    Alert,

    /// Communication thread, shared between hospitals via a join table.
    CommunicationThread,

    /// Immutable audit trail entry. Never cascaded.
    AuditEntry,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hospital => "hospital",
            Self::Coordinator => "coordinator",
            Self::CaseRecord => "case_record",
            Self::Alert => "alert",
            Self::CommunicationThread => "communication_thread",
            Self::AuditEntry => "audit_entry",
        };
        write!(f, "{name}")
    }
}

/// A (type, id) pair identifying one record.
///
/// This is the deduplication key for traversals: no record is visited twice
/// for the same root, regardless of how many relation paths reach it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The record's entity type.
    pub entity_type: EntityType,

    /// The record's identifier.
    pub id: EntityId,
}

impl EntityRef {
    /// Create a reference to a record.
    pub fn new(entity_type: EntityType, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// The entity targeted for deletion, as read from the store.
///
/// The engine only ever reads root entities; creating them belongs to the
/// CRUD layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntity {
    /// Unique identifier.
    pub id: EntityId,

    /// Display name, used in action descriptions and audit events.
    pub name: String,
}

/// Caller-supplied flags recognized by both `analyze` and `execute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeOptions {
    /// When true, overrides the BLOCK policy on the coordinator relation and
    /// permits coordinator deletion (and therefore the deletion of records
    /// they own).
    #[serde(default)]
    pub include_coordinator_cascade: bool,
}

/// What the engine is allowed to do with a dependent relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CascadePolicy {
    /// Existence of dependents prevents deletion unless explicitly
    /// overridden by a caller option.
    Block,

    /// Dependents are deleted together with their owner.
    CascadeDelete,

    /// Dependents are detached from the owner and survive it.
    ReParent,

    /// Dependents are retained untouched and never reported.
    Ignore,
}

impl CascadePolicy {
    /// The verb used when describing this policy to a human.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Block => "blocked by",
            Self::CascadeDelete => "delete",
            Self::ReParent => "detach",
            Self::Ignore => "retain",
        }
    }
}

/// One planned step of a cascade, e.g. "delete 4 coordinators".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescription {
    /// The relation the affected records were discovered through.
    #[serde(rename = "type")]
    pub relation: String,

    /// How many records the step covers.
    pub count: usize,

    /// The policy applied to the step.
    pub policy: CascadePolicy,

    /// Human-readable description for confirmation UIs.
    pub description: String,
}

impl ActionDescription {
    /// Build a description for `count` records of `relation` under `policy`.
    pub fn new(relation: &str, count: usize, policy: CascadePolicy) -> Self {
        let noun = relation.replace('_', " ");
        Self {
            relation: relation.to_string(),
            count,
            policy,
            description: format!("{} {count} {noun}", policy.verb()),
        }
    }
}

/// Output of the analyze phase, consumed by the caller's confirmation UI.
///
/// Immutable once produced. Every `execute` re-derives a fresh report against
/// current state rather than trusting one handed back by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// The root entity the analysis ran against.
    pub root_id: EntityId,

    /// True when at least one BLOCK-policy relation has dependents and no
    /// caller option overrides it. Execution must refuse while this is set.
    pub has_blocking_dependencies: bool,

    /// Planned steps, one per affected relation, in discovery order.
    pub actions: Vec<ActionDescription>,

    /// The option flags that were honored while producing this report.
    pub options: CascadeOptions,
}

/// Result of the execute phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// Whether the cascade was applied.
    pub success: bool,

    /// Human-readable summary.
    pub message: String,

    /// Steps actually performed (empty on failure).
    pub actions: Vec<ActionDescription>,

    /// Stable failure code when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Identity of the user driving the request, supplied by the caller's
/// authentication layer. The engine only reports it onward for auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    /// Acting user id.
    pub user_id: String,
}

impl ActorContext {
    /// Create an actor context for the given user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
