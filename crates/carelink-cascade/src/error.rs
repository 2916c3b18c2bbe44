//! Error types for cascade operations.
//!
//! The four domain failure kinds the facade must surface are
//! [`Error::StoreUnavailable`] (transient, caller may retry the whole call),
//! [`Error::DependencyCycleSuspected`] (relation catalog defect, fatal),
//! [`Error::BlockedByDependencies`] (expected, user-recoverable), and
//! [`Error::ConcurrentModification`] (expected under races; caller must
//! re-analyze before retrying). Everything else is ambient plumbing.

use crate::domain::{ActionDescription, EntityId};
use thiserror::Error;

/// A specialized Result type for cascade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for cascade operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be reached (or timed out).
    ///
    /// Transient. Never retried internally; the caller decides.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The traversal exceeded its depth bound, which only happens when the
    /// relation catalog is misconfigured into a cycle.
    #[error("dependency cycle suspected: traversal through '{relation}' exceeded depth {max_depth}")]
    DependencyCycleSuspected {
        /// The relation being expanded when the bound was hit.
        relation: &'static str,
        /// The configured depth bound.
        max_depth: usize,
    },

    /// Unresolved BLOCK-policy dependents prevent the deletion.
    ///
    /// The caller must either cancel or re-invoke with options that resolve
    /// the block.
    #[error("deletion blocked by {} unresolved relation(s)", .blocking.len())]
    BlockedByDependencies {
        /// The blocking relations, with counts.
        blocking: Vec<ActionDescription>,
    },

    /// The dependency set changed between analysis and apply in a way that
    /// invalidates the plan. The caller must re-analyze before retrying.
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    /// The root entity does not exist (or no longer exists).
    #[error("root entity not found: {0}")]
    RootNotFound(EntityId),

    /// The relation catalog failed validation.
    #[error("invalid relation catalog: {0}")]
    Catalog(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend-specific store error.
    #[error("store error: {0}")]
    Store(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable wire code for this failure, used by the facade when mapping
    /// into the caller's result shape.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::DependencyCycleSuspected { .. } => "dependency_cycle_suspected",
            Self::BlockedByDependencies { .. } => "blocked_by_dependencies",
            Self::ConcurrentModification(_) => "concurrent_modification",
            Self::RootNotFound(_) => "root_not_found",
            Self::Catalog(_) | Self::Config(_) | Self::Store(_) | Self::Io(_) => "internal",
        }
    }
}
