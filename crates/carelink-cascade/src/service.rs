//! Public two-phase facade: analyze, then execute.
//!
//! [`CascadeService`] is the only surface external callers (the route layer)
//! see. `analyze` is always read-only; `execute` re-validates against current
//! state before touching anything. Both calls return tagged results; no
//! internal failure crosses this boundary as anything other than a
//! [`ServiceError`] code or a failed [`ExecutionOutcome`].

use crate::audit::{AuditSink, CascadeAuditEvent};
use crate::catalog::RelationCatalog;
use crate::classify::classify;
use crate::config::EngineConfig;
use crate::domain::{
    ActorContext, CascadeOptions, EntityId, EntityRef, EntityType, ExecutionOutcome, ImpactReport,
};
use crate::error::Error;
use crate::planner::ExecutionPlanner;
use crate::store::DependentStore;
use crate::walker::DependencyWalker;
use chrono::Utc;
use std::sync::Arc;

/// Tagged failure shape handed to the route layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Stable failure code (`blocked_by_dependencies`, `root_not_found`, …).
    pub code: &'static str,

    /// Human-readable detail.
    pub message: String,
}

impl From<Error> for ServiceError {
    fn from(err: Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// The cascade deletion engine's public surface.
///
/// Owns no mutable state of its own; the store, catalog, and audit sink are
/// shared immutable collaborators, so one service instance serves concurrent
/// requests.
pub struct CascadeService {
    store: Arc<dyn DependentStore>,
    catalog: Arc<RelationCatalog>,
    audit: Arc<dyn AuditSink>,
    config: EngineConfig,
}

impl CascadeService {
    /// Assemble the engine from its collaborators.
    pub fn new(
        store: Arc<dyn DependentStore>,
        catalog: Arc<RelationCatalog>,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            audit,
            config,
        }
    }

    /// Dry-run: compute the impact of deleting `hospital_id` without
    /// mutating anything.
    pub async fn analyze_hospital_deletion(
        &self,
        hospital_id: &EntityId,
        options: &CascadeOptions,
    ) -> Result<ImpactReport, ServiceError> {
        match self.analyze_inner(hospital_id, options).await {
            Ok(report) => Ok(report),
            Err(err) => {
                log_failure("analyze", hospital_id, &err);
                Err(ServiceError::from(err))
            }
        }
    }

    async fn analyze_inner(
        &self,
        hospital_id: &EntityId,
        options: &CascadeOptions,
    ) -> Result<ImpactReport, Error> {
        let root_entity = self
            .store
            .fetch_root(EntityType::Hospital, hospital_id)
            .await?
            .ok_or_else(|| Error::RootNotFound(hospital_id.clone()))?;
        let root = EntityRef::new(EntityType::Hospital, root_entity.id);

        let walker =
            DependencyWalker::new(&self.catalog, self.store.as_ref(), self.config.max_walk_depth);
        let nodes = walker.walk(&root, options).await?;
        Ok(classify(hospital_id, &nodes, options))
    }

    /// Execute the cascade for `hospital_id`.
    ///
    /// Always re-analyzes against current state first; a report previously
    /// returned by [`Self::analyze_hospital_deletion`] is only a preview. On
    /// success the acting user is reported to the audit sink.
    pub async fn execute_hospital_deletion(
        &self,
        hospital_id: &EntityId,
        options: &CascadeOptions,
        actor: &ActorContext,
    ) -> ExecutionOutcome {
        let planner =
            ExecutionPlanner::new(&self.catalog, self.store.as_ref(), self.config.max_walk_depth);

        match planner
            .execute(EntityType::Hospital, hospital_id, options)
            .await
        {
            Ok(executed) => {
                let event = CascadeAuditEvent {
                    acting_user: actor.user_id.clone(),
                    root: EntityRef::new(EntityType::Hospital, executed.root.id.clone()),
                    root_name: executed.root.name.clone(),
                    actions: executed.actions.clone(),
                    occurred_at: Utc::now(),
                };
                if let Err(err) = self.audit.record(event).await {
                    tracing::warn!(
                        root = %hospital_id,
                        error = %err,
                        "audit sink rejected cascade event"
                    );
                }

                ExecutionOutcome {
                    success: true,
                    message: format!(
                        "hospital {} deleted ({} dependent action(s))",
                        hospital_id,
                        executed.actions.len().saturating_sub(1)
                    ),
                    actions: executed.actions,
                    error: None,
                }
            }
            Err(err) => {
                log_failure("execute", hospital_id, &err);
                ExecutionOutcome {
                    success: false,
                    message: err.to_string(),
                    actions: Vec::new(),
                    error: Some(err.code().to_string()),
                }
            }
        }
    }
}

/// Expected failures stay quiet; defects get loud.
fn log_failure(stage: &'static str, root: &EntityId, err: &Error) {
    match err {
        Error::BlockedByDependencies { .. }
        | Error::ConcurrentModification(_)
        | Error::RootNotFound(_) => {
            tracing::debug!(stage, root = %root, error = %err, "cascade refused");
        }
        Error::StoreUnavailable(_) => {
            tracing::warn!(stage, root = %root, error = %err, "store unavailable");
        }
        Error::DependencyCycleSuspected { .. }
        | Error::Catalog(_)
        | Error::Config(_)
        | Error::Store(_)
        | Error::Io(_) => {
            tracing::error!(stage, root = %root, error = %err, "cascade engine defect");
        }
    }
}
