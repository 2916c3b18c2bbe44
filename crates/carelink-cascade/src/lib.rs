//! carelink-cascade - the cascade deletion and impact analysis engine of the
//! CareLink hospital-coordination backend.
//!
//! Deleting a hospital touches everything that references it: coordinators,
//! case records, alerts, communication threads. This crate decides what that
//! deletion means and carries it out safely:
//!
//! - the [`catalog`] declares every dependent relation and its policy
//!   (block, cascade-delete, re-parent, ignore) as data;
//! - the [`walker`] discovers the transitive closure of affected records,
//!   deduplicated and depth-bounded;
//! - [`classify`] reduces the discovered set into an [`domain::ImpactReport`]
//!   for the caller's confirmation UI;
//! - the [`planner`] re-validates and applies the cascade deepest-first as a
//!   single atomic unit against the [`store`];
//! - the [`service`] facade exposes the two-phase protocol
//!   (`analyze_hospital_deletion`, `execute_hospital_deletion`) and maps all
//!   failures into tagged results.
//!
//! The engine is a library invoked per-request by the route layer; it owns no
//! background tasks and caches nothing across calls.
//!
//! # Example
//!
//! ```no_run
//! use carelink_cascade::audit::LogAuditSink;
//! use carelink_cascade::catalog::RelationCatalog;
//! use carelink_cascade::config::EngineConfig;
//! use carelink_cascade::domain::{ActorContext, CascadeOptions, EntityId};
//! use carelink_cascade::service::CascadeService;
//! use carelink_cascade::store::in_memory::InMemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store = InMemoryStore::new();
//!     let service = CascadeService::new(
//!         Arc::new(store.clone()),
//!         Arc::new(RelationCatalog::carelink()),
//!         Arc::new(LogAuditSink),
//!         EngineConfig::default(),
//!     );
//!
//!     let hospital = EntityId::from("H1");
//!     let report = service
//!         .analyze_hospital_deletion(&hospital, &CascadeOptions::default())
//!         .await;
//!     // Show the report to the operator for confirmation, then:
//!     let outcome = service
//!         .execute_hospital_deletion(
//!             &hospital,
//!             &CascadeOptions::default(),
//!             &ActorContext::new("admin-7"),
//!         )
//!         .await;
//!     let _ = (report, outcome);
//! }
//! ```

#![forbid(unsafe_code)]

pub mod audit;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod planner;
pub mod service;
pub mod store;
pub mod walker;
