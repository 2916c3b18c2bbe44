//! Core in-memory store data structures.
//!
//! The inner structure holds all records and the relation graph; it is
//! wrapped in `Arc<Mutex<>>` by the public handle for thread safety.
//!
//! # Graph Representation
//!
//! Relations are a petgraph `DiGraph` with edges directed from **dependent to
//! owner** (source references target). The edge weight is the relation name,
//! which is what `find_dependents` filters on; one-to-many foreign keys and
//! many-to-many join rows are both represented as labelled edges, so the
//! traversal code does not branch on cardinality.

use crate::domain::{EntityId, EntityRef, EntityType};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// Payload kept per record. Links live in the graph, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredRecord {
    /// Display name.
    pub(crate) name: String,
}

/// Inner store structure (not thread-safe on its own).
pub(crate) struct InMemoryStoreInner {
    /// Records indexed by (type, id) for O(1) lookups.
    pub(super) records: HashMap<EntityRef, StoredRecord>,

    /// Relation graph. Edge direction: dependent -> owner, weight is the
    /// relation name.
    pub(super) graph: DiGraph<EntityRef, &'static str>,

    /// Mapping from record to graph node. Every record in `records` has a
    /// node here and vice versa.
    pub(super) node_map: HashMap<EntityRef, NodeIndex>,
}

impl InMemoryStoreInner {
    /// Create an empty store.
    pub(crate) fn new() -> Self {
        Self {
            records: HashMap::new(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Insert a record, creating its graph node. Re-inserting an existing
    /// record only refreshes the display name.
    pub(super) fn insert(&mut self, entity: EntityRef, name: String) {
        if !self.node_map.contains_key(&entity) {
            let node = self.graph.add_node(entity.clone());
            self.node_map.insert(entity.clone(), node);
        }
        self.records.insert(entity, StoredRecord { name });
    }

    /// Link `dependent` to `owner` under the given relation name.
    ///
    /// Both endpoints must exist. Re-linking an existing edge is a no-op.
    pub(super) fn link(
        &mut self,
        dependent: &EntityRef,
        owner: &EntityRef,
        relation: &'static str,
    ) -> Result<()> {
        let from = *self
            .node_map
            .get(dependent)
            .ok_or_else(|| Error::Store(format!("cannot link unknown record {dependent}")))?;
        let to = *self
            .node_map
            .get(owner)
            .ok_or_else(|| Error::Store(format!("cannot link to unknown record {owner}")))?;

        let already_linked = self
            .graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == relation);
        if !already_linked {
            self.graph.add_edge(from, to, relation);
        }
        Ok(())
    }

    /// Remove a record and all its incident edges.
    pub(super) fn remove_entity(&mut self, entity: &EntityRef) {
        if let Some(node) = self.node_map.remove(entity) {
            self.graph.remove_node(node);
            // petgraph swap-removes: the former last node now occupies
            // `node`, so its map entry must be re-pointed.
            if let Some(moved) = self.graph.node_weight(node) {
                self.node_map.insert(moved.clone(), node);
            }
        }
        self.records.remove(entity);
    }

    /// Sever `dependent`'s edges named `relation` that point at any record in
    /// `owners`. The dependent record itself survives.
    pub(super) fn detach(
        &mut self,
        dependent: &EntityRef,
        relation: &'static str,
        owners: &HashSet<EntityRef>,
    ) {
        let Some(&node) = self.node_map.get(dependent) else {
            return;
        };
        loop {
            let next = self
                .graph
                .edges_directed(node, Direction::Outgoing)
                .find(|edge| {
                    *edge.weight() == relation && owners.contains(&self.graph[edge.target()])
                })
                .map(|edge| edge.id());
            match next {
                Some(edge) => {
                    self.graph.remove_edge(edge);
                }
                None => break,
            }
        }
    }

    /// Ids of records of `entity_type` that reference `owner` through the
    /// relation named `relation`, in sorted order.
    pub(super) fn dependents_of(
        &self,
        owner: &EntityRef,
        entity_type: EntityType,
        relation: &str,
    ) -> Vec<EntityId> {
        let Some(&node) = self.node_map.get(owner) else {
            return Vec::new();
        };
        let mut ids: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|edge| *edge.weight() == relation)
            .map(|edge| self.graph[edge.source()].clone())
            .filter(|dependent| dependent.entity_type == entity_type)
            .map(|dependent| dependent.id)
            .collect();
        // Sorted so that repeated analyses of unchanged state are identical.
        ids.sort();
        ids
    }
}
