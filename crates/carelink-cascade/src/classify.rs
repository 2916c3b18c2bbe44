//! Pure reduction of a discovered dependency set into an impact report.
//!
//! No I/O happens here: given the same nodes and options, the output is
//! identical down to action ordering, which is what makes repeated analyses
//! of unchanged state byte-identical on the wire.

use crate::domain::{
    ActionDescription, CascadeOptions, CascadePolicy, EntityId, ImpactReport,
};
use crate::walker::DependencyNode;

/// Reduce `nodes` into an [`ImpactReport`] for `root_id`.
///
/// Nodes are grouped per relation name in first-seen (traversal) order. The
/// report flags blocking dependencies when any group's effective policy is
/// still BLOCK after applying the caller's options.
pub fn classify(
    root_id: &EntityId,
    nodes: &[DependencyNode],
    options: &CascadeOptions,
) -> ImpactReport {
    struct Group {
        relation: &'static str,
        policy: CascadePolicy,
        count: usize,
    }

    let mut groups: Vec<Group> = Vec::new();
    for node in nodes {
        let effective = node.relation.effective_policy(options);
        match groups.iter_mut().find(|g| g.relation == node.relation.name) {
            Some(group) => group.count += 1,
            None => groups.push(Group {
                relation: node.relation.name,
                policy: effective,
                count: 1,
            }),
        }
    }

    let mut has_blocking = false;
    let actions: Vec<ActionDescription> = groups
        .into_iter()
        .map(|group| {
            if group.policy == CascadePolicy::Block {
                has_blocking = true;
            }
            ActionDescription::new(group.relation, group.count, group.policy)
        })
        .collect();

    ImpactReport {
        root_id: root_id.clone(),
        has_blocking_dependencies: has_blocking,
        actions,
        options: *options,
    }
}
