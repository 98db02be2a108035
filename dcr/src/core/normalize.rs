//! Nesting normalization: materialize group-level relations on leaf events.
//!
//! Two top-down walks over the forest:
//!
//! 1. **fall-down** copies every outgoing relation of a node onto each of its
//!    children, so descendants carry their ancestors' outgoing edges;
//! 2. **transfer** copies every incoming relation of a node onto each of its
//!    children, using a constraint index built from the post-fall-down store.
//!
//! Group-level edges are kept. Edges live in sets, so re-running converges to
//! the same store.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::EngineError;
use crate::core::forest::Forest;
use crate::core::relations::RelationStore;
use crate::core::types::{NodeId, Relation};
use crate::graph::DcrGraph;

/// Incoming `(source, kind)` pairs per target node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintIndex {
    incoming: BTreeMap<NodeId, BTreeSet<(NodeId, Relation)>>,
}

impl ConstraintIndex {
    pub fn incoming(&self, target: NodeId) -> impl Iterator<Item = (NodeId, Relation)> + '_ {
        self.incoming
            .get(&target)
            .into_iter()
            .flat_map(|pairs| pairs.iter().copied())
    }

    fn record(&mut self, target: NodeId, source: NodeId, kind: Relation) {
        self.incoming
            .entry(target)
            .or_default()
            .insert((source, kind));
    }

    fn clear(&mut self) {
        self.incoming.clear();
    }
}

/// Counters reported by one normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub edges_before: usize,
    pub edges_after: usize,
    pub fall_down_added: usize,
    pub transfer_added: usize,
    pub nodes_visited: usize,
}

/// Normalize `graph` in place.
///
/// Fails with `StructuralCorruption` before touching the relation store if
/// the forest is not a proper forest.
pub fn update_nests(graph: &mut DcrGraph) -> Result<NormalizeSummary, EngineError> {
    graph
        .forest()
        .check_structure()
        .map_err(|violation| graph.describe(violation))?;

    let (forest, relations, constraints) = graph.normalization_parts();
    let mut summary = NormalizeSummary {
        edges_before: relations.edge_count(),
        ..NormalizeSummary::default()
    };

    for node in preorder(forest) {
        summary.nodes_visited += 1;
        summary.fall_down_added += fall_down(forest, relations, node);
    }

    constraints.clear();
    for (kind, source, target) in relations.edges().collect::<Vec<_>>() {
        constraints.record(target, source, kind);
    }

    for node in preorder(forest) {
        summary.transfer_added += transfer(forest, relations, constraints, node);
    }

    summary.edges_after = relations.edge_count();
    graph.mark_normalized();
    Ok(summary)
}

/// Give each child of `node` every outgoing edge of `node`.
fn fall_down(forest: &Forest, relations: &mut RelationStore, node: NodeId) -> usize {
    if forest.is_leaf(node) || !relations.is_source(node) {
        return 0;
    }
    let mut added = 0;
    for child in forest.children(node) {
        for kind in Relation::ALL {
            let inherited: Vec<NodeId> = relations.targets(kind, node).iter().copied().collect();
            if inherited.is_empty() {
                continue;
            }
            added += relations.extend(kind, child, inherited);
        }
    }
    added
}

/// Make each child of `node` a target of every edge pointing at `node`.
fn transfer(
    forest: &Forest,
    relations: &mut RelationStore,
    constraints: &mut ConstraintIndex,
    node: NodeId,
) -> usize {
    if forest.is_leaf(node) {
        return 0;
    }
    let pairs: Vec<(NodeId, Relation)> = constraints.incoming(node).collect();
    let mut added = 0;
    for child in forest.children(node) {
        for (source, kind) in &pairs {
            if relations.insert(*kind, *source, child) {
                added += 1;
            }
            constraints.record(child, *source, *kind);
        }
    }
    added
}

/// Parents before children, roots in id order. The caller has already
/// checked the structure, so every node appears exactly once.
fn preorder(forest: &Forest) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(forest.len());
    let mut stack: Vec<NodeId> = forest.roots().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        order.push(node);
        let mut children: Vec<NodeId> = forest.children(node).collect();
        children.reverse();
        stack.extend(children);
    }
    order
}
