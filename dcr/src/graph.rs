//! The hierarchical DCR graph: node table, nesting forest, relations and marking.

use std::collections::BTreeSet;

use crate::core::error::EngineError;
use crate::core::forest::{Forest, ForestViolation};
use crate::core::marking::{Marking, MarkingSet};
use crate::core::normalize::ConstraintIndex;
use crate::core::relations::RelationStore;
use crate::core::types::{NodeId, NodeTable, Relation};

/// A graph instance. All mutable state (marking and the constraint index
/// built by normalization) is scoped to one instance; clone it to evaluate
/// independent traces.
#[derive(Debug, Clone, Default)]
pub struct DcrGraph {
    nodes: NodeTable,
    forest: Forest,
    relations: RelationStore,
    marking: Marking,
    constraints: ConstraintIndex,
    normalized: bool,
}

impl DcrGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node name, returning its id. Idempotent.
    pub fn add_event(&mut self, name: &str) -> NodeId {
        let id = self.nodes.intern(name);
        self.forest.ensure(id);
        id
    }

    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes.lookup(name)
    }

    pub fn require(&self, name: &str) -> Result<NodeId, EngineError> {
        self.node(name)
            .ok_or_else(|| EngineError::UnknownNode(name.to_string()))
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.name(id)
    }

    /// Replace the children of `group`, creating any unseen names.
    pub fn set_children(&mut self, group: &str, children: &[&str]) -> Result<(), EngineError> {
        let group_id = self.add_event(group);
        let child_ids: Vec<NodeId> = children.iter().map(|child| self.add_event(child)).collect();
        self.forest
            .set_children(group_id, child_ids)
            .map_err(|violation| self.describe(violation))?;
        self.normalized = false;
        Ok(())
    }

    /// Declare `source -> target` under `kind`, creating any unseen names.
    pub fn add_relation(&mut self, kind: Relation, source: &str, target: &str) {
        let source = self.add_event(source);
        let target = self.add_event(target);
        if self.relations.insert(kind, source, target) {
            self.normalized = false;
        }
    }

    /// Seed the initial marking. Intended for graph construction only;
    /// runtime changes go through `Semantics::execute`.
    pub fn seed_marking(&mut self, which: MarkingSet, names: &[&str]) {
        for name in names {
            let id = self.add_event(name);
            self.marking.set_mut(which).insert(id);
        }
    }

    /// Replace the whole marking, e.g. when resuming a persisted run.
    pub fn restore_marking(&mut self, marking: Marking) {
        self.marking = marking;
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn relations(&self) -> &RelationStore {
        &self.relations
    }

    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    pub fn constraints(&self) -> &ConstraintIndex {
        &self.constraints
    }

    /// True once `update_nests` has run and no structural edit followed.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// An atomic event is a node that is not a group.
    pub fn is_event(&self, id: NodeId) -> bool {
        !self.forest.is_group(id)
    }

    /// Ids of every atomic event, in id order.
    pub fn events(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.ids().filter(|id| self.is_event(*id))
    }

    /// Sorted names for a set of ids.
    pub fn names_of<'a>(&self, ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<String> {
        let mut names: Vec<String> = ids
            .into_iter()
            .map(|id| self.name(*id).to_string())
            .collect();
        names.sort();
        names
    }

    /// Union of the leaf expansions of `targets`.
    pub fn leaves_of<'a>(&self, targets: impl IntoIterator<Item = &'a NodeId>) -> BTreeSet<NodeId> {
        targets
            .into_iter()
            .flat_map(|target| self.forest.leaves(*target))
            .collect()
    }

    pub(crate) fn marking_mut(&mut self) -> &mut Marking {
        &mut self.marking
    }

    pub(crate) fn normalization_parts(
        &mut self,
    ) -> (&Forest, &mut RelationStore, &mut ConstraintIndex) {
        (&self.forest, &mut self.relations, &mut self.constraints)
    }

    #[cfg(test)]
    pub(crate) fn forest_mut(&mut self) -> &mut Forest {
        &mut self.forest
    }

    pub(crate) fn mark_normalized(&mut self) {
        self.normalized = true;
    }

    pub(crate) fn describe(&self, violation: ForestViolation) -> EngineError {
        match violation {
            ForestViolation::Cycle { parent, child } => EngineError::Cycle {
                parent: self.name(parent).to_string(),
                child: self.name(child).to_string(),
            },
            ForestViolation::Corrupt(detail) => EngineError::StructuralCorruption(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_edits_clear_normalized_flag() {
        let mut graph = DcrGraph::new();
        graph.set_children("g", &["a", "b"]).expect("nest");
        graph.mark_normalized();
        graph.add_relation(Relation::Include, "x", "g");
        assert!(!graph.is_normalized());

        graph.mark_normalized();
        graph.add_relation(Relation::Include, "x", "g");
        assert!(graph.is_normalized(), "duplicate edge is not an edit");

        graph.set_children("g", &["a"]).expect("renest");
        assert!(!graph.is_normalized());
    }

    #[test]
    fn cycle_error_names_both_nodes() {
        let mut graph = DcrGraph::new();
        graph.set_children("outer", &["inner"]).expect("outer");
        let err = graph.set_children("inner", &["outer"]).expect_err("cycle");
        assert_eq!(
            err,
            EngineError::Cycle {
                parent: "inner".to_string(),
                child: "outer".to_string(),
            }
        );
    }

    #[test]
    fn events_excludes_groups() {
        let mut graph = DcrGraph::new();
        graph.add_event("x");
        graph.set_children("g", &["a", "b"]).expect("nest");
        let names = graph.names_of(graph.events().collect::<Vec<_>>().iter());
        assert_eq!(names, vec!["a", "b", "x"]);
    }
}
