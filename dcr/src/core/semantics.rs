//! Enablement and execution over a graph's marking.
//!
//! [`HierarchicalSemantics`] resolves constraints declared on any ancestor of
//! an event and applies marking effects to every leaf below a targeted group.
//! [`FlatSemantics`] reads direct relations only and is kept as the baseline
//! the hierarchical rules extend.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::core::marking::MarkingSet;
use crate::core::types::{ExecuteSummary, NodeId, Relation};
use crate::graph::DcrGraph;

/// Shared contract for the semantics variants.
pub trait Semantics {
    /// Events that may execute under the current marking. Never mutates.
    fn enabled(&self, graph: &DcrGraph) -> BTreeSet<NodeId>;

    /// Execute `event`, updating the marking in place.
    fn execute(&self, graph: &mut DcrGraph, event: NodeId)
    -> Result<ExecuteSummary, EngineError>;

    /// No included event is pending.
    fn is_accepting(&self, graph: &DcrGraph) -> bool {
        graph.marking().is_accepting()
    }
}

/// Selects a semantics variant, e.g. from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticsKind {
    #[default]
    Hierarchical,
    Flat,
}

impl SemanticsKind {
    pub fn build(self, check_enabled: bool) -> Box<dyn Semantics> {
        match self {
            SemanticsKind::Hierarchical => Box::new(HierarchicalSemantics { check_enabled }),
            SemanticsKind::Flat => Box::new(FlatSemantics { check_enabled }),
        }
    }
}

/// Ancestor-aware semantics for nested graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchicalSemantics {
    /// Reject executions of events outside `enabled`.
    pub check_enabled: bool,
}

impl Default for HierarchicalSemantics {
    fn default() -> Self {
        Self {
            check_enabled: true,
        }
    }
}

impl HierarchicalSemantics {
    /// Targets of `kind` declared on `event` or on any of its ancestors.
    pub fn super_constraints(
        &self,
        graph: &DcrGraph,
        event: NodeId,
        kind: Relation,
    ) -> BTreeSet<NodeId> {
        std::iter::once(event)
            .chain(graph.forest().ancestors(event))
            .flat_map(|node| graph.relations().targets(kind, node).iter().copied())
            .collect()
    }

    /// Leaf expansion of [`Self::super_constraints`].
    pub fn nested_constraints(
        &self,
        graph: &DcrGraph,
        event: NodeId,
        kind: Relation,
    ) -> BTreeSet<NodeId> {
        graph.leaves_of(&self.super_constraints(graph, event, kind))
    }
}

impl Semantics for HierarchicalSemantics {
    fn enabled(&self, graph: &DcrGraph) -> BTreeSet<NodeId> {
        let marking = graph.marking();
        let blocking_conditions = marking.unexecuted_included();
        let blocking_milestones = marking.pending_included();

        marking
            .included
            .iter()
            .copied()
            .filter(|event| {
                self.nested_constraints(graph, *event, Relation::Condition)
                    .is_disjoint(&blocking_conditions)
            })
            .filter(|event| {
                self.nested_constraints(graph, *event, Relation::Milestone)
                    .is_disjoint(&blocking_milestones)
            })
            .collect()
    }

    fn execute(
        &self,
        graph: &mut DcrGraph,
        event: NodeId,
    ) -> Result<ExecuteSummary, EngineError> {
        check_preconditions(self, self.check_enabled, graph, event)?;

        let view: &DcrGraph = graph;
        let effects = [
            (Relation::Exclude, MarkingSet::Included, Action::Remove),
            (Relation::Include, MarkingSet::Included, Action::Add),
            (Relation::Response, MarkingSet::Pending, Action::Add),
        ]
        .map(|(kind, set, action)| {
            let leaves = self.nested_constraints(view, event, kind);
            (set, action, leaves)
        });

        Ok(apply(graph, event, effects))
    }
}

/// Direct-relation semantics; nesting is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatSemantics {
    pub check_enabled: bool,
}

impl Default for FlatSemantics {
    fn default() -> Self {
        Self {
            check_enabled: true,
        }
    }
}

impl Semantics for FlatSemantics {
    fn enabled(&self, graph: &DcrGraph) -> BTreeSet<NodeId> {
        let marking = graph.marking();
        let blocking_conditions = marking.unexecuted_included();
        let blocking_milestones = marking.pending_included();
        let relations = graph.relations();

        marking
            .included
            .iter()
            .copied()
            .filter(|event| {
                relations
                    .targets(Relation::Condition, *event)
                    .is_disjoint(&blocking_conditions)
                    && relations
                        .targets(Relation::Milestone, *event)
                        .is_disjoint(&blocking_milestones)
            })
            .collect()
    }

    fn execute(
        &self,
        graph: &mut DcrGraph,
        event: NodeId,
    ) -> Result<ExecuteSummary, EngineError> {
        check_preconditions(self, self.check_enabled, graph, event)?;

        let view: &DcrGraph = graph;
        let effects = [
            (Relation::Exclude, MarkingSet::Included, Action::Remove),
            (Relation::Include, MarkingSet::Included, Action::Add),
            (Relation::Response, MarkingSet::Pending, Action::Add),
        ]
        .map(|(kind, set, action)| {
            let targets = view.relations().targets(kind, event).clone();
            (set, action, targets)
        });

        Ok(apply(graph, event, effects))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Remove,
}

fn check_preconditions(
    semantics: &dyn Semantics,
    check_enabled: bool,
    graph: &DcrGraph,
    event: NodeId,
) -> Result<(), EngineError> {
    if event.index() >= graph.nodes().len() {
        return Err(EngineError::ForeignNode(event));
    }
    if !graph.is_event(event) {
        return Err(EngineError::NotAnEvent(graph.name(event).to_string()));
    }
    if !graph.is_normalized() {
        return Err(EngineError::NotNormalized);
    }
    if check_enabled && !semantics.enabled(graph).contains(&event) {
        return Err(EngineError::NotEnabled(graph.name(event).to_string()));
    }
    Ok(())
}

/// Mark `event` executed, then apply each effect in order.
fn apply(
    graph: &mut DcrGraph,
    event: NodeId,
    effects: [(MarkingSet, Action, BTreeSet<NodeId>); 3],
) -> ExecuteSummary {
    let marking = graph.marking_mut();
    let was_pending = marking.pending.remove(&event);
    marking.executed.insert(event);

    let mut changed: [Vec<NodeId>; 3] = Default::default();
    for (slot, (set, action, targets)) in effects.into_iter().enumerate() {
        let set = marking.set_mut(set);
        for target in targets {
            let flipped = match action {
                Action::Add => set.insert(target),
                Action::Remove => set.remove(&target),
            };
            if flipped {
                changed[slot].push(target);
            }
        }
    }

    let [excluded, included, pending_added] = changed;
    let mut summary = ExecuteSummary {
        event: graph.name(event).to_string(),
        excluded: graph.names_of(&excluded),
        included: graph.names_of(&included),
        pending_added: graph.names_of(&pending_added),
        was_pending,
    };
    summary.sort();
    summary
}
