//! Serializable graph document used by the CLI and fixtures.
//!
//! Relation maps keep the orientation of the in-memory store: `conditionsFor`
//! and `milestonesFor` are keyed by the constrained node, the other three by
//! the executing node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::core::marking::{Marking, MarkingSet};
use crate::core::types::Relation;
use crate::graph::DcrGraph;

pub type EdgeLists = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub events: Vec<String>,
    #[serde(default)]
    pub nested_groups: EdgeLists,
    #[serde(default)]
    pub conditions_for: EdgeLists,
    #[serde(default)]
    pub milestones_for: EdgeLists,
    #[serde(default)]
    pub response_to: EdgeLists,
    #[serde(default)]
    pub includes_to: EdgeLists,
    #[serde(default)]
    pub excludes_to: EdgeLists,
    #[serde(default)]
    pub marking: MarkingDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkingDocument {
    pub included: Vec<String>,
    pub executed: Vec<String>,
    pub pending: Vec<String>,
}

impl GraphDocument {
    pub fn relation(&self, kind: Relation) -> &EdgeLists {
        match kind {
            Relation::Condition => &self.conditions_for,
            Relation::Response => &self.response_to,
            Relation::Milestone => &self.milestones_for,
            Relation::Include => &self.includes_to,
            Relation::Exclude => &self.excludes_to,
        }
    }

    fn relation_mut(&mut self, kind: Relation) -> &mut EdgeLists {
        match kind {
            Relation::Condition => &mut self.conditions_for,
            Relation::Response => &mut self.response_to,
            Relation::Milestone => &mut self.milestones_for,
            Relation::Include => &mut self.includes_to,
            Relation::Exclude => &mut self.excludes_to,
        }
    }

    /// Document key used for a relation kind in error messages.
    pub fn relation_key(kind: Relation) -> &'static str {
        match kind {
            Relation::Condition => "conditionsFor",
            Relation::Response => "responseTo",
            Relation::Milestone => "milestonesFor",
            Relation::Include => "includesTo",
            Relation::Exclude => "excludesTo",
        }
    }

    /// Build an un-normalized graph. Events are registered first so ids follow
    /// declaration order.
    pub fn to_graph(&self) -> Result<DcrGraph, EngineError> {
        let mut graph = DcrGraph::new();
        for event in &self.events {
            graph.add_event(event);
        }
        for (group, children) in &self.nested_groups {
            let children: Vec<&str> = children.iter().map(String::as_str).collect();
            graph.set_children(group, &children)?;
        }
        for kind in Relation::ALL {
            for (source, targets) in self.relation(kind) {
                for target in targets {
                    graph.add_relation(kind, source, target);
                }
            }
        }
        let marking = self.marking.to_marking(&graph)?;
        graph.restore_marking(marking);
        Ok(graph)
    }

    /// Snapshot a graph, including any edges added by normalization.
    pub fn from_graph(graph: &DcrGraph) -> Self {
        let mut doc = GraphDocument {
            events: graph.names_of(graph.events().collect::<Vec<_>>().iter()),
            marking: MarkingDocument::from_marking(graph, graph.marking()),
            ..GraphDocument::default()
        };
        for id in graph.nodes().ids().filter(|id| graph.forest().is_group(*id)) {
            let children: Vec<_> = graph.forest().children(id).collect();
            doc.nested_groups
                .insert(graph.name(id).to_string(), graph.names_of(&children));
        }
        for kind in Relation::ALL {
            for (source, targets) in graph.relations().entries(kind) {
                doc.relation_mut(kind)
                    .insert(graph.name(source).to_string(), graph.names_of(targets));
            }
        }
        doc
    }
}

impl MarkingDocument {
    pub fn from_marking(graph: &DcrGraph, marking: &Marking) -> Self {
        Self {
            included: graph.names_of(&marking.included),
            executed: graph.names_of(&marking.executed),
            pending: graph.names_of(&marking.pending),
        }
    }

    /// Resolve names against `graph`. Unknown names are rejected.
    pub fn to_marking(&self, graph: &DcrGraph) -> Result<Marking, EngineError> {
        let mut marking = Marking::default();
        for (which, names) in [
            (MarkingSet::Included, &self.included),
            (MarkingSet::Executed, &self.executed),
            (MarkingSet::Pending, &self.pending),
        ] {
            for name in names {
                marking.set_mut(which).insert(graph.require(name)?);
            }
        }
        Ok(marking)
    }
}

/// Fixture shipped by `dcr init`: `A` conditions `B`, group `G = {B, C}`
/// waits on `B` as a milestone, and `A` includes `G`.
pub fn default_document() -> GraphDocument {
    GraphDocument {
        events: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        nested_groups: lists(&[("G", &["B", "C"])]),
        conditions_for: lists(&[("B", &["A"])]),
        milestones_for: lists(&[("G", &["B"])]),
        includes_to: lists(&[("A", &["G"])]),
        marking: MarkingDocument {
            included: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            ..MarkingDocument::default()
        },
        ..GraphDocument::default()
    }
}

fn lists(entries: &[(&str, &[&str])]) -> EdgeLists {
    entries
        .iter()
        .map(|(key, values)| {
            (
                key.to_string(),
                values.iter().map(|value| value.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::update_nests;

    #[test]
    fn parses_camel_case_keys_with_defaults() {
        let raw = r#"{
            "events": ["a", "b"],
            "nestedGroups": { "g": ["a", "b"] },
            "includesTo": { "x": ["g"] }
        }"#;

        let doc: GraphDocument = serde_json::from_str(raw).expect("parse");
        assert_eq!(doc.nested_groups["g"], vec!["a", "b"]);
        assert_eq!(doc.includes_to["x"], vec!["g"]);
        assert!(doc.conditions_for.is_empty());
        assert!(doc.marking.included.is_empty());
    }

    #[test]
    fn to_graph_builds_forest_relations_and_marking() {
        let graph = default_document().to_graph().expect("graph");

        let g = graph.node("G").expect("G");
        let b = graph.node("B").expect("B");
        assert_eq!(graph.forest().parent(b), Some(g));
        assert!(!graph.is_event(g));
        assert!(
            graph
                .relations()
                .contains(Relation::Include, graph.node("A").expect("A"), g)
        );
        assert_eq!(graph.names_of(&graph.marking().included), vec!["A", "B", "C"]);
        assert!(!graph.is_normalized());
    }

    #[test]
    fn marking_with_unknown_name_is_rejected() {
        let mut doc = default_document();
        doc.marking.pending.push("ghost".to_string());
        let err = doc.to_graph().expect_err("unknown");
        assert_eq!(err, EngineError::UnknownNode("ghost".to_string()));
    }

    #[test]
    fn from_graph_includes_normalized_edges() {
        let mut graph = default_document().to_graph().expect("graph");
        update_nests(&mut graph).expect("normalize");

        let doc = GraphDocument::from_graph(&graph);
        assert_eq!(doc.events, vec!["A", "B", "C"]);
        assert_eq!(doc.includes_to["A"], vec!["B", "C", "G"]);
        assert_eq!(doc.milestones_for["C"], vec!["B"]);
        assert_eq!(doc.nested_groups["G"], vec!["B", "C"]);
    }
}
