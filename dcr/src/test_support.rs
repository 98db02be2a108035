//! Test-only helpers for building graphs and scratch workspaces.

use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;

use crate::core::marking::MarkingSet;
use crate::core::types::Relation;
use crate::document::{GraphDocument, MarkingDocument};
use crate::graph::DcrGraph;
use crate::io::graph_store::write_document;
use crate::io::init::{DcrPaths, InitOptions, init_workspace};
use crate::io::run_state::{RunState, load_run_state};

/// Group `g = {a, b}` that waits on `x`; every event starts included.
pub fn grouped_condition_graph() -> DcrGraph {
    let mut graph = DcrGraph::new();
    graph.add_event("x");
    graph.add_event("a");
    graph.add_event("b");
    graph.set_children("g", &["a", "b"]).expect("nest g");
    graph.add_relation(Relation::Condition, "g", "x");
    graph.seed_marking(MarkingSet::Included, &["x", "a", "b"]);
    graph
}

/// The fixture written by `dcr init`, built directly (not normalized).
pub fn scenario_graph() -> DcrGraph {
    let mut graph = DcrGraph::new();
    for event in ["A", "B", "C"] {
        graph.add_event(event);
    }
    graph.set_children("G", &["B", "C"]).expect("nest G");
    graph.add_relation(Relation::Condition, "B", "A");
    graph.add_relation(Relation::Milestone, "G", "B");
    graph.add_relation(Relation::Include, "A", "G");
    graph.seed_marking(MarkingSet::Included, &["A", "B", "C"]);
    graph
}

/// An initialized `.dcr/` workspace in a temporary directory.
pub struct TestWorkspace {
    temp: TempDir,
    paths: DcrPaths,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let paths = init_workspace(temp.path(), &InitOptions { force: false })?;
        Ok(Self { temp, paths })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn paths(&self) -> &DcrPaths {
        &self.paths
    }

    /// Replace `.dcr/graph.json`.
    pub fn write_document(&self, doc: &GraphDocument) -> Result<()> {
        write_document(&self.paths.graph_path, doc)
    }

    /// Write a graph in which no event is ever enabled: `A` and `C` wait on
    /// each other.
    pub fn write_blocked_document(&self) -> Result<()> {
        let doc = GraphDocument {
            events: vec!["A".to_string(), "C".to_string()],
            conditions_for: [
                ("A".to_string(), vec!["C".to_string()]),
                ("C".to_string(), vec!["A".to_string()]),
            ]
            .into_iter()
            .collect(),
            marking: MarkingDocument {
                included: vec!["A".to_string(), "C".to_string()],
                ..MarkingDocument::default()
            },
            ..GraphDocument::default()
        };
        self.write_document(&doc)
    }

    pub fn run_state(&self) -> Result<RunState> {
        load_run_state(&self.paths.run_state_path)
    }
}
