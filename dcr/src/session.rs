//! Loading a `.dcr/` workspace into a graph ready for `enabled`/`execute`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::marking::Marking;
use crate::core::normalize::{NormalizeSummary, update_nests};
use crate::core::semantics::Semantics;
use crate::document::GraphDocument;
use crate::graph::DcrGraph;
use crate::io::config::{EngineConfig, load_config};
use crate::io::graph_store::load_graph;
use crate::io::init::DcrPaths;
use crate::io::run_state::{RunState, load_run_state};

/// A loaded workspace: config, graph with the live marking, and run state.
#[derive(Debug, Clone)]
pub struct Session {
    pub paths: DcrPaths,
    pub config: EngineConfig,
    pub graph: DcrGraph,
    /// Marking declared in `graph.json`, before any execution.
    pub initial: Marking,
    pub run_state: RunState,
}

/// Snapshot printed by `dcr status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub included: Vec<String>,
    pub executed: Vec<String>,
    pub pending: Vec<String>,
    pub enabled: Vec<String>,
    pub accepting: bool,
    pub history: Vec<String>,
}

/// Load config, graph and run state from `root`.
///
/// The graph is normalized when `normalize_on_load` is set, then the run
/// state's marking (if any) replaces the declared one.
pub fn open_session(root: &Path) -> Result<Session> {
    let paths = DcrPaths::new(root);
    let config = load_config(&paths.config_path).context("load config.toml")?;
    let mut graph =
        load_graph(&paths.schema_path, &paths.graph_path).context("load graph.json")?;
    if config.normalize_on_load {
        let summary = update_nests(&mut graph).context("normalize graph")?;
        debug!(
            edges_before = summary.edges_before,
            edges_after = summary.edges_after,
            "graph normalized"
        );
    }
    let initial = graph.marking().clone();
    let run_state = load_run_state(&paths.run_state_path).context("load run_state.json")?;
    let marking = run_state.current_marking(&graph, &initial)?;
    graph.restore_marking(marking);

    Ok(Session {
        paths,
        config,
        graph,
        initial,
        run_state,
    })
}

impl Session {
    pub fn semantics(&self) -> Box<dyn Semantics> {
        self.config.semantics()
    }

    /// Sorted names of the currently enabled events.
    pub fn enabled_names(&self) -> Vec<String> {
        let semantics = self.semantics();
        self.graph.names_of(&semantics.enabled(&self.graph))
    }

    pub fn status(&self) -> StatusReport {
        let marking = self.graph.marking();
        StatusReport {
            included: self.graph.names_of(&marking.included),
            executed: self.graph.names_of(&marking.executed),
            pending: self.graph.names_of(&marking.pending),
            enabled: self.enabled_names(),
            accepting: self.semantics().is_accepting(&self.graph),
            history: self.run_state.history.clone(),
        }
    }
}

/// Normalize the declared graph and return it as a document. The run state
/// is not consulted; the marking is the one in `graph.json`.
pub fn normalize_from_root(root: &Path) -> Result<(GraphDocument, NormalizeSummary)> {
    let paths = DcrPaths::new(root);
    let mut graph =
        load_graph(&paths.schema_path, &paths.graph_path).context("load graph.json")?;
    let summary = update_nests(&mut graph).context("normalize graph")?;
    Ok((GraphDocument::from_graph(&graph), summary))
}
