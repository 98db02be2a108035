//! Run state storage: the live marking and the execution history.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::write_atomic;
use crate::core::marking::Marking;
use crate::document::MarkingDocument;
use crate::graph::DcrGraph;

/// Persisted bookkeeping for the current run (`.dcr/run_state.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunState {
    /// Marking after the last execution. `None` means the graph's initial
    /// marking is still current.
    pub marking: Option<MarkingDocument>,
    /// Executed events, oldest first.
    pub history: Vec<String>,
}

impl RunState {
    /// Resolve the stored marking against `graph`, falling back to
    /// `initial` when no event has executed yet.
    pub fn current_marking(&self, graph: &DcrGraph, initial: &Marking) -> Result<Marking> {
        let Some(doc) = &self.marking else {
            return Ok(initial.clone());
        };
        let marking = doc
            .to_marking(graph)
            .context("resolve run state marking")?;
        for id in marking
            .included
            .iter()
            .chain(&marking.executed)
            .chain(&marking.pending)
        {
            if !graph.is_event(*id) {
                return Err(anyhow!(
                    "run state marking names group '{}'",
                    graph.name(*id)
                ));
            }
        }
        Ok(marking)
    }
}

/// Load run state from disk.
pub fn load_run_state(path: &Path) -> Result<RunState> {
    debug!(path = %path.display(), "loading run state");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read run state {}", path.display()))?;
    let state: RunState = serde_json::from_str(&contents)
        .with_context(|| format!("parse run state {}", path.display()))?;
    debug!(history = state.history.len(), resumed = state.marking.is_some(), "run state loaded");
    Ok(state)
}

/// Atomically write run state to disk (temp file + rename).
pub fn write_run_state(path: &Path, state: &RunState) -> Result<()> {
    debug!(path = %path.display(), history = state.history.len(), "writing run state");
    let mut buf = serde_json::to_string_pretty(state)?;
    buf.push('\n');
    write_atomic(path, "json.tmp", &buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scenario_graph;

    /// Verifies write → read preserves the marking and history.
    #[test]
    fn run_state_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("run_state.json");

        let state = RunState {
            marking: Some(MarkingDocument {
                included: vec!["A".to_string(), "B".to_string()],
                executed: vec!["A".to_string()],
                pending: Vec::new(),
            }),
            history: vec!["A".to_string()],
        };

        write_run_state(&path, &state).expect("write");
        let loaded = load_run_state(&path).expect("load");
        assert_eq!(loaded, state);
    }

    /// Guards against accidental changes to the default on-disk format.
    #[test]
    fn run_state_defaults_are_deterministic() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("run_state.json");

        write_run_state(&path, &RunState::default()).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        let expected = "{\n  \"marking\": null,\n  \"history\": []\n}\n";
        assert_eq!(contents, expected);
    }

    #[test]
    fn missing_marking_falls_back_to_initial() {
        let graph = scenario_graph();
        let initial = graph.marking().clone();

        let marking = RunState::default()
            .current_marking(&graph, &initial)
            .expect("marking");
        assert_eq!(marking, initial);
    }

    #[test]
    fn stored_marking_rejects_groups() {
        let graph = scenario_graph();
        let state = RunState {
            marking: Some(MarkingDocument {
                included: vec!["G".to_string()],
                ..MarkingDocument::default()
            }),
            history: Vec::new(),
        };

        let err = state
            .current_marking(&graph, graph.marking())
            .expect_err("group in marking");
        assert!(err.to_string().contains("names group 'G'"));
    }
}
