//! Validation helpers for the `.dcr/` layout, config, graph and run state.

use std::path::Path;

use anyhow::{Result, anyhow};

use crate::io::init::DcrPaths;
use crate::session::open_session;

/// Shape of a workspace that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOutcome {
    pub events: usize,
    pub groups: usize,
    /// Relation edges after load-time normalization.
    pub edges: usize,
    /// Executed steps recorded in the run state.
    pub history: usize,
}

/// Validate `.dcr/` layout, config, graph (schema + invariants) and run state.
pub fn validate_workspace(root: &Path) -> Result<ValidateOutcome> {
    let paths = DcrPaths::new(root);

    ensure_dir(&paths.dcr_dir)?;
    ensure_file(&paths.graph_path)?;
    ensure_file(&paths.schema_path)?;
    ensure_file(&paths.config_path)?;
    ensure_file(&paths.run_state_path)?;

    let session = open_session(root)?;
    let graph = &session.graph;
    for name in &session.run_state.history {
        match graph.node(name) {
            Some(id) if graph.is_event(id) => {}
            Some(_) => return Err(anyhow!("run state history names group '{name}'")),
            None => return Err(anyhow!("run state history names unknown event '{name}'")),
        }
    }

    Ok(ValidateOutcome {
        events: graph.events().count(),
        groups: graph
            .nodes()
            .ids()
            .filter(|id| graph.forest().is_group(*id))
            .count(),
        edges: graph.relations().edge_count(),
        history: session.run_state.history.len(),
    })
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("missing directory {}", path.display()));
    }
    if !path.is_dir() {
        return Err(anyhow!("expected directory {}", path.display()));
    }
    Ok(())
}

fn ensure_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("missing file {}", path.display()));
    }
    if !path.is_file() {
        return Err(anyhow!("expected file {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::run_state::{RunState, write_run_state};
    use crate::test_support::TestWorkspace;

    #[test]
    fn validate_ok_for_fresh_workspace() {
        let workspace = TestWorkspace::new().expect("workspace");

        let outcome = validate_workspace(workspace.root()).expect("validate");
        assert_eq!(outcome.events, 3);
        assert_eq!(outcome.groups, 1);
        assert_eq!(outcome.history, 0);
        // 3 declared edges, plus A->B and A->C (include) and B->B and C->B
        // (milestone).
        assert_eq!(outcome.edges, 7);
    }

    #[test]
    fn validate_errors_on_missing_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = validate_workspace(temp.path()).expect_err("validate should fail");
        assert!(err.to_string().contains("missing directory"));
    }

    #[test]
    fn validate_errors_on_group_in_history() {
        let workspace = TestWorkspace::new().expect("workspace");
        write_run_state(
            &workspace.paths().run_state_path,
            &RunState {
                marking: None,
                history: vec!["G".to_string()],
            },
        )
        .expect("write run state");

        let err = validate_workspace(workspace.root()).expect_err("validate should fail");
        assert!(err.to_string().contains("history names group 'G'"));
    }

    #[test]
    fn validate_errors_on_bad_config() {
        let workspace = TestWorkspace::new().expect("workspace");
        std::fs::write(&workspace.paths().config_path, "semantics = \"cyclic\"\n")
            .expect("write config");

        let err = validate_workspace(workspace.root()).expect_err("validate should fail");
        assert!(format!("{:#}", err).contains("load config.toml"));
    }
}
