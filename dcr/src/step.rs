//! Orchestration for `dcr execute` and `dcr reset`.
//!
//! A step loads the workspace, fires one event through the configured
//! semantics and persists the resulting marking. A rejected step writes
//! nothing.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::core::error::EngineError;
use crate::core::types::ExecuteSummary;
use crate::document::MarkingDocument;
use crate::io::init::DcrPaths;
use crate::io::run_state::{RunState, load_run_state, write_run_state};
use crate::session::{Session, open_session};

/// Result of a single `dcr execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The event fired and the run state was written.
    Executed {
        summary: ExecuteSummary,
        /// Acceptance of the marking after the step.
        accepting: bool,
    },
    /// The event is not enabled; nothing was written.
    NotEnabled {
        event: String,
        enabled: Vec<String>,
    },
}

/// Execute `event` in `session` and persist the new run state.
pub fn execute_in_session(session: &mut Session, event: &str) -> Result<StepOutcome> {
    let id = session.graph.require(event)?;
    let semantics = session.semantics();

    let summary = match semantics.execute(&mut session.graph, id) {
        Ok(summary) => summary,
        Err(EngineError::NotEnabled(event)) => {
            debug!(event = %event, "event not enabled");
            return Ok(StepOutcome::NotEnabled {
                event,
                enabled: session.enabled_names(),
            });
        }
        Err(err) => return Err(anyhow!(err).context(format!("execute '{event}'"))),
    };

    session.run_state.marking = Some(MarkingDocument::from_marking(
        &session.graph,
        session.graph.marking(),
    ));
    session.run_state.history.push(summary.event.clone());
    write_run_state(&session.paths.run_state_path, &session.run_state)?;

    let accepting = semantics.is_accepting(&session.graph);
    info!(
        event = %summary.event,
        step = session.run_state.history.len(),
        accepting,
        "event executed"
    );
    Ok(StepOutcome::Executed { summary, accepting })
}

/// Load the workspace at `root` and execute `event`.
pub fn execute_event(root: &Path, event: &str) -> Result<StepOutcome> {
    let mut session = open_session(root).with_context(|| "load workspace for execute")?;
    execute_in_session(&mut session, event)
}

/// Discard the run, returning to the graph's declared marking.
///
/// Returns the number of history entries dropped.
pub fn reset_run(root: &Path) -> Result<usize> {
    let paths = DcrPaths::new(root);
    if !paths.dcr_dir.is_dir() {
        return Err(anyhow!("missing directory {}", paths.dcr_dir.display()));
    }
    let dropped = match load_run_state(&paths.run_state_path) {
        Ok(state) => state.history.len(),
        Err(err) => {
            debug!(error = %format!("{:#}", err), "discarding unreadable run state");
            0
        }
    };
    write_run_state(&paths.run_state_path, &RunState::default())?;
    info!(dropped, "run state reset");
    Ok(dropped)
}
