//! Enabled-set query for `dcr enabled`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::session::{Session, open_session};

/// Structured outcome of an enabled-set query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnabledOutcome {
    /// No event may execute under the current marking.
    NoneEnabled,
    /// Sorted names of the enabled events.
    Enabled(Vec<String>),
}

/// Enabled events of an already loaded session.
pub fn enabled_events(session: &Session) -> EnabledOutcome {
    let names = session.enabled_names();
    if names.is_empty() {
        return EnabledOutcome::NoneEnabled;
    }
    EnabledOutcome::Enabled(names)
}

/// Load the workspace at `root` and compute its enabled events.
pub fn enabled_from_root(root: &Path) -> Result<EnabledOutcome> {
    let session = open_session(root).with_context(|| "load workspace for enabled query")?;
    Ok(enabled_events(&session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestWorkspace;

    #[test]
    fn fixture_enables_a_and_c() {
        let workspace = TestWorkspace::new().expect("workspace");
        let outcome = enabled_from_root(workspace.root()).expect("enabled");
        assert_eq!(
            outcome,
            EnabledOutcome::Enabled(vec!["A".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn mutual_conditions_enable_nothing() {
        let workspace = TestWorkspace::new().expect("workspace");
        workspace.write_blocked_document().expect("write graph");

        let outcome = enabled_from_root(workspace.root()).expect("enabled");
        assert_eq!(outcome, EnabledOutcome::NoneEnabled);
    }

    #[test]
    fn missing_workspace_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = enabled_from_root(temp.path()).expect_err("no workspace");
        assert!(format!("{:#}", err).contains("load graph.json"));
    }
}
