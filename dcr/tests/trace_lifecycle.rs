//! Trace-level tests driving a workspace through several executions.
//!
//! These use the library entry points (`execute_event`, `open_session`) so a
//! whole trace runs against persisted state, the way repeated CLI calls do.

use dcr::document::{GraphDocument, MarkingDocument};
use dcr::session::open_session;
use dcr::step::{StepOutcome, execute_event, reset_run};
use dcr::test_support::TestWorkspace;

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Review process:
///
/// ```text
/// submit ──response──▶ review = { approve, reject }
/// review ──condition─▶ submit
/// reject ──exclude───▶ approve
/// approve ─exclude───▶ reject
/// ```
fn review_document() -> GraphDocument {
    GraphDocument {
        events: names(&["submit", "approve", "reject"]),
        nested_groups: [("review".to_string(), names(&["approve", "reject"]))]
            .into_iter()
            .collect(),
        conditions_for: [("review".to_string(), names(&["submit"]))]
            .into_iter()
            .collect(),
        response_to: [("submit".to_string(), names(&["review"]))]
            .into_iter()
            .collect(),
        excludes_to: [
            ("reject".to_string(), names(&["approve"])),
            ("approve".to_string(), names(&["reject"])),
        ]
        .into_iter()
        .collect(),
        marking: MarkingDocument {
            included: names(&["submit", "approve", "reject"]),
            ..MarkingDocument::default()
        },
        ..GraphDocument::default()
    }
}

fn expect_executed(outcome: StepOutcome) -> bool {
    match outcome {
        StepOutcome::Executed { accepting, .. } => accepting,
        other => panic!("expected execution, got {other:?}"),
    }
}

#[test]
fn review_trace_reaches_acceptance() {
    let workspace = TestWorkspace::new().expect("workspace");
    workspace
        .write_document(&review_document())
        .expect("write graph");

    let session = open_session(workspace.root()).expect("open");
    assert_eq!(session.enabled_names(), vec!["submit"]);

    // Submitting makes both members of the review group pending.
    let accepting = expect_executed(execute_event(workspace.root(), "submit").expect("submit"));
    assert!(!accepting);
    let status = open_session(workspace.root()).expect("reopen").status();
    assert_eq!(status.pending, vec!["approve", "reject"]);
    assert_eq!(status.enabled, vec!["approve", "reject", "submit"]);

    // Rejecting excludes approve, so its pending response no longer counts.
    let accepting = expect_executed(execute_event(workspace.root(), "reject").expect("reject"));
    assert!(accepting);
    let status = open_session(workspace.root()).expect("reopen").status();
    assert_eq!(status.included, vec!["reject", "submit"]);
    assert_eq!(status.pending, vec!["approve"]);
    assert_eq!(status.history, vec!["submit", "reject"]);

    let outcome = execute_event(workspace.root(), "approve").expect("approve");
    assert!(matches!(outcome, StepOutcome::NotEnabled { .. }));
}

#[test]
fn reset_replays_from_declared_marking() {
    let workspace = TestWorkspace::new().expect("workspace");
    workspace
        .write_document(&review_document())
        .expect("write graph");

    execute_event(workspace.root(), "submit").expect("submit");
    reset_run(workspace.root()).expect("reset");

    let session = open_session(workspace.root()).expect("reopen");
    assert_eq!(session.enabled_names(), vec!["submit"]);
    assert!(session.status().history.is_empty());
}
