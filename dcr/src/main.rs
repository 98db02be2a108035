//! Hierarchical DCR graph engine CLI.
//!
//! Works on a `.dcr/` workspace in the current directory: the graph document,
//! its schema, engine config and the run state holding the live marking.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dcr::enabled::{EnabledOutcome, enabled_from_root};
use dcr::exit_codes;
use dcr::io::init::{InitOptions, init_workspace};
use dcr::logging;
use dcr::session::{normalize_from_root, open_session};
use dcr::step::{StepOutcome, execute_event, reset_run};
use dcr::validate::validate_workspace;

#[derive(Parser)]
#[command(name = "dcr", version, about = "Hierarchical DCR graph engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.dcr/` with a sample graph, schema, config and empty run.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
    /// Check layout, config, graph (schema + invariants) and run state.
    Validate,
    /// Print the enabled events, one per line.
    Enabled,
    /// Execute one event and persist the new marking.
    Execute {
        /// Name of an atomic event.
        event: String,
    },
    /// Print the graph with group relations materialized on leaf events.
    Normalize,
    /// Print the current marking, enabled events and acceptance.
    Status,
    /// Discard the run and return to the declared marking.
    Reset,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = Path::new(".");
    match cli.command {
        Command::Init { force } => cmd_init(root, force),
        Command::Validate => cmd_validate(root),
        Command::Enabled => cmd_enabled(root),
        Command::Execute { event } => cmd_execute(root, &event),
        Command::Normalize => cmd_normalize(root),
        Command::Status => cmd_status(root),
        Command::Reset => cmd_reset(root),
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let paths = init_workspace(root, &InitOptions { force })?;
    println!("initialized {}", paths.dcr_dir.display());
    Ok(exit_codes::OK)
}

fn cmd_validate(root: &Path) -> Result<i32> {
    let outcome = validate_workspace(root)?;
    println!(
        "ok: {} events, {} groups, {} edges, {} steps",
        outcome.events, outcome.groups, outcome.edges, outcome.history
    );
    Ok(exit_codes::OK)
}

fn cmd_enabled(root: &Path) -> Result<i32> {
    match enabled_from_root(root)? {
        EnabledOutcome::Enabled(names) => {
            for name in names {
                println!("{}", name);
            }
            Ok(exit_codes::OK)
        }
        EnabledOutcome::NoneEnabled => {
            eprintln!("no enabled events");
            Ok(exit_codes::NONE_ENABLED)
        }
    }
}

fn cmd_execute(root: &Path, event: &str) -> Result<i32> {
    match execute_event(root, event)? {
        StepOutcome::Executed { summary, accepting } => {
            let mut payload =
                serde_json::to_string_pretty(&summary).context("serialize execute summary")?;
            payload.push('\n');
            print!("{}", payload);
            println!("accepting: {}", accepting);
            Ok(exit_codes::OK)
        }
        StepOutcome::NotEnabled { event, enabled } => {
            eprintln!(
                "event '{}' is not enabled (enabled: {})",
                event,
                enabled.join(", ")
            );
            Ok(exit_codes::NOT_ENABLED)
        }
    }
}

fn cmd_normalize(root: &Path) -> Result<i32> {
    let (doc, summary) = normalize_from_root(root)?;
    let payload = serde_json::to_string_pretty(&doc).context("serialize graph document")?;
    println!("{}", payload);
    eprintln!(
        "normalized: {} -> {} edges",
        summary.edges_before, summary.edges_after
    );
    Ok(exit_codes::OK)
}

fn cmd_status(root: &Path) -> Result<i32> {
    let status = open_session(root)?.status();
    println!("included: {}", status.included.join(" "));
    println!("executed: {}", status.executed.join(" "));
    println!("pending: {}", status.pending.join(" "));
    println!("enabled: {}", status.enabled.join(" "));
    println!("accepting: {}", status.accepting);
    println!("history: {}", status.history.join(" "));
    Ok(exit_codes::OK)
}

fn cmd_reset(root: &Path) -> Result<i32> {
    let dropped = reset_run(root)?;
    println!("reset: dropped {} steps", dropped);
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["dcr", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false }));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["dcr", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_execute_takes_event_name() {
        let cli = Cli::parse_from(["dcr", "execute", "A"]);
        match cli.command {
            Command::Execute { event } => assert_eq!(event, "A"),
            _ => panic!("expected execute"),
        }
    }

    #[test]
    fn execute_requires_event() {
        assert!(Cli::try_parse_from(["dcr", "execute"]).is_err());
    }
}
