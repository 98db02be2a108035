//! Initialization helpers for `.dcr/` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::info;

use super::config::{EngineConfig, write_config};
use super::graph_store::write_document;
use super::run_state::{RunState, write_run_state};
use crate::document::default_document;

pub(crate) const GRAPH_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/graph/v1.schema.json"
));

/// All canonical paths within `.dcr/` for a project root.
#[derive(Debug, Clone)]
pub struct DcrPaths {
    pub root: PathBuf,
    pub dcr_dir: PathBuf,
    pub graph_path: PathBuf,
    pub schema_path: PathBuf,
    pub config_path: PathBuf,
    pub run_state_path: PathBuf,
}

impl DcrPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dcr_dir = root.join(".dcr");
        Self {
            root,
            graph_path: dcr_dir.join("graph.json"),
            schema_path: dcr_dir.join("schema.json"),
            config_path: dcr_dir.join("config.toml"),
            run_state_path: dcr_dir.join("run_state.json"),
            dcr_dir,
        }
    }
}

/// Options for `init_workspace`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing workspace files.
    pub force: bool,
}

/// Create `.dcr/` scaffolding in `root`.
///
/// Fails if `.dcr/` already exists unless `options.force` is set.
pub fn init_workspace(root: &Path, options: &InitOptions) -> Result<DcrPaths> {
    let paths = DcrPaths::new(root);
    if paths.dcr_dir.exists() && !options.force {
        return Err(anyhow!(
            "dcr init: .dcr already exists (use --force to overwrite)"
        ));
    }
    if paths.dcr_dir.exists() && !paths.dcr_dir.is_dir() {
        return Err(anyhow!("dcr init: .dcr exists but is not a directory"));
    }

    fs::create_dir_all(&paths.dcr_dir)
        .with_context(|| format!("create directory {}", paths.dcr_dir.display()))?;
    fs::write(&paths.schema_path, GRAPH_SCHEMA)
        .with_context(|| format!("write file {}", paths.schema_path.display()))?;
    write_document(&paths.graph_path, &default_document())?;
    write_config(&paths.config_path, &EngineConfig::default())?;
    write_run_state(&paths.run_state_path, &RunState::default())?;

    info!(dir = %paths.dcr_dir.display(), force = options.force, "workspace initialized");
    Ok(paths)
}
