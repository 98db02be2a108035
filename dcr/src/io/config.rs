//! Engine configuration stored under `.dcr/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::write_atomic;
use crate::core::semantics::{Semantics, SemanticsKind};

/// Engine configuration (TOML).
///
/// This file is intended to be edited by humans. Missing fields default to
/// the hierarchical semantics with enablement checks on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Which semantics `enabled` and `execute` use.
    pub semantics: SemanticsKind,

    /// Reject `execute` for events outside the enabled set.
    pub check_enabled: bool,

    /// Run `update_nests` right after loading the graph. Execution requires a
    /// normalized graph, so turning this off leaves the workspace read-only.
    pub normalize_on_load: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            semantics: SemanticsKind::Hierarchical,
            check_enabled: true,
            normalize_on_load: true,
        }
    }
}

impl EngineConfig {
    /// Reject combinations whose reads would be wrong.
    ///
    /// With `normalize_on_load = false` no semantics can execute. Hierarchical
    /// `enabled` still reads group constraints through ancestors, so that
    /// pairing is a valid read-only workspace. Flat `enabled` only sees edges
    /// that normalization has copied down to the events, so it would silently
    /// ignore every group-level constraint and is refused.
    pub fn validate(&self) -> Result<()> {
        if self.semantics == SemanticsKind::Flat && !self.normalize_on_load {
            return Err(anyhow!(
                "semantics = \"flat\" requires normalize_on_load = true: flat enabled sets ignore group constraints until they are normalized"
            ));
        }
        Ok(())
    }

    /// Build the configured semantics.
    pub fn semantics(&self) -> Box<dyn Semantics> {
        self.semantics.build(self.check_enabled)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        return Ok(EngineConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: EngineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    debug!(semantics = ?cfg.semantics, check_enabled = cfg.check_enabled, "config loaded");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &EngineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, "toml.tmp", &buf)
}
