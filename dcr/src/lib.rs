//! Hierarchical DCR graph engine.
//!
//! Events can be nested into groups; a relation declared on a group applies
//! to every atomic event below it. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (forest, relation store,
//!   normalization, semantics). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (workspace scaffolding, config,
//!   graph documents, run state).
//!
//! Orchestration modules ([`session`], [`enabled`], [`step`], [`validate`])
//! coordinate core logic with I/O to implement CLI commands.

pub mod core;
pub mod document;
pub mod enabled;
pub mod exit_codes;
pub mod graph;
pub mod io;
pub mod logging;
pub mod session;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;

pub use crate::core::error::EngineError;
pub use crate::core::normalize::{NormalizeSummary, update_nests};
pub use crate::core::semantics::{
    FlatSemantics, HierarchicalSemantics, Semantics, SemanticsKind,
};
pub use crate::graph::DcrGraph;
