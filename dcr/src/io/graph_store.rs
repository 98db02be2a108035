//! Graph document load/save helpers with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use super::write_atomic;
use crate::core::invariants::validate_invariants;
use crate::document::GraphDocument;
use crate::graph::DcrGraph;

/// Load and validate a graph document from disk (schema + invariants).
pub fn load_document(schema_path: &Path, graph_path: &Path) -> Result<GraphDocument> {
    debug!(path = %graph_path.display(), "loading graph document");
    let contents = fs::read_to_string(graph_path)
        .with_context(|| format!("read graph {}", graph_path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse graph {}", graph_path.display()))?;
    validate_schema(schema_path, &value)?;
    let doc: GraphDocument = serde_json::from_value(value)
        .with_context(|| format!("deserialize graph {}", graph_path.display()))?;
    validate_document_invariants(&doc)?;
    debug!(
        events = doc.events.len(),
        groups = doc.nested_groups.len(),
        "graph document loaded"
    );
    Ok(doc)
}

/// Load a validated document and build the (un-normalized) graph.
pub fn load_graph(schema_path: &Path, graph_path: &Path) -> Result<DcrGraph> {
    let doc = load_document(schema_path, graph_path)?;
    doc.to_graph()
        .with_context(|| format!("build graph from {}", graph_path.display()))
}

/// Atomically write a graph document to disk (temp file + rename).
pub fn write_document(graph_path: &Path, doc: &GraphDocument) -> Result<()> {
    debug!(path = %graph_path.display(), "writing graph document");
    let mut buf = serde_json::to_string_pretty(doc)?;
    buf.push('\n');
    write_atomic(graph_path, "json.tmp", &buf)
}

fn validate_schema(schema_path: &Path, doc: &Value) -> Result<()> {
    let schema_contents = fs::read_to_string(schema_path)
        .with_context(|| format!("read schema {}", schema_path.display()))?;
    let schema_value: Value = serde_json::from_str(&schema_contents)
        .with_context(|| format!("parse schema {}", schema_path.display()))?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(doc) {
        let messages = compiled
            .iter_errors(doc)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "graph schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

fn validate_document_invariants(doc: &GraphDocument) -> Result<()> {
    let errors = validate_invariants(doc);
    if errors.is_empty() {
        return Ok(());
    }
    Err(anyhow!("graph invariants failed: {}", errors.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_document;
    use crate::io::init::GRAPH_SCHEMA;

    fn scratch() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let schema_path = temp.path().join("schema.json");
        let graph_path = temp.path().join("graph.json");
        fs::write(&schema_path, GRAPH_SCHEMA).expect("write schema");
        (temp, schema_path, graph_path)
    }

    /// Verifies write → load preserves the document.
    #[test]
    fn load_and_write_document_round_trip() {
        let (_temp, schema_path, graph_path) = scratch();
        write_document(&graph_path, &default_document()).expect("write graph");

        let doc = load_document(&schema_path, &graph_path).expect("load graph");
        assert_eq!(doc, default_document());
    }

    #[test]
    fn schema_rejects_unknown_keys() {
        let (_temp, schema_path, graph_path) = scratch();
        fs::write(&graph_path, r#"{ "events": ["a"], "conditions": {} }"#).expect("write");

        let err = load_document(&schema_path, &graph_path).expect_err("schema");
        assert!(err.to_string().contains("graph schema validation failed"));
    }

    #[test]
    fn invariants_run_after_schema() {
        let (_temp, schema_path, graph_path) = scratch();
        let mut doc = default_document();
        doc.includes_to
            .insert("A".to_string(), vec!["ghost".to_string()]);
        write_document(&graph_path, &doc).expect("write");

        let err = load_document(&schema_path, &graph_path).expect_err("invariants");
        let msg = err.to_string();
        assert!(msg.contains("graph invariants failed"));
        assert!(msg.contains("includesTo.A: unknown node 'ghost'"));
    }

    #[test]
    fn load_graph_builds_forest() {
        let (_temp, schema_path, graph_path) = scratch();
        write_document(&graph_path, &default_document()).expect("write");

        let graph = load_graph(&schema_path, &graph_path).expect("graph");
        let g = graph.node("G").expect("G");
        assert_eq!(graph.forest().children(g).count(), 2);
        assert!(!graph.is_normalized());
    }
}
