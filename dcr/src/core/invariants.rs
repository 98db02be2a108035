//! Semantic invariants of a graph document not expressible via JSON Schema.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::Relation;
use crate::document::GraphDocument;

/// Check semantic invariants not expressible in JSON Schema:
/// - No duplicate event ids
/// - No name declared both as an event and as a group
/// - Every nested child and relation endpoint is a declared node
/// - Each node has at most one parent group and nesting is acyclic
/// - The marking only names atomic events
pub fn validate_invariants(doc: &GraphDocument) -> Vec<String> {
    let mut errors = Vec::new();

    let mut events = BTreeSet::new();
    for event in &doc.events {
        if !events.insert(event.as_str()) {
            errors.push(format!("duplicate event '{}'", event));
        }
    }
    let groups: BTreeSet<&str> = doc.nested_groups.keys().map(String::as_str).collect();
    for group in groups.intersection(&events) {
        errors.push(format!("'{}' is declared both as event and group", group));
    }
    let known = |name: &str| events.contains(name) || groups.contains(name);

    let mut parents: BTreeMap<&str, &str> = BTreeMap::new();
    for (group, children) in &doc.nested_groups {
        for child in children {
            if !known(child.as_str()) {
                errors.push(format!("nestedGroups.{}: unknown node '{}'", group, child));
            }
            if let Some(previous) = parents.insert(child.as_str(), group.as_str())
                && previous != group.as_str()
            {
                errors.push(format!(
                    "'{}' nested under both '{}' and '{}'",
                    child, previous, group
                ));
            }
        }
    }
    errors.extend(nesting_cycles(&parents));

    for kind in Relation::ALL {
        let key = GraphDocument::relation_key(kind);
        for (source, targets) in doc.relation(kind) {
            if !known(source.as_str()) {
                errors.push(format!("{}: unknown node '{}'", key, source));
            }
            for target in targets {
                if !known(target.as_str()) {
                    errors.push(format!("{}.{}: unknown node '{}'", key, source, target));
                }
            }
        }
    }

    for (label, names) in [
        ("included", &doc.marking.included),
        ("executed", &doc.marking.executed),
        ("pending", &doc.marking.pending),
    ] {
        for name in names {
            if groups.contains(name.as_str()) {
                errors.push(format!("marking.{}: '{}' is a group", label, name));
            } else if !events.contains(name.as_str()) {
                errors.push(format!("marking.{}: unknown event '{}'", label, name));
            }
        }
    }

    errors
}

/// Report each group that is its own ancestor, once per cycle.
fn nesting_cycles(parents: &BTreeMap<&str, &str>) -> Vec<String> {
    let mut errors = Vec::new();
    let mut reported: BTreeSet<&str> = BTreeSet::new();
    for start in parents.keys() {
        let mut path = vec![*start];
        let mut current = *start;
        while let Some(parent) = parents.get(current).copied() {
            if let Some(position) = path.iter().position(|node| *node == parent) {
                let cycle = &path[position..];
                if cycle.iter().all(|node| reported.insert(*node)) {
                    let mut rendered: Vec<&str> = cycle.to_vec();
                    rendered.push(parent);
                    errors.push(format!("nesting cycle: {}", rendered.join(" -> ")));
                }
                break;
            }
            path.push(parent);
            current = parent;
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_document;

    #[test]
    fn default_document_is_valid() {
        assert!(validate_invariants(&default_document()).is_empty());
    }

    #[test]
    fn reports_duplicate_and_unknown_nodes() {
        let mut doc = default_document();
        doc.events.push("A".to_string());
        doc.conditions_for
            .insert("C".to_string(), vec!["ghost".to_string()]);

        let errors = validate_invariants(&doc);
        assert!(errors.iter().any(|err| err == "duplicate event 'A'"));
        assert!(
            errors
                .iter()
                .any(|err| err == "conditionsFor.C: unknown node 'ghost'")
        );
    }

    #[test]
    fn reports_node_with_two_parents() {
        let mut doc = default_document();
        doc.nested_groups
            .insert("H".to_string(), vec!["C".to_string()]);

        let errors = validate_invariants(&doc);
        assert_eq!(errors, vec!["'C' nested under both 'G' and 'H'".to_string()]);
    }

    #[test]
    fn reports_nesting_cycle_once() {
        let mut doc = default_document();
        doc.nested_groups
            .insert("H".to_string(), vec!["K".to_string()]);
        doc.nested_groups
            .insert("K".to_string(), vec!["H".to_string()]);

        let errors = validate_invariants(&doc);
        let cycles: Vec<&String> = errors
            .iter()
            .filter(|err| err.starts_with("nesting cycle"))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], "nesting cycle: H -> K -> H");
    }

    #[test]
    fn reports_group_in_marking() {
        let mut doc = default_document();
        doc.marking.pending.push("G".to_string());
        doc.events.push("G".to_string());

        let errors = validate_invariants(&doc);
        assert!(
            errors
                .iter()
                .any(|err| err == "'G' is declared both as event and group")
        );
        assert!(errors.iter().any(|err| err == "marking.pending: 'G' is a group"));
    }
}
