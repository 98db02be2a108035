//! Relation store: one `source -> targets` map per relation kind.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{NodeId, Relation};

type EdgeMap = BTreeMap<NodeId, BTreeSet<NodeId>>;

static NO_TARGETS: BTreeSet<NodeId> = BTreeSet::new();

/// Five independent edge maps indexed by [`Relation`].
///
/// Targets are sets, so inserting an existing edge is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationStore {
    maps: [EdgeMap; 5],
}

impl RelationStore {
    /// Add one edge. Returns true if it was not already present.
    pub fn insert(&mut self, kind: Relation, source: NodeId, target: NodeId) -> bool {
        self.maps[kind.slot()]
            .entry(source)
            .or_default()
            .insert(target)
    }

    /// Add every edge `source -> t` for `t` in `targets`. Returns how many were new.
    ///
    /// An empty `targets` leaves the store untouched; `source` does not become
    /// a key.
    pub fn extend(
        &mut self,
        kind: Relation,
        source: NodeId,
        targets: impl IntoIterator<Item = NodeId>,
    ) -> usize {
        let mut targets = targets.into_iter().peekable();
        if targets.peek().is_none() {
            return 0;
        }
        let entry = self.maps[kind.slot()].entry(source).or_default();
        targets.filter(|target| entry.insert(*target)).count()
    }

    /// Targets of `source` under `kind`; empty if `source` has none.
    pub fn targets(&self, kind: Relation, source: NodeId) -> &BTreeSet<NodeId> {
        self.maps[kind.slot()].get(&source).unwrap_or(&NO_TARGETS)
    }

    pub fn contains(&self, kind: Relation, source: NodeId, target: NodeId) -> bool {
        self.targets(kind, source).contains(&target)
    }

    /// True if `source` is a key of any relation kind.
    pub fn is_source(&self, source: NodeId) -> bool {
        self.maps.iter().any(|map| map.contains_key(&source))
    }

    /// `(source, targets)` pairs for one kind, in id order.
    pub fn entries(&self, kind: Relation) -> impl Iterator<Item = (NodeId, &BTreeSet<NodeId>)> {
        self.maps[kind.slot()]
            .iter()
            .map(|(source, targets)| (*source, targets))
    }

    /// Every `(kind, source, target)` triple.
    pub fn edges(&self) -> impl Iterator<Item = (Relation, NodeId, NodeId)> + '_ {
        Relation::ALL.into_iter().flat_map(move |kind| {
            self.entries(kind).flat_map(move |(source, targets)| {
                targets.iter().map(move |target| (kind, source, *target))
            })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.maps
            .iter()
            .flat_map(|map| map.values())
            .map(BTreeSet::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::NodeTable;

    #[test]
    fn insert_ignores_duplicate_edges() {
        let mut table = NodeTable::default();
        let (a, b) = (table.intern("a"), table.intern("b"));
        let mut store = RelationStore::default();

        assert!(store.insert(Relation::Include, a, b));
        assert!(!store.insert(Relation::Include, a, b));
        assert_eq!(store.edge_count(), 1);
        assert!(store.contains(Relation::Include, a, b));
        assert!(!store.contains(Relation::Exclude, a, b));
    }

    #[test]
    fn kinds_are_independent() {
        let mut table = NodeTable::default();
        let (a, b, c) = (table.intern("a"), table.intern("b"), table.intern("c"));
        let mut store = RelationStore::default();
        store.insert(Relation::Condition, a, b);
        store.extend(Relation::Response, a, [b, c]);

        assert_eq!(store.targets(Relation::Condition, a), &BTreeSet::from([b]));
        assert_eq!(store.targets(Relation::Response, a), &BTreeSet::from([b, c]));
        assert!(store.targets(Relation::Milestone, a).is_empty());
        assert!(store.is_source(a));
        assert!(!store.is_source(b));
        assert_eq!(store.edges().count(), 3);
    }

    #[test]
    fn extend_with_no_targets_adds_no_key() {
        let mut table = NodeTable::default();
        let a = table.intern("a");
        let mut store = RelationStore::default();

        assert_eq!(store.extend(Relation::Condition, a, []), 0);
        assert!(!store.is_source(a));
        assert_eq!(store.entries(Relation::Condition).count(), 0);
    }
}
