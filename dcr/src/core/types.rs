//! Shared deterministic types for the engine core.
//!
//! Node identifiers are interned once into dense integer ids so the forest,
//! relation store and marking can all be plain index structures.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense handle for an interned node identifier.
///
/// Ids are assigned in insertion order and are only meaningful for the
/// [`NodeTable`] that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interner mapping opaque node names to [`NodeId`]s.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    names: Vec<String>,
    index: HashMap<String, NodeId>,
}

impl NodeTable {
    /// Return the id for `name`, allocating a new one if unseen.
    pub fn intern(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = NodeId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Name for an id issued by this table.
    ///
    /// Panics on foreign ids; ids never outlive the table that issued them.
    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id.index()]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.names.len() as u32).map(NodeId)
    }
}

/// The five DCR relation kinds.
///
/// Each kind is a map from a *source* node to a set of *target* nodes. For
/// `Condition` and `Milestone` the source is the constrained node and the
/// targets are what it waits on. For `Response`, `Include` and `Exclude` the
/// source is the executing node and the targets are what it affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Condition,
    Response,
    Milestone,
    Include,
    Exclude,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Condition,
        Relation::Response,
        Relation::Milestone,
        Relation::Include,
        Relation::Exclude,
    ];

    pub(crate) fn slot(self) -> usize {
        match self {
            Relation::Condition => 0,
            Relation::Response => 1,
            Relation::Milestone => 2,
            Relation::Include => 3,
            Relation::Exclude => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Condition => "condition",
            Relation::Response => "response",
            Relation::Milestone => "milestone",
            Relation::Include => "include",
            Relation::Exclude => "exclude",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of events whose marking changed during one execution.
///
/// Lists are sorted by event name to keep rendered output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecuteSummary {
    /// The executed event.
    pub event: String,
    /// Events that left the included set.
    pub excluded: Vec<String>,
    /// Events that entered the included set.
    pub included: Vec<String>,
    /// Events that became pending.
    pub pending_added: Vec<String>,
    /// Whether the executed event was pending before it fired.
    pub was_pending: bool,
}

impl ExecuteSummary {
    pub(crate) fn sort(&mut self) {
        self.excluded.sort();
        self.included.sort();
        self.pending_added.sort();
    }
}
