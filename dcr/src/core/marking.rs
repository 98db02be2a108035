//! Runtime state of a DCR graph.

use std::collections::BTreeSet;

use crate::core::types::NodeId;

/// The `(included, executed, pending)` triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marking {
    pub included: BTreeSet<NodeId>,
    pub executed: BTreeSet<NodeId>,
    pub pending: BTreeSet<NodeId>,
}

/// Which marking set an action writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingSet {
    Included,
    Executed,
    Pending,
}

impl Marking {
    pub fn set_mut(&mut self, which: MarkingSet) -> &mut BTreeSet<NodeId> {
        match which {
            MarkingSet::Included => &mut self.included,
            MarkingSet::Executed => &mut self.executed,
            MarkingSet::Pending => &mut self.pending,
        }
    }

    /// Included events that have not executed yet.
    pub fn unexecuted_included(&self) -> BTreeSet<NodeId> {
        self.included.difference(&self.executed).copied().collect()
    }

    /// Included events that are still owed a response.
    pub fn pending_included(&self) -> BTreeSet<NodeId> {
        self.included.intersection(&self.pending).copied().collect()
    }

    /// No included event is pending.
    pub fn is_accepting(&self) -> bool {
        self.included.is_disjoint(&self.pending)
    }
}
