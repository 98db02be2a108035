//! Hierarchy forest over interned node ids.
//!
//! Parent and children are stored as index arrays. Every traversal is
//! iterative and bounded by the arena size, so a corrupted forest produces an
//! error instead of unbounded recursion.

use std::collections::BTreeSet;

use crate::core::types::NodeId;

/// A forest edit or walk that would break the single-parent, acyclic shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestViolation {
    /// Attaching `child` under `parent` would close a cycle.
    Cycle { parent: NodeId, child: NodeId },
    /// The stored parent/children arrays disagree or contain a cycle.
    Corrupt(String),
}

/// Parent/children arena. Nodes without a parent are roots; nodes without
/// children are leaves.
///
/// A node that was given a child set is a *declared group* even if that set
/// is now empty: it stops traversal like a leaf but expands to no events.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    parent: Vec<Option<NodeId>>,
    children: Vec<BTreeSet<NodeId>>,
    declared: Vec<bool>,
}

impl Forest {
    /// Make sure `node` has a slot. New nodes start as childless roots.
    pub fn ensure(&mut self, node: NodeId) {
        let needed = node.index() + 1;
        if self.parent.len() < needed {
            self.parent.resize(needed, None);
            self.children.resize_with(needed, BTreeSet::new);
            self.declared.resize(needed, false);
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent.get(node.index()).copied().flatten()
    }

    /// Direct children of `node`, in id order. Unknown nodes have none.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .get(node.index())
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.children
            .get(node.index())
            .is_none_or(|set| set.is_empty())
    }

    /// True if `node` owns children or was declared as a group.
    pub fn is_group(&self, node: NodeId) -> bool {
        !self.is_leaf(node) || self.declared.get(node.index()).copied().unwrap_or(false)
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(index, _)| NodeId::from_index(index))
    }

    /// Walk from `node`'s parent up to its root.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            forest: self,
            next: self.parent(node),
            budget: self.len(),
        }
    }

    /// True if `candidate` is `node` or one of its ancestors.
    pub fn is_self_or_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        candidate == node || self.ancestors(node).any(|ancestor| ancestor == candidate)
    }

    /// Every atomic event at or below `node`. An event expands to itself; an
    /// empty declared group expands to nothing.
    pub fn leaves(&self, node: NodeId) -> BTreeSet<NodeId> {
        let mut leaves = BTreeSet::new();
        let mut seen = vec![false; self.len().max(node.index() + 1)];
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if std::mem::replace(&mut seen[current.index()], true) {
                continue;
            }
            if self.is_leaf(current) {
                if !self.is_group(current) {
                    leaves.insert(current);
                }
                continue;
            }
            stack.extend(self.children(current));
        }
        leaves
    }

    /// Attach `child` under `parent`, moving it away from any previous parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), ForestViolation> {
        self.ensure(parent);
        self.ensure(child);
        if self.is_self_or_ancestor(child, parent) {
            return Err(ForestViolation::Cycle { parent, child });
        }
        self.declared[parent.index()] = true;
        self.link(parent, child);
        Ok(())
    }

    /// Detach `child` from its parent, promoting it to a root.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent(child) {
            self.children[parent.index()].remove(&child);
            self.parent[child.index()] = None;
        }
    }

    /// Replace the full child set of `node`.
    ///
    /// Previously owned children missing from `children` become roots. New
    /// ids are created, roots are annexed and children of other nodes are
    /// re-parented. `node` keeps its own parent, or becomes a root if new.
    /// The edit is rejected without mutation if it would create a cycle.
    pub fn set_children(
        &mut self,
        node: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), ForestViolation> {
        let wanted: BTreeSet<NodeId> = children.into_iter().collect();
        self.ensure(node);
        for child in &wanted {
            self.ensure(*child);
        }
        if let Some(child) = wanted
            .iter()
            .copied()
            .find(|child| self.is_self_or_ancestor(*child, node))
        {
            return Err(ForestViolation::Cycle {
                parent: node,
                child,
            });
        }

        let dropped: Vec<NodeId> = self.children[node.index()]
            .difference(&wanted)
            .copied()
            .collect();
        self.declared[node.index()] = true;
        for child in dropped {
            self.detach(child);
        }
        for child in wanted {
            self.link(node, child);
        }
        Ok(())
    }

    /// Verify parent/children agreement and that every node is reachable
    /// from exactly one root path.
    pub fn check_structure(&self) -> Result<(), ForestViolation> {
        for (index, parent) in self.parent.iter().enumerate() {
            let node = NodeId::from_index(index);
            if let Some(parent) = parent
                && !self.children[parent.index()].contains(&node)
            {
                return Err(ForestViolation::Corrupt(format!(
                    "{node} points at parent {parent} which does not list it"
                )));
            }
            for child in &self.children[index] {
                if self.parent(*child) != Some(node) {
                    return Err(ForestViolation::Corrupt(format!(
                        "{node} lists child {child} owned by {:?}",
                        self.parent(*child)
                    )));
                }
            }
        }

        let mut seen = vec![false; self.len()];
        let mut stack: Vec<NodeId> = self.roots().collect();
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut seen[node.index()], true) {
                return Err(ForestViolation::Corrupt(format!("{node} reached twice")));
            }
            stack.extend(self.children(node));
        }
        if let Some(index) = seen.iter().position(|visited| !visited) {
            return Err(ForestViolation::Corrupt(format!(
                "{} is not reachable from any root",
                NodeId::from_index(index)
            )));
        }
        Ok(())
    }

    /// Overwrite a parent pointer without touching the child sets.
    #[cfg(test)]
    pub(crate) fn set_parent_unchecked(&mut self, child: NodeId, parent: Option<NodeId>) {
        self.ensure(child);
        self.parent[child.index()] = parent;
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            return;
        }
        self.detach(child);
        self.parent[child.index()] = Some(parent);
        self.children[parent.index()].insert(child);
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    forest: &'a Forest,
    next: Option<NodeId>,
    budget: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        self.next = self.forest.parent(current);
        Some(current)
    }
}
