//! Ordered tree arena backing a navigation structure.
//!
//! Nodes are addressed by [`NodeId`]; internally each placed node lives in a
//! generational arena slot holding its parent and ordered children. Top-level
//! nodes are kept in an ordered root list, so a structure is a forest.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::entities::{NodeId, Placement};
use crate::domain::error::{StructureError, StructureResult};

/// Slot of a placed node.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub node_id: NodeId,
    /// Index of parent slot, None for top-level nodes
    pub parent: Option<Index>,
    /// Ordered child slots
    pub children: Vec<Index>,
}

/// A placed node in preorder, as produced by [`StructureArena::flatten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// 1 for top-level nodes
    #[serde(skip)]
    pub level: u32,
}

#[derive(Debug, Default)]
pub struct StructureArena {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    index: HashMap<NodeId, Index>,
}

impl StructureArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a structure from preorder entries (parents before children).
    pub fn from_entries(entries: &[FlatEntry]) -> StructureResult<Self> {
        let mut structure = Self::new();
        for entry in entries {
            structure.place(entry.node, entry.parent, Placement::Append, None)?;
        }
        Ok(structure)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    fn slot(&self, node: NodeId) -> StructureResult<Index> {
        self.index
            .get(&node)
            .copied()
            .ok_or(StructureError::NodeMissing(node))
    }

    fn tree_node(&self, idx: Index) -> StructureResult<&TreeNode> {
        self.arena
            .get(idx)
            .ok_or_else(|| StructureError::Corrupt(format!("dangling slot {idx:?}")))
    }

    fn tree_node_mut(&mut self, idx: Index) -> StructureResult<&mut TreeNode> {
        self.arena
            .get_mut(idx)
            .ok_or_else(|| StructureError::Corrupt(format!("dangling slot {idx:?}")))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn parent_of(&self, node: NodeId) -> StructureResult<Option<NodeId>> {
        self.ancestor(node, 1)
    }

    /// Depth of a placed node; top level is 1.
    #[instrument(level = "trace", skip(self))]
    pub fn level(&self, node: NodeId) -> StructureResult<u32> {
        let mut level = 1;
        let mut current = self.tree_node(self.slot(node)?)?.parent;
        while let Some(idx) = current {
            level += 1;
            current = self.tree_node(idx)?.parent;
        }
        Ok(level)
    }

    /// Ancestor `distance` levels above `node`; distance 1 is the parent.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestor(&self, node: NodeId, distance: u32) -> StructureResult<Option<NodeId>> {
        let mut current = self.slot(node)?;
        for _ in 0..distance {
            match self.tree_node(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
        Ok(Some(self.tree_node(current)?.node_id))
    }

    /// Ancestors nearest first.
    pub fn ancestors(&self, node: NodeId) -> StructureResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.tree_node(self.slot(node)?)?.parent;
        while let Some(idx) = current {
            let tree_node = self.tree_node(idx)?;
            result.push(tree_node.node_id);
            current = tree_node.parent;
        }
        Ok(result)
    }

    /// Ordered children of `parent`, or the top level for `None`.
    #[instrument(level = "trace", skip(self))]
    pub fn children(&self, parent: Option<NodeId>) -> StructureResult<Vec<NodeId>> {
        let slots = match parent {
            Some(p) => &self.tree_node(self.slot(p)?)?.children,
            None => &self.roots,
        };
        slots
            .iter()
            .map(|&idx| self.tree_node(idx).map(|n| n.node_id))
            .collect()
    }

    /// All descendants of `node` in preorder, excluding `node` itself.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, node: NodeId) -> StructureResult<Vec<NodeId>> {
        let root = self.slot(node)?;
        let mut result = Vec::new();
        let mut stack: Vec<Index> = self.tree_node(root)?.children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let tree_node = self.tree_node(idx)?;
            result.push(tree_node.node_id);
            stack.extend(tree_node.children.iter().rev());
        }
        Ok(result)
    }

    /// True if `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(candidate)
            .map(|chain| chain.contains(&ancestor))
            .unwrap_or(false)
    }

    /// Height of the subtree rooted at `node`; a leaf has height 1.
    #[instrument(level = "trace", skip(self))]
    pub fn subtree_depth(&self, node: NodeId) -> StructureResult<u32> {
        self.calculate_depth(self.slot(node)?)
    }

    fn calculate_depth(&self, idx: Index) -> StructureResult<u32> {
        let tree_node = self.tree_node(idx)?;
        let mut deepest = 0;
        for &child in &tree_node.children {
            deepest = deepest.max(self.calculate_depth(child)?);
        }
        Ok(1 + deepest)
    }

    /// Number of levels in the whole structure.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> StructureResult<u32> {
        let mut deepest = 0;
        for &root in &self.roots {
            deepest = deepest.max(self.calculate_depth(root)?);
        }
        Ok(deepest)
    }

    /// Place `node` (with its subtree, if already placed) under `parent`.
    ///
    /// Unplaced nodes are inserted. With `max_levels` set, the deepest node
    /// of the moved subtree must stay within that level. All checks run
    /// before anything is detached, so a failed placement leaves the
    /// structure unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn place(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        placement: Placement,
        max_levels: Option<u32>,
    ) -> StructureResult<()> {
        let parent_slot = match parent {
            Some(p) => {
                if p == node || self.is_descendant_of(p, node) {
                    return Err(StructureError::Cycle { node, parent: p });
                }
                Some(
                    self.index
                        .get(&p)
                        .copied()
                        .ok_or(StructureError::ParentMissing(p))?,
                )
            }
            None => None,
        };

        if let Placement::Before(sibling) | Placement::After(sibling) = placement {
            let mismatch = StructureError::SiblingMismatch { node, sibling };
            if sibling == node {
                return Err(mismatch);
            }
            let sibling_slot = self.index.get(&sibling).copied().ok_or(mismatch.clone())?;
            if self.tree_node(sibling_slot)?.parent != parent_slot {
                return Err(mismatch);
            }
        }

        if let Some(max) = max_levels {
            let parent_level = match parent {
                Some(p) => self.level(p)?,
                None => 0,
            };
            let height = if self.contains(node) {
                self.subtree_depth(node)?
            } else {
                1
            };
            if parent_level + height > max {
                return Err(StructureError::TooDeep {
                    node,
                    level: parent_level + height,
                    max,
                });
            }
        }

        let idx = match self.index.get(&node).copied() {
            Some(idx) => {
                self.detach(idx)?;
                idx
            }
            None => {
                let idx = self.arena.insert(TreeNode {
                    node_id: node,
                    parent: None,
                    children: Vec::new(),
                });
                self.index.insert(node, idx);
                idx
            }
        };
        self.tree_node_mut(idx)?.parent = parent_slot;

        let sibling_slot = match placement {
            Placement::Before(s) | Placement::After(s) => Some(self.slot(s)?),
            _ => None,
        };
        let siblings = self.siblings_mut(parent_slot)?;
        let position = match (placement, sibling_slot) {
            (Placement::Prepend, _) => 0,
            (Placement::Before(_), Some(s)) => siblings.iter().position(|&i| i == s).unwrap_or(0),
            (Placement::After(_), Some(s)) => siblings
                .iter()
                .position(|&i| i == s)
                .map(|p| p + 1)
                .unwrap_or(siblings.len()),
            _ => siblings.len(),
        };
        siblings.insert(position, idx);
        Ok(())
    }

    pub fn append_to_root(&mut self, node: NodeId, max_levels: Option<u32>) -> StructureResult<()> {
        self.place(node, None, Placement::Append, max_levels)
    }

    pub fn append(
        &mut self,
        node: NodeId,
        parent: NodeId,
        max_levels: Option<u32>,
    ) -> StructureResult<()> {
        self.place(node, Some(parent), Placement::Append, max_levels)
    }

    fn siblings_mut(&mut self, parent: Option<Index>) -> StructureResult<&mut Vec<Index>> {
        match parent {
            Some(p) => Ok(&mut self.tree_node_mut(p)?.children),
            None => Ok(&mut self.roots),
        }
    }

    fn detach(&mut self, idx: Index) -> StructureResult<()> {
        let parent = self.tree_node(idx)?.parent;
        self.siblings_mut(parent)?.retain(|&i| i != idx);
        self.tree_node_mut(idx)?.parent = None;
        Ok(())
    }

    /// Remove `node` and every descendant; returns the removed ids, `node` first.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, node: NodeId) -> StructureResult<Vec<NodeId>> {
        let idx = self.slot(node)?;
        let mut removed = vec![node];
        removed.extend(self.descendants(node)?);
        self.detach(idx)?;
        for id in &removed {
            if let Some(slot) = self.index.remove(id) {
                self.arena.remove(slot);
            }
        }
        Ok(removed)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Every placed node in preorder with its parent and level.
    pub fn flatten(&self) -> Vec<FlatEntry> {
        self.iter()
            .map(|(level, tree_node)| FlatEntry {
                node: tree_node.node_id,
                parent: tree_node
                    .parent
                    .and_then(|p| self.arena.get(p))
                    .map(|p| p.node_id),
                level,
            })
            .collect()
    }
}

/// Depth-first, left-to-right traversal yielding `(level, node)`.
pub struct PreOrderIterator<'a> {
    structure: &'a StructureArena,
    stack: Vec<(Index, u32)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(structure: &'a StructureArena) -> Self {
        let stack = structure.roots.iter().rev().map(|&idx| (idx, 1)).collect();
        Self { structure, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (u32, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, level)) = self.stack.pop() {
            if let Some(node) = self.structure.arena.get(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((child, level + 1));
                }
                return Some((level, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId(id)
    }

    /// 1
    /// ├── 2
    /// │   └── 3
    /// └── 4
    /// 5
    fn sample() -> StructureArena {
        let mut s = StructureArena::new();
        s.append_to_root(n(1), None).unwrap();
        s.append(n(2), n(1), None).unwrap();
        s.append(n(3), n(2), None).unwrap();
        s.append(n(4), n(1), None).unwrap();
        s.append_to_root(n(5), None).unwrap();
        s
    }

    #[test]
    fn given_sample_when_querying_levels_then_counts_from_one() {
        let s = sample();
        assert_eq!(s.level(n(1)).unwrap(), 1);
        assert_eq!(s.level(n(3)).unwrap(), 3);
        assert_eq!(s.depth().unwrap(), 3);
        assert_eq!(s.subtree_depth(n(2)).unwrap(), 2);
    }

    #[test]
    fn given_sample_when_asking_ancestors_then_walks_up() {
        let s = sample();
        assert_eq!(s.ancestor(n(3), 1).unwrap(), Some(n(2)));
        assert_eq!(s.ancestor(n(3), 2).unwrap(), Some(n(1)));
        assert_eq!(s.ancestor(n(3), 3).unwrap(), None);
        assert_eq!(s.ancestors(n(3)).unwrap(), vec![n(2), n(1)]);
        assert_eq!(s.parent_of(n(5)).unwrap(), None);
    }

    #[test]
    fn given_sample_when_flattening_then_preorder() {
        let s = sample();
        let order: Vec<_> = s.flatten().iter().map(|e| (e.node.0, e.level)).collect();
        assert_eq!(order, vec![(1, 1), (2, 2), (3, 3), (4, 2), (5, 1)]);
        assert_eq!(s.descendants(n(1)).unwrap(), vec![n(2), n(3), n(4)]);
    }

    #[test]
    fn given_subtree_when_moving_then_children_travel_along() {
        let mut s = sample();
        s.append(n(2), n(5), None).unwrap();

        assert_eq!(s.children(Some(n(1))).unwrap(), vec![n(4)]);
        assert_eq!(s.children(Some(n(5))).unwrap(), vec![n(2)]);
        assert_eq!(s.parent_of(n(3)).unwrap(), Some(n(2)));
        assert_eq!(s.level(n(3)).unwrap(), 3);
    }

    #[test]
    fn given_descendant_as_parent_when_placing_then_cycle_and_unchanged() {
        let mut s = sample();
        let before = s.flatten();

        let err = s.append(n(1), n(3), None).unwrap_err();

        assert_eq!(
            err,
            StructureError::Cycle {
                node: n(1),
                parent: n(3)
            }
        );
        assert_eq!(s.flatten(), before);
        assert!(matches!(
            s.append(n(2), n(2), None),
            Err(StructureError::Cycle { .. })
        ));
    }

    #[test]
    fn given_unknown_parent_when_placing_then_parent_missing() {
        let mut s = sample();
        assert_eq!(
            s.append(n(9), n(42), None).unwrap_err(),
            StructureError::ParentMissing(n(42))
        );
        assert!(!s.contains(n(9)));
    }

    #[test]
    fn given_sibling_placements_when_reordering_then_order_follows() {
        let mut s = sample();
        s.place(n(5), None, Placement::Before(n(1)), None).unwrap();
        assert_eq!(s.children(None).unwrap(), vec![n(5), n(1)]);

        s.place(n(5), None, Placement::After(n(1)), None).unwrap();
        assert_eq!(s.children(None).unwrap(), vec![n(1), n(5)]);

        s.place(n(4), Some(n(1)), Placement::Prepend, None).unwrap();
        assert_eq!(s.children(Some(n(1))).unwrap(), vec![n(4), n(2)]);
    }

    #[test]
    fn given_sibling_under_other_parent_when_placing_then_mismatch() {
        let mut s = sample();
        let err = s.place(n(5), None, Placement::After(n(3)), None).unwrap_err();
        assert_eq!(
            err,
            StructureError::SiblingMismatch {
                node: n(5),
                sibling: n(3)
            }
        );
    }

    #[test]
    fn given_level_limit_when_subtree_would_exceed_it_then_too_deep_and_unchanged() {
        let mut s = sample();
        let before = s.flatten();

        let err = s.place(n(2), Some(n(5)), Placement::Append, Some(2)).unwrap_err();

        assert_eq!(
            err,
            StructureError::TooDeep {
                node: n(2),
                level: 3,
                max: 2
            }
        );
        assert_eq!(s.flatten(), before);
        s.place(n(4), Some(n(5)), Placement::Append, Some(2)).unwrap();
        assert_eq!(s.parent_of(n(4)).unwrap(), Some(n(5)));
    }

    #[test]
    fn given_subtree_when_removing_then_descendants_go_too() {
        let mut s = sample();
        let removed = s.remove_subtree(n(2)).unwrap();

        assert_eq!(removed, vec![n(2), n(3)]);
        assert!(!s.contains(n(3)));
        assert_eq!(s.children(Some(n(1))).unwrap(), vec![n(4)]);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn given_flattened_entries_when_rebuilding_then_same_shape() {
        let s = sample();
        let rebuilt = StructureArena::from_entries(&s.flatten()).unwrap();
        assert_eq!(rebuilt.flatten(), s.flatten());
    }
}
