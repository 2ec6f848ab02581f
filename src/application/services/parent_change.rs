//! Parent-change detection for a single save request
//!
//! A save either leaves a node where it is or re-places it. The answer is
//! computed at most once per request: the save orchestration asks before
//! persisting (to stage the move) and again when building its summary.

use std::cell::OnceCell;

use tracing::{debug, trace};

use crate::application::ApplicationResult;
use crate::domain::{NodeId, ParentField, SiteId, StructureId};
use crate::infrastructure::traits::{NodeRepository, TreeStore};

/// Per-request answer to "was a new parent requested for this node?".
pub struct ParentChange<'a> {
    tree: &'a dyn TreeStore,
    nodes: &'a dyn NodeRepository,
    structure: StructureId,
    node_id: Option<NodeId>,
    site: SiteId,
    parent: ParentField,
    memo: OnceCell<bool>,
}

impl<'a> ParentChange<'a> {
    pub fn new(
        tree: &'a dyn TreeStore,
        nodes: &'a dyn NodeRepository,
        structure: StructureId,
        node_id: Option<NodeId>,
        site: SiteId,
        parent: ParentField,
    ) -> Self {
        Self {
            tree,
            nodes,
            structure,
            node_id,
            site,
            parent,
            memo: OnceCell::new(),
        }
    }

    /// Requested parent, `None` for the top level or when nothing was submitted.
    pub fn requested_parent(&self) -> Option<NodeId> {
        self.parent.node_id()
    }

    /// True if the node must be (re)placed in the tree.
    ///
    /// Rules, first match wins:
    /// 1. node without id: always placed
    /// 2. parent field absent: stays put
    /// 3. top level requested, node not on level 1: move
    /// 4. node requested, node on level 1: move
    /// 5. otherwise compare the current parent (any status, same site)
    pub fn has_new_parent(&self) -> ApplicationResult<bool> {
        if let Some(known) = self.memo.get() {
            trace!("has_new_parent: memoized {}", known);
            return Ok(*known);
        }
        let detected = self.detect()?;
        debug!(
            "has_new_parent: node={:?} parent={:?} -> {}",
            self.node_id, self.parent, detected
        );
        Ok(*self.memo.get_or_init(|| detected))
    }

    fn detect(&self) -> ApplicationResult<bool> {
        let Some(node_id) = self.node_id else {
            return Ok(true);
        };
        if !self.parent.is_submitted() {
            return Ok(false);
        }

        let Some(level) = self.tree.level(self.structure, node_id)? else {
            // persisted but never placed
            return Ok(true);
        };

        match self.parent {
            ParentField::Absent => Ok(false),
            ParentField::Root => Ok(level != 1),
            ParentField::Node(_) if level == 1 => Ok(true),
            ParentField::Node(requested) => {
                let current = self
                    .tree
                    .ancestor_of(self.structure, node_id, 1)?
                    .and_then(|id| self.nodes.find(id, self.site))
                    .and_then(|parent| parent.id);
                Ok(current != Some(requested))
            }
        }
    }
}
