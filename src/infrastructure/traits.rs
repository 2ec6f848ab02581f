//! Storage boundary traits
//!
//! The services never touch storage directly: node records, navigation
//! definitions, tree structures and host content elements are reached through
//! these traits, so tests and other hosts can swap implementations.

use crate::domain::{
    ElementId, FlatEntry, LinkedElement, NavId, Navigation, NewNavigation, Node, NodeId, Placement,
    RepositoryResult, SiteId, StructureId, StructureResult,
};

/// Ordered-tree persistence keyed by structure id.
///
/// Every mutation is atomic with respect to parent and ordering metadata:
/// implementations apply it under their own lock and validate cycles inside
/// that lock.
pub trait TreeStore: Send + Sync {
    /// Allocate an empty structure.
    fn create_structure(&self) -> StructureId;

    /// Drop a structure with all placements.
    fn delete_structure(&self, structure: StructureId) -> StructureResult<()>;

    /// Place `node` (and its subtree) at the end of the top level.
    ///
    /// `max_levels` bounds the deepest level the moved subtree may reach; it
    /// is checked under the same lock as the mutation.
    fn append_to_root(
        &self,
        structure: StructureId,
        node: NodeId,
        max_levels: Option<u32>,
    ) -> StructureResult<()>;

    /// Place `node` (and its subtree) as last child of `parent`.
    fn append(
        &self,
        structure: StructureId,
        node: NodeId,
        parent: NodeId,
        max_levels: Option<u32>,
    ) -> StructureResult<()>;

    /// Place `node` under `parent` (top level for `None`) at `placement`.
    fn place(
        &self,
        structure: StructureId,
        node: NodeId,
        parent: Option<NodeId>,
        placement: Placement,
        max_levels: Option<u32>,
    ) -> StructureResult<()>;

    /// Ancestor `distance` levels above `node`; 1 is the parent.
    fn ancestor_of(
        &self,
        structure: StructureId,
        node: NodeId,
        distance: u32,
    ) -> StructureResult<Option<NodeId>>;

    /// Level of `node`, `None` if it is not placed.
    fn level(&self, structure: StructureId, node: NodeId) -> StructureResult<Option<u32>>;

    /// Ordered children of `parent`, or the top level for `None`.
    fn children(&self, structure: StructureId, parent: Option<NodeId>)
        -> StructureResult<Vec<NodeId>>;

    /// Descendants of `node` in preorder.
    fn descendants(&self, structure: StructureId, node: NodeId) -> StructureResult<Vec<NodeId>>;

    /// Number of levels in use, 0 for an empty structure.
    fn depth(&self, structure: StructureId) -> StructureResult<u32>;

    /// Height of the subtree at `node` (1 for a leaf).
    fn subtree_depth(&self, structure: StructureId, node: NodeId) -> StructureResult<u32>;

    /// All placements in preorder.
    fn flatten(&self, structure: StructureId) -> StructureResult<Vec<FlatEntry>>;

    /// Remove `node` and its descendants; returns removed ids, `node` first.
    fn remove_subtree(&self, structure: StructureId, node: NodeId) -> StructureResult<Vec<NodeId>>;
}

/// CRUD over node records.
pub trait NodeRepository: Send + Sync {
    /// Node `id` in `site`, regardless of its enabled status.
    fn find(&self, id: NodeId, site: SiteId) -> Option<Node>;

    /// Node `id` in whichever site it belongs to.
    fn find_any(&self, id: NodeId) -> Option<Node>;

    /// Insert (no id) or update (with id) a record in one write; returns the
    /// stored record with its id.
    fn save(&self, node: Node) -> RepositoryResult<Node>;

    /// Delete records; returns how many existed.
    fn delete(&self, ids: &[NodeId]) -> usize;

    /// Delete every record of a navigation; returns how many existed.
    fn delete_by_nav(&self, nav: NavId) -> usize;

    /// Records of a navigation, optionally limited to one site.
    fn by_nav(&self, nav: NavId, site: Option<SiteId>) -> Vec<Node>;
}

/// Navigation definitions and their structures.
pub trait NavigationRegistry: Send + Sync {
    fn get(&self, id: NavId) -> Option<Navigation>;

    fn get_by_handle(&self, handle: &str) -> Option<Navigation>;

    /// All navigations ordered by id.
    fn all(&self) -> Vec<Navigation>;

    /// Register a navigation; handles are unique.
    fn insert(&self, nav: NewNavigation) -> RepositoryResult<Navigation>;

    /// Replace an existing definition.
    fn update(&self, nav: Navigation) -> RepositoryResult<Navigation>;

    fn delete(&self, id: NavId) -> RepositoryResult<Navigation>;
}

/// Host content elements that nodes link to.
pub trait ElementResolver: Send + Sync {
    /// Element `id` as localized for `site`.
    fn element(&self, id: ElementId, site: SiteId) -> Option<LinkedElement>;

    /// Element whose URI equals `uri` in `site`.
    fn element_by_uri(&self, uri: &str, site: SiteId) -> Option<LinkedElement>;
}
