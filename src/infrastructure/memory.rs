//! In-process storage implementations
//!
//! Each store guards its state with its own lock. Tree mutations run entirely
//! under the tree store mutex, which serializes concurrent moves and saves.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, instrument};

use crate::domain::{
    ElementId, FlatEntry, LinkedElement, NavId, Navigation, NewNavigation, Node, NodeId, Placement,
    RepositoryError, RepositoryResult, SiteId, StructureArena, StructureError, StructureId,
    StructureResult,
};
use crate::infrastructure::traits::{ElementResolver, NavigationRegistry, NodeRepository, TreeStore};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn next_after<K: Copy>(keys: impl Iterator<Item = K>, raw: impl Fn(K) -> u64) -> u64 {
    keys.map(raw).max().map(|max| max + 1).unwrap_or(1)
}

// ============================================================
// TREE STORE
// ============================================================

#[derive(Debug)]
pub struct MemoryTreeStore {
    structures: Mutex<BTreeMap<StructureId, StructureArena>>,
    next_id: AtomicU64,
}

impl Default for MemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::from_structures(BTreeMap::new())
    }

    pub fn from_structures(structures: BTreeMap<StructureId, StructureArena>) -> Self {
        let next_id = next_after(structures.keys().copied(), |id| id.0);
        Self {
            structures: Mutex::new(structures),
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Every structure as preorder entries, for persistence.
    pub fn export(&self) -> Vec<(StructureId, Vec<FlatEntry>)> {
        self.lock()
            .iter()
            .map(|(id, arena)| (*id, arena.flatten()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<StructureId, StructureArena>> {
        self.structures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_structure<T>(
        &self,
        id: StructureId,
        f: impl FnOnce(&StructureArena) -> StructureResult<T>,
    ) -> StructureResult<T> {
        let guard = self.lock();
        let arena = guard.get(&id).ok_or(StructureError::StructureMissing(id))?;
        f(arena)
    }

    fn with_structure_mut<T>(
        &self,
        id: StructureId,
        f: impl FnOnce(&mut StructureArena) -> StructureResult<T>,
    ) -> StructureResult<T> {
        let mut guard = self.lock();
        let arena = guard
            .get_mut(&id)
            .ok_or(StructureError::StructureMissing(id))?;
        f(arena)
    }
}

impl TreeStore for MemoryTreeStore {
    fn create_structure(&self) -> StructureId {
        let id = StructureId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().insert(id, StructureArena::new());
        debug!("create_structure: {}", id);
        id
    }

    fn delete_structure(&self, structure: StructureId) -> StructureResult<()> {
        self.lock()
            .remove(&structure)
            .map(|_| ())
            .ok_or(StructureError::StructureMissing(structure))
    }

    #[instrument(level = "debug", skip(self))]
    fn append_to_root(
        &self,
        structure: StructureId,
        node: NodeId,
        max_levels: Option<u32>,
    ) -> StructureResult<()> {
        self.with_structure_mut(structure, |arena| arena.append_to_root(node, max_levels))
    }

    #[instrument(level = "debug", skip(self))]
    fn append(
        &self,
        structure: StructureId,
        node: NodeId,
        parent: NodeId,
        max_levels: Option<u32>,
    ) -> StructureResult<()> {
        self.with_structure_mut(structure, |arena| arena.append(node, parent, max_levels))
    }

    #[instrument(level = "debug", skip(self))]
    fn place(
        &self,
        structure: StructureId,
        node: NodeId,
        parent: Option<NodeId>,
        placement: Placement,
        max_levels: Option<u32>,
    ) -> StructureResult<()> {
        self.with_structure_mut(structure, |arena| {
            arena.place(node, parent, placement, max_levels)
        })
    }

    fn ancestor_of(
        &self,
        structure: StructureId,
        node: NodeId,
        distance: u32,
    ) -> StructureResult<Option<NodeId>> {
        self.with_structure(structure, |arena| {
            if arena.contains(node) {
                arena.ancestor(node, distance)
            } else {
                Ok(None)
            }
        })
    }

    fn level(&self, structure: StructureId, node: NodeId) -> StructureResult<Option<u32>> {
        self.with_structure(structure, |arena| {
            if arena.contains(node) {
                arena.level(node).map(Some)
            } else {
                Ok(None)
            }
        })
    }

    fn children(
        &self,
        structure: StructureId,
        parent: Option<NodeId>,
    ) -> StructureResult<Vec<NodeId>> {
        self.with_structure(structure, |arena| arena.children(parent))
    }

    fn descendants(&self, structure: StructureId, node: NodeId) -> StructureResult<Vec<NodeId>> {
        self.with_structure(structure, |arena| arena.descendants(node))
    }

    fn depth(&self, structure: StructureId) -> StructureResult<u32> {
        self.with_structure(structure, |arena| arena.depth())
    }

    fn subtree_depth(&self, structure: StructureId, node: NodeId) -> StructureResult<u32> {
        self.with_structure(structure, |arena| arena.subtree_depth(node))
    }

    fn flatten(&self, structure: StructureId) -> StructureResult<Vec<FlatEntry>> {
        self.with_structure(structure, |arena| Ok(arena.flatten()))
    }

    #[instrument(level = "debug", skip(self))]
    fn remove_subtree(&self, structure: StructureId, node: NodeId) -> StructureResult<Vec<NodeId>> {
        self.with_structure_mut(structure, |arena| arena.remove_subtree(node))
    }
}

// ============================================================
// NODE REPOSITORY
// ============================================================

#[derive(Debug)]
pub struct MemoryNodeRepository {
    nodes: RwLock<BTreeMap<NodeId, Node>>,
    next_id: AtomicU64,
}

impl Default for MemoryNodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNodeRepository {
    pub fn new() -> Self {
        Self::from_nodes(Vec::new())
    }

    /// Load persisted records; records without an id are skipped.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let nodes: BTreeMap<NodeId, Node> = nodes
            .into_iter()
            .filter_map(|node| node.id.map(|id| (id, node)))
            .collect();
        let next_id = next_after(nodes.keys().copied(), |id| id.0);
        Self {
            nodes: RwLock::new(nodes),
            next_id: AtomicU64::new(next_id),
        }
    }

    pub fn export(&self) -> Vec<Node> {
        read(&self.nodes).values().cloned().collect()
    }
}

impl NodeRepository for MemoryNodeRepository {
    fn find(&self, id: NodeId, site: SiteId) -> Option<Node> {
        read(&self.nodes)
            .get(&id)
            .filter(|node| node.site_id == site)
            .cloned()
    }

    fn find_any(&self, id: NodeId) -> Option<Node> {
        read(&self.nodes).get(&id).cloned()
    }

    fn save(&self, mut node: Node) -> RepositoryResult<Node> {
        let mut nodes = write(&self.nodes);
        let id = match node.id {
            Some(id) if nodes.contains_key(&id) => id,
            Some(id) => return Err(RepositoryError::NodeNotFound(id)),
            None => NodeId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        node.id = Some(id);
        nodes.insert(id, node.clone());
        Ok(node)
    }

    fn delete(&self, ids: &[NodeId]) -> usize {
        let mut nodes = write(&self.nodes);
        ids.iter().filter(|id| nodes.remove(id).is_some()).count()
    }

    fn delete_by_nav(&self, nav: NavId) -> usize {
        let mut nodes = write(&self.nodes);
        let before = nodes.len();
        nodes.retain(|_, node| node.nav_id != Some(nav));
        before - nodes.len()
    }

    fn by_nav(&self, nav: NavId, site: Option<SiteId>) -> Vec<Node> {
        read(&self.nodes)
            .values()
            .filter(|node| node.nav_id == Some(nav))
            .filter(|node| site.map_or(true, |s| node.site_id == s))
            .cloned()
            .collect()
    }
}

// ============================================================
// NAVIGATION REGISTRY
// ============================================================

#[derive(Debug)]
pub struct MemoryNavigationRegistry {
    navs: RwLock<BTreeMap<NavId, Navigation>>,
    next_id: AtomicU64,
}

impl Default for MemoryNavigationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNavigationRegistry {
    pub fn new() -> Self {
        Self::from_navigations(Vec::new())
    }

    pub fn from_navigations(navs: Vec<Navigation>) -> Self {
        let navs: BTreeMap<NavId, Navigation> = navs.into_iter().map(|nav| (nav.id, nav)).collect();
        let next_id = next_after(navs.keys().copied(), |id| id.0);
        Self {
            navs: RwLock::new(navs),
            next_id: AtomicU64::new(next_id),
        }
    }

    pub fn export(&self) -> Vec<Navigation> {
        self.all()
    }
}

impl NavigationRegistry for MemoryNavigationRegistry {
    fn get(&self, id: NavId) -> Option<Navigation> {
        read(&self.navs).get(&id).cloned()
    }

    fn get_by_handle(&self, handle: &str) -> Option<Navigation> {
        read(&self.navs)
            .values()
            .find(|nav| nav.handle == handle)
            .cloned()
    }

    fn all(&self) -> Vec<Navigation> {
        read(&self.navs).values().cloned().collect()
    }

    fn insert(&self, nav: NewNavigation) -> RepositoryResult<Navigation> {
        let mut navs = write(&self.navs);
        if navs.values().any(|existing| existing.handle == nav.handle) {
            return Err(RepositoryError::DuplicateHandle(nav.handle));
        }
        let id = NavId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let navigation = Navigation {
            id,
            handle: nav.handle,
            name: nav.name,
            structure_id: nav.structure_id,
            max_levels: nav.max_levels,
        };
        navs.insert(id, navigation.clone());
        Ok(navigation)
    }

    fn update(&self, nav: Navigation) -> RepositoryResult<Navigation> {
        let mut navs = write(&self.navs);
        if !navs.contains_key(&nav.id) {
            return Err(RepositoryError::NavigationNotFound(nav.id));
        }
        if navs
            .values()
            .any(|existing| existing.id != nav.id && existing.handle == nav.handle)
        {
            return Err(RepositoryError::DuplicateHandle(nav.handle));
        }
        navs.insert(nav.id, nav.clone());
        Ok(nav)
    }

    fn delete(&self, id: NavId) -> RepositoryResult<Navigation> {
        write(&self.navs)
            .remove(&id)
            .ok_or(RepositoryError::NavigationNotFound(id))
    }
}

// ============================================================
// ELEMENT CATALOG
// ============================================================

/// Content elements registered by the host, keyed per site.
#[derive(Debug, Default)]
pub struct MemoryElementCatalog {
    elements: RwLock<BTreeMap<(ElementId, SiteId), LinkedElement>>,
}

impl MemoryElementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<LinkedElement>) -> Self {
        let catalog = Self::new();
        for element in elements {
            catalog.upsert(element);
        }
        catalog
    }

    /// Insert or replace the localized element.
    pub fn upsert(&self, element: LinkedElement) {
        write(&self.elements).insert((element.id, element.site_id), element);
    }

    pub fn remove(&self, id: ElementId, site: SiteId) -> Option<LinkedElement> {
        write(&self.elements).remove(&(id, site))
    }

    pub fn export(&self) -> Vec<LinkedElement> {
        read(&self.elements).values().cloned().collect()
    }
}

impl ElementResolver for MemoryElementCatalog {
    fn element(&self, id: ElementId, site: SiteId) -> Option<LinkedElement> {
        read(&self.elements).get(&(id, site)).cloned()
    }

    fn element_by_uri(&self, uri: &str, site: SiteId) -> Option<LinkedElement> {
        let uri = uri.trim_matches('/');
        read(&self.elements)
            .values()
            .find(|element| {
                element.site_id == site
                    && element.uri.as_deref().map(|u| u.trim_matches('/')) == Some(uri)
            })
            .cloned()
    }
}
