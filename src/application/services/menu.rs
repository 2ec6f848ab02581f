//! Menu read side: nested trees, live URLs and the active trail

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::nodes::effective_url;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{ActiveMatcher, MenuItem, Navigation, Node, NodeId, Site, SiteId};
use crate::infrastructure::traits::{ElementResolver, NavigationRegistry, NodeRepository, TreeStore};

/// Renders navigation trees for one site and answers which nodes are active.
pub struct MenuService {
    settings: Arc<Settings>,
    tree: Arc<dyn TreeStore>,
    nodes: Arc<dyn NodeRepository>,
    navs: Arc<dyn NavigationRegistry>,
    elements: Arc<dyn ElementResolver>,
}

impl MenuService {
    pub fn new(
        settings: Arc<Settings>,
        tree: Arc<dyn TreeStore>,
        nodes: Arc<dyn NodeRepository>,
        navs: Arc<dyn NavigationRegistry>,
        elements: Arc<dyn ElementResolver>,
    ) -> Self {
        Self {
            settings,
            tree,
            nodes,
            navs,
            elements,
        }
    }

    /// Nested menu of a navigation as seen by `site`.
    ///
    /// Disabled nodes and everything below them are left out unless
    /// `include_disabled` is set.
    pub fn tree(
        &self,
        handle: &str,
        site: SiteId,
        include_disabled: bool,
    ) -> ApplicationResult<Vec<MenuItem>> {
        let nav = self.navigation(handle)?;
        self.items_below(&nav, None, 1, site, include_disabled)
    }

    fn items_below(
        &self,
        nav: &Navigation,
        parent: Option<NodeId>,
        level: u32,
        site: SiteId,
        include_disabled: bool,
    ) -> ApplicationResult<Vec<MenuItem>> {
        let mut items = Vec::new();
        for id in self.tree.children(nav.structure_id, parent)? {
            let Some(node) = self.nodes.find(id, site) else {
                continue;
            };
            if !node.enabled && !include_disabled {
                continue;
            }
            let children = self.items_below(nav, Some(id), level + 1, site, include_disabled)?;
            items.push(MenuItem {
                url: self.effective_url(&node),
                node,
                level,
                children,
            });
        }
        Ok(items)
    }

    /// Explicit URL, or the live URL of the linked element.
    pub fn effective_url(&self, node: &Node) -> Option<String> {
        let element = node
            .element_id
            .and_then(|id| self.elements.element(id, node.site_id));
        effective_url(node, element.as_ref())
    }

    /// True if the node's link is the current page, a parent path of it, or
    /// if any enabled descendant is active.
    pub fn is_active(
        &self,
        node_id: NodeId,
        site: SiteId,
        current_path: &str,
    ) -> ApplicationResult<bool> {
        let node = self
            .nodes
            .find(node_id, site)
            .ok_or_else(|| ApplicationError::not_found("node", node_id))?;
        let nav_id = node.nav_id.ok_or(ApplicationError::MissingNavigation)?;
        let nav = self
            .navs
            .get(nav_id)
            .ok_or_else(|| ApplicationError::UnknownNavigation(nav_id.to_string()))?;

        let mut subtree = vec![node_id];
        if self.tree.level(nav.structure_id, node_id)?.is_some() {
            subtree.extend(self.tree.descendants(nav.structure_id, node_id)?);
        }
        let active = self.active_map(&nav, &subtree, site, current_path)?;
        Ok(active.get(&node_id).copied().unwrap_or(false))
    }

    /// Every active node of a navigation, in tree order.
    pub fn active_nodes(
        &self,
        handle: &str,
        site: SiteId,
        current_path: &str,
    ) -> ApplicationResult<Vec<NodeId>> {
        let nav = self.navigation(handle)?;
        let order: Vec<NodeId> = self
            .tree
            .flatten(nav.structure_id)?
            .into_iter()
            .map(|entry| entry.node)
            .collect();
        let active = self.active_map(&nav, &order, site, current_path)?;
        Ok(order
            .into_iter()
            .filter(|id| active.get(id).copied().unwrap_or(false))
            .collect())
    }

    /// Evaluate nodes given in preorder; children are settled before their
    /// parent by walking the list backwards.
    fn active_map(
        &self,
        nav: &Navigation,
        preorder: &[NodeId],
        site: SiteId,
        current_path: &str,
    ) -> ApplicationResult<HashMap<NodeId, bool>> {
        let site = self.site(site)?;
        let matcher = ActiveMatcher::new(site.base_url.clone(), self.settings.active_match);
        debug!(
            "active_map: nav={} site={} path={:?} mode={}",
            nav.handle, site.id, current_path, self.settings.active_match
        );

        let mut active: HashMap<NodeId, bool> = HashMap::with_capacity(preorder.len());
        for &id in preorder.iter().rev() {
            let Some(node) = self.nodes.find(id, site.id) else {
                continue;
            };
            if !node.enabled {
                active.insert(id, false);
                continue;
            }
            let url = self.effective_url(&node);
            let direct = matcher.matches(url.as_deref(), node.is_manual(), current_path);
            let children = if direct || self.tree.level(nav.structure_id, id)?.is_none() {
                Vec::new()
            } else {
                self.tree.children(nav.structure_id, Some(id))?
            };
            let child_active = children
                .iter()
                .any(|child| active.get(child).copied().unwrap_or(false));
            active.insert(id, direct || child_active);
        }
        Ok(active)
    }

    fn navigation(&self, handle: &str) -> ApplicationResult<Navigation> {
        self.navs
            .get_by_handle(handle)
            .ok_or_else(|| ApplicationError::UnknownNavigation(handle.to_string()))
    }

    fn site(&self, id: SiteId) -> ApplicationResult<&Site> {
        self.settings
            .site(id)
            .ok_or(ApplicationError::UnknownSite(id))
    }
}
