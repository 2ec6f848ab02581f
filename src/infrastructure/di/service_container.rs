//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    BreadcrumbService, MenuService, NavigationService, NodeService,
};
use crate::config::Settings;
use crate::infrastructure::traits::{ElementResolver, NavigationRegistry, NodeRepository, TreeStore};
use crate::infrastructure::workspace::Workspace;

/// Container holding the shared stores and handing out services.
///
/// Services are cheap handles over the same `Arc`ed stores, so every service
/// created from one container sees the same state.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    pub tree: Arc<dyn TreeStore>,
    pub nodes: Arc<dyn NodeRepository>,
    pub navs: Arc<dyn NavigationRegistry>,
    pub elements: Arc<dyn ElementResolver>,
}

impl ServiceContainer {
    /// Create a container over the stores of a loaded workspace.
    pub fn new(settings: Settings, workspace: &Workspace) -> Self {
        Self::with_deps(
            settings,
            workspace.tree.clone(),
            workspace.nodes.clone(),
            workspace.navs.clone(),
            workspace.elements.clone(),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        tree: Arc<dyn TreeStore>,
        nodes: Arc<dyn NodeRepository>,
        navs: Arc<dyn NavigationRegistry>,
        elements: Arc<dyn ElementResolver>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            tree,
            nodes,
            navs,
            elements,
        }
    }

    pub fn node_service(&self) -> NodeService {
        NodeService::new(
            self.tree.clone(),
            self.nodes.clone(),
            self.navs.clone(),
            self.elements.clone(),
        )
    }

    pub fn navigation_service(&self) -> NavigationService {
        NavigationService::new(self.tree.clone(), self.nodes.clone(), self.navs.clone())
    }

    pub fn menu_service(&self) -> MenuService {
        MenuService::new(
            self.settings.clone(),
            self.tree.clone(),
            self.nodes.clone(),
            self.navs.clone(),
            self.elements.clone(),
        )
    }

    pub fn breadcrumb_service(&self) -> BreadcrumbService {
        BreadcrumbService::new(self.settings.clone(), self.elements.clone())
    }
}
