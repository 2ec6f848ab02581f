//! Navigation definitions: create, edit, list and cascading delete

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult, FieldError};
use crate::domain::{Navigation, NewNavigation};
use crate::infrastructure::traits::{NavigationRegistry, NodeRepository, TreeStore};

/// Requested changes to a navigation; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationChanges {
    pub handle: Option<String>,
    pub name: Option<String>,
    /// `Some(None)` removes the limit
    pub max_levels: Option<Option<u32>>,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedNavigation {
    pub navigation: Navigation,
    pub nodes_removed: usize,
}

pub struct NavigationService {
    tree: Arc<dyn TreeStore>,
    nodes: Arc<dyn NodeRepository>,
    navs: Arc<dyn NavigationRegistry>,
}

impl NavigationService {
    pub fn new(
        tree: Arc<dyn TreeStore>,
        nodes: Arc<dyn NodeRepository>,
        navs: Arc<dyn NavigationRegistry>,
    ) -> Self {
        Self { tree, nodes, navs }
    }

    /// Register a navigation together with its own empty structure.
    pub fn create(
        &self,
        handle: &str,
        name: &str,
        max_levels: Option<u32>,
    ) -> ApplicationResult<Navigation> {
        debug!("create: handle={} name={} max_levels={:?}", handle, name, max_levels);
        let errors = validate(handle, name, max_levels);
        if !errors.is_empty() {
            return Err(ApplicationError::Validation(errors));
        }

        let structure_id = self.tree.create_structure();
        let registered = self.navs.insert(NewNavigation {
            handle: handle.to_string(),
            name: name.trim().to_string(),
            structure_id,
            max_levels,
        });
        match registered {
            Ok(nav) => {
                info!("create: navigation {} '{}' (structure {})", nav.id, nav.handle, structure_id);
                Ok(nav)
            }
            Err(e) => {
                if let Err(cleanup) = self.tree.delete_structure(structure_id) {
                    warn!("create: orphaned structure {}: {}", structure_id, cleanup);
                }
                Err(e.into())
            }
        }
    }

    pub fn update(&self, handle: &str, changes: NavigationChanges) -> ApplicationResult<Navigation> {
        debug!("update: handle={} changes={:?}", handle, changes);
        let current = self.get_by_handle(handle)?;
        let updated = Navigation {
            handle: changes.handle.unwrap_or_else(|| current.handle.clone()),
            name: changes
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| current.name.clone()),
            max_levels: changes.max_levels.unwrap_or(current.max_levels),
            ..current
        };
        let mut errors = validate(&updated.handle, &updated.name, updated.max_levels);
        if let Some(max) = updated.max_levels.filter(|&m| m > 0) {
            let depth = self.tree.depth(updated.structure_id)?;
            if depth > max {
                errors.push(FieldError::new(
                    "maxLevels",
                    format!("The navigation already uses {depth} levels."),
                ));
            }
        }
        if !errors.is_empty() {
            return Err(ApplicationError::Validation(errors));
        }
        let nav = self.navs.update(updated)?;
        info!("update: navigation {} '{}'", nav.id, nav.handle);
        Ok(nav)
    }

    pub fn get_by_handle(&self, handle: &str) -> ApplicationResult<Navigation> {
        self.navs
            .get_by_handle(handle)
            .ok_or_else(|| ApplicationError::UnknownNavigation(handle.to_string()))
    }

    pub fn all(&self) -> Vec<Navigation> {
        self.navs.all()
    }

    /// Remove a navigation, its structure and every node record it owns.
    pub fn delete(&self, handle: &str) -> ApplicationResult<DeletedNavigation> {
        let nav = self.get_by_handle(handle)?;
        let nodes_removed = self.nodes.delete_by_nav(nav.id);
        self.tree.delete_structure(nav.structure_id)?;
        let navigation = self.navs.delete(nav.id)?;
        info!(
            "delete: navigation '{}' with {} nodes",
            navigation.handle, nodes_removed
        );
        Ok(DeletedNavigation {
            navigation,
            nodes_removed,
        })
    }
}

fn validate(handle: &str, name: &str, max_levels: Option<u32>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Err(e) = Navigation::validate_handle(handle) {
        errors.push(FieldError::new("handle", e.to_string()));
    }
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name cannot be blank."));
    }
    if max_levels == Some(0) {
        errors.push(FieldError::new("maxLevels", "Max levels must be at least 1."));
    }
    errors
}
