//! Node save, move and delete orchestration
//!
//! Every action follows the same discipline: configuration and reference
//! checks run first and abort before anything is written. A save then
//! persists the scalar fields and applies the staged tree move last, so a
//! failing tree mutation is reported as a placement failure of an already
//! saved node.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::application::services::parent_change::ParentChange;
use crate::application::{ApplicationError, ApplicationResult, FieldError};
use crate::domain::{
    LinkedElement, NavId, Navigation, Node, NodeEditorFields, NodeId, NodeSubmission,
    ParentOption, ParentOptions, Placement, SaveOutcome, SavedNode, SiteId, StructureError,
};
use crate::infrastructure::traits::{ElementResolver, NavigationRegistry, NodeRepository, TreeStore};

/// Indentation per level in parent option labels.
const OPTION_INDENT: &str = "    ";

/// A single CSS class name.
const CSS_CLASS_PATTERN: &str = r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$";

/// Orchestrates the node actions of the admin client.
pub struct NodeService {
    tree: Arc<dyn TreeStore>,
    nodes: Arc<dyn NodeRepository>,
    navs: Arc<dyn NavigationRegistry>,
    elements: Arc<dyn ElementResolver>,
}

impl NodeService {
    pub fn new(
        tree: Arc<dyn TreeStore>,
        nodes: Arc<dyn NodeRepository>,
        navs: Arc<dyn NavigationRegistry>,
        elements: Arc<dyn ElementResolver>,
    ) -> Self {
        Self {
            tree,
            nodes,
            navs,
            elements,
        }
    }

    /// Save a node and place it if a new parent was requested.
    ///
    /// # Errors
    /// - `MissingNavigation` / `UnknownNavigation` before anything else
    /// - `NotFound`, `Cycle`, `ForeignParent` for unresolvable references
    /// - `Validation` with every invalid field at once
    /// - `PlacementFailed` if the record was saved but the tree move failed
    pub fn save_node(&self, submission: &NodeSubmission) -> ApplicationResult<SaveOutcome> {
        debug!(
            "save_node: id={:?} nav={:?} site={} parent={:?}",
            submission.id, submission.nav_id, submission.site_id, submission.new_parent
        );
        let nav = self.navigation_for(submission.nav_id)?;
        let mut errors = Vec::new();
        if let Some(id) = submission.id {
            let existing = self
                .nodes
                .find(id, submission.site_id)
                .ok_or_else(|| ApplicationError::not_found("node", id))?;
            if existing.nav_id != Some(nav.id) {
                errors.push(FieldError::new("navId", "A node cannot change its navigation."));
            }
        }

        let parent = self.resolve_parent(
            &nav,
            submission.id,
            submission.new_parent.node_id(),
            submission.site_id,
        )?;
        let element = self.resolve_element(submission)?;

        let change = ParentChange::new(
            self.tree.as_ref(),
            self.nodes.as_ref(),
            nav.structure_id,
            submission.id,
            submission.site_id,
            submission.new_parent,
        );
        let moving = change.has_new_parent()?;

        errors.extend(validate_fields(submission)?);
        if moving {
            errors.extend(self.level_limit_error(&nav, submission.id, parent)?);
        }
        if !errors.is_empty() {
            return Err(ApplicationError::Validation(errors));
        }

        let mut record = submission.to_node();
        record.nav_id = Some(nav.id);
        let saved = self.nodes.save(record)?;
        let node_id = saved
            .id
            .ok_or_else(|| StructureError::Corrupt("repository returned a node without id".into()))?;
        info!("save_node: saved node {} '{}'", node_id, saved.title);

        if change.has_new_parent()? {
            self.apply_move(&nav, node_id, change.requested_parent())
                .map_err(|source| {
                    warn!("save_node: node {} saved, placement failed: {}", node_id, source);
                    ApplicationError::PlacementFailed { node_id, source }
                })?;
            info!(
                "save_node: placed node {} under {:?}",
                node_id,
                change.requested_parent()
            );
        }

        let summary = SavedNode {
            id: node_id,
            title: saved.title.clone(),
            url: effective_url(&saved, element.as_ref()),
            enabled: saved.enabled,
            element_display_name: element.as_ref().map(|e| e.display_name.clone()),
            site_id: saved.site_id,
            new_parent_id: if moving { change.requested_parent() } else { None },
        };
        Ok(SaveOutcome {
            node: summary,
            parent_options: self.options_for(&nav, saved.site_id, None)?,
            moved: moving,
        })
    }

    /// Answer the parent-change question for a submission without saving.
    pub fn has_new_parent(&self, submission: &NodeSubmission) -> ApplicationResult<bool> {
        let nav = self.navigation_for(submission.nav_id)?;
        ParentChange::new(
            self.tree.as_ref(),
            self.nodes.as_ref(),
            nav.structure_id,
            submission.id,
            submission.site_id,
            submission.new_parent,
        )
        .has_new_parent()
    }

    /// Relocate a node with its subtree.
    ///
    /// Returns parent options in which the moved node and its descendants
    /// are disabled.
    pub fn move_node(
        &self,
        node_id: NodeId,
        new_parent: Option<NodeId>,
        site: SiteId,
        placement: Placement,
    ) -> ApplicationResult<ParentOptions> {
        debug!(
            "move_node: node={} parent={:?} site={} placement={:?}",
            node_id, new_parent, site, placement
        );
        let node = self
            .nodes
            .find(node_id, site)
            .ok_or_else(|| ApplicationError::not_found("node", node_id))?;
        let nav = self.navigation_for(node.nav_id)?;
        let parent = self.resolve_parent(&nav, Some(node_id), new_parent, site)?;
        if let Placement::Before(sibling) | Placement::After(sibling) = placement {
            self.nodes
                .find(sibling, site)
                .ok_or_else(|| ApplicationError::not_found("node", sibling))?;
        }
        if let Some(limit) = self.level_limit_error(&nav, Some(node_id), parent)? {
            return Err(ApplicationError::Validation(vec![limit]));
        }

        self.tree
            .place(nav.structure_id, node_id, parent, placement, nav.max_levels)
            .map_err(|e| match e {
                StructureError::Cycle { node, parent } => ApplicationError::Cycle { node, parent },
                StructureError::TooDeep { max, .. } => {
                    ApplicationError::Validation(vec![too_deep(max)])
                }
                other => ApplicationError::Structure(other),
            })?;
        info!("move_node: moved node {} under {:?}", node_id, parent);

        self.options_for(&nav, site, Some(node_id))
    }

    /// Delete nodes with their subtrees.
    ///
    /// All ids are checked before anything is removed. Ids removed earlier in
    /// the same request as part of another subtree are skipped.
    pub fn delete_nodes(&self, node_ids: &[NodeId]) -> ApplicationResult<ParentOptions> {
        debug!("delete_nodes: {:?}", node_ids);
        if node_ids.is_empty() {
            return Err(ApplicationError::field("nodeIds", "No nodes selected."));
        }

        let mut targets = Vec::with_capacity(node_ids.len());
        for &id in node_ids {
            let node = self
                .nodes
                .find_any(id)
                .ok_or_else(|| ApplicationError::not_found("node", id))?;
            let nav = self.navigation_for(node.nav_id)?;
            targets.push((id, node.site_id, nav));
        }

        let mut removed: HashSet<NodeId> = HashSet::new();
        for (id, _, nav) in &targets {
            if removed.contains(id) {
                debug!("delete_nodes: {} already removed with an ancestor", id);
                continue;
            }
            let subtree = match self.tree.remove_subtree(nav.structure_id, *id) {
                Ok(subtree) => subtree,
                Err(StructureError::NodeMissing(_)) => {
                    debug!("delete_nodes: {} not placed, removing the record only", id);
                    vec![*id]
                }
                Err(e) => return Err(e.into()),
            };
            let deleted = self.nodes.delete(&subtree);
            info!("delete_nodes: removed node {} ({} records)", id, deleted);
            removed.extend(subtree);
        }

        let (_, site, nav) = &targets[0];
        self.options_for(nav, *site, None)
    }

    /// Current values an inline editor is populated with.
    pub fn editor_fields(&self, node_id: NodeId, site: SiteId) -> ApplicationResult<NodeEditorFields> {
        let node = self.get_node(node_id, site)?;
        let nav = self.navigation_for(node.nav_id)?;
        let element = node
            .element_id
            .and_then(|element_id| self.elements.element(element_id, site));
        let level = self.tree.level(nav.structure_id, node_id)?;
        let parent_id = match level {
            Some(_) => self.tree.ancestor_of(nav.structure_id, node_id, 1)?,
            None => None,
        };

        Ok(NodeEditorFields {
            id: node_id,
            site_id: node.site_id,
            url: effective_url(&node, element.as_ref()),
            title: node.title,
            element_id: node.element_id,
            element_display_name: element.map(|e| e.display_name),
            link_type: node.link_type,
            classes: node.classes,
            new_window: node.new_window,
            enabled: node.enabled,
            parent_id,
            level,
        })
    }

    pub fn get_node(&self, node_id: NodeId, site: SiteId) -> ApplicationResult<Node> {
        self.nodes
            .find(node_id, site)
            .ok_or_else(|| ApplicationError::not_found("node", node_id))
    }

    /// Parent options for a navigation: a top-level entry, then every node
    /// in tree order with its label indented by level.
    ///
    /// `exclude` and its descendants are disabled, as are nodes that already
    /// sit on the deepest allowed level.
    pub fn parent_options(
        &self,
        nav_id: NavId,
        site: SiteId,
        exclude: Option<NodeId>,
    ) -> ApplicationResult<ParentOptions> {
        let nav = self.navigation_for(Some(nav_id))?;
        self.options_for(&nav, site, exclude)
    }

    fn options_for(
        &self,
        nav: &Navigation,
        site: SiteId,
        exclude: Option<NodeId>,
    ) -> ApplicationResult<ParentOptions> {
        let mut disabled: HashSet<NodeId> = HashSet::new();
        if let Some(id) = exclude {
            if self.tree.level(nav.structure_id, id)?.is_some() {
                disabled.insert(id);
                disabled.extend(self.tree.descendants(nav.structure_id, id)?);
            }
        }

        let mut options = vec![ParentOption::root()];
        for entry in self.tree.flatten(nav.structure_id)? {
            let Some(node) = self.nodes.find(entry.node, site) else {
                continue;
            };
            let too_deep = nav.max_levels.is_some_and(|max| entry.level >= max);
            options.push(ParentOption {
                value: entry.node.to_string(),
                label: format!(
                    "{}{}",
                    OPTION_INDENT.repeat(entry.level.saturating_sub(1) as usize),
                    node.title
                ),
                disabled: too_deep || disabled.contains(&entry.node),
            });
        }
        Ok(options)
    }

    fn navigation_for(&self, nav_id: Option<NavId>) -> ApplicationResult<Navigation> {
        let nav_id = nav_id.ok_or(ApplicationError::MissingNavigation)?;
        self.navs
            .get(nav_id)
            .ok_or_else(|| ApplicationError::UnknownNavigation(nav_id.to_string()))
    }

    /// Resolve the requested parent and reject cycles and foreign parents.
    fn resolve_parent(
        &self,
        nav: &Navigation,
        node_id: Option<NodeId>,
        parent_id: Option<NodeId>,
        site: SiteId,
    ) -> ApplicationResult<Option<NodeId>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let parent = self
            .nodes
            .find(parent_id, site)
            .ok_or_else(|| ApplicationError::not_found("node", parent_id))?;
        if parent.nav_id != Some(nav.id) {
            return Err(ApplicationError::ForeignParent { parent: parent_id });
        }
        if let Some(node_id) = node_id {
            let cycle = ApplicationError::Cycle {
                node: node_id,
                parent: parent_id,
            };
            if node_id == parent_id {
                return Err(cycle);
            }
            if self.tree.level(nav.structure_id, node_id)?.is_some()
                && self
                    .tree
                    .descendants(nav.structure_id, node_id)?
                    .contains(&parent_id)
            {
                return Err(cycle);
            }
        }
        Ok(Some(parent_id))
    }

    fn resolve_element(&self, submission: &NodeSubmission) -> ApplicationResult<Option<LinkedElement>> {
        match submission.element_id {
            Some(id) => self
                .elements
                .element(id, submission.site_id)
                .map(Some)
                .ok_or_else(|| ApplicationError::not_found("element", id)),
            None => Ok(None),
        }
    }

    /// Advisory depth check for early, collected reporting. The tree store
    /// enforces the same limit atomically when the move is applied.
    fn level_limit_error(
        &self,
        nav: &Navigation,
        node_id: Option<NodeId>,
        parent: Option<NodeId>,
    ) -> ApplicationResult<Option<FieldError>> {
        let Some(max) = nav.max_levels else {
            return Ok(None);
        };
        let parent_level = match parent {
            Some(p) => self.tree.level(nav.structure_id, p)?.unwrap_or(1),
            None => 0,
        };
        let height = match node_id {
            Some(id) if self.tree.level(nav.structure_id, id)?.is_some() => {
                self.tree.subtree_depth(nav.structure_id, id)?
            }
            _ => 1,
        };
        Ok((parent_level + height > max).then(|| too_deep(max)))
    }

    fn apply_move(
        &self,
        nav: &Navigation,
        node_id: NodeId,
        parent: Option<NodeId>,
    ) -> Result<(), StructureError> {
        match parent {
            Some(parent) => self
                .tree
                .append(nav.structure_id, node_id, parent, nav.max_levels),
            None => self
                .tree
                .append_to_root(nav.structure_id, node_id, nav.max_levels),
        }
    }
}

fn too_deep(max: u32) -> FieldError {
    FieldError::new("parent", format!("The navigation allows at most {max} levels."))
}

/// Explicit URL of a manual link, or the live URL of the linked element.
pub fn effective_url(node: &Node, element: Option<&LinkedElement>) -> Option<String> {
    match node.element_id {
        Some(_) => element.and_then(|e| e.url.clone()),
        None => node.url.clone(),
    }
}

/// Check scalar fields, collecting every problem.
fn validate_fields(submission: &NodeSubmission) -> ApplicationResult<Vec<FieldError>> {
    let mut errors = Vec::new();

    if submission.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title cannot be blank."));
    }

    let link_type = submission
        .link_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    match (submission.element_id, link_type) {
        (None, None) => {
            if submission.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                errors.push(FieldError::new("url", "URL cannot be blank."));
            }
        }
        (Some(_), None) => errors.push(FieldError::new(
            "linkType",
            "A linked element needs its element type.",
        )),
        (None, Some(_)) => errors.push(FieldError::new("elementId", "Choose an element to link to.")),
        (Some(_), Some(_)) => {}
    }

    if let Some(classes) = submission.classes.as_deref() {
        let re = Regex::new(CSS_CLASS_PATTERN).map_err(|e| ApplicationError::OperationFailed {
            context: "compile css class pattern".into(),
            source: Box::new(e),
        })?;
        let invalid: Vec<&str> = classes
            .split_whitespace()
            .filter(|class| !re.is_match(class))
            .collect();
        if !invalid.is_empty() {
            errors.push(FieldError::new(
                "classes",
                format!("Invalid CSS class: {}", invalid.join(", ")),
            ));
        }
    }

    Ok(errors)
}
