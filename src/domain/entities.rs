//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name)
                    .map_err(|_| DomainError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

id_type!(
    /// Identifier of a navigation node.
    NodeId,
    "node"
);
id_type!(
    /// Identifier of a navigation definition.
    NavId,
    "navigation"
);
id_type!(
    /// Identifier of a localized site.
    SiteId,
    "site"
);
id_type!(
    /// Identifier of a host content element a node can link to.
    ElementId,
    "element"
);
id_type!(
    /// Identifier of an ordered tree structure in the tree store.
    StructureId,
    "structure"
);

/// A named menu tree. Owns exactly one structure in the tree store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub id: NavId,
    pub handle: String,
    pub name: String,
    pub structure_id: StructureId,
    /// Deepest level a node may occupy (1 = top level only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_levels: Option<u32>,
}

impl Navigation {
    /// Handles are lowercase identifiers: a letter, then letters, digits, `_` or `-`.
    pub fn validate_handle(handle: &str) -> Result<(), DomainError> {
        let mut chars = handle.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidHandle(handle.to_string()))
        }
    }
}

/// Values for registering a navigation; the registry assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNavigation {
    pub handle: String,
    pub name: String,
    pub structure_id: StructureId,
    pub max_levels: Option<u32>,
}

/// One entry of a navigation tree.
///
/// Position in the tree (level, parent, sibling order) is not stored here:
/// it belongs to the navigation's structure in the tree store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unset until the first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_id: Option<NavId>,
    pub site_id: SiteId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<ElementId>,
    /// Explicit URL; always `None` once persisted with an element id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Element type of the link target, `None` for manual links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(default)]
    pub new_window: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Node {
    /// Manual links point to a user-supplied URL instead of an element.
    pub fn is_manual(&self) -> bool {
        self.link_type.is_none()
    }

    /// The URL as it must be stored: linked nodes never keep a URL string.
    pub fn stored_url(&self) -> Option<String> {
        if self.element_id.is_some() {
            None
        } else {
            self.url.clone()
        }
    }
}

/// The "new parent" field of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentField {
    /// Field not submitted: no move requested
    #[default]
    Absent,
    /// Submitted empty: place at top level
    Root,
    /// Submitted with a node id
    Node(NodeId),
}

impl ParentField {
    /// Interpret a raw form value. `""` and `"0"` both mean top level.
    pub fn from_submitted(value: Option<&str>) -> Result<Self, DomainError> {
        match value.map(str::trim) {
            None => Ok(Self::Absent),
            Some("") | Some("0") => Ok(Self::Root),
            Some(raw) => raw.parse::<NodeId>().map(Self::Node),
        }
    }

    pub fn is_submitted(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Requested parent id, `None` for both absent and root.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }
}

/// Input of the save-node action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSubmission {
    pub id: Option<NodeId>,
    pub nav_id: Option<NavId>,
    pub site_id: SiteId,
    pub title: String,
    pub element_id: Option<ElementId>,
    pub url: Option<String>,
    pub link_type: Option<String>,
    pub classes: Option<String>,
    pub new_window: bool,
    pub enabled: bool,
    pub new_parent: ParentField,
}

impl NodeSubmission {
    /// A manual link placed at the end of the top level.
    pub fn manual(nav_id: NavId, site_id: SiteId, title: &str, url: &str) -> Self {
        Self {
            id: None,
            nav_id: Some(nav_id),
            site_id,
            title: title.to_string(),
            element_id: None,
            url: Some(url.to_string()),
            link_type: None,
            classes: None,
            new_window: false,
            enabled: true,
            new_parent: ParentField::Root,
        }
    }

    /// A link to a content element placed at the end of the top level.
    pub fn element(nav_id: NavId, site_id: SiteId, element: &LinkedElement) -> Self {
        Self {
            id: None,
            nav_id: Some(nav_id),
            site_id,
            title: element.title.clone(),
            element_id: Some(element.id),
            url: element.url.clone(),
            link_type: Some(element.element_type.clone()),
            classes: None,
            new_window: false,
            enabled: true,
            new_parent: ParentField::Root,
        }
    }

    /// Start an edit from a persisted node; the parent field is left absent.
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id,
            nav_id: node.nav_id,
            site_id: node.site_id,
            title: node.title.clone(),
            element_id: node.element_id,
            url: node.url.clone(),
            link_type: node.link_type.clone(),
            classes: node.classes.clone(),
            new_window: node.new_window,
            enabled: node.enabled,
            new_parent: ParentField::Absent,
        }
    }

    pub fn with_parent(mut self, parent: ParentField) -> Self {
        self.new_parent = parent;
        self
    }

    /// The record this submission persists, URL already normalized.
    pub fn to_node(&self) -> Node {
        let node = Node {
            id: self.id,
            nav_id: self.nav_id,
            site_id: self.site_id,
            title: self.title.trim().to_string(),
            element_id: self.element_id,
            url: self.url.clone().filter(|u| !u.trim().is_empty()),
            link_type: self.link_type.clone().filter(|t| !t.trim().is_empty()),
            classes: self.classes.clone().filter(|c| !c.trim().is_empty()),
            new_window: self.new_window,
            enabled: self.enabled,
        };
        Node {
            url: node.stored_url(),
            ..node
        }
    }
}

/// A host content element a node can point to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedElement {
    pub id: ElementId,
    pub site_id: SiteId,
    pub element_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Human name of the element type, e.g. "Entry"
    pub display_name: String,
}

/// A localized site and the base URL its links are relative to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub handle: String,
    pub base_url: String,
}

/// Where a moved node lands among its new siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Append,
    Prepend,
    Before(NodeId),
    After(NodeId),
}

/// Parses `append`, `prepend`, `before:<id>` and `after:<id>`.
impl FromStr for Placement {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidPlacement(s.to_string());
        match s.trim().split_once(':') {
            None => match s.trim() {
                "append" => Ok(Placement::Append),
                "prepend" => Ok(Placement::Prepend),
                _ => Err(invalid()),
            },
            Some((kind, id)) => {
                let sibling = id.parse::<NodeId>().map_err(|_| invalid())?;
                match kind {
                    "before" => Ok(Placement::Before(sibling)),
                    "after" => Ok(Placement::After(sibling)),
                    _ => Err(invalid()),
                }
            }
        }
    }
}

/// Summary returned to the client after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNode {
    pub id: NodeId,
    pub title: String,
    pub url: Option<String>,
    pub enabled: bool,
    pub element_display_name: Option<String>,
    pub site_id: SiteId,
    pub new_parent_id: Option<NodeId>,
}

/// One entry of the "choose a parent" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentOption {
    /// Node id, or empty for the top level
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl ParentOption {
    pub fn root() -> Self {
        Self {
            value: String::new(),
            label: String::new(),
            disabled: false,
        }
    }
}

pub type ParentOptions = Vec<ParentOption>;

/// Result of a save: the node summary plus refreshed parent options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub node: SavedNode,
    pub parent_options: ParentOptions,
    /// Whether the tree position changed
    pub moved: bool,
}

/// Current values an inline editor is populated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEditorFields {
    pub id: NodeId,
    pub site_id: SiteId,
    pub title: String,
    pub url: Option<String>,
    pub element_id: Option<ElementId>,
    pub element_display_name: Option<String>,
    pub link_type: Option<String>,
    pub classes: Option<String>,
    pub new_window: bool,
    pub enabled: bool,
    pub parent_id: Option<NodeId>,
    pub level: Option<u32>,
}

/// Rendered menu entry with its resolved URL and nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub node: Node,
    pub url: Option<String>,
    pub level: u32,
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub title: String,
    pub url: String,
    pub segment: Option<String>,
    pub is_element: bool,
}
