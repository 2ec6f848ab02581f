//! Shared fixture: one navigation on two sites, backed by an in-memory workspace.
#![allow(dead_code)]

use std::path::PathBuf;

use navtree::config::Settings;
use navtree::domain::{
    ActiveMatch, ElementId, LinkedElement, NavId, Navigation, NodeId, NodeSubmission, ParentField,
    Site, SiteId,
};
use navtree::infrastructure::di::ServiceContainer;
use navtree::infrastructure::traits::TreeStore;
use navtree::infrastructure::Workspace;
use navtree::util::testing;

pub const SITE: SiteId = SiteId(1);
pub const OTHER_SITE: SiteId = SiteId(2);
pub const BASE_URL: &str = "https://example.com/";

pub fn test_settings(active_match: ActiveMatch) -> Settings {
    Settings {
        data_file: PathBuf::from("unused.toml"),
        default_site: SITE,
        active_match,
        sites: vec![
            Site {
                id: SITE,
                handle: "en".into(),
                base_url: BASE_URL.into(),
            },
            Site {
                id: OTHER_SITE,
                handle: "de".into(),
                base_url: "https://example.com/de/".into(),
            },
        ],
    }
}

pub struct Fixture {
    pub workspace: Workspace,
    pub container: ServiceContainer,
    pub nav: Navigation,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(test_settings(ActiveMatch::Segment), None)
    }

    pub fn with_max_levels(max_levels: u32) -> Self {
        Self::with_settings(test_settings(ActiveMatch::Segment), Some(max_levels))
    }

    pub fn with_settings(settings: Settings, max_levels: Option<u32>) -> Self {
        testing::init_test_setup();
        let workspace = Workspace::in_memory();
        let container = ServiceContainer::new(settings, &workspace);
        let nav = container
            .navigation_service()
            .create("main", "Main Navigation", max_levels)
            .expect("create navigation");
        Self {
            workspace,
            container,
            nav,
        }
    }

    pub fn nav_id(&self) -> NavId {
        self.nav.id
    }

    /// Save a manual link under `parent` (top level for `None`).
    pub fn add(&self, title: &str, url: &str, parent: Option<NodeId>) -> NodeId {
        let submission = NodeSubmission::manual(self.nav.id, SITE, title, url)
            .with_parent(parent.map(ParentField::Node).unwrap_or(ParentField::Root));
        self.container
            .node_service()
            .save_node(&submission)
            .expect("save node")
            .node
            .id
    }

    pub fn register_element(&self, id: u64, title: &str, uri: &str) -> LinkedElement {
        let element = LinkedElement {
            id: ElementId(id),
            site_id: SITE,
            element_type: "entry".into(),
            title: title.into(),
            url: Some(format!("{BASE_URL}{uri}")),
            uri: Some(uri.into()),
            display_name: "Entry".into(),
        };
        self.workspace.elements.upsert(element.clone());
        element
    }

    /// Node ids of the navigation in tree order with their levels.
    pub fn shape(&self) -> Vec<(NodeId, u32)> {
        self.container
            .tree
            .flatten(self.nav.structure_id)
            .expect("flatten")
            .into_iter()
            .map(|e| (e.node, e.level))
            .collect()
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.container
            .tree
            .ancestor_of(self.nav.structure_id, node, 1)
            .expect("ancestor")
    }
}

/// Home
/// About
/// ├── Team
/// │   └── Alice
/// └── History
/// Blog
pub struct SampleTree {
    pub home: NodeId,
    pub about: NodeId,
    pub team: NodeId,
    pub alice: NodeId,
    pub history: NodeId,
    pub blog: NodeId,
}

pub fn sample_tree(fx: &Fixture) -> SampleTree {
    let home = fx.add("Home", "/", None);
    let about = fx.add("About", "/about", None);
    let team = fx.add("Team", "/about/team", Some(about));
    let alice = fx.add("Alice", "/about/team/alice", Some(team));
    let history = fx.add("History", "/about/history", Some(about));
    let blog = fx.add("Blog", "/blog", None);
    SampleTree {
        home,
        about,
        team,
        alice,
        history,
        blog,
    }
}
