//! Integration tests for menu rendering and current-page matching.

mod common;

use rstest::rstest;

use common::{sample_tree, test_settings, Fixture, OTHER_SITE, SITE};
use navtree::application::ApplicationError;
use navtree::domain::{ActiveMatch, MenuItem, NodeId, NodeSubmission, ParentField, SiteId};
use navtree::infrastructure::traits::NodeRepository;

fn titles(items: &[MenuItem]) -> Vec<String> {
    items.iter().map(|item| item.node.title.clone()).collect()
}

fn disable(fx: &Fixture, id: NodeId) {
    let mut submission = NodeSubmission::from_node(&fx.container.nodes.find(id, SITE).unwrap());
    submission.enabled = false;
    fx.container.node_service().save_node(&submission).unwrap();
}

// ============================================================
// tree
// ============================================================

#[test]
fn given_nested_nodes_when_rendering_tree_then_levels_and_urls_resolved() {
    // Arrange
    let fx = Fixture::new();
    let t = sample_tree(&fx);

    // Act
    let items = fx.container.menu_service().tree("main", SITE, false).unwrap();

    // Assert
    assert_eq!(titles(&items), vec!["Home", "About", "Blog"]);
    let about = &items[1];
    assert_eq!(about.node.id, Some(t.about));
    assert_eq!(about.level, 1);
    assert_eq!(titles(&about.children), vec!["Team", "History"]);
    assert_eq!(about.children[0].level, 2);
    assert_eq!(about.children[0].children[0].url.as_deref(), Some("/about/team/alice"));
}

#[test]
fn given_disabled_node_when_rendering_tree_then_hidden_with_subtree_unless_requested() {
    let fx = Fixture::new();
    let t = sample_tree(&fx);
    disable(&fx, t.team);

    let visible = fx.container.menu_service().tree("main", SITE, false).unwrap();
    let all = fx.container.menu_service().tree("main", SITE, true).unwrap();

    assert_eq!(titles(&visible[1].children), vec!["History"]);
    assert_eq!(titles(&all[1].children), vec!["Team", "History"]);
    assert_eq!(titles(&all[1].children[0].children), vec!["Alice"]);
}

#[test]
fn given_nodes_of_two_sites_when_rendering_tree_then_only_requested_site() {
    let fx = Fixture::new();
    fx.add("Home", "/", None);
    fx.container
        .node_service()
        .save_node(
            &NodeSubmission::manual(fx.nav_id(), OTHER_SITE, "Startseite", "/")
                .with_parent(ParentField::Root),
        )
        .unwrap();

    let en = fx.container.menu_service().tree("main", SITE, false).unwrap();
    let de = fx.container.menu_service().tree("main", OTHER_SITE, false).unwrap();

    assert_eq!(titles(&en), vec!["Home"]);
    assert_eq!(titles(&de), vec!["Startseite"]);
}

#[test]
fn given_element_link_when_rendering_tree_then_live_element_url() {
    let fx = Fixture::new();
    let element = fx.register_element(3, "Contact", "contact");
    fx.container
        .node_service()
        .save_node(&NodeSubmission::element(fx.nav_id(), SITE, &element))
        .unwrap();

    let items = fx.container.menu_service().tree("main", SITE, false).unwrap();

    assert_eq!(items[0].url.as_deref(), Some("https://example.com/contact"));
}

#[test]
fn given_unknown_handle_when_rendering_tree_then_unknown_navigation() {
    let fx = Fixture::new();

    let err = fx.container.menu_service().tree("footer", SITE, false).unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownNavigation(ref h) if h == "footer"));
}

// ============================================================
// active matching
// ============================================================

#[rstest]
#[case::homepage("/", vec!["Home"])]
#[case::exact_top_level("/blog", vec!["Blog"])]
#[case::nested_exact("/about/team", vec!["About", "Team"])]
#[case::deep_path("/about/team/alice/?tab=cv", vec!["About", "Team", "Alice"])]
#[case::below_leaf("/blog/2024/hello-world", vec!["Blog"])]
#[case::sibling_prefix("/about-us", vec![])]
#[case::unknown("/contact", vec![])]
fn given_segment_matching_when_resolving_active_then_expected_nodes(
    #[case] path: &str,
    #[case] expected: Vec<&str>,
) {
    // Arrange
    let fx = Fixture::new();
    sample_tree(&fx);
    let menu = fx.container.menu_service();

    // Act
    let active = menu.active_nodes("main", SITE, path).unwrap();

    // Assert
    let active_titles: Vec<String> = active
        .iter()
        .map(|id| fx.container.nodes.find(*id, SITE).unwrap().title)
        .collect();
    assert_eq!(active_titles, expected);
}

#[test]
fn given_literal_matching_when_path_shares_prefix_then_active() {
    let fx = Fixture::with_settings(test_settings(ActiveMatch::Literal), None);
    let t = sample_tree(&fx);
    let menu = fx.container.menu_service();

    assert!(menu.is_active(t.about, SITE, "/about-us").unwrap());
    assert!(!menu.is_active(t.home, SITE, "/about-us").unwrap());
}

#[test]
fn given_child_matches_when_parent_url_differs_then_parent_active() {
    // Arrange
    let fx = Fixture::new();
    let company = fx.add("Company", "/company", None);
    let jobs = fx.add("Jobs", "/careers/jobs", Some(company));
    let menu = fx.container.menu_service();

    // Act / Assert
    assert!(menu.is_active(jobs, SITE, "/careers/jobs").unwrap());
    assert!(menu.is_active(company, SITE, "/careers/jobs").unwrap());
    assert!(!menu.is_active(company, SITE, "/careers").unwrap());
}

#[test]
fn given_disabled_child_when_it_matches_then_neither_is_active() {
    let fx = Fixture::new();
    let company = fx.add("Company", "/company", None);
    let jobs = fx.add("Jobs", "/careers/jobs", Some(company));
    disable(&fx, jobs);
    let menu = fx.container.menu_service();

    assert!(!menu.is_active(jobs, SITE, "/careers/jobs").unwrap());
    assert!(!menu.is_active(company, SITE, "/careers/jobs").unwrap());
}

#[test]
fn given_element_link_when_path_below_element_uri_then_active() {
    let fx = Fixture::new();
    let element = fx.register_element(5, "News", "news");
    let news = fx
        .container
        .node_service()
        .save_node(&NodeSubmission::element(fx.nav_id(), SITE, &element))
        .unwrap()
        .node
        .id;

    let menu = fx.container.menu_service();

    assert!(menu.is_active(news, SITE, "/news/first-post").unwrap());
    assert!(!menu.is_active(news, SITE, "/newsletter").unwrap());
}

#[test]
fn given_unknown_site_when_resolving_active_then_unknown_site() {
    let fx = Fixture::new();
    sample_tree(&fx);

    let err = fx
        .container
        .menu_service()
        .active_nodes("main", SiteId(9), "/")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownSite(SiteId(9))));
}
