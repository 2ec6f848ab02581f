//! Integration tests for Settings loading with a local config next to the
//! workspace file.
//!
//! Note: these tests assume no global config and no NAVTREE_* variables, so
//! the local file merges onto the compiled defaults.

use std::fs;

use tempfile::TempDir;

use navtree::application::{ApplicationError, ErrorKind};
use navtree::config::{local_config_path, Settings};
use navtree::domain::{ActiveMatch, SiteId};

fn workspace_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("workspace.toml")
}

#[test]
fn given_local_config_when_loading_then_merged_onto_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let data_file = workspace_in(&dir);
    let local = r#"
default_site = 2
active_match = "literal"

[[sites]]
id = 1
handle = "en"
base_url = "https://example.com/"

[[sites]]
id = 2
handle = "de"
base_url = "https://example.com/de/"
"#;
    fs::write(local_config_path(&data_file), local).unwrap();

    // Act
    let settings = Settings::load(Some(&data_file)).expect("load settings");

    // Assert
    assert_eq!(settings.data_file, data_file);
    assert_eq!(settings.default_site, SiteId(2));
    assert_eq!(settings.active_match, ActiveMatch::Literal);
    assert_eq!(settings.sites.len(), 2, "site 1 replaced, site 2 added");
    assert_eq!(settings.site(SiteId(1)).unwrap().handle, "en");
    assert_eq!(settings.resolve_site("de").unwrap().id, SiteId(2));
    assert_eq!(settings.resolve_site("1").unwrap().handle, "en");
    assert!(settings.resolve_site("fr").is_none());
}

#[test]
fn given_no_local_config_when_loading_then_defaults_with_explicit_data_file() {
    let dir = TempDir::new().unwrap();
    let data_file = workspace_in(&dir);

    let settings = Settings::load(Some(&data_file)).expect("load settings");

    assert_eq!(settings.data_file, data_file);
    assert_eq!(settings.default_site, SiteId(1));
    assert_eq!(settings.active_match, ActiveMatch::Segment);
    assert_eq!(settings.sites.len(), 1);
}

#[test]
fn given_default_site_not_configured_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let data_file = workspace_in(&dir);
    fs::write(local_config_path(&data_file), "default_site = 5\n").unwrap();

    let err = Settings::load(Some(&data_file)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn given_site_with_empty_base_url_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let data_file = workspace_in(&dir);
    let local = r#"
[[sites]]
id = 3
handle = "fr"
base_url = " "
"#;
    fs::write(local_config_path(&data_file), local).unwrap();

    let err = Settings::load(Some(&data_file)).unwrap_err();

    assert!(err.to_string().contains("fr"));
}

#[test]
fn given_malformed_local_config_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let data_file = workspace_in(&dir);
    fs::write(local_config_path(&data_file), "active_match = \"fuzzy\"\n").unwrap();

    let err = Settings::load(Some(&data_file)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_effective_settings_when_serializing_then_parseable_again() {
    let dir = TempDir::new().unwrap();
    let data_file = workspace_in(&dir);
    let settings = Settings::load(Some(&data_file)).unwrap();

    let shown = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&shown).unwrap();

    assert_eq!(parsed, settings);
}

#[test]
fn given_template_when_parsing_then_valid_toml() {
    let template = Settings::template();

    let parsed: Result<toml::Table, _> = toml::from_str(&template);

    assert!(parsed.is_ok());
    assert!(template.contains("active_match"));
}
