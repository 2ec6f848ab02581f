//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/navtree/navtree.toml`
//! 3. Local config: `.navtree.toml` next to the workspace data file
//! 4. Environment variables: `NAVTREE_*` prefix
//! 5. Explicit data file from the command line

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{ActiveMatch, Site, SiteId};
use crate::util::path::{expand_path, workspace_dir};

const APP_NAME: &str = "navtree";
const LOCAL_CONFIG_FILE: &str = ".navtree.toml";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub default_site: Option<SiteId>,
    pub active_match: Option<ActiveMatch>,
    pub sites: Option<Vec<Site>>,
}

/// Unified configuration for navtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Workspace file holding navigations, nodes and structures
    pub data_file: PathBuf,
    /// Site used when a command does not name one
    pub default_site: SiteId,
    /// Prefix rule of current-page matching
    pub active_match: ActiveMatch,
    /// Known sites and their base URLs
    pub sites: Vec<Site>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            default_site: SiteId(1),
            active_match: ActiveMatch::default(),
            sites: vec![Site {
                id: SiteId(1),
                handle: "default".into(),
                base_url: "http://localhost/".into(),
            }],
        }
    }
}

/// Default workspace location in the XDG data directory.
fn default_data_file() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("workspace.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.navtree/workspace.toml"))
}

/// Get the XDG config directory for navtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("navtree.toml"))
}

/// Get the path to the local config file belonging to a workspace file.
pub fn local_config_path(data_file: &Path) -> PathBuf {
    workspace_dir(data_file).join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Site by id.
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }

    /// Site by handle or numeric id.
    pub fn resolve_site(&self, key: &str) -> Option<&Site> {
        self.sites
            .iter()
            .find(|site| site.handle == key)
            .or_else(|| key.parse::<SiteId>().ok().and_then(|id| self.site(id)))
    }

    /// Merge sites by id: overlay entries replace same-id sites, new ids are
    /// appended.
    pub fn merge_sites(base: &[Site], overlay: &[Site]) -> Vec<Site> {
        let mut merged = base.to_vec();
        for site in overlay {
            match merged.iter_mut().find(|existing| existing.id == site.id) {
                Some(existing) => *existing = site.clone(),
                None => merged.push(site.clone()),
            }
        }
        merged
    }

    /// Merge overlay config onto self (base). Scalars: overlay wins if set.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            default_site: overlay.default_site.unwrap_or(self.default_site),
            active_match: overlay.active_match.unwrap_or(self.active_match),
            sites: overlay
                .sites
                .as_ref()
                .map(|sites| Self::merge_sites(&self.sites, sites))
                .unwrap_or_else(|| self.sites.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_file` - Workspace file given on the command line; also decides
    ///   where the local config is looked up
    pub fn load(data_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        let workspace_file = data_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| current.data_file.clone());
        let local_path = local_config_path(&expand_path(&workspace_file));
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;

        if let Some(explicit) = data_file {
            current.data_file = explicit.to_path_buf();
        }

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply NAVTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("NAVTREE")
                .separator("__")
                .try_parsing(false),
        );
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_site") {
            settings.default_site = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("NAVTREE_DEFAULT_SITE: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("active_match") {
            settings.active_match = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("NAVTREE_ACTIVE_MATCH: {e}"),
            })?;
        }
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        self.data_file = expand_path(&self.data_file);
    }

    /// Reject settings the services cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.site(self.default_site).is_none() {
            return Err(ApplicationError::Config {
                message: format!("default_site {} is not among the configured sites", self.default_site),
            });
        }
        if let Some(site) = self.sites.iter().find(|site| site.base_url.trim().is_empty()) {
            return Err(ApplicationError::Config {
                message: format!("site '{}' has an empty base_url", site.handle),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# navtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/navtree/navtree.toml
#   Local:  .navtree.toml next to the workspace data file
#   Env:    NAVTREE_* environment variables (explicit overrides)
#
# Sites are merged by id: a local [[sites]] entry replaces the global site
# with the same id and adds new ones.

# Workspace file with navigations, nodes and structures
# data_file = "~/.local/share/navtree/workspace.toml"

# Site used when --site is not given
# default_site = 1

# Prefix rule for active-page matching:
#   "segment": /about matches /about/team but not /about-us
#   "literal": plain string prefix, /about also matches /about-us
# active_match = "segment"

# [[sites]]
# id = 1
# handle = "default"
# base_url = "https://example.com/"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
