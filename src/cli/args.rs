//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{ElementId, NodeId, Placement};

/// Hierarchical navigation menus: build, reorder and inspect node trees
#[derive(Parser, Debug)]
#[command(name = "navtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Workspace file (default: data_file from config)
    #[arg(long, global = true, env = "NAVTREE_DATA", value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Site handle or id (default: default_site from config)
    #[arg(short, long, global = true)]
    pub site: Option<String>,

    /// Print action responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage navigations
    Nav {
        #[command(subcommand)]
        command: NavCommands,
    },

    /// Save, move and delete nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Register content elements nodes can link to
    Element {
        #[command(subcommand)]
        command: ElementCommands,
    },

    /// List nodes active for a request path
    Active {
        /// Navigation handle
        nav: String,
        /// Request path, e.g. /blog/my-post
        path: String,
    },

    /// Show the breadcrumb trail of a request path
    Breadcrumbs {
        /// Request path, e.g. /blog/my-post
        path: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NavCommands {
    /// Create a navigation
    Create {
        /// Lowercase handle, e.g. main
        handle: String,
        /// Display name
        name: String,
        /// Deepest level nodes may occupy
        #[arg(long)]
        max_levels: Option<u32>,
    },

    /// Change name, handle or level limit
    Update {
        /// Current handle
        handle: String,
        #[arg(long)]
        name: Option<String>,
        /// New handle
        #[arg(long = "handle")]
        new_handle: Option<String>,
        #[arg(long, conflicts_with = "no_max_levels")]
        max_levels: Option<u32>,
        /// Remove the level limit
        #[arg(long)]
        no_max_levels: bool,
    },

    /// List navigations
    List,

    /// Show a navigation as tree
    Show {
        /// Navigation handle
        handle: String,
        /// Include disabled nodes
        #[arg(short, long)]
        all: bool,
        /// Mark nodes active for this request path
        #[arg(long)]
        path: Option<String>,
    },

    /// Delete a navigation with all its nodes
    Delete {
        /// Navigation handle
        handle: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Create a node (manual URL or linked element)
    Add {
        /// Navigation handle
        nav: String,
        /// Title (default: element title)
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, conflicts_with = "element")]
        url: Option<String>,
        /// Link to a registered element
        #[arg(short, long)]
        element: Option<ElementId>,
        /// Parent node (default: top level)
        #[arg(short, long)]
        parent: Option<NodeId>,
        /// Space-separated CSS classes
        #[arg(long)]
        classes: Option<String>,
        #[arg(long)]
        new_window: bool,
        #[arg(long)]
        disabled: bool,
    },

    /// Change a node; --parent "" moves it to the top level
    Edit {
        id: NodeId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        url: Option<String>,
        /// Link to a registered element
        #[arg(short, long, conflicts_with = "unlink")]
        element: Option<ElementId>,
        /// Turn a linked node into a manual link
        #[arg(long, requires = "url")]
        unlink: bool,
        /// New parent id, empty or 0 for the top level
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(long)]
        classes: Option<String>,
        #[arg(long)]
        new_window: Option<bool>,
        #[arg(long)]
        enabled: Option<bool>,
    },

    /// Move a node with its subtree
    Move {
        id: NodeId,
        /// New parent (default: top level)
        #[arg(short, long)]
        parent: Option<NodeId>,
        /// append, prepend, before:<id> or after:<id>
        #[arg(long, default_value = "append")]
        placement: Placement,
    },

    /// Delete nodes with their subtrees
    Delete {
        #[arg(required = true)]
        ids: Vec<NodeId>,
    },

    /// Show the editor fields of a node
    Show { id: NodeId },

    /// List parent options of a navigation
    Options {
        /// Navigation handle
        nav: String,
        /// Disable this node and its descendants
        #[arg(long)]
        exclude: Option<NodeId>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ElementCommands {
    /// Register or replace an element for the current site
    Set {
        id: ElementId,
        /// Element type, e.g. entry or category
        #[arg(long = "type", default_value = "entry")]
        element_type: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        url: Option<String>,
        /// Site-relative URI, e.g. blog/my-post
        #[arg(long)]
        uri: Option<String>,
        /// Display name of the element type (default: capitalized type)
        #[arg(long)]
        display_name: Option<String>,
    },

    /// List registered elements
    List,

    /// Remove an element from the current site
    Remove { id: ElementId },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented template
    Template,
    /// Show config and workspace locations
    Path,
}
