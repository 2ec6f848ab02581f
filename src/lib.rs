//! navtree: hierarchical navigation menus
//!
//! Layers, innermost first:
//! - `domain`: entities, the ordered tree arena, URL matching
//! - `application`: node, navigation, menu and breadcrumb services
//! - `infrastructure`: storage traits, in-memory stores, TOML workspace, DI
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
