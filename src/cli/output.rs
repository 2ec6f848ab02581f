//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::application::FieldError;
use crate::domain::{MenuItem, NodeId, ParentOption};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print field errors indented (red X) to stderr
pub fn field_errors(errors: &[FieldError]) {
    for e in errors {
        eprintln!("  {} {}: {}", "✗".red(), e.field.bold(), e.message);
    }
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One line per parent option, disabled entries dimmed.
pub fn parent_options(options: &[ParentOption]) {
    for option in options {
        let label = if option.value.is_empty() {
            "(top level)".to_string()
        } else {
            format!("{:>4}  {}", option.value, option.label)
        };
        if option.disabled {
            println!("{}", label.dimmed());
        } else {
            println!("{}", label);
        }
    }
}

fn menu_label(item: &MenuItem, active: &[NodeId]) -> String {
    let id = item.node.id.map(|id| id.to_string()).unwrap_or_default();
    let url = item.url.as_deref().unwrap_or("-");
    let mut label = format!("{} [{}] {}", item.node.title, id, url.dimmed());
    if !item.node.enabled {
        label = format!("{} {}", label, "(disabled)".yellow());
    }
    if item.node.id.is_some_and(|id| active.contains(&id)) {
        label = format!("{} {}", label, "*".green().bold());
    }
    label
}

fn menu_subtree(item: &MenuItem, active: &[NodeId]) -> Tree<String> {
    let mut tree = Tree::new(menu_label(item, active));
    for child in &item.children {
        tree.push(menu_subtree(child, active));
    }
    tree
}

/// Render a navigation as a tree rooted at its name; `active` ids get a marker.
pub fn menu_tree(name: &str, items: &[MenuItem], active: &[NodeId]) -> Tree<String> {
    let mut tree = Tree::new(name.cyan().bold().to_string());
    for item in items {
        tree.push(menu_subtree(item, active));
    }
    tree
}
