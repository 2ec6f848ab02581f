//! Command dispatch: one function per subcommand
//!
//! Commands that change state return `true`; the workspace is written once
//! after dispatch. It is also written when a save failed after committing the
//! node record, so the record is not lost.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::NavigationChanges;
use crate::application::{ActionResponse, ApplicationError, ApplicationResult};
use crate::cli::args::{Cli, Commands, ConfigCommands, ElementCommands, NavCommands, NodeCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    ElementId, LinkedElement, NodeId, NodeSubmission, ParentField, Placement, SiteId,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, Workspace};

/// Everything a command needs: services, the selected site and output mode.
struct Context {
    container: ServiceContainer,
    workspace: Workspace,
    site: SiteId,
    json: bool,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            return Ok(());
        }
        Commands::Config { command } => {
            let settings = Settings::load(cli.data.as_deref()).map_err(InfraError::from)?;
            return config_command(command, &settings);
        }
        _ => {}
    }

    let settings = Settings::load(cli.data.as_deref()).map_err(InfraError::from)?;
    let site = match cli.site.as_deref() {
        Some(key) => settings
            .resolve_site(key)
            .map(|s| s.id)
            .ok_or_else(|| CliError::InvalidArgs(format!("unknown site: {key}")))?,
        None => settings.default_site,
    };
    debug!("execute_command: data={} site={}", settings.data_file.display(), site);

    let workspace = Workspace::open(&settings.data_file)?;
    let container = ServiceContainer::new(settings, &workspace);
    let ctx = Context {
        container,
        workspace,
        site,
        json: cli.json,
    };

    let outcome = match &cli.command {
        Commands::Nav { command } => nav_command(&ctx, command),
        Commands::Node { command } => node_command(&ctx, command),
        Commands::Element { command } => element_command(&ctx, command),
        Commands::Active { nav, path } => active(&ctx, nav, path),
        Commands::Breadcrumbs { path } => breadcrumbs(&ctx, path),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(false),
    };

    let persist = match &outcome {
        Ok(mutated) => *mutated,
        Err(e) => e.committed_partially(),
    };
    if persist {
        ctx.workspace.save()?;
    }
    if let Err(e) = &outcome {
        if e.committed_partially() {
            output::warning(&"node record saved, its tree position is unchanged");
        }
    }
    outcome.map(|_| ())
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    output::info(&serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the JSON response of a client action, success or failure.
fn finish_action<T>(
    ctx: &Context,
    result: ApplicationResult<T>,
    respond: impl FnOnce(&T) -> ActionResponse,
) -> CliResult<T> {
    match result {
        Ok(value) => {
            if ctx.json {
                output::info(&respond(&value).to_json()?);
            }
            Ok(value)
        }
        Err(e) => {
            if ctx.json {
                output::info(&ActionResponse::failure(&e).to_json()?);
            }
            Err(e.into())
        }
    }
}

// ============================================================
// CONFIG
// ============================================================

fn config_command(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml().map_err(InfraError::from)?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".into());
            output::action("global", &global);
            output::action("local", &local_config_path(&settings.data_file).display());
            output::action("data", &settings.data_file.display());
        }
    }
    Ok(())
}

// ============================================================
// NAVIGATIONS
// ============================================================

#[instrument(level = "debug", skip(ctx))]
fn nav_command(ctx: &Context, command: &NavCommands) -> CliResult<bool> {
    let navs = ctx.container.navigation_service();
    match command {
        NavCommands::Create {
            handle,
            name,
            max_levels,
        } => {
            let nav = navs.create(handle, name, *max_levels)?;
            if ctx.json {
                print_json(&nav)?;
            } else {
                output::success(&format!("created navigation '{}' ({})", nav.handle, nav.id));
            }
            Ok(true)
        }
        NavCommands::Update {
            handle,
            name,
            new_handle,
            max_levels,
            no_max_levels,
        } => {
            let changes = NavigationChanges {
                handle: new_handle.clone(),
                name: name.clone(),
                max_levels: if *no_max_levels {
                    Some(None)
                } else {
                    max_levels.map(Some)
                },
            };
            let nav = navs.update(handle, changes)?;
            if ctx.json {
                print_json(&nav)?;
            } else {
                output::success(&format!("updated navigation '{}'", nav.handle));
            }
            Ok(true)
        }
        NavCommands::List => {
            let all = navs.all();
            if ctx.json {
                print_json(&all)?;
            } else if all.is_empty() {
                output::detail(&"no navigations");
            } else {
                for nav in all {
                    let limit = nav
                        .max_levels
                        .map(|m| format!(", max {m} levels"))
                        .unwrap_or_default();
                    output::info(&format!("{:>4}  {} ({}{})", nav.id, nav.handle, nav.name, limit));
                }
            }
            Ok(false)
        }
        NavCommands::Show { handle, all, path } => {
            let nav = navs.get_by_handle(handle)?;
            let menu = ctx.container.menu_service();
            let items = menu.tree(handle, ctx.site, *all)?;
            let active = match path {
                Some(path) => menu.active_nodes(handle, ctx.site, path)?,
                None => Vec::new(),
            };
            output::info(&output::menu_tree(&nav.name, &items, &active));
            Ok(false)
        }
        NavCommands::Delete { handle } => {
            let deleted = navs.delete(handle)?;
            output::success(&format!(
                "deleted navigation '{}' with {} nodes",
                deleted.navigation.handle, deleted.nodes_removed
            ));
            Ok(true)
        }
    }
}

// ============================================================
// NODES
// ============================================================

#[instrument(level = "debug", skip(ctx))]
fn node_command(ctx: &Context, command: &NodeCommands) -> CliResult<bool> {
    let nodes = ctx.container.node_service();
    match command {
        NodeCommands::Add {
            nav,
            title,
            url,
            element,
            parent,
            classes,
            new_window,
            disabled,
        } => {
            let nav = ctx.container.navigation_service().get_by_handle(nav)?;
            let mut submission = match element {
                Some(id) => NodeSubmission::element(nav.id, ctx.site, &lookup_element(ctx, *id)?),
                None => NodeSubmission::manual(
                    nav.id,
                    ctx.site,
                    title.as_deref().unwrap_or_default(),
                    url.as_deref().unwrap_or_default(),
                ),
            };
            if let Some(title) = title {
                submission.title = title.clone();
            }
            submission.classes = classes.clone();
            submission.new_window = *new_window;
            submission.enabled = !*disabled;
            submission.new_parent = parent.map(ParentField::Node).unwrap_or(ParentField::Root);

            let outcome = finish_action(ctx, nodes.save_node(&submission), ActionResponse::saved)?;
            if !ctx.json {
                output::success(&format!(
                    "saved node {} '{}'",
                    outcome.node.id, outcome.node.title
                ));
            }
            Ok(true)
        }
        NodeCommands::Edit {
            id,
            title,
            url,
            element,
            unlink,
            parent,
            classes,
            new_window,
            enabled,
        } => {
            let current = nodes.get_node(*id, ctx.site)?;
            let mut submission = NodeSubmission::from_node(&current)
                .with_parent(ParentField::from_submitted(parent.as_deref()).map_err(ApplicationError::from)?);
            if let Some(title) = title {
                submission.title = title.clone();
            }
            if *unlink {
                submission.element_id = None;
                submission.link_type = None;
            }
            if let Some(element_id) = element {
                let linked = lookup_element(ctx, *element_id)?;
                submission.element_id = Some(linked.id);
                submission.link_type = Some(linked.element_type);
            }
            if let Some(url) = url {
                submission.url = Some(url.clone());
            }
            if let Some(classes) = classes {
                submission.classes = Some(classes.clone());
            }
            if let Some(new_window) = new_window {
                submission.new_window = *new_window;
            }
            if let Some(enabled) = enabled {
                submission.enabled = *enabled;
            }

            let outcome = finish_action(ctx, nodes.save_node(&submission), ActionResponse::saved)?;
            if !ctx.json {
                let moved = if outcome.moved { " (moved)" } else { "" };
                output::success(&format!(
                    "saved node {} '{}'{}",
                    outcome.node.id, outcome.node.title, moved
                ));
            }
            Ok(true)
        }
        NodeCommands::Move {
            id,
            parent,
            placement,
        } => {
            let options = finish_action(
                ctx,
                nodes.move_node(*id, *parent, ctx.site, *placement),
                ActionResponse::options,
            )?;
            if !ctx.json {
                output::success(&format!("moved node {}", describe_move(*id, *parent, *placement)));
                output::parent_options(&options);
            }
            Ok(true)
        }
        NodeCommands::Delete { ids } => {
            finish_action(ctx, nodes.delete_nodes(ids), ActionResponse::options)?;
            if !ctx.json {
                output::success(&format!("deleted nodes {}", ids.iter().join(", ")));
            }
            Ok(true)
        }
        NodeCommands::Show { id } => {
            let fields = nodes.editor_fields(*id, ctx.site)?;
            if ctx.json {
                print_json(&fields)?;
            } else {
                output::header(&fields.title);
                output::detail(&format!("id: {}", fields.id));
                output::detail(&format!("url: {}", fields.url.as_deref().unwrap_or("-")));
                if let Some(name) = &fields.element_display_name {
                    output::detail(&format!("element: {} {}", name, fields.element_id.map(|e| e.to_string()).unwrap_or_default()));
                }
                output::detail(&format!(
                    "parent: {}",
                    fields.parent_id.map(|p| p.to_string()).unwrap_or_else(|| "(top level)".into())
                ));
                output::detail(&format!("level: {}", fields.level.map(|l| l.to_string()).unwrap_or_else(|| "-".into())));
                output::detail(&format!("enabled: {}", fields.enabled));
                output::detail(&format!("new window: {}", fields.new_window));
                if let Some(classes) = &fields.classes {
                    output::detail(&format!("classes: {classes}"));
                }
            }
            Ok(false)
        }
        NodeCommands::Options { nav, exclude } => {
            let nav = ctx.container.navigation_service().get_by_handle(nav)?;
            let options = nodes.parent_options(nav.id, ctx.site, *exclude)?;
            if ctx.json {
                print_json(&options)?;
            } else {
                output::parent_options(&options);
            }
            Ok(false)
        }
    }
}

fn describe_move(id: NodeId, parent: Option<NodeId>, placement: Placement) -> String {
    let parent = parent
        .map(|p| format!("under {p}"))
        .unwrap_or_else(|| "to top level".into());
    match placement {
        Placement::Append => format!("{id} {parent}"),
        Placement::Prepend => format!("{id} {parent} (first)"),
        Placement::Before(s) => format!("{id} {parent} (before {s})"),
        Placement::After(s) => format!("{id} {parent} (after {s})"),
    }
}

fn lookup_element(ctx: &Context, id: ElementId) -> CliResult<LinkedElement> {
    ctx.container
        .elements
        .element(id, ctx.site)
        .ok_or_else(|| ApplicationError::not_found("element", id).into())
}

// ============================================================
// ELEMENTS
// ============================================================

#[instrument(level = "debug", skip(ctx))]
fn element_command(ctx: &Context, command: &ElementCommands) -> CliResult<bool> {
    let catalog = &ctx.workspace.elements;
    match command {
        ElementCommands::Set {
            id,
            element_type,
            title,
            url,
            uri,
            display_name,
        } => {
            let element = LinkedElement {
                id: *id,
                site_id: ctx.site,
                element_type: element_type.clone(),
                title: title.clone(),
                url: url.clone(),
                uri: uri.clone(),
                display_name: display_name
                    .clone()
                    .unwrap_or_else(|| capitalize(element_type)),
            };
            catalog.upsert(element);
            output::success(&format!("registered element {} '{}'", id, title));
            Ok(true)
        }
        ElementCommands::List => {
            let elements: Vec<LinkedElement> = catalog
                .export()
                .into_iter()
                .filter(|e| e.site_id == ctx.site)
                .collect();
            if ctx.json {
                print_json(&elements)?;
            } else {
                for e in elements {
                    output::info(&format!(
                        "{:>4}  {} [{}] {}",
                        e.id,
                        e.title,
                        e.display_name,
                        e.url.as_deref().unwrap_or("-")
                    ));
                }
            }
            Ok(false)
        }
        ElementCommands::Remove { id } => match catalog.remove(*id, ctx.site) {
            Some(removed) => {
                output::success(&format!("removed element {} '{}'", id, removed.title));
                Ok(true)
            }
            None => Err(ApplicationError::not_found("element", id).into()),
        },
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================
// READ SIDE
// ============================================================

fn active(ctx: &Context, nav: &str, path: &str) -> CliResult<bool> {
    let active = ctx.container.menu_service().active_nodes(nav, ctx.site, path)?;
    if ctx.json {
        print_json(&active)?;
    } else {
        for id in active {
            let node = ctx.container.node_service().get_node(id, ctx.site)?;
            output::info(&format!("{:>4}  {}", id, node.title));
        }
    }
    Ok(false)
}

fn breadcrumbs(ctx: &Context, path: &str) -> CliResult<bool> {
    let crumbs = ctx.container.breadcrumb_service().breadcrumbs(ctx.site, path)?;
    if ctx.json {
        print_json(&crumbs)?;
    } else {
        output::info(&crumbs.iter().map(|c| c.title.as_str()).join(" › "));
    }
    Ok(false)
}
