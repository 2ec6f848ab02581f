//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the storage boundary traits (TreeStore, NodeRepository,
//! NavigationRegistry, ElementResolver) but are themselves concrete structs,
//! not traits.

mod breadcrumbs;
mod menu;
mod navigations;
mod nodes;
mod parent_change;

pub use breadcrumbs::BreadcrumbService;
pub use menu::MenuService;
pub use navigations::{DeletedNavigation, NavigationChanges, NavigationService};
pub use nodes::{effective_url, NodeService};
pub use parent_change::ParentChange;
