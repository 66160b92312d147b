//! Hierarchical filter state: projects contain groups, groups contain filters.
//!
//! The model has no behavior beyond CRUD and flag cascades. Group-level
//! toggles fan out to member filters when they are applied; evaluation only
//! ever reads a filter's own flags.

pub mod entities;
pub mod error;
pub mod workspace;

pub use entities::{Color, EntityId, Filter, FilterIcon, Group, Pattern, Project, VisualState};
pub use error::ModelError;
pub use workspace::{Selection, SharedWorkspace, ToggleTarget, Workspace};
