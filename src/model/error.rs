use crate::model::EntityId;
use thiserror::Error;

/// Errors raised by data model operations
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid color '{0}'. Expected the form 'hsl(H, S%, L%)'")]
    InvalidColor(String),

    #[error("No project is selected")]
    NoProjectSelected,

    #[error("No project with id '{0}'")]
    ProjectNotFound(EntityId),

    #[error("No group with id '{0}'")]
    GroupNotFound(EntityId),

    #[error("No filter with id '{0}'")]
    FilterNotFound(EntityId),

    #[error("No group or filter with id '{0}'")]
    ItemNotFound(EntityId),
}

impl ModelError {
    /// Lookup misses are expected under concurrent edits and are never fatal.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            ModelError::ProjectNotFound(_)
                | ModelError::GroupNotFound(_)
                | ModelError::FilterNotFound(_)
                | ModelError::ItemNotFound(_)
        )
    }
}
