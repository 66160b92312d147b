//! Focus projection: the reduced view of a document that keeps only lines
//! matched by at least one shown filter.
//!
//! A document moves `Normal -> Focus` once. A focus document cannot enter
//! focus mode again; there is no way back other than closing the view.

use crate::document::{DocumentHandle, DocumentUri, split_lines};
use crate::model::{Group, SharedWorkspace};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FocusError {
    #[error("You are on focus mode virtual document already!")]
    AlreadyFocused(DocumentUri),
}

/// Indices of the lines kept in the focus projection.
///
/// Shown filters are OR-combined. The highlight flag plays no part here.
pub fn retained_lines<S: AsRef<str>>(lines: &[S], groups: &[Group]) -> Vec<usize> {
    let shown: Vec<_> = groups
        .iter()
        .flat_map(|g| g.filters.iter())
        .filter(|f| f.is_shown)
        .collect();

    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.as_ref();
            shown.iter().any(|f| f.pattern.is_match(line)).then_some(idx)
        })
        .collect()
}

/// Focus content for the given source text.
pub fn project(source_text: &str, groups: &[Group]) -> String {
    let lines = split_lines(source_text);
    retained_lines(&lines, groups)
        .into_iter()
        .map(|idx| lines[idx])
        .collect::<Vec<_>>()
        .join("\n")
}

/// Transition a document into focus mode.
pub fn enter_focus(
    document: &DocumentHandle,
    scheme: &str,
) -> Result<DocumentHandle, FocusError> {
    if document.is_focus() {
        return Err(FocusError::AlreadyFocused(document.uri().clone()));
    }
    Ok(DocumentHandle::focus_of(document.uri(), scheme))
}

/// Supplies focus document content on demand.
///
/// Hosts keep a clone and pull content whenever they are told a focus
/// document changed, or when they first open one.
#[derive(Debug, Clone)]
pub struct FocusProvider {
    workspace: SharedWorkspace,
    scheme: String,
}

impl FocusProvider {
    pub fn new(workspace: SharedWorkspace, scheme: impl Into<String>) -> Self {
        Self {
            workspace,
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Classify a raw host uri against this provider's scheme.
    pub fn classify(&self, raw: &str) -> DocumentHandle {
        DocumentHandle::from_host_uri(raw, &self.scheme)
    }

    /// Content of a focus document, given the text of its source document.
    ///
    /// Returns `None` for documents that are not in focus mode.
    pub fn provide_content(
        &self,
        document: &DocumentHandle,
        source_text: &str,
    ) -> Option<String> {
        if !document.is_focus() {
            return None;
        }
        let workspace = self.workspace.borrow();
        let content = project(source_text, workspace.active_groups());
        debug!(uri = %document.uri(), bytes = content.len(), "provided focus content");
        Some(content)
    }
}
