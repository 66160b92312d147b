//! Interfaces the editor host implements for the core.
//!
//! The core never stores documents, renders decorations or shows dialogs
//! itself. It reads and signals through these traits, one event at a time.

use crate::document::{DocumentHandle, DocumentUri};
use crate::focus::FocusProvider;
use crate::highlight::DecorationLayer;
use crate::model::EntityId;
use std::fmt;

/// Host-assigned id of an open editor view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

/// Host-assigned handle for one applied decoration layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecorationHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A single-line input request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt: String,
    /// Pre-filled value, if any
    pub value: Option<String>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Which side-panel tree changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Filters,
    Projects,
}

/// Open editors and their documents
pub trait EditorHost {
    fn visible_editors(&self) -> Vec<EditorId>;

    fn active_editor(&self) -> Option<EditorId>;

    /// The document shown in an editor, classified at the host boundary.
    fn editor_document(&self, editor: EditorId) -> Option<DocumentHandle>;

    /// Full text of an open document.
    fn document_text(&self, uri: &DocumentUri) -> Option<String>;

    /// Open and show a focus document. The host pulls its content from
    /// `provider`.
    fn open_focus_document(&mut self, document: &DocumentHandle, provider: &FocusProvider);

    /// The content of an open focus document is stale; pull it again.
    fn focus_document_changed(&mut self, document: &DocumentHandle, provider: &FocusProvider);
}

/// Applies and releases decoration layers on editors
pub trait DecorationSink {
    fn apply_decorations(&mut self, editor: EditorId, layer: &DecorationLayer) -> DecorationHandle;

    fn release_decorations(&mut self, handle: DecorationHandle);
}

/// Prompts and notices
pub trait Interaction {
    /// Ask for one line of input. `None` means the prompt was dismissed.
    fn prompt(&mut self, request: &PromptRequest) -> Option<String>;

    fn notify(&mut self, notice: Notice);
}

/// Receives "this changed" signals from the tree caches
pub trait TreeListener {
    /// `node` is `None` when the whole tree should be re-queried.
    fn tree_changed(&mut self, tree: TreeKind, node: Option<&EntityId>);
}

/// Everything a session needs from its host
pub trait Host: EditorHost + DecorationSink + Interaction + TreeListener {}

impl<T: EditorHost + DecorationSink + Interaction + TreeListener> Host for T {}
