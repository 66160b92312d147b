#![allow(dead_code)]

use log_focus::document::{DocumentHandle, DocumentUri};
use log_focus::focus::FocusProvider;
use log_focus::highlight::{DecorationLayer, DecorationStyle};
use log_focus::host::{
    DecorationHandle, DecorationSink, EditorHost, EditorId, Interaction, Notice, NoticeLevel,
    PromptRequest, TreeKind, TreeListener,
};
use log_focus::model::{Color, EntityId, Filter, Group, Pattern, Project, Workspace};
use log_focus::{AppConfig, MemoryStore, Session};
use std::collections::{HashMap, VecDeque};

pub const SCHEME: &str = "focus:";

/// Records everything the core asks of it.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub documents: HashMap<DocumentUri, String>,
    pub editors: Vec<(EditorId, String)>,
    pub active: Option<EditorId>,
    pub answers: VecDeque<Option<String>>,
    pub prompts: Vec<PromptRequest>,
    pub notices: Vec<Notice>,
    pub live: HashMap<DecorationHandle, (EditorId, DecorationLayer)>,
    pub released: Vec<DecorationHandle>,
    pub tree_signals: Vec<(TreeKind, Option<EntityId>)>,
    pub focus_pulls: usize,
    next_editor: u64,
    next_handle: u64,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a normal document in a new editor and make it active.
    pub fn open(&mut self, uri: &str, text: &str) -> EditorId {
        self.documents.insert(DocumentUri::new(uri), text.to_string());
        self.add_editor(uri.to_string())
    }

    fn add_editor(&mut self, uri: String) -> EditorId {
        self.next_editor += 1;
        let id = EditorId(self.next_editor);
        self.editors.push((id, uri));
        self.active = Some(id);
        id
    }

    pub fn close(&mut self, editor: EditorId) {
        self.editors.retain(|(id, _)| *id != editor);
        if self.active == Some(editor) {
            self.active = self.editors.last().map(|(id, _)| *id);
        }
    }

    pub fn active_id(&self) -> EditorId {
        self.active.expect("an active editor")
    }

    pub fn answer(&mut self, value: &str) {
        self.answers.push_back(Some(value.to_string()));
    }

    pub fn dismiss(&mut self) {
        self.answers.push_back(None);
    }

    pub fn text_of(&self, editor: EditorId) -> Option<String> {
        let document = self.editor_document(editor)?;
        self.document_text(document.uri())
    }

    /// Highlighted lines per filter currently applied to an editor.
    pub fn highlighted(&self, editor: EditorId, filter: &EntityId) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .live
            .values()
            .filter(|(owner, layer)| {
                *owner == editor && layer.filter_id.as_ref() == Some(filter)
            })
            .flat_map(|(_, layer)| layer.lines.iter().copied())
            .collect();
        lines.sort_unstable();
        lines
    }

    pub fn layers_on(&self, editor: EditorId) -> usize {
        self.live.values().filter(|(owner, _)| *owner == editor).count()
    }

    pub fn markers_on(&self, editor: EditorId) -> usize {
        self.live
            .values()
            .filter(|(owner, layer)| {
                *owner == editor && matches!(layer.style, DecorationStyle::FocusMarker { .. })
            })
            .count()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn infos(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Info)
            .map(|n| n.message.as_str())
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.as_str())
            .collect()
    }

    fn pull(&mut self, document: &DocumentHandle, provider: &FocusProvider) {
        let source = self
            .documents
            .get(document.source())
            .cloned()
            .unwrap_or_default();
        if let Some(content) = provider.provide_content(document, &source) {
            self.documents.insert(document.uri().clone(), content);
        }
        self.focus_pulls += 1;
    }
}

impl EditorHost for FakeHost {
    fn visible_editors(&self) -> Vec<EditorId> {
        self.editors.iter().map(|(id, _)| *id).collect()
    }

    fn active_editor(&self) -> Option<EditorId> {
        self.active
    }

    fn editor_document(&self, editor: EditorId) -> Option<DocumentHandle> {
        self.editors
            .iter()
            .find(|(id, _)| *id == editor)
            .map(|(_, uri)| DocumentHandle::from_host_uri(uri, SCHEME))
    }

    fn document_text(&self, uri: &DocumentUri) -> Option<String> {
        self.documents.get(uri).cloned()
    }

    fn open_focus_document(&mut self, document: &DocumentHandle, provider: &FocusProvider) {
        self.pull(document, provider);
        self.add_editor(document.uri().to_string());
    }

    fn focus_document_changed(&mut self, document: &DocumentHandle, provider: &FocusProvider) {
        self.pull(document, provider);
    }
}

impl DecorationSink for FakeHost {
    fn apply_decorations(&mut self, editor: EditorId, layer: &DecorationLayer) -> DecorationHandle {
        self.next_handle += 1;
        let handle = DecorationHandle(self.next_handle);
        self.live.insert(handle, (editor, layer.clone()));
        handle
    }

    fn release_decorations(&mut self, handle: DecorationHandle) {
        self.live.remove(&handle);
        self.released.push(handle);
    }
}

impl Interaction for FakeHost {
    fn prompt(&mut self, request: &PromptRequest) -> Option<String> {
        self.prompts.push(request.clone());
        self.answers.pop_front().flatten()
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

impl TreeListener for FakeHost {
    fn tree_changed(&mut self, tree: TreeKind, node: Option<&EntityId>) {
        self.tree_signals.push((tree, node.cloned()));
    }
}

pub fn filter(pattern: &str, is_highlighted: bool, is_shown: bool) -> Filter {
    let mut filter = Filter::new(Pattern::new(pattern).unwrap(), Color::random(40, 40));
    filter.is_highlighted = is_highlighted;
    filter.is_shown = is_shown;
    filter
}

pub fn group(name: &str, filters: Vec<Filter>) -> Group {
    let mut group = Group::new(name);
    group.filters = filters;
    group
}

pub fn selected_project(name: &str, groups: Vec<Group>) -> Project {
    let mut project = Project::new(name);
    project.groups = groups;
    project.selected = true;
    project
}

/// Session over a single selected project.
pub fn session_with(groups: Vec<Group>) -> Session<FakeHost> {
    let workspace = Workspace::from_projects(vec![selected_project("test", groups)]);
    Session::with_workspace(
        FakeHost::new(),
        Box::new(MemoryStore::default()),
        AppConfig::default(),
        workspace,
    )
}

pub fn empty_session() -> Session<FakeHost> {
    Session::with_workspace(
        FakeHost::new(),
        Box::new(MemoryStore::default()),
        AppConfig::default(),
        Workspace::new(),
    )
}
