use crate::document::{DocumentHandle, DocumentUri, split_lines};
use crate::focus::FocusProvider;
use crate::highlight::{DecorationLayer, DecorationStyle};
use crate::host::{
    DecorationHandle, DecorationSink, EditorHost, EditorId, Interaction, Notice, NoticeLevel,
    PromptRequest, TreeKind, TreeListener,
};
use crate::model::EntityId;
use anyhow::Context;
use colored::Colorize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::Write;
use std::path::Path;
use tracing::trace;

/// A one-shot host for the command line.
///
/// Prompts are answered from a queue filled from command arguments, and
/// editors are files opened for the duration of one invocation.
#[derive(Debug, Default)]
pub struct TerminalHost {
    scheme: String,
    documents: BTreeMap<DocumentUri, String>,
    editors: Vec<(EditorId, String)>,
    active: Option<EditorId>,
    answers: VecDeque<String>,
    decorations: HashMap<DecorationHandle, (EditorId, DecorationLayer)>,
    next_handle: u64,
    notices: Vec<Notice>,
}

impl TerminalHost {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Self::default()
        }
    }

    pub fn push_answer(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Open a file as the active editor.
    pub fn open_file(&mut self, path: &Path) -> anyhow::Result<EditorId> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let uri = format!("file://{}", absolute.display());
        self.documents.insert(DocumentUri::new(uri.clone()), text);
        Ok(self.add_editor(uri))
    }

    fn add_editor(&mut self, raw_uri: String) -> EditorId {
        let id = EditorId(self.editors.len() as u64 + 1);
        self.editors.push((id, raw_uri));
        self.active = Some(id);
        id
    }

    fn pull_focus_content(&mut self, document: &DocumentHandle, provider: &FocusProvider) {
        let source = self
            .documents
            .get(document.source())
            .cloned()
            .unwrap_or_default();
        if let Some(content) = provider.provide_content(document, &source) {
            self.documents.insert(document.uri().clone(), content);
        }
    }

    /// Render an editor's text with its decorations applied.
    pub fn render(&self, editor: EditorId) -> String {
        let mut out = String::new();
        let Some(document) = self.editor_document(editor) else {
            return out;
        };
        let text = self.document_text(document.uri()).unwrap_or_default();

        let mut line_colors: HashMap<usize, (u8, u8, u8)> = HashMap::new();
        let mut layers: Vec<_> = self
            .decorations
            .iter()
            .filter(|(_, (owner, _))| *owner == editor)
            .collect();
        layers.sort_by_key(|(handle, _)| handle.0);

        for (_, (_, layer)) in layers {
            match &layer.style {
                DecorationStyle::Highlight { color } => {
                    for line in &layer.lines {
                        line_colors.insert(*line, color.to_rgb());
                    }
                }
                DecorationStyle::FocusMarker { text, color } => {
                    let marker = match hex_rgb(color) {
                        Some((r, g, b)) => text.truecolor(r, g, b),
                        None => text.dimmed(),
                    };
                    let _ = writeln!(out, "{:>6}  {}", "", marker);
                }
            }
        }

        for (idx, line) in split_lines(&text).into_iter().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let rendered = match line_colors.get(&idx) {
                Some((r, g, b)) => line.on_truecolor(*r, *g, *b).to_string(),
                None => line.to_string(),
            };
            let _ = writeln!(out, "{:>6}: {}", idx + 1, rendered);
        }
        out
    }
}

fn hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

impl EditorHost for TerminalHost {
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
            .map(|(_, raw)| DocumentHandle::from_host_uri(raw, &self.scheme))
    }

    fn document_text(&self, uri: &DocumentUri) -> Option<String> {
        self.documents.get(uri).cloned()
    }

    fn open_focus_document(&mut self, document: &DocumentHandle, provider: &FocusProvider) {
        self.pull_focus_content(document, provider);
        self.add_editor(document.uri().to_string());
    }

    fn focus_document_changed(&mut self, document: &DocumentHandle, provider: &FocusProvider) {
        self.pull_focus_content(document, provider);
    }
}

impl DecorationSink for TerminalHost {
    fn apply_decorations(&mut self, editor: EditorId, layer: &DecorationLayer) -> DecorationHandle {
        self.next_handle += 1;
        let handle = DecorationHandle(self.next_handle);
        self.decorations.insert(handle, (editor, layer.clone()));
        handle
    }

    fn release_decorations(&mut self, handle: DecorationHandle) {
        self.decorations.remove(&handle);
    }
}

impl Interaction for TerminalHost {
    /// Queued answers first; an unanswered pre-filled prompt is accepted
    /// as is.
    fn prompt(&mut self, request: &PromptRequest) -> Option<String> {
        let answer = self
            .answers
            .pop_front()
            .or_else(|| request.value.clone());
        trace!(prompt = %request.prompt, answered = answer.is_some(), "prompt");
        answer
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => eprintln!("{} {}", "info:".cyan().bold(), notice.message),
            NoticeLevel::Error => eprintln!("{} {}", "error:".red().bold(), notice.message),
        }
        self.notices.push(notice);
    }
}

impl TreeListener for TerminalHost {
    fn tree_changed(&mut self, tree: TreeKind, node: Option<&EntityId>) {
        trace!(?tree, node = ?node, "tree changed");
    }
}
