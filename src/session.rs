//! The refresh orchestrator and the user-facing commands built on it.
//!
//! Every state-changing event ends in the same fixed pipeline: focus
//! content is re-pulled, highlights are re-evaluated, then the trees are
//! re-rendered. Each command runs to completion before the next event.

use crate::config::AppConfig;
use crate::document::split_lines;
use crate::engine;
use crate::focus::{FocusProvider, enter_focus};
use crate::highlight::{DecorationPlan, HighlightProjector};
use crate::host::{EditorId, Host, Notice, PromptRequest};
use crate::model::{
    Color, EntityId, ModelError, Pattern, Selection, SharedWorkspace, Workspace,
};
use crate::settings::{SettingsError, SettingsStore, export_groups, import_groups};
use crate::tree::{FilterTree, ProjectTree};
use std::cell::Ref;
use std::path::Path;
use tracing::{debug, info, warn};

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The model changed and views were refreshed
    Applied,
    /// The user dismissed a prompt; nothing changed
    Cancelled,
    /// A precondition or validation failed; a notice was sent
    Rejected,
}

pub struct Session<H: Host> {
    workspace: SharedWorkspace,
    host: H,
    store: Box<dyn SettingsStore>,
    config: AppConfig,
    highlighter: HighlightProjector,
    focus: FocusProvider,
    filter_tree: FilterTree,
    project_tree: ProjectTree,
}

impl<H: Host> Session<H> {
    /// Start a session from the projects currently in `store`.
    pub fn new(
        host: H,
        store: Box<dyn SettingsStore>,
        config: AppConfig,
    ) -> Result<Self, SettingsError> {
        let projects = store.load()?;
        Ok(Self::with_workspace(
            host,
            store,
            config,
            Workspace::from_projects(projects),
        ))
    }

    pub fn with_workspace(
        host: H,
        store: Box<dyn SettingsStore>,
        config: AppConfig,
        workspace: Workspace,
    ) -> Self {
        let workspace = workspace.into_shared();
        let focus = FocusProvider::new(workspace.clone(), config.focus.scheme.clone());
        Self {
            filter_tree: FilterTree::new(workspace.clone()),
            project_tree: ProjectTree::new(workspace.clone()),
            highlighter: HighlightProjector::new(),
            focus,
            workspace,
            host,
            store,
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn workspace(&self) -> Ref<'_, Workspace> {
        self.workspace.borrow()
    }

    pub fn shared_workspace(&self) -> SharedWorkspace {
        self.workspace.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn focus_provider(&self) -> &FocusProvider {
        &self.focus
    }

    pub fn highlighter(&self) -> &HighlightProjector {
        &self.highlighter
    }

    pub fn filter_tree(&mut self) -> &mut FilterTree {
        &mut self.filter_tree
    }

    pub fn project_tree(&mut self) -> &mut ProjectTree {
        &mut self.project_tree
    }

    // Refresh pipeline

    /// Refresh every visible component: focus document content, focus
    /// markers and highlights of visible editors, then the filter tree.
    pub fn refresh_editors(&mut self) {
        let editors = self.host.visible_editors();
        debug!(editors = editors.len(), "refresh editors");

        for &editor in &editors {
            if let Some(document) = self.host.editor_document(editor)
                && document.is_focus()
            {
                self.host.focus_document_changed(&document, &self.focus);
            }
        }
        self.apply_highlight(&editors);
        self.refresh_tree();
    }

    pub fn refresh_tree(&mut self) {
        self.filter_tree.refresh(&mut self.host);
    }

    /// The active group set or project list changed shape.
    pub fn update_trees(&mut self) {
        debug!("update filter and project trees");
        self.filter_tree.update(&mut self.host);
        self.project_tree.update(&mut self.host);
    }

    fn apply_highlight(&mut self, editors: &[EditorId]) {
        self.highlighter.release_except(&mut self.host, editors);
        let active = self.host.active_editor();

        for &editor in editors {
            let Some(document) = self.host.editor_document(editor) else {
                continue;
            };
            let text = self.host.document_text(document.uri()).unwrap_or_default();
            let lines = split_lines(&text);
            let evaluation = {
                let workspace = self.workspace.borrow();
                engine::evaluate(&lines, document.mode(), workspace.active_groups())
            };

            let mut plan = DecorationPlan::from_evaluation(&evaluation);
            if document.is_focus() {
                plan.push_focus_marker(&self.config.focus);
            }
            self.highlighter.apply(&mut self.host, editor, &plan);

            if Some(editor) == active {
                engine::apply_counts(
                    self.workspace.borrow_mut().active_groups_mut(),
                    &evaluation,
                );
            }
        }
    }

    // Host events

    pub fn on_document_changed(&mut self) {
        self.refresh_editors();
    }

    pub fn on_visible_editors_changed(&mut self) {
        self.refresh_editors();
    }

    /// Counts follow the active editor, so only highlights and the tree
    /// need another pass.
    pub fn on_active_editor_changed(&mut self) {
        let editors = self.host.visible_editors();
        self.apply_highlight(&editors);
        self.refresh_tree();
    }

    // Helpers

    fn ask(&mut self, request: PromptRequest) -> Option<String> {
        let answer = self.host.prompt(&request);
        if answer.is_none() {
            debug!(prompt = %request.prompt, "prompt dismissed");
        }
        answer
    }

    fn reject(&mut self, err: ModelError) -> CommandOutcome {
        let notice = match &err {
            ModelError::InvalidPattern { .. } | ModelError::InvalidColor(_) => {
                Notice::error(err.to_string())
            }
            ModelError::NoProjectSelected => Notice::info("You need to add a project first!"),
            _ => Notice::info(err.to_string()),
        };
        debug!(%err, "command rejected");
        self.host.notify(notice);
        CommandOutcome::Rejected
    }

    /// Save all projects. Failures are reported, never propagated.
    pub fn persist(&mut self) -> bool {
        let result = {
            let workspace = self.workspace.borrow();
            self.store.save(workspace.projects())
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "failed to save settings");
                self.host.notify(Notice::error(err.to_string()));
                false
            }
        }
    }

    fn new_color(&self) -> Color {
        Color::random(self.config.colors.saturation, self.config.colors.lightness)
    }

    // Projects

    pub fn add_project(&mut self) -> CommandOutcome {
        let Some(name) = self.ask(PromptRequest::new("[PROJECT] Type a new project name")) else {
            return CommandOutcome::Cancelled;
        };
        let id = self.workspace.borrow_mut().add_project(&name);
        info!(project = %id, "added project");
        self.persist();
        self.project_tree.update(&mut self.host);
        CommandOutcome::Applied
    }

    pub fn rename_project(&mut self, id: &EntityId) -> CommandOutcome {
        let current = self.workspace.borrow().find_project(id).map(|p| p.name.clone());
        let Some(current) = current else {
            return self.reject(ModelError::ProjectNotFound(id.clone()));
        };
        let request = PromptRequest::new("[PROJECT] Type a project name").with_value(current);
        let Some(name) = self.ask(request) else {
            return CommandOutcome::Cancelled;
        };
        let result = self.workspace.borrow_mut().rename_project(id, &name);
        if let Err(err) = result {
            return self.reject(err);
        }
        self.persist();
        self.project_tree.refresh(&mut self.host);
        CommandOutcome::Applied
    }

    /// Delete a project. Deleting the selected project empties the active
    /// group set and forces a full re-evaluation.
    pub fn delete_project(&mut self, id: &EntityId) -> CommandOutcome {
        let result = self.workspace.borrow_mut().delete_project(id);
        let was_selected = match result {
            Ok(was_selected) => was_selected,
            Err(err) => return self.reject(err),
        };
        info!(project = %id, was_selected, "deleted project");
        if was_selected {
            self.filter_tree.update(&mut self.host);
            self.refresh_editors();
        }
        self.persist();
        self.project_tree.update(&mut self.host);
        CommandOutcome::Applied
    }

    pub fn select_project(&mut self, id: &EntityId) -> CommandOutcome {
        let result = self.workspace.borrow_mut().select_project(id);
        match result {
            Ok(Selection::Changed) => {
                info!(project = %id, "selected project");
                self.persist();
                self.update_trees();
                self.refresh_editors();
                CommandOutcome::Applied
            }
            Ok(Selection::AlreadySelected) => {
                self.host
                    .notify(Notice::info("This project is already selected"));
                CommandOutcome::Rejected
            }
            Err(err) => self.reject(err),
        }
    }

    /// Rename the selected project (pre-filled with its name) and save
    /// every project.
    pub fn save_project(&mut self) -> CommandOutcome {
        let selected = {
            let workspace = self.workspace.borrow();
            workspace
                .selected_project()
                .map(|p| (p.id.clone(), p.name.clone(), p.groups.is_empty()))
        };
        let Some((id, current, no_groups)) = selected else {
            self.host.notify(Notice::info("There is no selected project"));
            return CommandOutcome::Rejected;
        };
        if no_groups {
            self.host.notify(Notice::info("There is no filter groups"));
            return CommandOutcome::Rejected;
        }
        let request = PromptRequest::new("[PROJECT] Type a project name").with_value(current);
        let Some(name) = self.ask(request) else {
            return CommandOutcome::Cancelled;
        };
        let result = self.workspace.borrow_mut().rename_project(&id, &name);
        if let Err(err) = result {
            return self.reject(err);
        }
        if !self.persist() {
            return CommandOutcome::Rejected;
        }
        self.project_tree.refresh(&mut self.host);
        CommandOutcome::Applied
    }

    /// Reload projects from the store, keeping the selection index when it
    /// still exists.
    pub fn reload_settings(&mut self) -> CommandOutcome {
        let projects = match self.store.load() {
            Ok(projects) => projects,
            Err(err) => {
                warn!(%err, "failed to load settings");
                self.host.notify(Notice::error(err.to_string()));
                return CommandOutcome::Rejected;
            }
        };
        self.workspace.borrow_mut().replace_projects(projects);
        self.update_trees();
        self.refresh_editors();
        CommandOutcome::Applied
    }

    // Groups

    pub fn add_group(&mut self) -> CommandOutcome {
        if self.workspace.borrow().selected_project().is_none() {
            return self.reject(ModelError::NoProjectSelected);
        }
        let Some(name) = self.ask(PromptRequest::new("[GROUP] Type a new group name")) else {
            return CommandOutcome::Cancelled;
        };
        let result = self.workspace.borrow_mut().add_group(&name);
        match result {
            Ok(id) => {
                info!(group = %id, "added group");
                self.filter_tree.update(&mut self.host);
                CommandOutcome::Applied
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn rename_group(&mut self, id: &EntityId) -> CommandOutcome {
        let current = self.workspace.borrow().find_group(id).map(|g| g.name.clone());
        let Some(current) = current else {
            return self.reject(ModelError::GroupNotFound(id.clone()));
        };
        let request = PromptRequest::new("[GROUP] Type a new group name").with_value(current);
        let Some(name) = self.ask(request) else {
            return CommandOutcome::Cancelled;
        };
        let result = self.workspace.borrow_mut().rename_group(id, &name);
        if let Err(err) = result {
            return self.reject(err);
        }
        self.filter_tree.refresh_item(&mut self.host, id);
        CommandOutcome::Applied
    }

    /// Delete a group and every filter in it.
    pub fn delete_group(&mut self, id: &EntityId) -> CommandOutcome {
        let result = self.workspace.borrow_mut().delete_group(id);
        if let Err(err) = result {
            return self.reject(err);
        }
        info!(group = %id, "deleted group");
        self.filter_tree.update(&mut self.host);
        self.refresh_editors();
        CommandOutcome::Applied
    }

    // Filters

    pub fn add_filter(&mut self, group_id: &EntityId) -> CommandOutcome {
        if self.workspace.borrow().find_group(group_id).is_none() {
            return self.reject(ModelError::GroupNotFound(group_id.clone()));
        }
        let Some(source) = self.ask(PromptRequest::new("[FILTER] Type a regex to filter")) else {
            return CommandOutcome::Cancelled;
        };
        let pattern = match Pattern::new(&source) {
            Ok(pattern) => pattern,
            Err(err) => return self.reject(err),
        };
        let color = self.new_color();
        let result = self
            .workspace
            .borrow_mut()
            .add_filter(group_id, pattern, color);
        match result {
            Ok(id) => {
                info!(filter = %id, %color, "added filter");
                self.filter_tree.update(&mut self.host);
                self.refresh_editors();
                CommandOutcome::Applied
            }
            Err(err) => self.reject(err),
        }
    }

    /// Replace a filter's regex. An invalid regex leaves the filter as it was.
    pub fn edit_filter(&mut self, id: &EntityId) -> CommandOutcome {
        let current = self
            .workspace
            .borrow()
            .find_filter(id)
            .map(|f| f.pattern.as_str().to_string());
        let Some(current) = current else {
            return self.reject(ModelError::FilterNotFound(id.clone()));
        };
        let request = PromptRequest::new("[FILTER] Type a new regex").with_value(current);
        let Some(source) = self.ask(request) else {
            return CommandOutcome::Cancelled;
        };
        let pattern = match Pattern::new(&source) {
            Ok(pattern) => pattern,
            Err(err) => return self.reject(err),
        };
        let result = self.workspace.borrow_mut().edit_filter(id, pattern);
        if let Err(err) = result {
            return self.reject(err);
        }
        self.refresh_editors();
        CommandOutcome::Applied
    }

    pub fn delete_filter(&mut self, id: &EntityId) -> CommandOutcome {
        let result = self.workspace.borrow_mut().delete_filter(id);
        if let Err(err) = result {
            return self.reject(err);
        }
        info!(filter = %id, "deleted filter");
        self.filter_tree.update(&mut self.host);
        self.refresh_editors();
        CommandOutcome::Applied
    }

    /// Toggle highlighting of a filter, or of every filter in a group.
    pub fn set_highlight(&mut self, id: &EntityId, is_highlighted: bool) -> CommandOutcome {
        let result = self.workspace.borrow_mut().set_highlighted(id, is_highlighted);
        match result {
            Ok(target) => {
                debug!(item = %id, kind = ?target, is_highlighted, "set highlight");
                self.refresh_editors();
                CommandOutcome::Applied
            }
            Err(err) => self.reject(err),
        }
    }

    /// Toggle focus inclusion of a filter, or of every filter in a group.
    pub fn set_shown(&mut self, id: &EntityId, is_shown: bool) -> CommandOutcome {
        let result = self.workspace.borrow_mut().set_shown(id, is_shown);
        match result {
            Ok(target) => {
                debug!(item = %id, kind = ?target, is_shown, "set shown");
                self.refresh_editors();
                CommandOutcome::Applied
            }
            Err(err) => self.reject(err),
        }
    }

    // Focus mode

    /// Open the focus view of the active document.
    pub fn enter_focus_mode(&mut self) -> CommandOutcome {
        let document = self
            .host
            .active_editor()
            .and_then(|editor| self.host.editor_document(editor));
        let Some(document) = document else {
            self.host.notify(Notice::info("There is no active editor"));
            return CommandOutcome::Rejected;
        };
        match enter_focus(&document, &self.config.focus.scheme) {
            Ok(focus) => {
                info!(source = %document.uri(), focus = %focus.uri(), "entering focus mode");
                self.host.open_focus_document(&focus, &self.focus);
                self.refresh_editors();
                CommandOutcome::Applied
            }
            Err(err) => {
                self.host.notify(Notice::info(err.to_string()));
                CommandOutcome::Rejected
            }
        }
    }

    // Import / export

    pub fn export_filters(&mut self) -> CommandOutcome {
        if self.workspace.borrow().selected_project().is_none() {
            return self.reject(ModelError::NoProjectSelected);
        }
        let Some(path) = self.ask(PromptRequest::new("[EXPORT] Path of the file to write")) else {
            return CommandOutcome::Cancelled;
        };
        let result = {
            let workspace = self.workspace.borrow();
            export_groups(Path::new(&path), workspace.active_groups())
                .map(|()| workspace.active_groups().len())
        };
        match result {
            Ok(count) => {
                self.host
                    .notify(Notice::info(format!("Exported {count} groups to {path}")));
                CommandOutcome::Applied
            }
            Err(err) => {
                self.host.notify(Notice::error(err.to_string()));
                CommandOutcome::Rejected
            }
        }
    }

    /// Append groups from an export file to the selected project.
    pub fn import_filters(&mut self) -> CommandOutcome {
        if self.workspace.borrow().selected_project().is_none() {
            return self.reject(ModelError::NoProjectSelected);
        }
        let Some(path) = self.ask(PromptRequest::new("[IMPORT] Path of the file to read")) else {
            return CommandOutcome::Cancelled;
        };
        let groups = match import_groups(Path::new(&path)) {
            Ok(groups) => groups,
            Err(err) => {
                self.host.notify(Notice::error(err.to_string()));
                return CommandOutcome::Rejected;
            }
        };
        let result = self.workspace.borrow_mut().import_groups(groups);
        match result {
            Ok(count) => {
                info!(count, path = %path, "imported groups");
                self.update_trees();
                self.refresh_editors();
                CommandOutcome::Applied
            }
            Err(err) => self.reject(err),
        }
    }
}
