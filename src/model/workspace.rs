use super::entities::{Color, EntityId, Filter, Group, Pattern, Project};
use super::error::ModelError;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Workspace shared by the session, the focus provider and the tree caches.
///
/// Execution is single-threaded; a borrow is never held across a host call
/// that may re-enter the core.
pub type SharedWorkspace = Rc<RefCell<Workspace>>;

/// Which kind of item a toggle landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Group,
    Filter,
}

/// Result of a project selection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Changed,
    AlreadySelected,
}

/// Projects plus the selection pointer. The active group set is the
/// selected project's groups, or empty when nothing is selected.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    projects: Vec<Project>,
    selected: Option<usize>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted projects. The first project flagged as selected
    /// wins; every other flag is cleared. Duplicate ids are replaced.
    pub fn from_projects(mut projects: Vec<Project>) -> Self {
        assign_unique_ids(&mut projects);
        let mut workspace = Self {
            projects,
            selected: None,
        };
        let first = workspace.projects.iter().position(|p| p.selected);
        workspace.apply_selection(first);
        workspace
    }

    pub fn into_shared(self) -> SharedWorkspace {
        Rc::new(RefCell::new(self))
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected.and_then(|idx| self.projects.get(idx))
    }

    pub fn active_groups(&self) -> &[Group] {
        self.selected_project()
            .map(|p| p.groups.as_slice())
            .unwrap_or(&[])
    }

    pub fn active_groups_mut(&mut self) -> &mut [Group] {
        match self.selected.and_then(|idx| self.projects.get_mut(idx)) {
            Some(project) => project.groups.as_mut_slice(),
            None => &mut [],
        }
    }

    fn selected_groups_vec(&mut self) -> Result<&mut Vec<Group>, ModelError> {
        self.selected
            .and_then(|idx| self.projects.get_mut(idx))
            .map(|p| &mut p.groups)
            .ok_or(ModelError::NoProjectSelected)
    }

    fn apply_selection(&mut self, index: Option<usize>) {
        let index = index.filter(|idx| *idx < self.projects.len());
        for (idx, project) in self.projects.iter_mut().enumerate() {
            project.selected = Some(idx) == index;
        }
        self.selected = index;
    }

    pub fn find_project(&self, id: &EntityId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn find_group(&self, id: &EntityId) -> Option<&Group> {
        self.active_groups().iter().find(|g| &g.id == id)
    }

    pub fn find_filter(&self, id: &EntityId) -> Option<&Filter> {
        self.active_groups().iter().find_map(|g| g.find_filter(id))
    }

    // Projects

    pub fn add_project(&mut self, name: &str) -> EntityId {
        let project = Project::new(name);
        let id = project.id.clone();
        self.projects.push(project);
        id
    }

    pub fn rename_project(&mut self, id: &EntityId, name: &str) -> Result<(), ModelError> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ModelError::ProjectNotFound(id.clone()))?;
        project.name = name.to_string();
        Ok(())
    }

    /// Delete a project and everything it contains.
    ///
    /// Returns true when the deleted project was the selected one, in which
    /// case the active group set is now empty.
    pub fn delete_project(&mut self, id: &EntityId) -> Result<bool, ModelError> {
        let index = self
            .projects
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| ModelError::ProjectNotFound(id.clone()))?;
        self.projects.remove(index);

        let was_selected = match self.selected {
            Some(selected) if selected == index => {
                self.selected = None;
                true
            }
            Some(selected) if selected > index => {
                self.selected = Some(selected - 1);
                false
            }
            _ => false,
        };
        Ok(was_selected)
    }

    pub fn select_project(&mut self, id: &EntityId) -> Result<Selection, ModelError> {
        let index = self
            .projects
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| ModelError::ProjectNotFound(id.clone()))?;
        if self.selected == Some(index) {
            return Ok(Selection::AlreadySelected);
        }
        self.apply_selection(Some(index));
        Ok(Selection::Changed)
    }

    /// Swap in a freshly loaded project list, keeping the selection index
    /// when it still points at a project.
    pub fn replace_projects(&mut self, mut projects: Vec<Project>) {
        assign_unique_ids(&mut projects);
        let keep = self.selected;
        self.projects = projects;
        self.apply_selection(keep);
    }

    // Groups

    pub fn add_group(&mut self, name: &str) -> Result<EntityId, ModelError> {
        let groups = self.selected_groups_vec()?;
        let group = Group::new(name);
        let id = group.id.clone();
        groups.push(group);
        Ok(id)
    }

    pub fn rename_group(&mut self, id: &EntityId, name: &str) -> Result<(), ModelError> {
        let group = self
            .active_groups_mut()
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| ModelError::GroupNotFound(id.clone()))?;
        group.name = name.to_string();
        Ok(())
    }

    /// Delete a group along with its filters.
    pub fn delete_group(&mut self, id: &EntityId) -> Result<(), ModelError> {
        let groups = self.selected_groups_vec()?;
        let index = groups
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| ModelError::GroupNotFound(id.clone()))?;
        groups.remove(index);
        Ok(())
    }

    /// Append groups to the selected project. Incoming ids that collide with
    /// existing ones are replaced with fresh ids.
    pub fn import_groups(&mut self, incoming: Vec<Group>) -> Result<usize, ModelError> {
        let groups = self.selected_groups_vec()?;
        let mut taken: HashSet<EntityId> = groups
            .iter()
            .flat_map(|g| std::iter::once(g.id.clone()).chain(g.filters.iter().map(|f| f.id.clone())))
            .collect();

        let added = incoming.len();
        for mut group in incoming {
            claim_group_ids(&mut group, &mut taken);
            groups.push(group);
        }
        Ok(added)
    }

    // Filters

    pub fn add_filter(
        &mut self,
        group_id: &EntityId,
        pattern: Pattern,
        color: Color,
    ) -> Result<EntityId, ModelError> {
        let group = self
            .active_groups_mut()
            .iter_mut()
            .find(|g| &g.id == group_id)
            .ok_or_else(|| ModelError::GroupNotFound(group_id.clone()))?;
        let filter = Filter::new(pattern, color);
        let id = filter.id.clone();
        group.filters.push(filter);
        Ok(id)
    }

    /// Replace a filter's pattern. Id, color and flags are untouched.
    pub fn edit_filter(&mut self, id: &EntityId, pattern: Pattern) -> Result<(), ModelError> {
        let filter = self
            .find_filter_mut(id)
            .ok_or_else(|| ModelError::FilterNotFound(id.clone()))?;
        filter.pattern = pattern;
        Ok(())
    }

    pub fn delete_filter(&mut self, id: &EntityId) -> Result<(), ModelError> {
        for group in self.active_groups_mut() {
            if let Some(index) = group.filters.iter().position(|f| &f.id == id) {
                group.filters.remove(index);
                return Ok(());
            }
        }
        Err(ModelError::FilterNotFound(id.clone()))
    }

    fn find_filter_mut(&mut self, id: &EntityId) -> Option<&mut Filter> {
        self.active_groups_mut()
            .iter_mut()
            .find_map(|g| g.find_filter_mut(id))
    }

    /// Set the highlight flag on a group (cascading) or a single filter.
    pub fn set_highlighted(
        &mut self,
        id: &EntityId,
        is_highlighted: bool,
    ) -> Result<ToggleTarget, ModelError> {
        if let Some(group) = self.active_groups_mut().iter_mut().find(|g| &g.id == id) {
            group.set_highlighted(is_highlighted);
            return Ok(ToggleTarget::Group);
        }
        let filter = self
            .find_filter_mut(id)
            .ok_or_else(|| ModelError::ItemNotFound(id.clone()))?;
        filter.is_highlighted = is_highlighted;
        Ok(ToggleTarget::Filter)
    }

    /// Set the shown flag on a group (cascading) or a single filter.
    pub fn set_shown(&mut self, id: &EntityId, is_shown: bool) -> Result<ToggleTarget, ModelError> {
        if let Some(group) = self.active_groups_mut().iter_mut().find(|g| &g.id == id) {
            group.set_shown(is_shown);
            return Ok(ToggleTarget::Group);
        }
        let filter = self
            .find_filter_mut(id)
            .ok_or_else(|| ModelError::ItemNotFound(id.clone()))?;
        filter.is_shown = is_shown;
        Ok(ToggleTarget::Filter)
    }
}

fn claim_id(id: &mut EntityId, taken: &mut HashSet<EntityId>) {
    while !taken.insert(id.clone()) {
        *id = EntityId::generate();
    }
}

/// Give a group and its filters ids not yet in `taken`, then mark them taken.
fn claim_group_ids(group: &mut Group, taken: &mut HashSet<EntityId>) {
    claim_id(&mut group.id, taken);
    for filter in &mut group.filters {
        claim_id(&mut filter.id, taken);
    }
}

/// Replace duplicate ids in loaded projects. Project ids are unique across
/// the list; group and filter ids are unique within their project. The
/// first holder of an id keeps it.
fn assign_unique_ids(projects: &mut [Project]) {
    let mut project_ids = HashSet::new();
    for project in projects {
        claim_id(&mut project.id, &mut project_ids);
        let mut taken = HashSet::new();
        for group in &mut project.groups {
            claim_group_ids(group, &mut taken);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> Pattern {
        Pattern::new(s).unwrap()
    }

    fn color() -> Color {
        Color::random(40, 40)
    }

    fn workspace_with_selected() -> (Workspace, EntityId) {
        let mut ws = Workspace::new();
        let id = ws.add_project("p");
        ws.select_project(&id).unwrap();
        (ws, id)
    }

    #[test]
    fn test_no_selection_means_empty_active_set() {
        let mut ws = Workspace::new();
        ws.add_project("p");
        assert!(ws.active_groups().is_empty());
        assert!(matches!(ws.add_group("g"), Err(ModelError::NoProjectSelected)));
    }

    #[test]
    fn test_select_project_keeps_single_selected_flag() {
        let mut ws = Workspace::new();
        let a = ws.add_project("a");
        let b = ws.add_project("b");
        assert_eq!(ws.select_project(&a).unwrap(), Selection::Changed);
        assert_eq!(ws.select_project(&b).unwrap(), Selection::Changed);
        assert_eq!(ws.select_project(&b).unwrap(), Selection::AlreadySelected);

        let flagged: Vec<_> = ws.projects().iter().filter(|p| p.selected).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, b);
        assert_eq!(ws.selected_index(), Some(1));
    }

    #[test]
    fn test_delete_selected_project_clears_active_set() {
        let (mut ws, id) = workspace_with_selected();
        ws.add_group("g").unwrap();
        assert!(ws.delete_project(&id).unwrap());
        assert_eq!(ws.selected_index(), None);
        assert!(ws.active_groups().is_empty());
    }

    #[test]
    fn test_delete_earlier_project_shifts_selection() {
        let mut ws = Workspace::new();
        let a = ws.add_project("a");
        let b = ws.add_project("b");
        ws.select_project(&b).unwrap();
        assert!(!ws.delete_project(&a).unwrap());
        assert_eq!(ws.selected_project().map(|p| &p.id), Some(&b));
    }

    #[test]
    fn test_from_projects_keeps_only_first_selected() {
        let mut a = Project::new("a");
        let mut b = Project::new("b");
        a.selected = true;
        b.selected = true;
        let ws = Workspace::from_projects(vec![a, b]);
        assert_eq!(ws.selected_index(), Some(0));
        assert!(!ws.projects()[1].selected);
    }

    #[test]
    fn test_edit_filter_keeps_id_and_color() {
        let (mut ws, _) = workspace_with_selected();
        let group = ws.add_group("g").unwrap();
        let filter = ws.add_filter(&group, pattern("ERROR"), color()).unwrap();
        let before = ws.find_filter(&filter).cloned().unwrap();

        ws.edit_filter(&filter, pattern("WARN")).unwrap();
        let after = ws.find_filter(&filter).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.color, before.color);
        assert_eq!(after.pattern.as_str(), "WARN");
    }

    #[test]
    fn test_lookup_miss_is_reported_not_panicking() {
        let (mut ws, _) = workspace_with_selected();
        let missing = EntityId::from("missing");
        assert!(ws.delete_filter(&missing).unwrap_err().is_lookup_miss());
        assert!(ws.delete_group(&missing).unwrap_err().is_lookup_miss());
        assert!(ws.set_shown(&missing, false).unwrap_err().is_lookup_miss());
    }

    #[test]
    fn test_toggle_prefers_group_then_filter() {
        let (mut ws, _) = workspace_with_selected();
        let group = ws.add_group("g").unwrap();
        let filter = ws.add_filter(&group, pattern("x"), color()).unwrap();

        assert_eq!(ws.set_shown(&filter, false).unwrap(), ToggleTarget::Filter);
        assert!(ws.find_group(&group).unwrap().is_shown);

        assert_eq!(ws.set_shown(&group, true).unwrap(), ToggleTarget::Group);
        assert!(ws.find_filter(&filter).unwrap().is_shown);
    }

    #[test]
    fn test_loaded_duplicate_group_ids_are_replaced() {
        let mut project = Project::new("p");
        project.selected = true;
        let mut a = Group::new("a");
        a.filters.push(Filter::new(pattern("x"), color()));
        let mut b = Group::new("b");
        b.id = a.id.clone();
        b.filters.push(a.filters[0].clone());
        project.groups = vec![a.clone(), b];

        let mut ws = Workspace::from_projects(vec![project]);
        let groups = ws.active_groups();
        assert_eq!(groups[0].id, a.id);
        assert_eq!(groups[0].filters[0].id, a.filters[0].id);
        assert_ne!(groups[1].id, a.id);
        assert_ne!(groups[1].filters[0].id, a.filters[0].id);

        ws.set_highlighted(&a.id, false).unwrap();
        let flags: Vec<_> = ws.active_groups().iter().map(|g| g.is_highlighted).collect();
        assert_eq!(flags, vec![false, true]);
        ws.delete_group(&a.id).unwrap();
        assert_eq!(ws.active_groups().len(), 1);
        assert_eq!(ws.active_groups()[0].name, "b");
    }

    #[test]
    fn test_replace_projects_dedupes_project_ids() {
        let (mut ws, _) = workspace_with_selected();
        let a = Project::new("a");
        let mut b = Project::new("b");
        b.id = a.id.clone();

        ws.replace_projects(vec![a.clone(), b]);
        let projects = ws.projects();
        assert_eq!(projects[0].id, a.id);
        assert_ne!(projects[1].id, a.id);
        assert_eq!(ws.find_project(&a.id).map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn test_import_groups_regenerates_colliding_ids() {
        let (mut ws, _) = workspace_with_selected();
        let group = ws.add_group("g").unwrap();
        ws.add_filter(&group, pattern("x"), color()).unwrap();
        let copy = ws.active_groups().to_vec();

        assert_eq!(ws.import_groups(copy).unwrap(), 1);
        let groups = ws.active_groups();
        assert_eq!(groups.len(), 2);
        assert_ne!(groups[0].id, groups[1].id);
        assert_ne!(groups[0].filters[0].id, groups[1].filters[0].id);
    }
}
