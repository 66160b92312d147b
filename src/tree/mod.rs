//! Side-panel tree caches.
//!
//! Nodes are kept in id-keyed tables and mutated in place, so a host that
//! diffs by node identity keeps expansion state and scroll position across
//! refreshes. `update` purges ids that left the model; `refresh` only
//! re-renders what is cached.

pub mod node;

pub use node::{FilterNode, GroupIcon, GroupNode, ProjectNode, filter_context, group_context};

use crate::host::{TreeKind, TreeListener};
use crate::model::{EntityId, Group, SharedWorkspace};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A child row of the filter tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeItem<'a> {
    Group(&'a GroupNode),
    Filter(&'a FilterNode),
}

impl TreeItem<'_> {
    pub fn id(&self) -> &EntityId {
        match self {
            TreeItem::Group(node) => &node.id,
            TreeItem::Filter(node) => &node.id,
        }
    }
}

fn upsert_group(cache: &mut HashMap<EntityId, GroupNode>, group: &Group) {
    match cache.get_mut(&group.id) {
        Some(node) => node.update(group),
        None => {
            cache.insert(group.id.clone(), GroupNode::new(group));
        }
    }
}

/// Group/filter tree of the selected project
#[derive(Debug)]
pub struct FilterTree {
    workspace: SharedWorkspace,
    groups: HashMap<EntityId, GroupNode>,
    filters: HashMap<EntityId, FilterNode>,
}

impl FilterTree {
    pub fn new(workspace: SharedWorkspace) -> Self {
        Self {
            workspace,
            groups: HashMap::new(),
            filters: HashMap::new(),
        }
    }

    /// Rows under `parent`, or the root rows when `parent` is `None`.
    ///
    /// Cached nodes are updated in place; unseen ids get a new node.
    pub fn children(&mut self, parent: Option<&EntityId>) -> Vec<TreeItem<'_>> {
        let workspace = self.workspace.borrow();
        let groups = workspace.active_groups();

        let (ids, is_root) = match parent {
            None => {
                let ids: Vec<EntityId> = groups
                    .iter()
                    .map(|group| {
                        upsert_group(&mut self.groups, group);
                        group.id.clone()
                    })
                    .collect();
                (ids, true)
            }
            Some(parent) => {
                let Some(group) = groups.iter().find(|g| &g.id == parent) else {
                    return Vec::new();
                };
                let ids: Vec<EntityId> = group
                    .filters
                    .iter()
                    .map(|filter| {
                        match self.filters.get_mut(&filter.id) {
                            Some(node) => node.update(filter),
                            None => {
                                self.filters
                                    .insert(filter.id.clone(), FilterNode::new(filter));
                            }
                        }
                        filter.id.clone()
                    })
                    .collect();
                (ids, false)
            }
        };
        drop(workspace);

        if is_root {
            ids.iter()
                .filter_map(|id| self.groups.get(id))
                .map(TreeItem::Group)
                .collect()
        } else {
            ids.iter()
                .filter_map(|id| self.filters.get(id))
                .map(TreeItem::Filter)
                .collect()
        }
    }

    /// Re-render every cached node from the current model and signal the
    /// host. The id-to-node mapping is left as is.
    pub fn refresh<L: TreeListener + ?Sized>(&mut self, listener: &mut L) {
        debug!(
            groups = self.groups.len(),
            filters = self.filters.len(),
            "refresh filter tree"
        );
        {
            let workspace = self.workspace.borrow();
            for (id, node) in self.groups.iter_mut() {
                if let Some(group) = workspace.find_group(id) {
                    node.update(group);
                }
            }
            for (id, node) in self.filters.iter_mut() {
                if let Some(filter) = workspace.find_filter(id) {
                    node.update(filter);
                }
            }
        }
        listener.tree_changed(TreeKind::Filters, None);
    }

    /// Re-render a single node and signal only that node.
    pub fn refresh_item<L: TreeListener + ?Sized>(&mut self, listener: &mut L, id: &EntityId) {
        {
            let workspace = self.workspace.borrow();
            if let (Some(node), Some(group)) = (self.groups.get_mut(id), workspace.find_group(id)) {
                node.update(group);
            } else if let (Some(node), Some(filter)) =
                (self.filters.get_mut(id), workspace.find_filter(id))
            {
                node.update(filter);
            }
        }
        listener.tree_changed(TreeKind::Filters, Some(id));
    }

    /// The backing group set changed: drop nodes whose ids are gone, then
    /// refresh.
    pub fn update<L: TreeListener + ?Sized>(&mut self, listener: &mut L) {
        {
            let workspace = self.workspace.borrow();
            let groups = workspace.active_groups();
            let live_groups: HashSet<&EntityId> = groups.iter().map(|g| &g.id).collect();
            let live_filters: HashSet<&EntityId> = groups
                .iter()
                .flat_map(|g| g.filters.iter().map(|f| &f.id))
                .collect();
            self.groups.retain(|id, _| live_groups.contains(id));
            self.filters.retain(|id, _| live_filters.contains(id));
            debug!(
                groups = self.groups.len(),
                filters = self.filters.len(),
                "purged filter tree cache"
            );
        }
        self.refresh(listener);
    }

    pub fn group_node(&self, id: &EntityId) -> Option<&GroupNode> {
        self.groups.get(id)
    }

    pub fn filter_node(&self, id: &EntityId) -> Option<&FilterNode> {
        self.filters.get(id)
    }

    /// Record the host's expansion state for a group row.
    pub fn set_expanded(&mut self, id: &EntityId, expanded: bool) -> bool {
        match self.groups.get_mut(id) {
            Some(node) => {
                node.expanded = expanded;
                true
            }
            None => false,
        }
    }

    /// Number of cached group and filter nodes.
    pub fn cached_len(&self) -> (usize, usize) {
        (self.groups.len(), self.filters.len())
    }
}

/// Flat project list
#[derive(Debug)]
pub struct ProjectTree {
    workspace: SharedWorkspace,
    projects: HashMap<EntityId, ProjectNode>,
}

impl ProjectTree {
    pub fn new(workspace: SharedWorkspace) -> Self {
        Self {
            workspace,
            projects: HashMap::new(),
        }
    }

    pub fn children(&mut self) -> Vec<&ProjectNode> {
        let workspace = self.workspace.borrow();
        let ids: Vec<EntityId> = workspace
            .projects()
            .iter()
            .map(|project| {
                match self.projects.get_mut(&project.id) {
                    Some(node) => node.update(project),
                    None => {
                        self.projects
                            .insert(project.id.clone(), ProjectNode::new(project));
                    }
                }
                project.id.clone()
            })
            .collect();
        drop(workspace);

        ids.iter().filter_map(|id| self.projects.get(id)).collect()
    }

    pub fn refresh<L: TreeListener + ?Sized>(&mut self, listener: &mut L) {
        {
            let workspace = self.workspace.borrow();
            for (id, node) in self.projects.iter_mut() {
                if let Some(project) = workspace.find_project(id) {
                    node.update(project);
                }
            }
        }
        debug!(projects = self.projects.len(), "refresh project tree");
        listener.tree_changed(TreeKind::Projects, None);
    }

    pub fn update<L: TreeListener + ?Sized>(&mut self, listener: &mut L) {
        {
            let workspace = self.workspace.borrow();
            let live: HashSet<&EntityId> = workspace.projects().iter().map(|p| &p.id).collect();
            self.projects.retain(|id, _| live.contains(id));
        }
        self.refresh(listener);
    }

    pub fn node(&self, id: &EntityId) -> Option<&ProjectNode> {
        self.projects.get(id)
    }

    pub fn cached_len(&self) -> usize {
        self.projects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Pattern, Workspace};

    #[derive(Default)]
    struct Signals(Vec<(TreeKind, Option<EntityId>)>);

    impl TreeListener for Signals {
        fn tree_changed(&mut self, tree: TreeKind, node: Option<&EntityId>) {
            self.0.push((tree, node.cloned()));
        }
    }

    fn setup() -> (SharedWorkspace, EntityId, EntityId) {
        let mut ws = Workspace::new();
        let project = ws.add_project("p");
        ws.select_project(&project).unwrap();
        let group = ws.add_group("g").unwrap();
        let filter = ws
            .add_filter(&group, Pattern::new("x").unwrap(), Color::random(40, 40))
            .unwrap();
        (ws.into_shared(), group, filter)
    }

    #[test]
    fn test_children_reuse_cached_nodes() {
        let (ws, group, _) = setup();
        let mut tree = FilterTree::new(ws);

        tree.children(None);
        tree.set_expanded(&group, true);
        let roots = tree.children(None);

        assert_eq!(roots.len(), 1);
        match roots[0] {
            TreeItem::Group(node) => {
                assert!(node.expanded);
                assert_eq!(node.revision(), 2);
            }
            TreeItem::Filter(_) => panic!("expected a group row"),
        }
    }

    #[test]
    fn test_filter_children_of_unknown_parent_are_empty() {
        let (ws, _, filter) = setup();
        let mut tree = FilterTree::new(ws);
        assert!(tree.children(Some(&filter)).is_empty());
        assert!(tree.children(Some(&EntityId::from("nope"))).is_empty());
    }

    #[test]
    fn test_update_purges_deleted_ids() {
        let (ws, group, filter) = setup();
        let mut tree = FilterTree::new(ws.clone());
        let mut signals = Signals::default();
        tree.children(None);
        tree.children(Some(&group));
        assert_eq!(tree.cached_len(), (1, 1));

        ws.borrow_mut().delete_filter(&filter).unwrap();
        tree.refresh(&mut signals);
        assert_eq!(tree.cached_len(), (1, 1));

        tree.update(&mut signals);
        assert_eq!(tree.cached_len(), (1, 0));
        assert!(tree.group_node(&group).is_some());
        assert_eq!(signals.0.len(), 2);
    }

    #[test]
    fn test_refresh_rerenders_counts_in_place() {
        let (ws, group, filter) = setup();
        let mut tree = FilterTree::new(ws.clone());
        let mut signals = Signals::default();
        tree.children(Some(&group));

        ws.borrow_mut().active_groups_mut()[0].filters[0].count = 5;
        tree.refresh(&mut signals);
        let node = tree.filter_node(&filter).unwrap();
        assert_eq!(node.description, " · 5");
        assert_eq!(signals.0, vec![(TreeKind::Filters, None)]);
    }

    #[test]
    fn test_project_tree_marks_selection() {
        let (ws, _, _) = setup();
        let mut tree = ProjectTree::new(ws.clone());
        let rows = tree.children();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].selected);
        assert_eq!(rows[0].description, "selected");
    }
}
