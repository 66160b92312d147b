use crate::model::{EntityId, Filter, FilterIcon, Group, Project, VisualState};

/// Theme icons used for group rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupIcon {
    BracketDot,
    BracketError,
    Bracket,
}

impl GroupIcon {
    pub fn name(&self) -> &'static str {
        match self {
            GroupIcon::BracketDot => "bracket-dot",
            GroupIcon::BracketError => "bracket-error",
            GroupIcon::Bracket => "bracket",
        }
    }
}

/// Context tag of a group row; hosts key their item menus on it.
pub fn group_context(state: VisualState) -> &'static str {
    match state {
        VisualState::LitVisible => "g-lit-visible",
        VisualState::LitInvisible => "g-lit-invisible",
        VisualState::UnlitVisible => "g-unlit-visible",
        VisualState::UnlitInvisible => "g-unlit-invisible",
    }
}

/// Context tag of a filter row.
pub fn filter_context(state: VisualState) -> &'static str {
    match state {
        VisualState::LitVisible => "f-lit-visible",
        VisualState::LitInvisible => "f-lit-invisible",
        VisualState::UnlitVisible => "f-unlit-visible",
        VisualState::UnlitInvisible => "f-unlit-invisible",
    }
}

pub fn group_icon(state: VisualState) -> Option<GroupIcon> {
    match state {
        VisualState::LitVisible => Some(GroupIcon::BracketDot),
        VisualState::LitInvisible => Some(GroupIcon::BracketError),
        VisualState::UnlitVisible => Some(GroupIcon::Bracket),
        VisualState::UnlitInvisible => None,
    }
}

/// Renderable row for a group. Mutated in place across refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub id: EntityId,
    pub label: String,
    pub description: String,
    pub context: &'static str,
    pub icon: Option<GroupIcon>,
    pub filter_ids: Vec<EntityId>,
    /// Host-owned UI state, preserved across updates
    pub expanded: bool,
    revision: u64,
}

impl GroupNode {
    pub fn new(group: &Group) -> Self {
        let mut node = Self {
            id: group.id.clone(),
            label: String::new(),
            description: String::new(),
            context: group_context(VisualState::UnlitInvisible),
            icon: None,
            filter_ids: Vec::new(),
            expanded: false,
            revision: 0,
        };
        node.update(group);
        node
    }

    pub fn update(&mut self, group: &Group) {
        let state = group.state();
        self.label = group.name.clone();
        self.description.clear();
        self.context = group_context(state);
        self.icon = group_icon(state);
        self.filter_ids = group.filters.iter().map(|f| f.id.clone()).collect();
        self.revision += 1;
    }

    /// Number of times this node has been rendered.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Renderable row for a filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub id: EntityId,
    pub label: String,
    pub description: String,
    pub context: &'static str,
    pub icon: FilterIcon,
    revision: u64,
}

impl FilterNode {
    pub fn new(filter: &Filter) -> Self {
        let mut node = Self {
            id: filter.id.clone(),
            label: String::new(),
            description: String::new(),
            context: filter_context(VisualState::UnlitInvisible),
            icon: filter.icon(),
            revision: 0,
        };
        node.update(filter);
        node
    }

    pub fn update(&mut self, filter: &Filter) {
        let state = filter.state();
        self.label = filter.pattern.to_string();
        self.context = filter_context(state);
        self.icon = filter.icon();
        self.description = match state {
            VisualState::LitVisible => format!(" · {}", filter.count),
            _ => String::new(),
        };
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Renderable row for a project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectNode {
    pub id: EntityId,
    pub label: String,
    pub description: String,
    pub selected: bool,
    revision: u64,
}

impl ProjectNode {
    pub fn new(project: &Project) -> Self {
        let mut node = Self {
            id: project.id.clone(),
            label: String::new(),
            description: String::new(),
            selected: false,
            revision: 0,
        };
        node.update(project);
        node
    }

    pub fn update(&mut self, project: &Project) {
        self.label = project.name.clone();
        self.selected = project.selected;
        self.description = if project.selected {
            "selected".to_string()
        } else {
            String::new()
        };
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
