//! Text rendering of projects, filter counts and the filter tree for the
//! terminal host.

use crate::model::{Group, Project};
use crate::tree::{FilterTree, TreeItem};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use std::fmt::Write as _;

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

fn flag(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

pub fn format_projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects. Add one with `project add <name>`.\n".to_string();
    }
    let mut table = create_styled_table(&["", "Id", "Name", "Groups", "Filters"]);
    for project in projects {
        let filters: usize = project.groups.iter().map(|g| g.filters.len()).sum();
        table.add_row(vec![
            Cell::new(if project.selected { "*" } else { "" }),
            Cell::new(project.id.as_str()),
            Cell::new(&project.name),
            Cell::new(project.groups.len()),
            Cell::new(filters),
        ]);
    }
    format!("{table}\n")
}

/// Per-filter counts as of the last evaluation of the active editor
pub fn format_counts(groups: &[Group]) -> String {
    let mut table =
        create_styled_table(&["Group", "Filter", "Id", "Color", "Highlight", "Show", "Count"]);
    for group in groups {
        for filter in &group.filters {
            let (r, g, b) = filter.color.to_rgb();
            table.add_row(vec![
                Cell::new(&group.name),
                Cell::new(filter.pattern.to_string()),
                Cell::new(filter.id.as_str()),
                Cell::new("   ".on_truecolor(r, g, b)),
                Cell::new(flag(filter.is_highlighted)),
                Cell::new(flag(filter.is_shown)),
                Cell::new(filter.count),
            ]);
        }
    }
    format!("{table}\n")
}

/// Walk the filter tree the way a host would: root rows, then each
/// group's children.
pub fn format_tree(tree: &mut FilterTree) -> String {
    let mut out = String::new();
    let group_ids: Vec<_> = tree.children(None).iter().map(|item| item.id().clone()).collect();
    if group_ids.is_empty() {
        let _ = writeln!(out, "{}", "(no groups)".bright_black());
        return out;
    }

    for group_id in group_ids {
        if let Some(node) = tree.group_node(&group_id) {
            let icon = node.icon.map(|i| i.name()).unwrap_or("-");
            let _ = writeln!(
                out,
                "{} {}  {}",
                format!("[{icon}]").bright_black(),
                node.label.bold(),
                format!("{} {}", node.context, node.id).bright_black()
            );
        }
        for item in tree.children(Some(&group_id)) {
            if let TreeItem::Filter(node) = item {
                let (r, g, b) = node.icon.color.to_rgb();
                let swatch = if node.icon.filled { "●" } else { "○" };
                let _ = writeln!(
                    out,
                    "    {} {}{}  {}",
                    swatch.truecolor(r, g, b),
                    node.label,
                    node.description,
                    format!("{} {}", node.context, node.id).bright_black()
                );
            }
        }
    }
    out
}
