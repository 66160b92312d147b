//! Filter evaluation: scan document lines against the active group set.

use crate::document::DocumentMode;
use crate::model::{Color, EntityId, Filter, Group, Pattern};
use std::collections::HashMap;
use tracing::trace;

/// Lines matched by one filter in one document
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMatches {
    pub filter_id: EntityId,
    pub color: Color,
    pub lines: Vec<usize>,
}

/// Output of one evaluation pass over one document
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Matches for every filter that was evaluated, in group/filter order
    pub matches: Vec<FilterMatches>,
    counts: HashMap<EntityId, usize>,
}

impl Evaluation {
    pub fn from_matches(matches: Vec<FilterMatches>) -> Self {
        let counts = matches
            .iter()
            .map(|m| (m.filter_id.clone(), m.lines.len()))
            .collect();
        Self { matches, counts }
    }

    /// Match count for a filter; zero for filters that were not evaluated.
    pub fn count_for(&self, id: &EntityId) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn lines_for(&self, id: &EntityId) -> Option<&[usize]> {
        self.matches
            .iter()
            .find(|m| &m.filter_id == id)
            .map(|m| m.lines.as_slice())
    }
}

/// Whether a filter takes part in the highlight pass for a document.
///
/// A focus document only contains shown lines, so filters that are not
/// shown are suppressed there even when highlighted.
pub fn is_evaluated(filter: &Filter, mode: &DocumentMode) -> bool {
    filter.is_highlighted && (!mode.is_focus() || filter.is_shown)
}

/// Zero-indexed lines where the pattern matches.
pub fn match_lines<S: AsRef<str>>(pattern: &Pattern, lines: &[S]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| pattern.is_match(line.as_ref()).then_some(idx))
        .collect()
}

/// Evaluate every filter of every group against the document lines
pub fn evaluate<S: AsRef<str>>(
    lines: &[S],
    mode: &DocumentMode,
    groups: &[Group],
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for group in groups {
        for filter in &group.filters {
            if !is_evaluated(filter, mode) {
                continue;
            }
            let matched = match_lines(&filter.pattern, lines);
            trace!(
                filter = %filter.id,
                pattern = filter.pattern.as_str(),
                matches = matched.len(),
                "evaluated filter"
            );
            evaluation.counts.insert(filter.id.clone(), matched.len());
            evaluation.matches.push(FilterMatches {
                filter_id: filter.id.clone(),
                color: filter.color,
                lines: matched,
            });
        }
    }

    evaluation
}

/// Store the pass's counts on the filters. Only called for the active editor.
pub fn apply_counts(groups: &mut [Group], evaluation: &Evaluation) {
    for filter in groups.iter_mut().flat_map(|g| g.filters.iter_mut()) {
        filter.count = evaluation.count_for(&filter.id);
    }
}
