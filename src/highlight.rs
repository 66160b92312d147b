//! Highlight projection: turn match sets into per-editor decoration plans.

use crate::config::FocusRules;
use crate::engine::Evaluation;
use crate::host::{DecorationHandle, DecorationSink, EditorId};
use crate::model::{Color, EntityId};
use std::collections::HashMap;
use tracing::debug;

/// Visual treatment of one decoration layer
#[derive(Debug, Clone, PartialEq)]
pub enum DecorationStyle {
    /// Full-line background in the filter's color
    Highlight { color: Color },
    /// Synthetic text shown before the first line of a focus document.
    /// Not part of the addressable text.
    FocusMarker { text: String, color: String },
}

/// One named set of full-line regions sharing a style
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationLayer {
    pub filter_id: Option<EntityId>,
    pub style: DecorationStyle,
    pub lines: Vec<usize>,
}

/// Everything one editor should display after a pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecorationPlan {
    layers: Vec<DecorationLayer>,
}

impl DecorationPlan {
    /// One highlight layer per filter with at least one matched line.
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        let layers = evaluation
            .matches
            .iter()
            .filter(|m| !m.lines.is_empty())
            .map(|m| DecorationLayer {
                filter_id: Some(m.filter_id.clone()),
                style: DecorationStyle::Highlight { color: m.color },
                lines: m.lines.clone(),
            })
            .collect();
        Self { layers }
    }

    pub fn push_focus_marker(&mut self, rules: &FocusRules) {
        self.layers.push(DecorationLayer {
            filter_id: None,
            style: DecorationStyle::FocusMarker {
                text: rules.marker_text.clone(),
                color: rules.marker_color.clone(),
            },
            lines: vec![0],
        });
    }

    pub fn layers(&self) -> &[DecorationLayer] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Lines highlighted for a filter, empty when it has no layer.
    pub fn lines_for(&self, filter_id: &EntityId) -> &[usize] {
        self.layers
            .iter()
            .find(|l| l.filter_id.as_ref() == Some(filter_id))
            .map(|l| l.lines.as_slice())
            .unwrap_or(&[])
    }
}

/// Applies plans and owns every decoration handle it created.
///
/// Handles are never reused across passes: applying a plan first releases
/// whatever this projector previously applied to the same editor.
#[derive(Debug, Default)]
pub struct HighlightProjector {
    applied: HashMap<EditorId, Vec<DecorationHandle>>,
}

impl HighlightProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply<S: DecorationSink + ?Sized>(
        &mut self,
        sink: &mut S,
        editor: EditorId,
        plan: &DecorationPlan,
    ) {
        self.release(sink, editor);
        let handles: Vec<_> = plan
            .layers()
            .iter()
            .map(|layer| sink.apply_decorations(editor, layer))
            .collect();
        debug!(?editor, layers = handles.len(), "applied decorations");
        if !handles.is_empty() {
            self.applied.insert(editor, handles);
        }
    }

    pub fn release<S: DecorationSink + ?Sized>(&mut self, sink: &mut S, editor: EditorId) {
        if let Some(handles) = self.applied.remove(&editor) {
            for handle in handles {
                sink.release_decorations(handle);
            }
        }
    }

    /// Release decorations of editors that are no longer visible.
    pub fn release_except<S: DecorationSink + ?Sized>(
        &mut self,
        sink: &mut S,
        live: &[EditorId],
    ) {
        let stale: Vec<EditorId> = self
            .applied
            .keys()
            .filter(|editor| !live.contains(editor))
            .copied()
            .collect();
        for editor in stale {
            self.release(sink, editor);
        }
    }

    /// Number of live handles this projector holds for an editor.
    pub fn applied_count(&self, editor: EditorId) -> usize {
        self.applied.get(&editor).map_or(0, Vec::len)
    }
}
