//! Inline text editor: the Viewing/Editing state machine shared by the canvas
//! and the popout list.
//!
//! The editor owns the edit buffer only. It never touches a document; ending
//! an edit yields an [`EditEnd`] that the caller applies to whichever list
//! holds the item. Keys are classified into a [`KeyOutcome`] so the host knows
//! whether to let the keystroke through, suppress it, or tear down its text
//! widget.

#[cfg(test)]
#[path = "text_edit_test.rs"]
mod text_edit_test;

use crate::consts::{LINE_HEIGHT_PX, TEXT_PADDING_PX};
use crate::doc::{ElementId, ListItem, Surface, TextRule};
use crate::input::{Key, Modifiers};

/// Measures the edit buffer so it can grow with its content instead of scrolling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub line_height: f64,
    pub padding: f64,
    /// Soft-wrap width in characters; `None` wraps only on line breaks.
    pub wrap_chars: Option<usize>,
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self {
            line_height: LINE_HEIGHT_PX,
            padding: TEXT_PADDING_PX,
            wrap_chars: None,
        }
    }
}

impl LineMetrics {
    /// Number of rendered rows for `text`. Never less than one.
    #[must_use]
    pub fn rows(&self, text: &str) -> usize {
        let rows: usize = text
            .split('\n')
            .map(|line| match self.wrap_chars {
                Some(width) if width > 0 => line.chars().count().div_ceil(width).max(1),
                _ => 1,
            })
            .sum();
        rows.max(1)
    }

    /// Height that fits `text` without an internal scrollbar.
    #[must_use]
    pub fn content_height(&self, text: &str) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let rows = self.rows(text) as f64;
        rows * self.line_height + self.padding
    }
}

/// Why an edit could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditRefusal {
    #[error("element {0} is locked")]
    Locked(ElementId),
    #[error("element {0} has no editable text on this surface")]
    NotTextBearing(ElementId),
}

/// State of an edit in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit {
    pub id: ElementId,
    pub rule: TextRule,
    pub content_required: bool,
    /// Content at edit start, restored on cancel.
    pub original: String,
    pub buffer: String,
    /// Current autosized height of the buffer.
    pub height: f64,
}

/// Viewing or Editing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Viewing,
    Editing(ActiveEdit),
}

/// How an edit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEnd {
    /// Merge `content` into the item.
    Committed { id: ElementId, content: String },
    /// Leave the item as it was.
    Reverted { id: ElementId, content: String },
}

impl EditEnd {
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Committed { id, .. } | Self::Reverted { id, .. } => *id,
        }
    }
}

/// What the host should do with a keystroke during an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The edit ended; remove the text widget.
    Ended(EditEnd),
    /// Let the widget insert a line break.
    LineBreak,
    /// Swallow the keystroke.
    Suppressed,
    /// Not ours; let the widget handle it.
    PassThrough,
}

/// Inline text editor for one surface.
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    state: EditState,
    metrics: LineMetrics,
}

impl TextEditor {
    #[must_use]
    pub fn new(metrics: LineMetrics) -> Self {
        Self {
            state: EditState::Viewing,
            metrics,
        }
    }

    #[must_use]
    pub fn state(&self) -> &EditState {
        &self.state
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveEdit> {
        match self.state {
            EditState::Viewing => None,
            EditState::Editing(ref edit) => Some(edit),
        }
    }

    #[must_use]
    pub fn editing_id(&self) -> Option<ElementId> {
        self.active().map(|edit| edit.id)
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.active().is_some()
    }

    /// Enter Editing for `item`, seeding the buffer from its content.
    ///
    /// An edit already open on another item is committed first, as the blur
    /// that precedes the new focus would. Starting on the item already being
    /// edited keeps the current buffer.
    ///
    /// # Errors
    ///
    /// Refuses locked items and items with no editable text on `surface`;
    /// the current state is left untouched in that case.
    pub fn begin<T: ListItem>(
        &mut self,
        item: &T,
        surface: Surface,
    ) -> Result<Option<EditEnd>, EditRefusal> {
        let behavior = item.kind().behavior(surface);
        if behavior.text == TextRule::None {
            return Err(EditRefusal::NotTextBearing(item.id()));
        }
        if item.is_locked() {
            return Err(EditRefusal::Locked(item.id()));
        }
        if self.editing_id() == Some(item.id()) {
            return Ok(None);
        }
        let previous = self.commit();
        let buffer = item.content().to_string();
        tracing::debug!(id = %item.id(), "text edit started");
        self.state = EditState::Editing(ActiveEdit {
            id: item.id(),
            rule: behavior.text,
            content_required: behavior.content_required,
            original: buffer.clone(),
            height: self.metrics.content_height(&buffer),
            buffer,
        });
        Ok(previous)
    }

    /// Replace the buffer and rerun the autosize pass. Returns the new height.
    pub fn set_buffer(&mut self, text: impl Into<String>) -> Option<f64> {
        let metrics = self.metrics;
        let EditState::Editing(ref mut edit) = self.state else {
            return None;
        };
        edit.buffer = text.into();
        edit.height = metrics.content_height(&edit.buffer);
        Some(edit.height)
    }

    /// Classify a keystroke against the commit/cancel contract.
    pub fn on_key(&mut self, key: &Key, modifiers: Modifiers) -> KeyOutcome {
        let Some(rule) = self.active().map(|edit| edit.rule) else {
            return KeyOutcome::PassThrough;
        };
        if key.is_escape() {
            return self.cancel().map_or(KeyOutcome::PassThrough, KeyOutcome::Ended);
        }
        if !key.is_enter() {
            return KeyOutcome::PassThrough;
        }
        if !modifiers.shift {
            return self.commit().map_or(KeyOutcome::PassThrough, KeyOutcome::Ended);
        }
        match rule {
            TextRule::MultiLine => KeyOutcome::LineBreak,
            TextRule::SingleLine | TextRule::None => KeyOutcome::Suppressed,
        }
    }

    /// Commit path (blur, Enter, explicit confirm). A blank buffer on a kind
    /// that requires content reverts instead.
    pub fn commit(&mut self) -> Option<EditEnd> {
        let EditState::Editing(edit) = std::mem::take(&mut self.state) else {
            return None;
        };
        if edit.content_required && edit.buffer.trim().is_empty() {
            tracing::debug!(id = %edit.id, "blank required content, reverting");
            return Some(EditEnd::Reverted {
                id: edit.id,
                content: edit.original,
            });
        }
        tracing::debug!(id = %edit.id, "text edit committed");
        Some(EditEnd::Committed {
            id: edit.id,
            content: edit.buffer,
        })
    }

    /// Cancel path (Escape). The buffer is discarded.
    pub fn cancel(&mut self) -> Option<EditEnd> {
        let EditState::Editing(edit) = std::mem::take(&mut self.state) else {
            return None;
        };
        tracing::debug!(id = %edit.id, "text edit cancelled");
        Some(EditEnd::Reverted {
            id: edit.id,
            content: edit.original,
        })
    }

    /// Drop the edit on `id` without committing, e.g. when the item was
    /// deleted or locked. The returned end lets the host remove its widget.
    pub fn abandon(&mut self, id: &ElementId) -> Option<EditEnd> {
        if self.editing_id() != Some(*id) {
            return None;
        }
        self.cancel()
    }
}
