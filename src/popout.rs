//! Popout list editor: a linear sub-document attached to one button.
//!
//! DESIGN
//! ======
//! The popout surface has no coordinates. Items are edited with the same
//! Viewing/Editing state machine as the canvas and reordered by drag-and-drop
//! on list position. Reordering is live: every drag-over of a different item
//! moves the dragged item to the hovered item's index, so the drop itself has
//! nothing left to do but forget the drag.
//!
//! The editor works on its own copy of the list. `save` hands that copy to the
//! callback it was opened with; `cancel` drops it.

#[cfg(test)]
#[path = "popout_test.rs"]
mod popout_test;

use crate::config::EditorConfig;
use crate::doc::{
    ElementId, ElementKind, ListItem, PartialElement, PopoutElement, PopoutList, Surface,
};
use crate::ingest::{self, DecodedImage};
use crate::input::{Key, Modifiers};
use crate::text_edit::{EditEnd, KeyOutcome, TextEditor};

/// Receives the popout list on save.
pub type PopoutSaveCallback = Box<dyn FnMut(Vec<PopoutElement>)>;

pub struct PopoutEditor {
    /// Button whose `popoutContent` this editor targets.
    target: ElementId,
    items: PopoutList,
    drag_id: Option<ElementId>,
    text: TextEditor,
    config: EditorConfig,
    on_save: PopoutSaveCallback,
}

impl PopoutEditor {
    /// Open an editor over a copy of `initial`.
    pub fn new(
        target: ElementId,
        initial: Vec<PopoutElement>,
        config: EditorConfig,
        on_save: impl FnMut(Vec<PopoutElement>) + 'static,
    ) -> Self {
        Self {
            target,
            items: PopoutList::from_items(initial),
            drag_id: None,
            text: TextEditor::new(config.text),
            config,
            on_save: Box::new(on_save),
        }
    }

    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }

    #[must_use]
    pub fn items(&self) -> &[PopoutElement] {
        self.items.items()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ElementId> {
        self.items.ids()
    }

    #[must_use]
    pub fn drag_id(&self) -> Option<ElementId> {
        self.drag_id
    }

    #[must_use]
    pub fn text(&self) -> &TextEditor {
        &self.text
    }

    // --- Items ---

    /// Append a heading or text item. Blank content and other kinds are refused.
    pub fn add_text_item(&mut self, kind: ElementKind, content: &str) -> Option<ElementId> {
        if content.trim().is_empty() {
            tracing::debug!(?kind, "blank popout item not added");
            return None;
        }
        let item = PopoutElement::text_item(kind, content)?;
        Some(self.items.add(item))
    }

    /// Append an ingested image at the popout width.
    pub fn add_image(&mut self, decoded: &DecodedImage) -> ElementId {
        self.items.add(ingest::popout_image(decoded, &self.config))
    }

    /// Merge `fields` into an item. Returns false if the id is gone.
    pub fn update(&mut self, id: &ElementId, fields: &PartialElement) -> bool {
        match self.items.update(id, fields) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "popout update skipped");
                false
            }
        }
    }

    /// Remove an item. Any edit or drag on it is dropped.
    pub fn delete(&mut self, id: &ElementId) -> bool {
        if self.items.delete(id).is_none() {
            return false;
        }
        if self.text.abandon(id).is_some() {
            tracing::debug!(%id, "popout edit dropped with its item");
        }
        if self.drag_id == Some(*id) {
            self.drag_id = None;
        }
        true
    }

    /// Flip the lock flag. Locking drops an open edit on the item unsaved.
    pub fn toggle_lock(&mut self, id: &ElementId) -> Option<bool> {
        match self.items.toggle_lock(id) {
            Ok(locked) => {
                if locked && self.text.abandon(id).is_some() {
                    tracing::debug!(%id, "popout edit reverted by lock");
                }
                Some(locked)
            }
            Err(err) => {
                tracing::debug!(%err, "popout lock toggle skipped");
                None
            }
        }
    }

    // --- Text editing ---

    /// Start editing an item. Returns whether an edit is now open on it.
    pub fn begin_edit(&mut self, id: &ElementId) -> bool {
        if self.drag_id.is_some() {
            tracing::debug!(%id, "popout edit ignored during drag");
            return false;
        }
        let Some(item) = self.items.get(id) else {
            return false;
        };
        match self.text.begin(item, Surface::Popout) {
            Ok(previous) => {
                if let Some(end) = previous {
                    self.apply_edit_end(end);
                }
                true
            }
            Err(refusal) => {
                tracing::debug!(%refusal, "popout edit refused");
                false
            }
        }
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) -> Option<f64> {
        self.text.set_buffer(text)
    }

    pub fn on_key(&mut self, key: &Key, modifiers: Modifiers) -> KeyOutcome {
        let outcome = self.text.on_key(key, modifiers);
        if let KeyOutcome::Ended(ref end) = outcome {
            self.apply_edit_end(end.clone());
        }
        outcome
    }

    /// Blur or explicit confirm.
    pub fn commit_edit(&mut self) -> Option<EditEnd> {
        let end = self.text.commit()?;
        self.apply_edit_end(end.clone());
        Some(end)
    }

    pub fn cancel_edit(&mut self) -> Option<EditEnd> {
        self.text.cancel()
    }

    fn apply_edit_end(&mut self, end: EditEnd) {
        if let EditEnd::Committed { id, content } = end {
            self.update(&id, &PartialElement::content(content));
        }
    }

    // --- Reordering ---

    /// Capture the dragged item. Locked items and the item being edited stay put.
    pub fn drag_start(&mut self, id: &ElementId) -> bool {
        let Some(item) = self.items.get(id) else {
            return false;
        };
        if item.is_locked() || self.text.editing_id() == Some(*id) {
            tracing::debug!(%id, "popout drag refused");
            return false;
        }
        self.drag_id = Some(*id);
        true
    }

    /// Hovering over `hovered` moves the dragged item to its index.
    pub fn drag_over(&mut self, hovered: &ElementId) -> bool {
        let Some(dragged) = self.drag_id else {
            return false;
        };
        if dragged == *hovered {
            return false;
        }
        let Some(index) = self.items.index_of(hovered) else {
            return false;
        };
        self.items.move_to(&dragged, index)
    }

    /// Finish the drag. The list already reflects the last hover.
    pub fn drop_item(&mut self) {
        self.drag_id = None;
    }

    /// Drag ended without a drop (left the list, cancelled).
    pub fn drag_end(&mut self) {
        self.drag_id = None;
    }

    // --- Lifecycle ---

    /// Commit any open edit and hand the list to the save callback.
    pub fn save(mut self) {
        self.commit_edit();
        let items = std::mem::take(&mut self.items).into_items();
        tracing::info!(button = %self.target, count = items.len(), "popout saved");
        (self.on_save)(items);
    }

    /// Discard the working list.
    pub fn cancel(self) {
        tracing::debug!(button = %self.target, "popout discarded");
    }
}
