//! Canvas interaction engine.
//!
//! DESIGN
//! ======
//! `EngineCore` owns the working document and every piece of transient
//! interaction state: the interaction mode, the active pointer gesture, the
//! inline text editor, and the host-reported layout. Handlers mutate the
//! document immediately (moves and resizes are live) and return [`Action`]s
//! describing what the host must do: redraw, show or remove a text widget,
//! capture or release the pointer.
//!
//! A gesture acquires the pointer with `CapturePointer` when it starts and
//! always releases it with `ReleasePointer` when it ends, whether by
//! pointer-up, an explicit cancel, its element disappearing, or a reload.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::config::EditorConfig;
use crate::doc::{Document, Element, ElementId, PartialElement, Surface};
use crate::geometry::{Point, Rect, snap_point};
use crate::hit::{self, Hit, HitOptions, HitPart};
use crate::input::{
    Button, DragGesture, GestureKind, InputState, InteractionMode, Key, Modifiers, ResizeGesture,
    UiState,
};
use crate::render::{self, Controls, Layout, Painted};
use crate::text_edit::{EditEnd, KeyOutcome, TextEditor};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementUpdated {
        id: ElementId,
        fields: PartialElement,
    },
    ElementDeleted { id: ElementId },
    /// Show the text widget for `id`, seeded with `buffer`.
    EditStarted {
        id: ElementId,
        buffer: String,
        height: f64,
    },
    /// Remove the text widget; the element now shows its stored content.
    EditEnded(EditEnd),
    /// Route all pointer-move/up events to the engine until released.
    CapturePointer(GestureKind),
    ReleasePointer(GestureKind),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state.
pub struct EngineCore {
    pub doc: Document,
    pub ui: UiState,
    pub input: InputState,
    pub text: TextEditor,
    /// Rendered sizes of elements without an explicit size.
    pub layout: Layout,
    /// Canvas bounding rect in client coordinates.
    pub canvas_rect: Rect,
    pub config: EditorConfig,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            doc: Document::new(),
            ui: UiState::default(),
            input: InputState::default(),
            text: TextEditor::new(config.text),
            layout: Layout::new(),
            canvas_rect: Rect::default(),
            config,
        }
    }

    // --- Data inputs ---

    /// Replace the working document and reset all transient state.
    pub fn load_document(&mut self, doc: Document) -> Vec<Action> {
        let mut actions = self.end_gesture();
        if let Some(end) = self.text.cancel() {
            actions.push(Action::EditEnded(end));
        }
        self.ui.mode = InteractionMode::Direct;
        self.layout.clear();
        self.doc = doc;
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Record the canvas bounding rect in client coordinates.
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Record the rendered box size of an element.
    pub fn set_rendered_size(&mut self, id: ElementId, size: crate::geometry::Size) {
        self.layout.insert(id, size);
    }

    // --- Modes ---

    /// Switch interaction mode. Entering Move mode commits any open edit.
    pub fn set_mode(&mut self, mode: InteractionMode) -> Vec<Action> {
        if self.ui.mode == mode {
            return Vec::new();
        }
        let mut actions = self.end_gesture();
        if mode == InteractionMode::Move {
            if let Some(end) = self.text.commit() {
                actions.extend(self.apply_edit_end(end));
            }
        }
        self.ui.mode = mode;
        tracing::debug!(?mode, "interaction mode changed");
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.ui.snap_to_grid = snap;
    }

    // --- Element operations ---

    /// Append an element, returning its final id.
    pub fn add_element(&mut self, el: Element) -> ElementId {
        let id = self.doc.add(el);
        tracing::debug!(%id, "element added");
        id
    }

    /// Merge `fields` into an element. A missing id is a silent no-op.
    pub fn update_element(&mut self, id: &ElementId, fields: PartialElement) -> Vec<Action> {
        if let Err(err) = self.doc.update(id, &fields) {
            tracing::debug!(%err, "update skipped");
            return Vec::new();
        }
        let mut actions = Vec::new();
        if fields.is_locked == Some(true) {
            if self.input.target() == Some(*id) {
                actions.extend(self.end_gesture());
            }
            if let Some(end) = self.text.abandon(id) {
                actions.push(Action::EditEnded(end));
            }
        }
        actions.push(Action::ElementUpdated { id: *id, fields });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove an element. Lock state never blocks deletion.
    pub fn delete_element(&mut self, id: &ElementId) -> Vec<Action> {
        if self.doc.delete(id).is_none() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.input.target() == Some(*id) {
            actions.extend(self.end_gesture());
        }
        if let Some(end) = self.text.abandon(id) {
            actions.push(Action::EditEnded(end));
        }
        self.layout.remove(id);
        actions.push(Action::ElementDeleted { id: *id });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Flip the lock flag. Locking ends any gesture or text edit on the element.
    pub fn toggle_lock(&mut self, id: &ElementId) -> Vec<Action> {
        let locked = match self.doc.toggle_lock(id) {
            Ok(locked) => locked,
            Err(err) => {
                tracing::debug!(%err, "lock toggle skipped");
                return Vec::new();
            }
        };
        let mut actions = Vec::new();
        if locked {
            if self.input.target() == Some(*id) {
                actions.extend(self.end_gesture());
            }
            if let Some(end) = self.text.abandon(id) {
                actions.push(Action::EditEnded(end));
            }
        }
        actions.push(Action::ElementUpdated {
            id: *id,
            fields: PartialElement {
                is_locked: Some(locked),
                ..Default::default()
            },
        });
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Text editing ---

    /// Explicit start-edit gesture on an element.
    ///
    /// Ignored outside Direct mode, while a pointer gesture is active, and for
    /// locked or non-text elements.
    pub fn begin_edit(&mut self, id: &ElementId) -> Vec<Action> {
        if self.ui.mode != InteractionMode::Direct || !self.input.is_idle() {
            tracing::debug!(%id, "edit start ignored");
            return Vec::new();
        }
        let Some(el) = self.doc.get(id) else {
            return Vec::new();
        };
        let previous = match self.text.begin(el, Surface::Canvas) {
            Ok(previous) => previous,
            Err(refusal) => {
                tracing::debug!(%refusal, "edit start refused");
                return Vec::new();
            }
        };
        let mut actions = previous.map(|end| self.apply_edit_end(end)).unwrap_or_default();
        if let Some(edit) = self.text.active() {
            actions.push(Action::EditStarted {
                id: edit.id,
                buffer: edit.buffer.clone(),
                height: edit.height,
            });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Double-click at a client point: start editing whatever is under it.
    pub fn on_double_click(&mut self, client: Point) -> Vec<Action> {
        match self.hit(client) {
            Some(hit) if hit.part == HitPart::Body => self.begin_edit(&hit.element_id),
            _ => Vec::new(),
        }
    }

    /// The host's text widget changed. Returns the autosized height.
    pub fn set_edit_buffer(&mut self, text: impl Into<String>) -> Option<f64> {
        self.text.set_buffer(text)
    }

    /// Keystroke inside the text widget.
    pub fn on_key(&mut self, key: &Key, modifiers: Modifiers) -> (KeyOutcome, Vec<Action>) {
        let outcome = self.text.on_key(key, modifiers);
        let actions = match outcome {
            KeyOutcome::Ended(ref end) => self.apply_edit_end(end.clone()),
            KeyOutcome::LineBreak | KeyOutcome::Suppressed | KeyOutcome::PassThrough => Vec::new(),
        };
        (outcome, actions)
    }

    /// The text widget lost focus, or the user confirmed.
    pub fn commit_edit(&mut self) -> Vec<Action> {
        self.text.commit().map(|end| self.apply_edit_end(end)).unwrap_or_default()
    }

    pub fn cancel_edit(&mut self) -> Vec<Action> {
        self.text.cancel().map(|end| self.apply_edit_end(end)).unwrap_or_default()
    }

    fn apply_edit_end(&mut self, end: EditEnd) -> Vec<Action> {
        let mut actions = Vec::new();
        if let EditEnd::Committed { id, ref content } = end {
            let fields = PartialElement::content(content.clone());
            match self.doc.update(&id, &fields) {
                Ok(()) => actions.push(Action::ElementUpdated { id, fields }),
                Err(err) => tracing::debug!(%err, "edit commit skipped"),
            }
        }
        actions.push(Action::EditEnded(end));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Pointer input ---

    /// Pointer-down at a client-space point.
    pub fn on_pointer_down(&mut self, client: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let Some(hit) = self.hit(client) else {
            return Vec::new();
        };
        match (hit.part, self.ui.mode) {
            (HitPart::ResizeHandle, InteractionMode::Direct) => {
                self.start_resize(&hit.element_id, client)
            }
            (HitPart::Body, InteractionMode::Move) => self.start_drag(&hit.element_id, client),
            _ => Vec::new(),
        }
    }

    fn start_drag(&mut self, id: &ElementId, client: Point) -> Vec<Action> {
        let Some(el) = self.doc.get(id) else {
            return Vec::new();
        };
        if !el.is_draggable() || self.text.editing_id() == Some(*id) {
            tracing::debug!(%id, "drag refused");
            return Vec::new();
        }
        let top_left = self.canvas_rect.origin().add(el.position());
        self.input = InputState::Dragging(DragGesture {
            id: *id,
            offset: client.sub(top_left),
            canvas: self.canvas_rect,
            start: el.position(),
            moved: false,
        });
        tracing::debug!(%id, "drag started");
        vec![Action::CapturePointer(GestureKind::Drag), Action::SetCursor("grabbing".into())]
    }

    fn start_resize(&mut self, id: &ElementId, client: Point) -> Vec<Action> {
        let Some(el) = self.doc.get(id) else {
            return Vec::new();
        };
        let resizable = el.kind().behavior(Surface::Canvas).resizable;
        if !resizable || el.is_locked || self.text.editing_id() == Some(*id) {
            tracing::debug!(%id, "resize refused");
            return Vec::new();
        }
        let Some(start_size) = render::element_size(el, &self.layout) else {
            tracing::debug!(%id, "resize refused, size unknown");
            return Vec::new();
        };
        self.input = InputState::Resizing(ResizeGesture {
            id: *id,
            start_pointer: client,
            start_size,
        });
        tracing::debug!(%id, "resize started");
        vec![Action::CapturePointer(GestureKind::Resize), Action::SetCursor("nwse-resize".into())]
    }

    /// Pointer-move at a client-space point. Geometry is applied immediately.
    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Dragging(mut drag) => {
                let Some(current) = self.doc.get(&drag.id).map(Element::position) else {
                    return self.end_gesture();
                };
                let next = drag.position_for(client);
                if next == current {
                    return Vec::new();
                }
                drag.moved = true;
                self.input = InputState::Dragging(drag);
                self.update_element(&drag.id, PartialElement::position(next))
            }
            InputState::Resizing(resize) => {
                if !self.doc.contains(&resize.id) {
                    return self.end_gesture();
                }
                let size = resize.size_for(client, self.config.min_size);
                self.update_element(&resize.id, PartialElement::size(size.width, size.height))
            }
        }
    }

    /// Pointer-up. Ends the gesture; a moved drag snaps when snapping is on.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        let finished = self.input;
        let mut actions = self.end_gesture();
        if let InputState::Dragging(drag) = finished {
            if drag.moved && self.ui.snap_to_grid {
                if let Some(pos) = self.doc.get(&drag.id).map(Element::position) {
                    let snapped = snap_point(pos, self.config.grid_size);
                    if snapped != pos {
                        let fields = PartialElement::position(snapped);
                        actions.extend(self.update_element(&drag.id, fields));
                    }
                }
            }
        }
        actions
    }

    /// Abnormal gesture termination (pointer cancel, lost capture).
    /// Live geometry already applied is kept; no snapping.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        self.end_gesture()
    }

    fn end_gesture(&mut self) -> Vec<Action> {
        let Some(kind) = std::mem::take(&mut self.input).gesture_kind() else {
            return Vec::new();
        };
        tracing::debug!(?kind, "gesture ended");
        vec![Action::ReleasePointer(kind), Action::SetCursor("default".into())]
    }

    // --- Queries ---

    /// Hit-test a client-space point.
    #[must_use]
    pub fn hit(&self, client: Point) -> Option<Hit> {
        let local = client.sub(self.canvas_rect.origin());
        let opts = HitOptions {
            mode: self.ui.mode,
            editing: self.text.editing_id(),
            handle_px: self.config.resize_handle_px,
        };
        let canvas = self.canvas_rect.size();
        hit::hit_test(local, &self.doc, &self.layout, canvas, opts)
    }

    /// Elements bottom first, with layers and placement.
    #[must_use]
    pub fn paint_order(&self) -> Vec<Painted<'_>> {
        render::paint_order(&self.doc, self.text.editing_id())
    }

    /// Controls visible for an element in the current mode.
    #[must_use]
    pub fn controls(&self, id: &ElementId) -> Option<Controls> {
        self.doc.get(id).map(|el| render::controls_for(el, self.ui.mode))
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn editing_id(&self) -> Option<ElementId> {
        self.text.editing_id()
    }
}
