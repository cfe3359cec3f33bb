//! Input model: interaction modes, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `InteractionMode` and `Modifiers` capture the user's intent at the time of
//! a pointer event. `InputState` is the active gesture tracked between
//! pointer-down and pointer-up, carrying everything needed to recompute the
//! element's geometry on each move.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ElementId;
use crate::geometry::{Point, Rect, Size};

/// Which interaction mode the canvas is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Double-click edits text; per-element controls and resize handles are live.
    #[default]
    Direct,
    /// Editing affordances hidden; pointer-down on a draggable element drags it.
    Move,
}

/// Modifier keys at the time of a key or pointer event. Only `shift`
/// changes behavior today (Shift+Enter in the text editor).
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer button. Gestures start on `Primary` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Enter"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.0 == "Enter"
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Editor toggles that outlive a single gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiState {
    pub mode: InteractionMode,
    /// Round dropped positions to the grid.
    pub snap_to_grid: bool,
}

/// Which kind of gesture holds the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// An in-progress drag-to-move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    /// Id of the element being dragged.
    pub id: ElementId,
    /// Pointer position minus the element's rendered top-left, in client space.
    pub offset: Point,
    /// Canvas bounding rect captured at drag start.
    pub canvas: Rect,
    /// Element position at drag start.
    pub start: Point,
    /// Whether any pointer-move changed the position.
    pub moved: bool,
}

impl DragGesture {
    /// Canvas-local position for a client-space pointer.
    #[must_use]
    pub fn position_for(&self, client: Point) -> Point {
        client.sub(self.canvas.origin()).sub(self.offset)
    }
}

/// An in-progress drag-to-resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    /// Id of the image being resized.
    pub id: ElementId,
    /// Client-space pointer at resize start.
    pub start_pointer: Point,
    /// Element size at resize start.
    pub start_size: Size,
}

impl ResizeGesture {
    /// New size for a client-space pointer, floored at `min` on each axis.
    #[must_use]
    pub fn size_for(&self, client: Point, min: f64) -> Size {
        let delta = client.sub(self.start_pointer);
        Size::new(
            (self.start_size.width + delta.x).max(min),
            (self.start_size.height + delta.y).max(min),
        )
    }
}

/// Pointer gesture state. At most one gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// An element is following the pointer.
    Dragging(DragGesture),
    /// An image is being resized from its bottom-right handle.
    Resizing(ResizeGesture),
}

impl InputState {
    /// The element the active gesture targets, if any.
    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging(drag) => Some(drag.id),
            Self::Resizing(resize) => Some(resize.id),
        }
    }

    #[must_use]
    pub fn gesture_kind(&self) -> Option<GestureKind> {
        match self {
            Self::Idle => None,
            Self::Dragging(_) => Some(GestureKind::Drag),
            Self::Resizing(_) => Some(GestureKind::Resize),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
