//! Document model: elements, popout items, and the ordered lists that hold them.
//!
//! This module defines the data that describes what is on the canvas
//! (`Element`, `ElementBody`), the linear popout sub-documents attached to
//! buttons (`PopoutElement`), a sparse-update type for incremental edits
//! (`PartialElement`), and the ordered list that owns items of either kind
//! (`ElementList`). It carries no interaction behavior; the engine and the
//! editors decide when an operation is legal and call in here to apply it.
//!
//! Each element kind maps to a [`KindBehavior`] through
//! [`ElementKind::behavior`]. That table is the single place deciding which
//! kinds are text-editable, which require content, and which can be resized.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::DEFAULT_OPACITY;
use crate::geometry::Point;

/// Unique identifier for an element or popout item.
pub type ElementId = Uuid;

/// Error returned by list operations that target a specific element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    #[error("element not found: {0}")]
    NotFound(ElementId),
}

// =============================================================
// Kinds and the behavior table
// =============================================================

/// The type tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Heading,
    Text,
    Button,
    Image,
}

/// Which editing surface an item lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The absolute-positioned canvas.
    Canvas,
    /// The linear popout list.
    Popout,
}

/// How an item's `content` may be edited inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    /// Not text-editable on this surface.
    None,
    /// Enter commits; Shift+Enter is suppressed.
    SingleLine,
    /// Enter commits; Shift+Enter inserts a line break.
    MultiLine,
}

/// Per-kind editing behavior on a given surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindBehavior {
    pub text: TextRule,
    /// A blank buffer is never committed for this kind.
    pub content_required: bool,
    /// Whether the drag-to-resize handle applies.
    pub resizable: bool,
}

impl ElementKind {
    /// Dispatch table for per-kind behavior.
    #[must_use]
    pub const fn behavior(self, surface: Surface) -> KindBehavior {
        match (self, surface) {
            (Self::Heading | Self::Button, _) => KindBehavior {
                text: TextRule::SingleLine,
                content_required: true,
                resizable: false,
            },
            (Self::Text, _) => KindBehavior {
                text: TextRule::MultiLine,
                content_required: true,
                resizable: false,
            },
            (Self::Image, Surface::Canvas) => KindBehavior {
                text: TextRule::None,
                content_required: false,
                resizable: true,
            },
            // Popout images edit their alt text only; their pixels stay fixed.
            (Self::Image, Surface::Popout) => KindBehavior {
                text: TextRule::SingleLine,
                content_required: false,
                resizable: false,
            },
        }
    }

    /// Content given to a freshly added element of this kind.
    #[must_use]
    pub fn default_content(self) -> &'static str {
        match self {
            Self::Heading => "New Heading",
            Self::Text => "New text",
            Self::Button => "New Button",
            Self::Image => "image",
        }
    }
}

// =============================================================
// Variant payloads
// =============================================================

/// What a button does when clicked in the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonAction {
    #[default]
    None,
    OpenTeamModal,
    OpenPopout,
}

/// Size of the popout dialog a button opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopoutSize {
    Small,
    #[default]
    Medium,
    Large,
}

fn default_opacity() -> u8 {
    DEFAULT_OPACITY
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Image-only fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Embedded `data:` URL holding the image bytes.
    #[serde(default)]
    pub src: String,
    /// Explicit width; `None` means intrinsic sizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Explicit height; `None` means intrinsic sizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Opacity percentage, 0–100.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_background: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_centered: bool,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            src: String::new(),
            width: None,
            height: None,
            opacity: DEFAULT_OPACITY,
            is_background: false,
            is_centered: false,
        }
    }
}

impl ImageProps {
    fn apply(&mut self, partial: &PartialElement) {
        if let Some(ref src) = partial.src {
            self.src.clone_from(src);
        }
        if let Some(w) = partial.width {
            self.width = Some(w);
        }
        if let Some(h) = partial.height {
            self.height = Some(h);
        }
        if let Some(o) = partial.opacity {
            self.opacity = o.min(100);
        }
        if let Some(b) = partial.is_background {
            self.is_background = b;
        }
        if let Some(c) = partial.is_centered {
            self.is_centered = c;
        }
    }
}

/// Button-only fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonProps {
    #[serde(default)]
    pub action: ButtonAction,
    #[serde(default)]
    pub popout_size: PopoutSize,
    /// Authored popout list. Kept even while `action` is not `OpenPopout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popout_content: Option<Vec<PopoutElement>>,
}

impl ButtonProps {
    fn apply(&mut self, partial: &PartialElement) {
        if let Some(action) = partial.action {
            self.action = action;
        }
        if let Some(size) = partial.popout_size {
            self.popout_size = size;
        }
        if let Some(ref content) = partial.popout_content {
            self.popout_content = Some(content.clone());
        }
    }

    /// The popout list, only when the button actually opens it.
    #[must_use]
    pub fn active_popout(&self) -> Option<&[PopoutElement]> {
        match self.action {
            ButtonAction::OpenPopout => self.popout_content.as_deref(),
            ButtonAction::None | ButtonAction::OpenTeamModal => None,
        }
    }
}

/// Type-specific part of a canvas element, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementBody {
    Heading,
    Text,
    Button(ButtonProps),
    Image(ImageProps),
}

impl ElementBody {
    /// Default payload for a kind.
    #[must_use]
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Heading => Self::Heading,
            ElementKind::Text => Self::Text,
            ElementKind::Button => Self::Button(ButtonProps::default()),
            ElementKind::Image => Self::Image(ImageProps::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Heading => ElementKind::Heading,
            Self::Text => ElementKind::Text,
            Self::Button(_) => ElementKind::Button,
            Self::Image(_) => ElementKind::Image,
        }
    }
}

/// Type-specific part of a popout item. Buttons never appear in a popout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PopoutBody {
    Heading,
    Text,
    Image(ImageProps),
}

// =============================================================
// Elements
// =============================================================

/// A canvas element as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    /// Display text, or file name / alt text for images.
    #[serde(default)]
    pub content: String,
    /// Left edge in canvas-local pixels.
    #[serde(default)]
    pub x: f64,
    /// Top edge in canvas-local pixels.
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(flatten)]
    pub body: ElementBody,
}

impl Element {
    /// Build an element of `kind` at `at` with a fresh id.
    #[must_use]
    pub fn new(kind: ElementKind, content: impl Into<String>, at: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            x: at.x,
            y: at.y,
            is_locked: false,
            body: ElementBody::for_kind(kind),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageProps> {
        match self.body {
            ElementBody::Image(ref img) => Some(img),
            _ => None,
        }
    }

    #[must_use]
    pub fn button(&self) -> Option<&ButtonProps> {
        match self.body {
            ElementBody::Button(ref btn) => Some(btn),
            _ => None,
        }
    }

    /// Centered images ignore their stored `x`/`y` while rendered.
    #[must_use]
    pub fn is_centered(&self) -> bool {
        self.image().is_some_and(|img| img.is_centered)
    }

    #[must_use]
    pub fn is_background(&self) -> bool {
        self.image().is_some_and(|img| img.is_background)
    }

    /// Whether a drag-to-move gesture may start on this element.
    #[must_use]
    pub fn is_draggable(&self) -> bool {
        !self.is_locked && !self.is_centered() && !self.is_background()
    }
}

/// An item in a popout list. `x`/`y` are inert placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopoutElement {
    pub id: ElementId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(flatten)]
    pub body: PopoutBody,
}

impl PopoutElement {
    /// Build a popout heading or text item. Any other kind yields `None`.
    #[must_use]
    pub fn text_item(kind: ElementKind, content: impl Into<String>) -> Option<Self> {
        let body = match kind {
            ElementKind::Heading => PopoutBody::Heading,
            ElementKind::Text => PopoutBody::Text,
            ElementKind::Button | ElementKind::Image => return None,
        };
        Some(Self {
            id: Uuid::new_v4(),
            content: content.into(),
            x: 0.0,
            y: 0.0,
            is_locked: false,
            body,
        })
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageProps> {
        match self.body {
            PopoutBody::Image(ref img) => Some(img),
            PopoutBody::Heading | PopoutBody::Text => None,
        }
    }
}

// =============================================================
// Sparse updates
// =============================================================

/// Sparse update for an element. Only present fields are applied, and only
/// those that exist on the target's variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_centered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ButtonAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popout_size: Option<PopoutSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popout_content: Option<Vec<PopoutElement>>,
}

impl PartialElement {
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn position(pt: Point) -> Self {
        Self {
            x: Some(pt.x),
            y: Some(pt.y),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}

// =============================================================
// List items
// =============================================================

/// Common surface of items that live in an [`ElementList`].
pub trait ListItem: Clone {
    fn id(&self) -> ElementId;
    fn set_id(&mut self, id: ElementId);
    fn kind(&self) -> ElementKind;
    fn content(&self) -> &str;
    fn is_locked(&self) -> bool;
    /// Merge a sparse update into this item.
    fn apply(&mut self, partial: &PartialElement);
}

impl ListItem for Element {
    fn id(&self) -> ElementId {
        self.id
    }

    fn set_id(&mut self, id: ElementId) {
        self.id = id;
    }

    fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn is_locked(&self) -> bool {
        self.is_locked
    }

    fn apply(&mut self, partial: &PartialElement) {
        if let Some(ref content) = partial.content {
            self.content.clone_from(content);
        }
        if let Some(x) = partial.x {
            self.x = x;
        }
        if let Some(y) = partial.y {
            self.y = y;
        }
        if let Some(locked) = partial.is_locked {
            self.is_locked = locked;
        }
        match self.body {
            ElementBody::Image(ref mut img) => img.apply(partial),
            ElementBody::Button(ref mut btn) => btn.apply(partial),
            ElementBody::Heading | ElementBody::Text => {}
        }
    }
}

impl ListItem for PopoutElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn set_id(&mut self, id: ElementId) {
        self.id = id;
    }

    fn kind(&self) -> ElementKind {
        match self.body {
            PopoutBody::Heading => ElementKind::Heading,
            PopoutBody::Text => ElementKind::Text,
            PopoutBody::Image(_) => ElementKind::Image,
        }
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn is_locked(&self) -> bool {
        self.is_locked
    }

    fn apply(&mut self, partial: &PartialElement) {
        if let Some(ref content) = partial.content {
            self.content.clone_from(content);
        }
        if let Some(locked) = partial.is_locked {
            self.is_locked = locked;
        }
        if let PopoutBody::Image(ref mut img) = self.body {
            img.apply(partial);
        }
    }
}

// =============================================================
// ElementList
// =============================================================

/// Ordered list of items. Order is paint order on the canvas and reading
/// order in a popout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementList<T> {
    items: Vec<T>,
}

/// A canvas document.
pub type Document = ElementList<Element>;

/// A popout sub-document.
pub type PopoutList = ElementList<PopoutElement>;

impl<T> Default for ElementList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ListItem> ElementList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from items, re-keying any duplicate ids.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        let mut list = Self::new();
        for item in items {
            list.add(item);
        }
        list
    }

    /// Append an item. If its id is already taken, a fresh one is assigned.
    /// Returns the id the item ends up with.
    pub fn add(&mut self, mut item: T) -> ElementId {
        if self.contains(&item.id()) {
            let fresh = self.fresh_id();
            tracing::debug!(old = %item.id(), new = %fresh, "re-keyed colliding element id");
            item.set_id(fresh);
        }
        let id = item.id();
        self.items.push(item);
        id
    }

    /// Merge `partial` into the item with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has that id.
    pub fn update(&mut self, id: &ElementId, partial: &PartialElement) -> Result<(), DocError> {
        let item = self.get_mut(id).ok_or(DocError::NotFound(*id))?;
        item.apply(partial);
        Ok(())
    }

    /// Remove the item with `id`, returning it if it was present.
    pub fn delete(&mut self, id: &ElementId) -> Option<T> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }

    /// Flip the lock flag. Returns the new lock state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has that id.
    pub fn toggle_lock(&mut self, id: &ElementId) -> Result<bool, DocError> {
        let item = self.get_mut(id).ok_or(DocError::NotFound(*id))?;
        let locked = !item.is_locked();
        item.apply(&PartialElement {
            is_locked: Some(locked),
            ..Default::default()
        });
        Ok(locked)
    }

    /// Remove the item with `id` and reinsert it at `index` (clamped to the
    /// list end). Returns false if the id is absent.
    pub fn move_to(&mut self, id: &ElementId, index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let item = self.items.remove(from);
        let to = index.min(self.items.len());
        self.items.insert(to, item);
        true
    }

    /// Generate an id not used by any item in this list.
    #[must_use]
    pub fn fresh_id(&self) -> ElementId {
        loop {
            let id = Uuid::new_v4();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == *id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == *id)
    }

    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ElementId> {
        self.items.iter().map(ListItem::id).collect()
    }

    /// Number of items in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a ElementList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
