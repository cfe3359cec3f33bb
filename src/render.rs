//! Rendering model: paint order, stacking layers, and element placement.
//!
//! The engine never draws pixels itself. This module turns the document plus
//! the current UI state into the ordered, placed list a host needs to draw,
//! and decides which per-element controls are visible. It receives read-only
//! views of state and mutates nothing.
//!
//! Stacking is three layers, bottom first: background images, everything else
//! in document order, then the element currently being text-edited.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use crate::doc::{Document, Element, ElementId, ElementKind, Surface};
use crate::geometry::{Point, Rect, Size};
use crate::input::InteractionMode;

/// Rendered box sizes reported by the host, keyed by element id.
pub type Layout = HashMap<ElementId, Size>;

/// Stacking layer of a painted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Content,
    Editing,
}

/// Where an element is anchored on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Top-left corner at the given canvas-local point.
    Absolute(Point),
    /// Center of the element at the center of the canvas.
    Centered,
}

/// One entry in the paint list.
#[derive(Debug, Clone, Copy)]
pub struct Painted<'a> {
    pub element: &'a Element,
    pub layer: Layer,
    pub placement: Placement,
}

/// Placement of an element. Centering overrides the stored `x`/`y`.
#[must_use]
pub fn placement(el: &Element) -> Placement {
    if el.is_centered() {
        Placement::Centered
    } else {
        Placement::Absolute(el.position())
    }
}

/// Layer an element paints on.
#[must_use]
pub fn layer(el: &Element, editing: Option<ElementId>) -> Layer {
    if editing == Some(el.id) {
        Layer::Editing
    } else if el.is_background() {
        Layer::Background
    } else {
        Layer::Content
    }
}

/// All elements, bottom first. Document order is kept within a layer.
#[must_use]
pub fn paint_order(doc: &Document, editing: Option<ElementId>) -> Vec<Painted<'_>> {
    let mut painted: Vec<Painted<'_>> = doc
        .iter()
        .map(|el| Painted {
            element: el,
            layer: layer(el, editing),
            placement: placement(el),
        })
        .collect();
    // Stable: equal layers keep document order.
    painted.sort_by_key(|p| p.layer);
    painted
}

/// Size an element occupies. Images with an explicit width and height use
/// those; everything else falls back to the host-reported rendered size.
#[must_use]
pub fn element_size(el: &Element, layout: &Layout) -> Option<Size> {
    if let Some(img) = el.image() {
        if let (Some(w), Some(h)) = (img.width, img.height) {
            return Some(Size::new(w, h));
        }
    }
    layout.get(&el.id).copied()
}

/// Canvas-local box of an element, or `None` if its size is unknown.
#[must_use]
pub fn element_box(el: &Element, layout: &Layout, canvas: Size) -> Option<Rect> {
    let size = element_size(el, layout)?;
    let origin = match placement(el) {
        Placement::Absolute(pt) => pt,
        Placement::Centered => Point::new(
            (canvas.width - size.width) * 0.5,
            (canvas.height - size.height) * 0.5,
        ),
    };
    Some(Rect::from_origin(origin, size))
}

/// Square resize handle centered on the box's bottom-right corner.
#[must_use]
pub fn resize_handle_rect(bounds: Rect, handle_px: f64) -> Rect {
    let corner = bounds.bottom_right();
    let half = handle_px * 0.5;
    Rect::new(corner.x - half, corner.y - half, handle_px, handle_px)
}

/// Which per-element affordances a host should show.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub lock: bool,
    pub delete: bool,
    pub image_options: bool,
    pub button_options: bool,
    pub resize_handle: bool,
}

/// Controls visible for `el` in `mode`. Move mode hides everything.
#[must_use]
pub fn controls_for(el: &Element, mode: InteractionMode) -> Controls {
    match mode {
        InteractionMode::Move => Controls::default(),
        InteractionMode::Direct => {
            let kind = el.kind();
            Controls {
                lock: true,
                delete: true,
                image_options: kind == ElementKind::Image,
                button_options: kind == ElementKind::Button,
                resize_handle: kind.behavior(Surface::Canvas).resizable && !el.is_locked,
            }
        }
    }
}
