//! Hit-testing: map a canvas-local point to the element and part under it.
//!
//! Elements are tested topmost first, in reverse paint order. For a resizable
//! image in Direct mode the resize handle wins over the body it overlaps.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{Document, ElementId};
use crate::geometry::{Point, Size};
use crate::input::InteractionMode;
use crate::render::{self, Layout};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Interaction context that changes what is hittable.
#[derive(Debug, Clone, Copy)]
pub struct HitOptions {
    pub mode: InteractionMode,
    /// Element currently being text-edited; it paints on top.
    pub editing: Option<ElementId>,
    pub handle_px: f64,
}

/// Test which element (if any) is under the canvas-local point `local`.
///
/// Elements are tested topmost first. For an element whose resize handle is
/// visible, the handle is checked before its body. Elements with no known
/// size are never hit.
#[must_use]
pub fn hit_test(
    local: Point,
    doc: &Document,
    layout: &Layout,
    canvas: Size,
    opts: HitOptions,
) -> Option<Hit> {
    for painted in render::paint_order(doc, opts.editing).iter().rev() {
        let el = painted.element;
        let Some(bounds) = render::element_box(el, layout, canvas) else {
            continue;
        };
        if render::controls_for(el, opts.mode).resize_handle
            && render::resize_handle_rect(bounds, opts.handle_px).contains(local)
        {
            return Some(Hit {
                element_id: el.id,
                part: HitPart::ResizeHandle,
            });
        }
        if bounds.contains(local) {
            return Some(Hit {
                element_id: el.id,
                part: HitPart::Body,
            });
        }
    }
    None
}
