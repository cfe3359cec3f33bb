//! Shared numeric constants for the editor engine.

// ── Canvas geometry ─────────────────────────────────────────────

/// Grid cell size used when snapping a dropped element.
pub const GRID_SIZE: f64 = 20.0;

/// Smallest width or height a resize gesture may produce.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Side length of the square resize handle at an image's bottom-right corner.
pub const RESIZE_HANDLE_PX: f64 = 12.0;

// ── Image ingestion ─────────────────────────────────────────────

/// Placed width of an image ingested onto the canvas.
pub const CANVAS_IMAGE_WIDTH: f64 = 300.0;

/// Placed width of an image ingested into a popout list.
pub const POPOUT_IMAGE_WIDTH: f64 = 500.0;

/// Offset from the canvas origin for newly placed elements.
pub const PLACEMENT_OFFSET: f64 = 20.0;

/// Opacity of an image that never had one set.
pub const DEFAULT_OPACITY: u8 = 100;

// ── Text editing ────────────────────────────────────────────────

/// Height of one rendered line in the edit buffer.
pub const LINE_HEIGHT_PX: f64 = 24.0;

/// Vertical padding added around the edit buffer's content.
pub const TEXT_PADDING_PX: f64 = 8.0;
