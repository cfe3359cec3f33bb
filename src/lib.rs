//! Headless engine for a free-form canvas content editor.
//!
//! Users place, move, resize, lock, and edit typed content blocks on an
//! absolute-positioned canvas. The result is a serializable [`doc::Document`]
//! that some other surface renders read-only. This crate owns the whole
//! editing lifecycle: the element model, pointer gestures, inline text editing,
//! popout sub-documents, and image ingestion. The host layer is responsible
//! only for wiring raw input events to the engine and applying the resulting
//! [`engine::Action`]s to whatever it draws with.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Officer/public working copies, save and cancel |
//! | [`engine`] | Canvas interaction engine ([`engine::EngineCore`]) |
//! | [`doc`] | Element types, popout items, and list operations |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against rendered element boxes |
//! | [`render`] | Paint order, layers, and element placement |
//! | [`text_edit`] | Inline text editor state machine |
//! | [`popout`] | Linear popout list editor with drag-reorder |
//! | [`ingest`] | Image file decoding and image element construction |
//! | [`geometry`] | Points, sizes, rects, and grid snapping |
//! | [`config`] | Tunables with environment overrides |
//! | [`consts`] | Shared numeric constants (grid, minimum sizes, etc.) |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod ingest;
pub mod input;
pub mod popout;
pub mod render;
pub mod session;
pub mod text_edit;
