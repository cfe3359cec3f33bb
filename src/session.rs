//! Editor session: the officer/public variants and the working copy.
//!
//! DESIGN
//! ======
//! The session owns two source documents that it never mutates. Opening the
//! editor, or switching variant, deep-copies the active source into the
//! canvas engine; every edit lands on that copy. Save hands a copy of the
//! working document to the host callback together with the variant it
//! belongs to. Close discards the copy.
//!
//! Image ingestion may finish after the user has done other things. The
//! decoded result is appended to whatever the working copy is when it
//! arrives, through [`EditorSession::ingest_result`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::doc::{
    ButtonAction, Document, Element, ElementId, ElementKind, PartialElement, PopoutElement,
    PopoutSize,
};
use crate::engine::{Action, EngineCore};
use crate::geometry::Point;
use crate::ingest::{self, DecodedImage, IngestError};

/// Which of the two documents is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Officer,
    Public,
}

pub type SaveCallback = Box<dyn FnMut(Document, Variant)>;
pub type CloseCallback = Box<dyn FnMut()>;

pub struct EditorSession {
    officer: Document,
    public: Document,
    variant: Variant,
    open: bool,
    engine: EngineCore,
    on_save: SaveCallback,
    on_close: CloseCallback,
}

impl EditorSession {
    pub fn new(
        officer: Document,
        public: Document,
        config: EditorConfig,
        on_save: impl FnMut(Document, Variant) + 'static,
        on_close: impl FnMut() + 'static,
    ) -> Self {
        Self {
            officer,
            public,
            variant: Variant::default(),
            open: false,
            engine: EngineCore::with_config(config),
            on_save: Box::new(on_save),
            on_close: Box::new(on_close),
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The working copy.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.engine.doc
    }

    /// The untouched source for `variant`.
    #[must_use]
    pub fn source(&self, variant: Variant) -> &Document {
        match variant {
            Variant::Officer => &self.officer,
            Variant::Public => &self.public,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    /// Pointer, keyboard, and layout input goes straight to the engine.
    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.engine.config
    }

    // --- Lifecycle ---

    /// Show the editor on a fresh copy of the active variant.
    pub fn open(&mut self) -> Vec<Action> {
        self.open = true;
        self.reload()
    }

    /// Switch variant. Unsaved edits on the previous variant are dropped.
    pub fn set_variant(&mut self, variant: Variant) -> Vec<Action> {
        if self.variant == variant {
            return Vec::new();
        }
        self.variant = variant;
        if self.open { self.reload() } else { Vec::new() }
    }

    /// Swap in new external documents. The working copy is left alone until
    /// the next open or variant switch.
    pub fn replace_sources(&mut self, officer: Document, public: Document) {
        self.officer = officer;
        self.public = public;
    }

    fn reload(&mut self) -> Vec<Action> {
        let copy = self.source(self.variant).clone();
        tracing::info!(variant = ?self.variant, elements = copy.len(), "working copy loaded");
        self.engine.load_document(copy)
    }

    /// Commit any open edit and hand the working copy to the save callback.
    /// The session stays open.
    pub fn save(&mut self) -> Vec<Action> {
        let actions = self.engine.commit_edit();
        let doc = self.engine.doc.clone();
        tracing::info!(variant = ?self.variant, elements = doc.len(), "document saved");
        (self.on_save)(doc, self.variant);
        actions
    }

    /// Discard the working copy and notify the host.
    pub fn close(&mut self) -> Vec<Action> {
        let actions = self.engine.load_document(Document::new());
        self.open = false;
        tracing::debug!(variant = ?self.variant, "editor closed");
        (self.on_close)();
        actions
    }

    /// Same as [`Self::close`]; there is nothing to roll back outside the copy.
    pub fn cancel(&mut self) -> Vec<Action> {
        self.close()
    }

    // --- Elements ---

    /// Add a heading, text, or button at the placement offset.
    ///
    /// Blank content is refused, as are images (they come through ingestion).
    pub fn add_element(&mut self, kind: ElementKind, content: &str) -> Option<ElementId> {
        if content.trim().is_empty() || kind == ElementKind::Image {
            tracing::debug!(?kind, "element not added");
            return None;
        }
        let offset = self.engine.config.placement_offset;
        let el = Element::new(kind, content, Point::new(offset, offset));
        Some(self.engine.add_element(el))
    }

    /// Add an element with its kind's placeholder content.
    pub fn add_default(&mut self, kind: ElementKind) -> Option<ElementId> {
        self.add_element(kind, kind.default_content())
    }

    pub fn update(&mut self, id: &ElementId, fields: PartialElement) -> Vec<Action> {
        self.engine.update_element(id, fields)
    }

    pub fn delete(&mut self, id: &ElementId) -> Vec<Action> {
        self.engine.delete_element(id)
    }

    pub fn toggle_lock(&mut self, id: &ElementId) -> Vec<Action> {
        self.engine.toggle_lock(id)
    }

    // --- Image options ---

    /// Opacity percentage; values above 100 are clamped.
    pub fn set_image_opacity(&mut self, id: &ElementId, opacity: u8) -> Vec<Action> {
        let fields = PartialElement {
            opacity: Some(opacity),
            ..Default::default()
        };
        self.update(id, fields)
    }

    pub fn set_image_background(&mut self, id: &ElementId, background: bool) -> Vec<Action> {
        let fields = PartialElement {
            is_background: Some(background),
            ..Default::default()
        };
        self.update(id, fields)
    }

    pub fn set_image_centered(&mut self, id: &ElementId, centered: bool) -> Vec<Action> {
        let fields = PartialElement {
            is_centered: Some(centered),
            ..Default::default()
        };
        self.update(id, fields)
    }

    // --- Button options ---

    pub fn set_button_action(&mut self, id: &ElementId, action: ButtonAction) -> Vec<Action> {
        let fields = PartialElement {
            action: Some(action),
            ..Default::default()
        };
        self.update(id, fields)
    }

    pub fn set_popout_size(&mut self, id: &ElementId, size: PopoutSize) -> Vec<Action> {
        let fields = PartialElement {
            popout_size: Some(size),
            ..Default::default()
        };
        self.update(id, fields)
    }

    /// Authored popout list of a button, empty if none yet. This is the
    /// initial content for a [`crate::popout::PopoutEditor`].
    #[must_use]
    pub fn popout_content(&self, button: &ElementId) -> Vec<PopoutElement> {
        self.engine
            .element(button)
            .and_then(Element::button)
            .and_then(|btn| btn.popout_content.clone())
            .unwrap_or_default()
    }

    /// Store what a popout editor saved.
    pub fn set_popout_content(
        &mut self,
        button: &ElementId,
        content: Vec<PopoutElement>,
    ) -> Vec<Action> {
        let fields = PartialElement {
            popout_content: Some(content),
            ..Default::default()
        };
        self.update(button, fields)
    }

    // --- Ingestion ---

    /// Append an ingested image to the current working copy.
    pub fn append_image(&mut self, decoded: &DecodedImage) -> ElementId {
        let el = ingest::canvas_image(decoded, &self.engine.config);
        let id = self.engine.add_element(el);
        tracing::info!(%id, file_name = %decoded.file_name, "image ingested");
        id
    }

    /// Apply a finished ingestion. Failures leave the document untouched.
    pub fn ingest_result(
        &mut self,
        result: Result<DecodedImage, IngestError>,
    ) -> Option<ElementId> {
        match result {
            Ok(decoded) => Some(self.append_image(&decoded)),
            Err(err) => {
                tracing::warn!(%err, "image rejected");
                None
            }
        }
    }

    /// Read, decode, and append an image file.
    ///
    /// # Errors
    ///
    /// Returns the ingestion error; the document is unchanged in that case.
    pub async fn ingest_file(&mut self, path: &Path) -> Result<ElementId, IngestError> {
        match ingest::read_image_file(path).await {
            Ok(decoded) => Ok(self.append_image(&decoded)),
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "image rejected");
                Err(err)
            }
        }
    }
}
