//! Image ingestion: a selected file becomes a sized, self-contained image element.
//!
//! DESIGN
//! ======
//! Bytes are embedded as a `data:` URL so the element never references an
//! external resource. Decoding happens only to learn the intrinsic pixel size;
//! the placed width is fixed per surface and the height follows the intrinsic
//! aspect ratio. A file that fails to decode produces an error and nothing
//! else. Callers append the element to whatever the working copy looks like
//! when the decode finishes.

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::GenericImageView;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::doc::{Element, ElementBody, ImageProps, PopoutBody, PopoutElement};
use crate::geometry::Size;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    EmptyImage,
    #[error("image decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A decoded upload, ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub file_name: String,
    pub data_url: String,
    /// Intrinsic width in pixels, never zero.
    pub width: u32,
    /// Intrinsic height in pixels, never zero.
    pub height: u32,
}

impl DecodedImage {
    /// Size at `target_width`, keeping the intrinsic aspect ratio.
    #[must_use]
    pub fn placed_size(&self, target_width: f64) -> Size {
        let ratio = f64::from(self.height) / f64::from(self.width);
        Size::new(target_width, target_width * ratio)
    }
}

/// Decode `bytes` to learn their pixel size and embed them as a data URL.
///
/// # Errors
///
/// Returns `Decode` for bytes that are not a supported image and
/// `EmptyImage` for an image with a zero dimension.
pub fn decode_image(file_name: &str, bytes: &[u8]) -> Result<DecodedImage, IngestError> {
    let format = image::guess_format(bytes)?;
    let (width, height) = image::load_from_memory_with_format(bytes, format)?.dimensions();
    if width == 0 || height == 0 {
        return Err(IngestError::EmptyImage);
    }
    let mime = format.to_mime_type();
    let data_url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
    tracing::debug!(file_name, width, height, "decoded image");
    Ok(DecodedImage {
        file_name: file_name.to_string(),
        data_url,
        width,
        height,
    })
}

/// Read and decode an image file off the calling task.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise whatever
/// [`decode_image`] reports.
pub async fn read_image_file(path: &Path) -> Result<DecodedImage, IngestError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| {
            name.to_string_lossy().into_owned()
        });
    tokio::task::spawn_blocking(move || decode_image(&file_name, &bytes)).await?
}

fn image_props(decoded: &DecodedImage, target_width: f64) -> ImageProps {
    let size = decoded.placed_size(target_width);
    ImageProps {
        src: decoded.data_url.clone(),
        width: Some(size.width),
        height: Some(size.height),
        ..ImageProps::default()
    }
}

/// Canvas image element placed at the configured offset.
#[must_use]
pub fn canvas_image(decoded: &DecodedImage, config: &EditorConfig) -> Element {
    Element {
        id: Uuid::new_v4(),
        content: decoded.file_name.clone(),
        x: config.placement_offset,
        y: config.placement_offset,
        is_locked: false,
        body: ElementBody::Image(image_props(decoded, config.canvas_image_width)),
    }
}

/// Popout image item. Position is irrelevant in a popout list.
#[must_use]
pub fn popout_image(decoded: &DecodedImage, config: &EditorConfig) -> PopoutElement {
    PopoutElement {
        id: Uuid::new_v4(),
        content: decoded.file_name.clone(),
        x: 0.0,
        y: 0.0,
        is_locked: false,
        body: PopoutBody::Image(image_props(decoded, config.popout_image_width)),
    }
}
