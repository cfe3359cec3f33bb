#![allow(clippy::float_cmp)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

use super::*;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

// =============================================================
// decode_image
// =============================================================

#[test]
fn decode_reports_intrinsic_size() {
    let decoded = decode_image("wide.png", &png_bytes(800, 400)).unwrap();
    assert_eq!(decoded.width, 800);
    assert_eq!(decoded.height, 400);
    assert_eq!(decoded.file_name, "wide.png");
}

#[test]
fn decode_embeds_data_url() {
    let decoded = decode_image("a.png", &png_bytes(4, 4)).unwrap();
    assert!(decoded.data_url.starts_with("data:image/png;base64,"));
    assert!(decoded.data_url.len() > "data:image/png;base64,".len());
}

#[test]
fn decode_rejects_garbage() {
    let err = decode_image("notes.txt", b"definitely not an image").unwrap_err();
    assert!(matches!(err, IngestError::Decode(_)));
}

#[test]
fn decode_rejects_truncated_png() {
    let bytes = png_bytes(16, 16);
    let err = decode_image("cut.png", &bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err, IngestError::Decode(_)));
}

// =============================================================
// Placement
// =============================================================

#[test]
fn placed_size_keeps_aspect_ratio() {
    let decoded = decode_image("wide.png", &png_bytes(800, 400)).unwrap();
    let size = decoded.placed_size(300.0);
    assert_eq!(size.width, 300.0);
    assert_eq!(size.height, 150.0);
}

#[test]
fn canvas_image_uses_canvas_width_and_offset() {
    let decoded = decode_image("tall.png", &png_bytes(100, 200)).unwrap();
    let el = canvas_image(&decoded, &EditorConfig::default());
    let img = el.image().unwrap();
    assert_eq!((el.x, el.y), (20.0, 20.0));
    assert_eq!(img.width, Some(300.0));
    assert_eq!(img.height, Some(600.0));
    assert_eq!(img.opacity, 100);
    assert_eq!(el.content, "tall.png");
    assert_eq!(img.src, decoded.data_url);
}

#[test]
fn popout_image_uses_popout_width() {
    let decoded = decode_image("wide.png", &png_bytes(800, 400)).unwrap();
    let item = popout_image(&decoded, &EditorConfig::default());
    let img = item.image().unwrap();
    assert_eq!(img.width, Some(500.0));
    assert_eq!(img.height, Some(250.0));
    assert_eq!((item.x, item.y), (0.0, 0.0));
}

#[test]
fn each_ingestion_gets_a_fresh_id() {
    let decoded = decode_image("a.png", &png_bytes(2, 2)).unwrap();
    let config = EditorConfig::default();
    assert_ne!(
        canvas_image(&decoded, &config).id,
        canvas_image(&decoded, &config).id
    );
}

// =============================================================
// read_image_file
// =============================================================

#[tokio::test]
async fn read_image_file_decodes_from_disk() {
    let path = std::env::temp_dir().join(format!("freeform-{}.png", Uuid::new_v4()));
    tokio::fs::write(&path, png_bytes(30, 10)).await.unwrap();
    let decoded = read_image_file(&path).await;
    tokio::fs::remove_file(&path).await.unwrap();
    let decoded = decoded.unwrap();
    assert_eq!((decoded.width, decoded.height), (30, 10));
    assert!(decoded.file_name.starts_with("freeform-"));
}

#[tokio::test]
async fn read_image_file_missing_path_is_io_error() {
    let path = std::env::temp_dir().join(format!("freeform-missing-{}.png", Uuid::new_v4()));
    let err = read_image_file(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
}
