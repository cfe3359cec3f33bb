#![allow(clippy::float_cmp)]

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::rc::Rc;

use image::{DynamicImage, ImageFormat, RgbImage};
use uuid::Uuid;

use super::*;
use crate::doc::PopoutElement;
use crate::input::{InteractionMode, Key, Modifiers};

// =============================================================
// Helpers
// =============================================================

type Saves = Rc<RefCell<Vec<(Document, Variant)>>>;

struct Harness {
    session: EditorSession,
    saves: Saves,
    closes: Rc<Cell<usize>>,
}

fn doc_of(contents: &[&str]) -> Document {
    let mut doc = Document::new();
    for (i, content) in contents.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let at = Point::new(40.0 * i as f64, 10.0);
        doc.add(Element::new(ElementKind::Heading, *content, at));
    }
    doc
}

fn harness(officer: Document, public: Document) -> Harness {
    let saves: Saves = Rc::new(RefCell::new(Vec::new()));
    let closes = Rc::new(Cell::new(0));
    let save_sink = Rc::clone(&saves);
    let close_sink = Rc::clone(&closes);
    let session = EditorSession::new(
        officer,
        public,
        EditorConfig::default(),
        move |doc, variant| save_sink.borrow_mut().push((doc, variant)),
        move || close_sink.set(close_sink.get() + 1),
    );
    Harness {
        session,
        saves,
        closes,
    }
}

fn opened() -> Harness {
    let mut h = harness(doc_of(&["Officer A", "Officer B"]), doc_of(&["Public A"]));
    h.session.open();
    h
}

fn contents(doc: &Document) -> Vec<String> {
    doc.iter().map(|el| el.content.clone()).collect()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

// =============================================================
// Working copy
// =============================================================

#[test]
fn open_loads_officer_copy() {
    let h = opened();
    assert!(h.session.is_open());
    assert_eq!(h.session.variant(), Variant::Officer);
    assert_eq!(
        contents(h.session.document()),
        vec!["Officer A", "Officer B"]
    );
}

#[test]
fn discarded_edits_leave_source_byte_identical() {
    let mut h = opened();
    let before = serde_json::to_vec(h.session.source(Variant::Officer)).unwrap();
    let first = h.session.document().ids()[0];
    h.session.update(&first, PartialElement::content("changed"));
    h.session.toggle_lock(&first);
    h.session.add_element(ElementKind::Text, "extra");
    h.session.cancel();
    let after = serde_json::to_vec(h.session.source(Variant::Officer)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn switching_variant_loads_other_copy_and_drops_edits() {
    let mut h = opened();
    h.session.add_element(ElementKind::Text, "unsaved");
    h.session.set_variant(Variant::Public);
    assert_eq!(contents(h.session.document()), vec!["Public A"]);
    h.session.set_variant(Variant::Officer);
    assert_eq!(
        contents(h.session.document()),
        vec!["Officer A", "Officer B"]
    );
}

#[test]
fn same_variant_is_a_no_op() {
    let mut h = opened();
    h.session.add_element(ElementKind::Text, "kept");
    assert!(h.session.set_variant(Variant::Officer).is_empty());
    assert_eq!(h.session.document().len(), 3);
}

#[test]
fn variant_switch_while_closed_loads_nothing() {
    let mut h = harness(doc_of(&["O"]), doc_of(&["P"]));
    h.session.set_variant(Variant::Public);
    assert!(h.session.document().is_empty());
    h.session.open();
    assert_eq!(contents(h.session.document()), vec!["P"]);
}

#[test]
fn open_resets_move_mode() {
    let mut h = opened();
    h.session.engine_mut().set_mode(InteractionMode::Move);
    h.session.open();
    assert_eq!(h.session.engine().ui.mode, InteractionMode::Direct);
}

#[test]
fn replace_sources_applies_on_next_open() {
    let mut h = opened();
    h.session.replace_sources(doc_of(&["New officer"]), doc_of(&[]));
    assert_eq!(h.session.document().len(), 2);
    h.session.open();
    assert_eq!(contents(h.session.document()), vec!["New officer"]);
}

// =============================================================
// Save / close
// =============================================================

#[test]
fn save_emits_working_copy_with_variant() {
    let mut h = opened();
    h.session.set_variant(Variant::Public);
    h.session.add_element(ElementKind::Button, "Join");
    h.session.save();
    let saves = h.saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].1, Variant::Public);
    assert_eq!(contents(&saves[0].0), vec!["Public A", "Join"]);
    assert!(h.session.is_open());
}

#[test]
fn save_never_touches_sources() {
    let mut h = opened();
    h.session.add_element(ElementKind::Text, "saved");
    h.session.save();
    assert_eq!(h.session.source(Variant::Officer).len(), 2);
}

#[test]
fn save_commits_open_edit() {
    let mut h = opened();
    let first = h.session.document().ids()[0];
    h.session.engine_mut().begin_edit(&first);
    h.session.engine_mut().set_edit_buffer("Edited");
    h.session.save();
    assert_eq!(h.saves.borrow()[0].0.items()[0].content, "Edited");
}

#[test]
fn close_discards_and_notifies() {
    let mut h = opened();
    h.session.close();
    assert!(!h.session.is_open());
    assert!(h.session.document().is_empty());
    assert_eq!(h.closes.get(), 1);
    assert!(h.saves.borrow().is_empty());
}

#[test]
fn close_mid_edit_tells_host_to_drop_widget() {
    let mut h = opened();
    let first = h.session.document().ids()[0];
    h.session.engine_mut().begin_edit(&first);
    let actions = h.session.close();
    assert!(actions.iter().any(|a| matches!(a, Action::EditEnded(_))));
    assert!(h.session.engine().editing_id().is_none());
}

#[test]
fn escape_then_save_keeps_original_text() {
    let mut h = opened();
    let first = h.session.document().ids()[0];
    h.session.engine_mut().begin_edit(&first);
    h.session.engine_mut().set_edit_buffer("scrap");
    h.session.engine_mut().on_key(&Key::new("Escape"), Modifiers::default());
    h.session.save();
    assert_eq!(h.saves.borrow()[0].0.items()[0].content, "Officer A");
}

// =============================================================
// Element routing
// =============================================================

#[test]
fn added_element_lands_at_placement_offset() {
    let mut h = opened();
    let id = h.session.add_element(ElementKind::Text, "Body").unwrap();
    let el = h.session.engine().element(&id).unwrap();
    assert_eq!((el.x, el.y), (20.0, 20.0));
}

#[test]
fn blank_add_is_refused() {
    let mut h = opened();
    let added = h.session.add_element(ElementKind::Heading, "  \n");
    assert!(added.is_none());
    assert_eq!(h.session.document().len(), 2);
}

#[test]
fn images_only_come_through_ingestion() {
    let mut h = opened();
    assert!(h.session.add_element(ElementKind::Image, "x.png").is_none());
}

#[test]
fn add_default_uses_placeholder_content() {
    let mut h = opened();
    let id = h.session.add_default(ElementKind::Button).unwrap();
    assert_eq!(
        h.session.engine().element(&id).unwrap().content,
        "New Button"
    );
}

#[test]
fn delete_ignores_lock() {
    let mut h = opened();
    let first = h.session.document().ids()[0];
    h.session.toggle_lock(&first);
    h.session.delete(&first);
    assert_eq!(contents(h.session.document()), vec!["Officer B"]);
}

#[test]
fn missing_ids_are_silent() {
    let mut h = opened();
    let ghost = Uuid::new_v4();
    let actions = h.session.update(&ghost, PartialElement::content("x"));
    assert!(actions.is_empty());
    assert!(h.session.delete(&ghost).is_empty());
    assert!(h.session.toggle_lock(&ghost).is_empty());
    assert!(h.session.popout_content(&ghost).is_empty());
}

#[test]
fn image_options_route_to_image() {
    let mut h = opened();
    let id = h.session.append_image(&ingest::decode_image("a.png", &png_bytes(8, 4)).unwrap());
    h.session.set_image_opacity(&id, 250);
    h.session.set_image_background(&id, true);
    h.session.set_image_centered(&id, true);
    let img = h.session.engine().element(&id).unwrap().image().unwrap();
    assert_eq!(img.opacity, 100);
    assert!(img.is_background);
    assert!(img.is_centered);
}

#[test]
fn image_options_ignored_on_text() {
    let mut h = opened();
    let first = h.session.document().ids()[0];
    h.session.set_image_centered(&first, true);
    let el = h.session.engine().element(&first).unwrap();
    assert!(el.image().is_none());
    assert!(!el.is_centered());
}

// =============================================================
// Button popouts
// =============================================================

#[test]
fn popout_content_survives_action_round_trip() {
    let mut h = opened();
    let btn = h.session.add_element(ElementKind::Button, "More").unwrap();
    h.session.set_button_action(&btn, ButtonAction::OpenPopout);
    let items = vec![PopoutElement::text_item(ElementKind::Text, "inside").unwrap()];
    h.session.set_popout_content(&btn, items.clone());

    h.session.set_button_action(&btn, ButtonAction::None);
    let button = h.session.engine().element(&btn).unwrap().button().unwrap();
    assert!(button.active_popout().is_none());

    h.session.set_button_action(&btn, ButtonAction::OpenPopout);
    let button = h.session.engine().element(&btn).unwrap().button().unwrap();
    assert_eq!(button.active_popout(), Some(items.as_slice()));
    assert_eq!(h.session.popout_content(&btn), items);
}

#[test]
fn popout_size_is_stored() {
    let mut h = opened();
    let btn = h.session.add_element(ElementKind::Button, "More").unwrap();
    h.session.set_popout_size(&btn, PopoutSize::Large);
    let button = h.session.engine().element(&btn).unwrap().button().unwrap();
    assert_eq!(button.popout_size, PopoutSize::Large);
}

#[test]
fn popout_editor_save_flows_back_to_button() {
    let mut h = opened();
    let btn = h.session.add_element(ElementKind::Button, "More").unwrap();
    h.session.set_button_action(&btn, ButtonAction::OpenPopout);

    let received: Rc<RefCell<Option<Vec<PopoutElement>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&received);
    let mut editor = crate::popout::PopoutEditor::new(
        btn,
        h.session.popout_content(&btn),
        *h.session.config(),
        move |items| *sink.borrow_mut() = Some(items),
    );
    editor.add_text_item(ElementKind::Heading, "Details").unwrap();
    editor.save();

    let items = received.borrow_mut().take().unwrap();
    h.session.set_popout_content(&btn, items);
    assert_eq!(h.session.popout_content(&btn)[0].content, "Details");
}

// =============================================================
// Ingestion
// =============================================================

#[test]
fn append_image_sizes_to_canvas_width() {
    let mut h = opened();
    let decoded = ingest::decode_image("wide.png", &png_bytes(800, 400)).unwrap();
    let id = h.session.append_image(&decoded);
    let img = h.session.engine().element(&id).unwrap().image().unwrap();
    assert_eq!((img.width, img.height), (Some(300.0), Some(150.0)));
    assert_eq!(h.session.document().len(), 3);
}

#[test]
fn failed_ingestion_leaves_document_alone() {
    let mut h = opened();
    let result = ingest::decode_image("broken.png", b"not an image");
    assert!(h.session.ingest_result(result).is_none());
    assert_eq!(h.session.document().len(), 2);
}

#[test]
fn late_ingestion_appends_to_current_copy() {
    let mut h = opened();
    let pending = ingest::decode_image("late.png", &png_bytes(4, 4));
    h.session.set_variant(Variant::Public);
    h.session.add_element(ElementKind::Text, "meanwhile");
    let id = h.session.ingest_result(pending).unwrap();
    assert_eq!(h.session.document().ids().last(), Some(&id));
    assert_eq!(h.session.document().len(), 3);
}

#[tokio::test]
async fn ingest_file_appends_image() {
    let path = std::env::temp_dir().join(format!("freeform-session-{}.png", Uuid::new_v4()));
    tokio::fs::write(&path, png_bytes(600, 300)).await.unwrap();
    let mut h = opened();
    let result = h.session.ingest_file(&path).await;
    tokio::fs::remove_file(&path).await.unwrap();
    let id = result.unwrap();
    let el = h.session.engine().element(&id).unwrap();
    assert!(el.content.starts_with("freeform-session-"));
}

#[tokio::test]
async fn ingest_file_missing_is_error_and_no_op() {
    let path = std::env::temp_dir().join(format!("freeform-none-{}.png", Uuid::new_v4()));
    let mut h = opened();
    assert!(h.session.ingest_file(&path).await.is_err());
    assert_eq!(h.session.document().len(), 2);
}
