//! Integration tests for the placement store

use fill_core::{AnswerSet, FillError, PlacementStore};
use image::{DynamicImage, Rgba, RgbaImage};
use lopdf::{dictionary, Document, Object};
use vision::parse_candidates;

fn white_page(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([255, 255, 255, 255]),
    ))
}

fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Minimal one-page US-letter PDF for commit tests
fn create_test_pdf() -> Vec<u8> {
    let mut doc = Document::new();

    let pages_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Count" => 1,
        "Kids" => vec![],
    }));
    let contents_id = doc.add_object(Object::Stream(lopdf::Stream::new(
        dictionary! {},
        vec![],
    )));
    let page_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! {},
        "Contents" => contents_id,
    }));
    let mut pages_dict = doc.get_object(pages_id).unwrap().as_dict().unwrap().clone();
    pages_dict.set("Kids", Object::Array(vec![page_id.into()]));
    doc.objects.insert(pages_id, pages_dict.into());
    let catalog_id = doc.add_object(Object::Dictionary(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    }));
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn test_populate_resolves_text_through_matcher() {
    let candidates = parse_candidates(
        r#"[
            {"field_name": "Email", "suggested_data": "guess", "x": 10, "y": 20},
            {"field_name": "Signature", "suggested_data": "X", "x": 10, "y": 60}
        ]"#,
    )
    .unwrap();
    let answers = answers(&[("Email Address", "a@b.com")]);

    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), "form.pdf", candidates, &answers);

    assert_eq!(store.len(), 2);
    assert_eq!(store.placements()[0].text, "a@b.com");
    // No rule fires for "Signature": the model's suggestion passes through
    assert_eq!(store.placements()[1].text, "X");
}

#[test]
fn test_add_adjust_render_round_trip() {
    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), "form.pdf", vec![], &AnswerSet::new());

    store.add("Name", "Jane", 10, 10);
    assert_eq!(store.placements()[0].confidence, 1.0);

    store.adjust(0, Some(50), None, None, None);
    assert_eq!(store.placements()[0].x, 50);
    assert_eq!(store.placements()[0].y, 10);

    let rendered = store.render(true);
    // Manual placements are high tier: green outline at the new anchor
    assert_eq!(*rendered.get_pixel(50, 10), Rgba([0, 255, 0, 255]));
    // Nothing remains at the original anchor
    assert_eq!(*rendered.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_remove_then_render_returns_base_unchanged() {
    let page = white_page(400, 300);
    let base = page.to_rgba8();

    let mut store = PlacementStore::new();
    store.populate(page, "form.pdf", vec![], &AnswerSet::new());
    store.add("Name", "Jane", 10, 10);

    let removed = store.remove(0).unwrap();
    assert_eq!(removed.field_name, "Name");

    let rendered = store.render(true);
    assert_eq!(rendered.as_raw(), base.as_raw());
}

#[test]
fn test_render_is_idempotent() {
    let candidates = parse_candidates(
        r#"[{"field_name": "Name", "suggested_data": "Jane", "x": 30, "y": 40,
             "confidence": 0.6}]"#,
    )
    .unwrap();

    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), "form.pdf", candidates, &AnswerSet::new());

    let first = store.render(true);
    let second = store.render(true);
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn test_out_of_range_edits_are_noops() {
    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), "form.pdf", vec![], &AnswerSet::new());
    store.add("Name", "Jane", 10, 10);

    let before = store.placements().to_vec();
    store.adjust(1, Some(99), Some(99), None, None);
    store.adjust(usize::MAX, Some(99), None, None, None);
    assert_eq!(store.placements(), before.as_slice());

    assert!(store.remove(1).is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_render_unbound_store_is_blank_canvas() {
    let store = PlacementStore::new();
    let rendered = store.render(true);
    assert_eq!(rendered.dimensions(), (800, 600));
    assert_eq!(*rendered.get_pixel(400, 300), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_overlapping_boxes_draw_in_order() {
    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), "form.pdf", vec![], &AnswerSet::new());
    store.add_sized("a", "", 10, 10, 50, 20);
    store.add_sized("b", "", 10, 10, 50, 20);

    // The second box's outline overwrites the first box's fill
    let rendered = store.render(false);
    assert_eq!(*rendered.get_pixel(10, 10), Rgba([0, 255, 0, 255]));
}

#[test]
fn test_commit_without_document_fails() {
    let store = PlacementStore::new();
    let result = store.commit("out.pdf");
    assert!(matches!(result, Err(FillError::NoDocument)));
}

#[test]
fn test_commit_without_placements_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("form.pdf");
    std::fs::write(&source, create_test_pdf()).unwrap();

    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), &source, vec![], &AnswerSet::new());

    let result = store.commit(dir.path().join("out.pdf"));
    assert!(matches!(result, Err(FillError::NoPlacements)));
}

#[test]
fn test_commit_writes_text_with_baseline_adjustment() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("form.pdf");
    std::fs::write(&source, create_test_pdf()).unwrap();

    let mut store = PlacementStore::new();
    store.populate(white_page(400, 300), &source, vec![], &AnswerSet::new());
    store.add("Name", "Jane", 100, 100);

    let output = dir.path().join("out.pdf");
    let written = store.commit(&output).unwrap();
    assert_eq!(written, output);

    let reloaded = Document::load(&output).unwrap();
    let page_id = *reloaded.get_pages().get(&1).unwrap();
    let content = String::from_utf8_lossy(&reloaded.get_page_content(page_id).unwrap()).into_owned();
    assert!(content.contains("(Jane) Tj"));
    // y 100 plus the 12pt baseline adjustment on a 792pt page
    assert!(content.contains("100 680 Td"));
}
