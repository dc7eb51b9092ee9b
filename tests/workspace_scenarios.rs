use std::collections::{BTreeMap, BTreeSet, HashSet};

use imlabel::query::PageRequest;
use imlabel::{LabelerError, Workspace};

mod common;

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn fresh_directory_counts_everything_unlabeled() {
    let root = common::image_root(&["a.jpg", "b.jpg", "c.jpg"], &["cat", "dog"]);
    let mut workspace = Workspace::open(root.path()).expect("open");

    assert_eq!(workspace.counts().unlabeled, 3);

    workspace.assign("b.jpg", &labels(&["cat"])).expect("assign");
    assert_eq!(workspace.counts().labeled, 1);

    let listing = workspace.list_labeled(&BTreeSet::new(), PageRequest::default());
    assert_eq!(listing.label_counts.len(), 1);
    assert_eq!(listing.label_counts[0].label, "cat");
    assert_eq!(listing.label_counts[0].count, 1);

    let on_disk = common::read_annotation(root.path());
    assert_eq!(on_disk["labeling"]["b.jpg"], serde_json::json!(["cat"]));
}

#[test]
fn vanished_image_moves_to_missed_on_open() {
    let root = common::image_root(&["a.jpg"], &["dog"]);
    common::write_annotation(
        root.path(),
        r#"{"directory": "/elsewhere", "labeling": {"x.jpg": ["dog"]}, "missed": {}}"#,
    );

    let workspace = Workspace::open(root.path()).expect("open");
    assert!(workspace.store().labeling().is_empty());
    assert_eq!(
        workspace.store().missed(),
        &BTreeMap::from([("x.jpg".to_string(), labels(&["dog"]))])
    );

    let on_disk = common::read_annotation(root.path());
    assert_eq!(on_disk["labeling"], serde_json::json!({}));
    assert_eq!(on_disk["missed"]["x.jpg"], serde_json::json!(["dog"]));
    assert_eq!(
        on_disk["directory"],
        serde_json::json!(root.path().to_string_lossy())
    );
}

#[test]
fn empty_labeled_listing_is_one_empty_page() {
    let root = common::image_root(&["a.jpg"], &["cat"]);
    let workspace = Workspace::open(root.path()).expect("open");

    let listing = workspace.list_labeled(&BTreeSet::new(), PageRequest::new(None, Some(25)));
    assert_eq!(listing.page.max_page, 1);
    assert_eq!(listing.page.page, 1);
    assert!(listing.page.items.is_empty());
}

#[test]
fn filtered_pagination_counts_only_matches() {
    let images: Vec<String> = (0..12).map(|i| format!("img_{i:02}.png")).collect();
    let refs: Vec<&str> = images.iter().map(String::as_str).collect();
    let root = common::image_root(&refs, &["cat", "dog"]);
    let mut workspace = Workspace::open(root.path()).expect("open");

    for (i, image) in images.iter().enumerate() {
        let label = if i % 3 == 0 { "cat" } else { "dog" };
        workspace.assign(image, &labels(&[label])).expect("assign");
    }

    let selected = BTreeSet::from(["cat".to_string()]);
    let listing = workspace.list_labeled(&selected, PageRequest::new(Some(9), Some(3)));
    assert_eq!(listing.found, 4);
    assert_eq!(listing.page.max_page, 2);
    assert_eq!(listing.page.page, 2);
    assert_eq!(listing.page.items.len(), 1);
    assert_eq!(listing.page.items[0].path, "img_09.png");
}

#[test]
fn random_next_reaches_every_unlabeled_image() {
    let root = common::image_root(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"], &["cat"]);
    let mut workspace = Workspace::open(root.path()).expect("open");
    workspace.assign("c.jpg", &labels(&["cat"])).expect("assign");

    let mut seen = HashSet::new();
    for _ in 0..500 {
        let item = workspace.next().item.expect("unlabeled images remain");
        seen.insert(item);
    }
    let expected: HashSet<String> = ["a.jpg", "b.jpg", "d.jpg"].iter().map(|s| s.to_string()).collect();
    assert_eq!(seen, expected);
}

#[test]
fn clear_and_delete_are_noops_for_unknown_paths() {
    let root = common::image_root(&["a.jpg"], &["cat"]);
    let mut workspace = Workspace::open(root.path()).expect("open");

    let counts = workspace.clear("a.jpg").expect("clear");
    assert_eq!(counts.unlabeled, 1);

    let (counts, outcome) = workspace.delete("nope.jpg").expect("delete");
    assert_eq!(counts.total, 1);
    assert!(!outcome.file_deleted);
    assert!(!outcome.was_labeled);
}

#[test]
fn image_payload_reports_bmp_dimensions() {
    let root = common::image_root(&["sub/pic.bmp"], &["cat"]);
    let workspace = Workspace::open(root.path()).expect("open");

    let payload = workspace.image("sub/pic.bmp").expect("image");
    assert_eq!(payload.bytes, common::bmp_bytes(4, 3));
    assert_eq!(payload.width, Some(4));
    assert_eq!(payload.height, Some(3));
}

#[test]
fn missing_root_is_fatal() {
    let root = tempfile::tempdir().expect("create temp dir");
    let err = Workspace::open(&root.path().join("absent")).unwrap_err();
    assert!(matches!(err, LabelerError::RootNotFound { .. }));
}

#[test]
fn malformed_annotation_is_fatal() {
    let root = common::image_root(&["a.jpg"], &["cat"]);
    common::write_annotation(root.path(), r#"{"labeling": ["not", "a", "map"]}"#);

    let err = Workspace::open(root.path()).unwrap_err();
    assert!(matches!(err, LabelerError::AnnotationParse { .. }));
}
