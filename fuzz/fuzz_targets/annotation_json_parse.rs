//! Fuzz target for annotation document parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the annotation.json
//! parser, then reconciles whatever parsed against a small catalog,
//! checking for panics, crashes, or hangs.

#![no_main]

use imlabel::catalog::Catalog;
use imlabel::store::{from_annotation_slice, AnnotationStore};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(document) = from_annotation_slice(data) {
        let catalog = Catalog::from_items("/fuzz", ["a.jpg", "b/c.png"]);
        let mut store = AnnotationStore::from_document("/fuzz", document);
        store.reconcile(&catalog);
        assert_eq!(store.reconcile(&catalog), 0);
    }
});
