#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use imlabel::catalog::Catalog;
use imlabel::store::{AnnotationDocument, AnnotationStore};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const LABEL_POOL: &[&str] = &["cat", "dog", "bird", "car", "tree"];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn image_path_strategy() -> impl Strategy<Value = String> {
    ("[a-c]{0,1}", "[a-z0-9_]{1,6}", prop::sample::select(vec!["jpg", "png", "JPEG", "bmp"]))
        .prop_map(|(dir, stem, ext)| {
            if dir.is_empty() {
                format!("{stem}.{ext}")
            } else {
                format!("{dir}/{stem}.{ext}")
            }
        })
}

pub fn label_set_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set(prop::sample::select(LABEL_POOL.to_vec()), 0..=3)
        .prop_map(|labels| labels.into_iter().map(str::to_string).collect())
}

pub fn selection_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(prop::sample::select(LABEL_POOL.to_vec()), 0..=2)
        .prop_map(|labels| labels.into_iter().map(str::to_string).collect())
}

/// A catalog plus a store whose labeled paths partly fall outside it.
#[derive(Clone, Debug)]
pub struct ArbState {
    pub catalog_items: Vec<String>,
    pub labeling: BTreeMap<String, Vec<String>>,
    pub missed: BTreeMap<String, Vec<String>>,
}

impl ArbState {
    pub fn catalog(&self) -> Catalog {
        Catalog::from_items("/data", self.catalog_items.clone())
    }

    pub fn store(&self) -> AnnotationStore {
        AnnotationStore::from_document(
            "/data",
            AnnotationDocument {
                directory: None,
                labeling: self.labeling.clone(),
                missed: self.missed.clone(),
            },
        )
    }
}

pub fn arb_state(max_items: usize) -> BoxedStrategy<ArbState> {
    (
        proptest::collection::btree_set(image_path_strategy(), 0..=max_items),
        proptest::collection::btree_map(image_path_strategy(), label_set_strategy(), 0..=max_items),
        proptest::collection::btree_map(image_path_strategy(), label_set_strategy(), 0..=2),
    )
        .prop_map(|(catalog, extra_labeling, missed)| {
            let catalog_items: Vec<String> = catalog.into_iter().collect();
            // Keep half of the extra entries on cataloged paths so both the
            // kept and the moved branches of reconciliation are exercised.
            let labeling = extra_labeling
                .into_iter()
                .enumerate()
                .map(|(i, (path, labels))| {
                    if i % 2 == 0 && !catalog_items.is_empty() {
                        (catalog_items[i % catalog_items.len()].clone(), labels)
                    } else {
                        (path, labels)
                    }
                })
                .collect();
            ArbState {
                catalog_items,
                labeling,
                missed,
            }
        })
        .boxed()
}
