//! Counting, filtering, pagination and next-item selection.
//!
//! Everything here is a pure function of a [`Catalog`] and an
//! [`AnnotationStore`]; results are recomputed on every request.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, RngExt};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::store::{AnnotationStore, Labeling};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: i64 = 25;
/// Largest page size a caller can request.
pub const MAX_PER_PAGE: i64 = 100;

/// Image totals shown alongside every response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub labeled: usize,
    pub unlabeled: usize,
}

/// A label and how many images carry it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Requested page; out-of-range values are clamped, not rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }
}

/// One page of results with the effective (clamped) paging parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub max_page: usize,
    pub total: usize,
}

/// Outcome of picking the next image to label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextPick {
    Item(String),
    NoneRemaining,
}

pub fn count_labeled(store: &AnnotationStore) -> usize {
    store.labeling().len()
}

pub fn count_unlabeled(catalog: &Catalog, store: &AnnotationStore) -> usize {
    catalog.len().saturating_sub(count_labeled(store))
}

pub fn counts(catalog: &Catalog, store: &AnnotationStore) -> Counts {
    Counts {
        total: catalog.len(),
        labeled: count_labeled(store),
        unlabeled: count_unlabeled(catalog, store),
    }
}

/// How many labeled images carry each label.
///
/// A label repeated within one entry still counts once for that image.
pub fn count_per_label(labeling: &Labeling) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for labels in labeling.values() {
        let distinct: BTreeSet<&String> = labels.iter().collect();
        for label in distinct {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Orders label counts most frequent first, ties by label.
pub fn most_common(counts: &BTreeMap<String, usize>) -> Vec<LabelCount> {
    let mut sorted: Vec<LabelCount> = counts
        .iter()
        .map(|(label, count)| LabelCount {
            label: label.clone(),
            count: *count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    sorted
}

/// Labeled entries sharing at least one label with `selected`, by path.
///
/// An empty selection keeps every entry.
pub fn filter_by_labels<'a>(
    labeling: &'a Labeling,
    selected: &BTreeSet<String>,
) -> Vec<(&'a str, &'a [String])> {
    labeling
        .iter()
        .filter(|(_, labels)| {
            selected.is_empty() || labels.iter().any(|label| selected.contains(label))
        })
        .map(|(path, labels)| (path.as_str(), labels.as_slice()))
        .collect()
}

/// Parses a comma-separated label filter such as `"cat,dog"`.
pub fn parse_label_filter(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cuts one page out of `items`.
///
/// `per_page` is clamped to `[1, MAX_PER_PAGE]` and `page` to
/// `[1, max_page]`, where `max_page` is at least 1 so an empty list yields
/// an empty first page.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let per_page = request
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE) as usize;
    let total = items.len();
    let max_page = total.div_ceil(per_page).max(1);
    let page = request.page.unwrap_or(1).clamp(1, max_page as i64) as usize;

    let start = ((page - 1) * per_page).min(total);
    let end = (page * per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        max_page,
        total,
    }
}

/// Catalog items without labels, in catalog order.
pub fn unlabeled_paths<'a>(catalog: &'a Catalog, store: &AnnotationStore) -> Vec<&'a str> {
    catalog.iter().filter(|path| !store.is_labeled(path)).collect()
}

/// Picks an unlabeled image uniformly at random.
pub fn pick_next_unlabeled(catalog: &Catalog, store: &AnnotationStore) -> NextPick {
    let mut rng = rand::rng();
    pick_next_unlabeled_with(catalog, store, &mut rng)
}

/// Like [`pick_next_unlabeled`], drawing from the given generator.
pub fn pick_next_unlabeled_with<R: Rng + ?Sized>(
    catalog: &Catalog,
    store: &AnnotationStore,
    rng: &mut R,
) -> NextPick {
    let unlabeled = unlabeled_paths(catalog, store);
    if unlabeled.is_empty() {
        return NextPick::NoneRemaining;
    }

    let index = rng.random_range(0..unlabeled.len());
    NextPick::Item(unlabeled[index].to_string())
}
