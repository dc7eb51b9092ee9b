//! The labeling workspace: one image root with its catalog, label schema
//! and annotation store.
//!
//! A [`Workspace`] is the context object every operation runs against.
//! Mutations take `&mut self`, so a single owner serializes them; use
//! [`SharedWorkspace`] when several threads need access.

mod report;
mod shared;

pub use report::{
    ImagePayload, ItemView, LabelOption, LabelUsage, LabeledItem, LabeledPage, NextView,
    StatsView, UnlabeledPage,
};
pub use shared::SharedWorkspace;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::catalog::Catalog;
use crate::error::LabelerError;
use crate::query::{self, Counts, LabelCount, NextPick, PageRequest};
use crate::schema::LabelSchema;
use crate::store::{AnnotationStore, ForgetOutcome};

/// Catalog, schema and annotation state for one image root.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    catalog: Catalog,
    schema: LabelSchema,
    store: AnnotationStore,
}

impl Workspace {
    /// Opens the image root: scans images, loads the schema, then loads and
    /// reconciles the annotation.
    ///
    /// # Errors
    /// Fails if the root does not exist, the schema is missing or
    /// malformed, or the annotation document is malformed.
    pub fn open(root: &Path) -> Result<Self, LabelerError> {
        let catalog = Catalog::discover(root)?;
        let schema = LabelSchema::load(root)?;
        let store = AnnotationStore::load(root, &catalog)?;

        tracing::info!(
            root = %root.display(),
            images = catalog.len(),
            labels = schema.labels().len(),
            "opened workspace"
        );

        Ok(Self {
            root: root.to_path_buf(),
            catalog,
            schema,
            store,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn counts(&self) -> Counts {
        query::counts(&self.catalog, &self.store)
    }

    /// Rescans the directory and reloads schema and annotation.
    pub fn reload(&mut self) -> Result<Counts, LabelerError> {
        let catalog = Catalog::discover(&self.root)?;
        let schema = LabelSchema::load(&self.root)?;
        let store = AnnotationStore::load(&self.root, &catalog)?;

        self.catalog = catalog;
        self.schema = schema;
        self.store = store;
        Ok(self.counts())
    }

    /// Picks a random unlabeled image.
    pub fn next(&self) -> NextView {
        let mut rng = rand::rng();
        self.next_with(&mut rng)
    }

    /// Like [`Workspace::next`], drawing from the given generator.
    pub fn next_with<R: Rng + ?Sized>(&self, rng: &mut R) -> NextView {
        let item = match query::pick_next_unlabeled_with(&self.catalog, &self.store, rng) {
            NextPick::Item(path) => Some(path),
            NextPick::NoneRemaining => None,
        };

        NextView {
            counts: self.counts(),
            item,
            choices: self.choices(),
        }
    }

    /// Lists labeled images sorted by path, keeping those that share a
    /// label with `selected` (all of them when `selected` is empty).
    pub fn list_labeled(&self, selected: &BTreeSet<String>, request: PageRequest) -> LabeledPage {
        let matching: Vec<LabeledItem> = query::filter_by_labels(self.store.labeling(), selected)
            .into_iter()
            .map(|(path, labels)| LabeledItem {
                path: path.to_string(),
                labels: labels.to_vec(),
            })
            .collect();
        let page = query::paginate(&matching, request);

        let per_label = query::count_per_label(self.store.labeling());
        let label_counts = query::most_common(&per_label);
        let display = label_counts
            .iter()
            .map(|entry| self.option(&entry.label))
            .collect();

        LabeledPage {
            counts: self.counts(),
            selected: selected.iter().cloned().collect(),
            found: matching.len(),
            page,
            label_counts,
            display,
        }
    }

    /// Lists unlabeled images in catalog order.
    pub fn list_unlabeled(&self, request: PageRequest) -> UnlabeledPage {
        let unlabeled: Vec<String> = query::unlabeled_paths(&self.catalog, &self.store)
            .into_iter()
            .map(str::to_string)
            .collect();

        UnlabeledPage {
            counts: self.counts(),
            page: query::paginate(&unlabeled, request),
        }
    }

    /// One image and its current labels.
    pub fn item(&self, path: &str) -> Result<ItemView, LabelerError> {
        self.require_item(path)?;
        Ok(ItemView {
            counts: self.counts(),
            path: path.to_string(),
            labels: self.store.labels_of(path).unwrap_or_default().to_vec(),
            choices: self.choices(),
        })
    }

    /// Replaces the labels of a catalog image.
    ///
    /// # Errors
    /// [`LabelerError::UnknownItem`] for paths outside the catalog and
    /// [`LabelerError::UnknownLabel`] for labels outside the schema.
    pub fn assign(&mut self, path: &str, labels: &[String]) -> Result<Counts, LabelerError> {
        self.require_item(path)?;
        self.schema.validate(labels)?;

        let mut seen = BTreeSet::new();
        let labels: Vec<String> = labels
            .iter()
            .filter(|label| seen.insert(label.as_str()))
            .cloned()
            .collect();

        self.store.assign(path, labels)?;
        Ok(self.counts())
    }

    /// Removes the labels of an image; a no-op for unlabeled paths.
    pub fn clear(&mut self, path: &str) -> Result<Counts, LabelerError> {
        self.store.clear(path)?;
        Ok(self.counts())
    }

    /// Deletes an image from disk and forgets its labels.
    pub fn delete(&mut self, path: &str) -> Result<(Counts, ForgetOutcome), LabelerError> {
        let outcome = self.store.forget(path, &mut self.catalog)?;
        Ok((self.counts(), outcome))
    }

    /// Reads the raw bytes of a catalog image.
    pub fn image(&self, path: &str) -> Result<ImagePayload, LabelerError> {
        self.require_item(path)?;
        let bytes = fs::read(self.catalog.absolute_path(path))?;
        let (width, height) = match imagesize::blob_size(&bytes) {
            Ok(size) => (Some(size.width), Some(size.height)),
            Err(err) => {
                tracing::debug!(path, error = %err, "could not read image dimensions");
                (None, None)
            }
        };

        Ok(ImagePayload {
            path: path.to_string(),
            size: bytes.len(),
            bytes,
            width,
            height,
        })
    }

    /// Per-label usage in schema order plus labels the schema lacks.
    pub fn stats(&self) -> StatsView {
        let per_label = query::count_per_label(self.store.labeling());

        let labels = self
            .schema
            .labels()
            .iter()
            .map(|label| LabelUsage {
                label: label.clone(),
                display: self.schema.display_name(label).to_string(),
                count: per_label.get(label).copied().unwrap_or(0),
            })
            .collect();

        let unknown_labels: Vec<LabelCount> = query::most_common(&per_label)
            .into_iter()
            .filter(|entry| !self.schema.contains(&entry.label))
            .collect();

        StatsView {
            counts: self.counts(),
            missed: self.store.missed().len(),
            labels,
            unknown_labels,
        }
    }

    fn require_item(&self, path: &str) -> Result<(), LabelerError> {
        if self.catalog.contains(path) {
            Ok(())
        } else {
            Err(LabelerError::UnknownItem(path.to_string()))
        }
    }

    fn option(&self, label: &str) -> LabelOption {
        LabelOption {
            label: label.to_string(),
            display: self.schema.display_name(label).to_string(),
        }
    }

    fn choices(&self) -> Vec<LabelOption> {
        self.schema
            .labels()
            .iter()
            .map(|label| self.option(label))
            .collect()
    }
}
