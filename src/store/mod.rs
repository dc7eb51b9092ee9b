//! Persisted annotation state.
//!
//! The store maps image paths to their assigned labels and keeps a
//! separate record of labeled images that have disappeared from disk.
//! It is written to `annotation.json` at the image root after every
//! mutation:
//!
//! ```json
//! {"directory": "/data", "labeling": {"a.jpg": ["cat"]}, "missed": {}}
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{is_image_path, Catalog};
use crate::error::LabelerError;

/// File name of the annotation document under the image root.
pub const ANNOTATION_FILE: &str = "annotation.json";

/// Item path to assigned labels.
pub type Labeling = BTreeMap<String, Vec<String>>;

/// On-disk shape of `annotation.json`.
///
/// `directory` is written for compatibility with existing documents and
/// ignored on read; the store always uses the root it was loaded from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    pub labeling: Labeling,

    #[serde(default)]
    pub missed: Labeling,
}

/// What a [`AnnotationStore::forget`] call actually removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ForgetOutcome {
    pub was_labeled: bool,
    pub was_cataloged: bool,
    pub file_deleted: bool,
}

/// Labeling state for one image root.
#[derive(Clone, Debug)]
pub struct AnnotationStore {
    root: PathBuf,
    labeling: Labeling,
    missed: Labeling,
}

impl AnnotationStore {
    /// Creates an empty, unpersisted store.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            labeling: Labeling::new(),
            missed: Labeling::new(),
        }
    }

    /// Loads `annotation.json` (or starts empty), reconciles it against the
    /// catalog, and writes the result back.
    ///
    /// # Errors
    /// A malformed document is fatal ([`LabelerError::AnnotationParse`]).
    pub fn load(root: &Path, catalog: &Catalog) -> Result<Self, LabelerError> {
        let path = annotation_path(root);

        let mut store = if path.exists() {
            let file = File::open(&path).map_err(LabelerError::Io)?;
            let reader = BufReader::new(file);
            let document: AnnotationDocument = serde_json::from_reader(reader)
                .map_err(|source| LabelerError::AnnotationParse {
                    path: path.clone(),
                    source,
                })?;
            Self::from_document(root, document)
        } else {
            tracing::info!(path = %path.display(), "no annotation document, starting empty");
            Self::empty(root)
        };

        store.reconcile(catalog);
        store.persist()?;

        tracing::info!(
            labeled = store.labeling.len(),
            missed = store.missed.len(),
            "annotation state loaded"
        );
        Ok(store)
    }

    /// Builds a store from a parsed document without touching the disk.
    pub fn from_document(root: impl Into<PathBuf>, document: AnnotationDocument) -> Self {
        Self {
            root: root.into(),
            labeling: document.labeling,
            missed: document.missed,
        }
    }

    /// Snapshot of the state in its persisted shape.
    pub fn to_document(&self) -> AnnotationDocument {
        AnnotationDocument {
            directory: Some(self.root.to_string_lossy().into_owned()),
            labeling: self.labeling.clone(),
            missed: self.missed.clone(),
        }
    }

    /// Moves every labeled path absent from the catalog into `missed`.
    ///
    /// Returns how many entries moved. Running it again on the same
    /// catalog moves nothing. A `missed` entry whose path is labeled again
    /// is dropped, so the two maps never share a key.
    pub fn reconcile(&mut self, catalog: &Catalog) -> usize {
        let labeling = &self.labeling;
        self.missed.retain(|path, _| !labeling.contains_key(path));

        let gone: Vec<String> = self
            .labeling
            .keys()
            .filter(|path| !catalog.contains(path))
            .cloned()
            .collect();

        for path in &gone {
            if let Some(labels) = self.labeling.remove(path) {
                tracing::warn!(path = %path, "labeled image missing from disk, moved to missed");
                self.missed.insert(path.clone(), labels);
            }
        }

        gone.len()
    }

    /// Replaces the labels of `path` and persists.
    pub fn assign(&mut self, path: &str, labels: Vec<String>) -> Result<(), LabelerError> {
        self.missed.remove(path);
        self.labeling.insert(path.to_string(), labels);
        self.persist()
    }

    /// Removes the labels of `path`. Returns false, without writing, if it
    /// had none.
    pub fn clear(&mut self, path: &str) -> Result<bool, LabelerError> {
        if self.labeling.remove(path).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Drops `path` from the labeling and the catalog, deletes the image
    /// file if it exists, and persists. Only image files are ever removed,
    /// so the schema and annotation documents survive.
    pub fn forget(
        &mut self,
        path: &str,
        catalog: &mut Catalog,
    ) -> Result<ForgetOutcome, LabelerError> {
        let mut outcome = ForgetOutcome {
            was_cataloged: catalog.remove(path),
            ..ForgetOutcome::default()
        };

        let file = self.root.join(path);
        if stays_under_root(path) && is_image_path(&file) && file.is_file() {
            fs::remove_file(&file)?;
            outcome.file_deleted = true;
            tracing::warn!(path = %file.display(), "deleted image file");
        }

        outcome.was_labeled = self.labeling.remove(path).is_some();
        self.persist()?;
        Ok(outcome)
    }

    /// Rewrites `annotation.json` with the full state.
    ///
    /// The document is written next to the target and renamed over it, so
    /// an interrupted write leaves the previous version intact.
    pub fn persist(&self) -> Result<(), LabelerError> {
        let path = annotation_path(&self.root);
        let tmp_path = path.with_extension("json.tmp");

        let file = File::create(&tmp_path).map_err(LabelerError::Io)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.to_document()).map_err(|source| {
            LabelerError::AnnotationWrite {
                path: path.clone(),
                source,
            }
        })?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &path)?;
        tracing::debug!(path = %path.display(), labeled = self.labeling.len(), "persisted annotation");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn labeling(&self) -> &Labeling {
        &self.labeling
    }

    pub fn missed(&self) -> &Labeling {
        &self.missed
    }

    pub fn labels_of(&self, path: &str) -> Option<&[String]> {
        self.labeling.get(path).map(Vec::as_slice)
    }

    pub fn is_labeled(&self, path: &str) -> bool {
        self.labeling.contains_key(path)
    }
}

/// Parses an annotation document from a byte slice.
///
/// Useful for testing and fuzzing without file I/O.
pub fn from_annotation_slice(bytes: &[u8]) -> Result<AnnotationDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn annotation_path(root: &Path) -> PathBuf {
    root.join(ANNOTATION_FILE)
}

// Only plain relative paths may be deleted.
fn stays_under_root(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
