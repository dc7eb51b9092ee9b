//! Label schema loading.
//!
//! The schema is the fixed, ordered taxonomy an annotator picks from. It
//! lives in `labels.json` at the image root:
//!
//! ```json
//! {"labels": ["cat", "dog"], "visible_labels": {"cat": "Cat"}}
//! ```
//!
//! `visible_labels` is optional; any label without an entry is displayed
//! as itself.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LabelerError;

/// File name of the schema document under the image root.
pub const LABELS_FILE: &str = "labels.json";

/// On-disk shape of `labels.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_labels: Option<BTreeMap<String, String>>,
}

/// The ordered label taxonomy with display names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSchema {
    labels: Vec<String>,
    display: BTreeMap<String, String>,
}

impl LabelSchema {
    /// Loads `labels.json` from the image root.
    ///
    /// # Errors
    /// [`LabelerError::MissingSchema`] when the document does not exist,
    /// [`LabelerError::SchemaParse`] when it is not valid.
    pub fn load(root: &Path) -> Result<Self, LabelerError> {
        let path = schema_path(root);
        if !path.is_file() {
            return Err(LabelerError::MissingSchema { path });
        }

        let file = File::open(&path).map_err(LabelerError::Io)?;
        let reader = BufReader::new(file);
        let document: SchemaDocument = serde_json::from_reader(reader)
            .map_err(|source| LabelerError::SchemaParse { path, source })?;

        Ok(Self::from_document(document))
    }

    /// Builds a schema from a parsed document, filling in identity display
    /// names for labels without one.
    pub fn from_document(document: SchemaDocument) -> Self {
        let mut display = document.visible_labels.unwrap_or_default();
        for label in &document.labels {
            display
                .entry(label.clone())
                .or_insert_with(|| label.clone());
        }

        Self {
            labels: document.labels,
            display,
        }
    }

    /// Builds a schema with identity display names.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_document(SchemaDocument {
            labels: labels.into_iter().map(Into::into).collect(),
            visible_labels: None,
        })
    }

    /// Labels in canonical order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Display names keyed by label.
    pub fn display_names(&self) -> &BTreeMap<String, String> {
        &self.display
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|candidate| candidate == label)
    }

    pub fn display_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.display.get(label).map(String::as_str).unwrap_or(label)
    }

    /// Checks that every label belongs to the schema.
    pub fn validate(&self, labels: &[String]) -> Result<(), LabelerError> {
        match labels.iter().find(|label| !self.contains(label)) {
            Some(label) => Err(LabelerError::UnknownLabel {
                label: label.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses a schema document from a byte slice.
///
/// Useful for testing and fuzzing without file I/O.
pub fn from_schema_slice(bytes: &[u8]) -> Result<LabelSchema, serde_json::Error> {
    serde_json::from_slice::<SchemaDocument>(bytes).map(LabelSchema::from_document)
}

fn schema_path(root: &Path) -> PathBuf {
    root.join(LABELS_FILE)
}
