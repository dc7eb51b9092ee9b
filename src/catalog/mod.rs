//! Image catalog discovery.
//!
//! The catalog is the ordered set of labelable images under a root
//! directory. It is never persisted: every load and reload rebuilds it
//! with a full directory scan.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::LabelerError;

/// File extensions (compared case-insensitively) recognized as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// The ordered set of image paths found under a root directory.
///
/// Paths are stored relative to the root with `/` separators. Order is
/// lexicographic by absolute path, so it is stable across runs.
#[derive(Clone, Debug)]
pub struct Catalog {
    root: PathBuf,
    items: Vec<String>,
    index: HashSet<String>,
}

impl Catalog {
    /// Scans `root` recursively and builds the catalog.
    ///
    /// # Errors
    /// Returns [`LabelerError::RootNotFound`] if `root` is not an existing
    /// directory, or [`LabelerError::CatalogWalk`] if the root itself cannot
    /// be read. Unreadable entries below the root (dangling links, link
    /// loops) are logged and skipped.
    pub fn discover(root: &Path) -> Result<Self, LabelerError> {
        if !root.is_dir() {
            return Err(LabelerError::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut rows: Vec<(String, String)> = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() > 0 => {
                    tracing::warn!(error = %source, "skipping unreadable entry");
                    continue;
                }
                Err(source) => {
                    return Err(LabelerError::CatalogWalk {
                        path: root.to_path_buf(),
                        source,
                    });
                }
            };

            if !entry.file_type().is_file() || !is_image_path(entry.path()) {
                continue;
            }

            let Some(relative) = relative_key(root, entry.path()) else {
                continue;
            };
            let absolute = entry.path().to_string_lossy().into_owned();
            rows.push((absolute, relative));
        }

        rows.sort_by(|a, b| a.0.cmp(&b.0));
        let catalog = Self::from_items(root, rows.into_iter().map(|(_, relative)| relative));
        tracing::debug!(
            root = %root.display(),
            images = catalog.len(),
            "scanned image catalog"
        );
        Ok(catalog)
    }

    /// Builds a catalog from an explicit list of item paths, keeping their
    /// order. Useful for testing without file I/O.
    pub fn from_items<I, S>(root: impl Into<PathBuf>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let index = items.iter().cloned().collect();
        Self {
            root: root.into(),
            items,
            index,
        }
    }

    /// The directory this catalog was scanned from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.index.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Resolves an item path against the catalog root.
    pub fn absolute_path(&self, item: &str) -> PathBuf {
        self.root.join(item)
    }

    /// Drops an item from the in-memory view. Returns whether it was present.
    pub fn remove(&mut self, item: &str) -> bool {
        if !self.index.remove(item) {
            return false;
        }
        self.items.retain(|candidate| candidate != item);
        true
    }
}

/// Returns true if the path has one of the recognized image extensions.
pub fn is_image_path(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
