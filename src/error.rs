use std::path::PathBuf;
use thiserror::Error;

/// The main error type for imlabel operations.
#[derive(Debug, Error)]
pub enum LabelerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image directory does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Failed while scanning {path}: {source}")]
    CatalogWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Label schema not found: {path}")]
    MissingSchema { path: PathBuf },

    #[error("Failed to parse label schema from {path}: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse annotation from {path}: {source}")]
    AnnotationParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write annotation to {path}: {source}")]
    AnnotationWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Image is not part of the catalog: {0}")]
    UnknownItem(String),

    #[error("Label '{label}' is not defined in the label schema")]
    UnknownLabel { label: String },

    #[error("Workspace lock poisoned by a panicked holder")]
    Poisoned,
}
