//! Schema documents: the value tree, the store, and the on-disk loader

use std::path::PathBuf;

use thiserror::Error;

pub mod catalog;
pub mod loader;
pub mod store;
pub mod value;

pub use loader::{DocumentSource, document_name, load, load_document};
pub use store::{Document, DocumentKind, DocumentStore};
pub use value::{Mapping, Value};

/// Errors raised while reading or storing documents
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("document '{0}' is already loaded")]
    Duplicate(String),
}
