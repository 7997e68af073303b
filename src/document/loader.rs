//! Reads schema documents from disk into a [`DocumentStore`]
//!
//! Loading is tolerant: a missing or malformed source is logged and left out
//! of the store. Checks report absent documents as failed outcomes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::store::{Document, DocumentKind, DocumentStore};
use super::value::Value;
use super::DocumentError;

/// File extension of every document source
pub const DOCUMENT_EXTENSION: &str = "yaml";

/// A document to load: its relative id, kind, and resolved file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub id: String,
    pub kind: DocumentKind,
    pub path: PathBuf,
}

impl DocumentSource {
    /// A schema source, e.g. `essences/tester-essence` under `schemas_dir`
    pub fn schema(schemas_dir: &Path, id: &str) -> Self {
        Self::new(schemas_dir, id, DocumentKind::Schema)
    }

    /// A validation-rules source under `validation_dir`
    pub fn validation(validation_dir: &Path, id: &str) -> Self {
        Self::new(validation_dir, id, DocumentKind::Validation)
    }

    fn new(dir: &Path, id: &str, kind: DocumentKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            path: dir.join(format!("{}.{}", id, DOCUMENT_EXTENSION)),
        }
    }

    /// Store name derived from the id: `essences/tester-essence` → `essences_tester-essence`
    pub fn name(&self) -> String {
        document_name(&self.id)
    }
}

/// Derives a document name from a relative source id
pub fn document_name(id: &str) -> String {
    id.trim_end_matches(&format!(".{}", DOCUMENT_EXTENSION))
        .replace(['/', '\\'], "_")
}

/// Reads and parses a single source
pub fn load_document(source: &DocumentSource) -> Result<Document, DocumentError> {
    let text = fs::read_to_string(&source.path).map_err(|e| DocumentError::Io {
        path: source.path.clone(),
        source: e,
    })?;
    let root = Value::from_yaml_str(&text).map_err(|e| DocumentError::Parse {
        path: source.path.clone(),
        source: e,
    })?;
    Ok(Document::new(source.name(), source.kind, root))
}

/// Loads every source that exists and parses, skipping the rest
pub fn load<'a>(sources: impl IntoIterator<Item = &'a DocumentSource>) -> DocumentStore {
    let mut store = DocumentStore::new();

    for source in sources {
        if !source.path.exists() {
            warn!(path = %source.path.display(), "Schema file not found");
            continue;
        }

        match load_document(source).and_then(|doc| store.insert(doc)) {
            Ok(()) => info!(document = %source.name(), "Loaded schema"),
            Err(e) => error!(id = %source.id, error = %e, "Failed to load schema"),
        }
    }

    store
}
