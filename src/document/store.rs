//! Named, read-only document collection shared by every check

use indexmap::IndexMap;

use super::DocumentError;
use super::value::Value;

/// What a document describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Essence, capability, behavior or physics schema
    Schema,
    /// Validation rules for the system as a whole
    Validation,
}

/// One loaded configuration tree
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    kind: DocumentKind,
    root: Value,
}

impl Document {
    pub fn new(name: impl Into<String>, kind: DocumentKind, root: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Top-level key lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }
}

/// Mapping from document name to document, in load order
///
/// Populated once at start-up and never mutated by checks.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: IndexMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, rejecting a name that is already present
    pub fn insert(&mut self, document: Document) -> Result<(), DocumentError> {
        if self.documents.contains_key(document.name()) {
            return Err(DocumentError::Duplicate(document.name().to_string()));
        }
        self.documents.insert(document.name().to_string(), document);
        Ok(())
    }

    /// Builder-style insert for fixtures and tests
    pub fn with_document(mut self, document: Document) -> Result<Self, DocumentError> {
        self.insert(document)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Schema documents only, skipping validation rules
    pub fn schemas(&self) -> impl Iterator<Item = &Document> {
        self.iter().filter(|doc| doc.kind() == DocumentKind::Schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut store = DocumentStore::new();
        store
            .insert(Document::new("physics_testing-environment", DocumentKind::Schema, Value::Null))
            .unwrap();

        let err = store
            .insert(Document::new("physics_testing-environment", DocumentKind::Schema, Value::Null))
            .unwrap_err();

        assert!(matches!(err, DocumentError::Duplicate(name) if name == "physics_testing-environment"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_schemas_skip_validation_documents() {
        let store = DocumentStore::new()
            .with_document(Document::new("a", DocumentKind::Schema, Value::Null))
            .and_then(|s| s.with_document(Document::new("v", DocumentKind::Validation, Value::Null)))
            .unwrap();

        let names: Vec<_> = store.schemas().map(Document::name).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["a", "v"]);
    }
}
