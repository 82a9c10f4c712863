//! Debug documents.
//!
//! One [`Document`] exists per source path per module. The cache is owned by
//! the module and shared by every emitter writing into it, so the content
//! hash of a file is computed once no matter how many methods map to it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use markup_codegen_core::FileSource;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

/// Language id recorded for markup documents.
pub const MARKUP_LANGUAGE: Uuid = Uuid::from_u128(0x9a37fc74_96b5_4dbc_8b8a_c4e603735a63);

/// Vendor id recorded for markup documents.
pub const MARKUP_LANGUAGE_VENDOR: Uuid = Uuid::from_u128(0x3c631bf9_0cbe_4aab_a24a_5e417734441c);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
}

/// A source file referenced by sequence points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub language: Uuid,
    pub language_vendor: Uuid,
    pub kind: DocumentKind,
    pub hash_algorithm: HashAlgorithm,
    pub hash: Vec<u8>,
}

impl Document {
    fn from_source(file: &dyn FileSource) -> Self {
        Self {
            path: file.file_path().to_string(),
            language: MARKUP_LANGUAGE,
            language_vendor: MARKUP_LANGUAGE_VENDOR,
            kind: DocumentKind::Text,
            hash_algorithm: HashAlgorithm::Sha256,
            hash: Sha256::digest(file.file_contents()).to_vec(),
        }
    }
}

/// Per-module document cache keyed by file path.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: DashMap<String, Arc<Document>>,
    hashed: AtomicUsize,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the document for `file`, hashing its contents on first use.
    ///
    /// Concurrent callers for the same path observe a single document.
    pub fn get_or_create(&self, file: &dyn FileSource) -> Arc<Document> {
        if let Some(doc) = self.documents.get(file.file_path()) {
            return Arc::clone(doc.value());
        }
        let entry = self
            .documents
            .entry(file.file_path().to_string())
            .or_insert_with(|| {
                self.hashed.fetch_add(1, Ordering::Relaxed);
                debug!(path = file.file_path(), "hashing debug document");
                Arc::new(Document::from_source(file))
            });
        Arc::clone(entry.value())
    }

    pub fn get(&self, path: &str) -> Option<Arc<Document>> {
        self.documents.get(path).map(|doc| Arc::clone(doc.value()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of content hashes computed so far.
    pub fn hashes_computed(&self) -> usize {
        self.hashed.load(Ordering::Relaxed)
    }

    /// All cached documents, ordered by path.
    pub fn snapshot(&self) -> Vec<Arc<Document>> {
        let mut docs: Vec<Arc<Document>> = self
            .documents
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_codegen_core::InMemorySource;

    #[test]
    fn document_hashed_once_per_path() {
        let cache = DocumentCache::new();
        let file = InMemorySource::new("Views/Main.xaml", b"<Window/>".to_vec());

        let first = cache.get_or_create(&file);
        let second = cache.get_or_create(&file);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hashes_computed(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn document_fields() {
        let cache = DocumentCache::new();
        let file = InMemorySource::new("App.xaml", b"<Application/>".to_vec());
        let doc = cache.get_or_create(&file);

        assert_eq!(doc.path, "App.xaml");
        assert_eq!(doc.kind, DocumentKind::Text);
        assert_eq!(doc.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(doc.hash.len(), 32);
        assert_eq!(doc.hash, Sha256::digest(b"<Application/>").to_vec());
        assert_eq!(
            doc.language.to_string(),
            "9a37fc74-96b5-4dbc-8b8a-c4e603735a63"
        );
    }

    #[test]
    fn hash_is_content_stable() {
        let a = DocumentCache::new();
        let b = DocumentCache::new();
        let file = InMemorySource::new("Page.xaml", b"<Page/>".to_vec());
        assert_eq!(a.get_or_create(&file).hash, b.get_or_create(&file).hash);
    }

    #[test]
    fn snapshot_is_sorted() {
        let cache = DocumentCache::new();
        cache.get_or_create(&InMemorySource::new("b.xaml", b"b".to_vec()));
        cache.get_or_create(&InMemorySource::new("a.xaml", b"a".to_vec()));
        let paths: Vec<_> = cache.snapshot().iter().map(|d| d.path.clone()).collect();
        assert_eq!(paths, vec!["a.xaml", "b.xaml"]);
        assert!(cache.get("a.xaml").is_some());
        assert!(cache.get("c.xaml").is_none());
    }
}
