use std::sync::Arc;
use parking_lot::RwLock;
use tracing::info;
use crate::core::config::Config;
use crate::core::document::Document;
use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::layout::StorageLayout;

/// Thread-safe registry of documents, looked up by name.
#[derive(Default)]
pub struct Collection {
    documents: RwLock<Vec<Arc<Document>>>,
}

impl Collection {
    pub fn new() -> Self {
        Collection { documents: RwLock::new(Vec::new()) }
    }

    /// Opens every `<name>.kss` file under the layout's base directory.
    pub fn open(layout: &StorageLayout, config: &Config) -> Result<Self> {
        let collection = Collection::new();
        for path in layout.document_files()? {
            let document = Document::open(&path, config.clone())?;
            collection.add(Arc::new(document))?;
        }
        info!("Opened collection at {:?} with {} documents", layout.base_dir(), collection.len());
        Ok(collection)
    }

    pub fn add(&self, document: Arc<Document>) -> Result<()> {
        let name = document.name();
        let mut documents = self.documents.write();
        if documents.iter().any(|existing| existing.name() == name) {
            return Err(Error::new(ErrorKind::AlreadyExists, format!("document '{}' already exists", name)));
        }
        documents.push(document);
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<Arc<Document>> {
        let mut documents = self.documents.write();
        let position = documents
            .iter()
            .position(|document| document.name() == name)
            .ok_or_else(|| not_found(name))?;
        Ok(documents.remove(position))
    }

    pub fn find(&self, name: &str) -> Result<Arc<Document>> {
        self.documents
            .read()
            .iter()
            .find(|document| document.name() == name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.documents.read().iter().map(|document| document.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Saves every document to `<base_dir>/<name>.kss`.
    pub fn save_all(&self, layout: &StorageLayout) -> Result<()> {
        let documents: Vec<Arc<Document>> = self.documents.read().clone();
        for document in &documents {
            document.save(layout.document_path(&document.name()))?;
        }
        info!("Saved {} documents to {:?}", documents.len(), layout.base_dir());
        Ok(())
    }
}

fn not_found(name: &str) -> Error {
    Error::new(ErrorKind::NotFound, format!("no document named '{}'", name))
}
