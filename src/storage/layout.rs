use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use crate::core::error::Result;

/// Replaces `path` with `bytes` in one rename. The temp file lives next to
/// the target so the rename never crosses filesystems.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Extension of persisted document files.
pub const DOCUMENT_EXTENSION: &str = "kss";

/// Directory structure for data files
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,  // One `<name>.kss` file per document
}

impl StorageLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(StorageLayout { base_dir })
    }

    pub fn document_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", name, DOCUMENT_EXTENSION))
    }

    /// Every document file in the base directory, sorted by path.
    pub fn document_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.base_dir)? {
            let path = dir_entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
