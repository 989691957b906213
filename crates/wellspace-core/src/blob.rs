//! Blob storage for uploaded medical record files.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Object storage keyed by relative path (`{user_id}/{document_id}/{file_name}`).
pub trait BlobStore: Send + Sync {
    fn upload(&self, path: &str, bytes: &[u8]) -> BlobResult<()>;
    fn download(&self, path: &str) -> BlobResult<Vec<u8>>;
    fn remove(&self, path: &str) -> BlobResult<()>;
}

/// Blob store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative key under the root, rejecting anything that escapes it.
    fn resolve(&self, path: &str) -> BlobResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> BlobResult<()> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, bytes)?;
        tracing::debug!(path, size = bytes.len(), "Blob uploaded");
        Ok(())
    }

    fn download(&self, path: &str) -> BlobResult<Vec<u8>> {
        let full_path = self.resolve(path)?;
        match std::fs::read(&full_path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, path: &str) -> BlobResult<()> {
        let full_path = self.resolve(path)?;
        match std::fs::remove_file(&full_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_download_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store.upload("user-1/doc-1/scan.pdf", b"%PDF-1.3").unwrap();
        assert!(dir.path().join("user-1/doc-1/scan.pdf").exists());
        assert_eq!(store.download("user-1/doc-1/scan.pdf").unwrap(), b"%PDF-1.3");

        store.remove("user-1/doc-1/scan.pdf").unwrap();
        assert!(matches!(
            store.download("user-1/doc-1/scan.pdf"),
            Err(BlobError::NotFound(_))
        ));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        for path in ["../outside.pdf", "/etc/passwd", "", "user-1/../../x"] {
            assert!(
                matches!(store.upload(path, b"x"), Err(BlobError::InvalidPath(_))),
                "accepted {path}"
            );
        }
    }
}
