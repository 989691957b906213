//! Medical record files: metadata rows in the store, bytes in blob storage.

use sha2::{Digest, Sha256};

use crate::blob::{BlobError, BlobStore};
use crate::db::Database;
use crate::error::{WorkflowError, WorkflowResult};
use crate::identity::{require_user, IdentityProvider};
use crate::models::MedicalDocument;
use crate::validation::validate_document;

pub struct RecordLibrary<'a> {
    db: &'a Database,
    identity: &'a dyn IdentityProvider,
    blobs: &'a dyn BlobStore,
}

impl<'a> RecordLibrary<'a> {
    pub fn new(
        db: &'a Database,
        identity: &'a dyn IdentityProvider,
        blobs: &'a dyn BlobStore,
    ) -> Self {
        Self {
            db,
            identity,
            blobs,
        }
    }

    /// Store a file for the signed-in user.
    ///
    /// The row is written first; if the blob upload then fails the row is
    /// deleted again so no document points at missing bytes.
    pub fn upload(
        &self,
        title: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> WorkflowResult<MedicalDocument> {
        let user_id = require_user(self.identity)?;
        validate_document(title, file_name, bytes)?;

        let id = uuid::Uuid::new_v4().to_string();
        let file_name = file_name.trim();
        let document = MedicalDocument {
            storage_path: format!("{}/{}/{}", user_id, id, file_name),
            id,
            user_id,
            title: title.trim().to_string(),
            file_name: file_name.to_string(),
            size_bytes: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(bytes)),
            uploaded_at: crate::models::now(),
        };
        self.db.insert_document(&document)?;

        if let Err(e) = self.blobs.upload(&document.storage_path, bytes) {
            tracing::error!(document_id = %document.id, error = %e, "Blob upload failed");
            if let Err(cleanup) = self.db.delete_document(&document.id) {
                tracing::warn!(
                    document_id = %document.id,
                    error = %cleanup,
                    "Could not remove document row after failed upload"
                );
            }
            return Err(e.into());
        }

        tracing::info!(
            document_id = %document.id,
            size = document.size_bytes,
            "Medical document uploaded"
        );
        Ok(document)
    }

    /// The user's documents, newest first.
    pub fn list(&self) -> WorkflowResult<Vec<MedicalDocument>> {
        let user_id = require_user(self.identity)?;
        Ok(self.db.list_documents(&user_id)?)
    }

    pub fn download(&self, id: &str) -> WorkflowResult<(MedicalDocument, Vec<u8>)> {
        let user_id = require_user(self.identity)?;
        let document = self.owned(id, &user_id)?;
        let bytes = self.blobs.download(&document.storage_path)?;
        Ok((document, bytes))
    }

    /// Remove the blob, then the row. A blob that is already gone does not
    /// block removing the row.
    pub fn delete(&self, id: &str) -> WorkflowResult<()> {
        let user_id = require_user(self.identity)?;
        let document = self.owned(id, &user_id)?;
        match self.blobs.remove(&document.storage_path) {
            Ok(()) => {}
            Err(BlobError::NotFound(path)) => {
                tracing::warn!(document_id = %id, path = %path, "Blob already missing; removing row");
            }
            Err(e) => return Err(e.into()),
        }
        self.db.delete_document(&document.id)?;
        tracing::info!(document_id = %id, "Medical document deleted");
        Ok(())
    }

    fn owned(&self, id: &str, user_id: &str) -> WorkflowResult<MedicalDocument> {
        self.db
            .get_document(id)?
            .filter(|d| d.user_id == user_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("Document {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{BlobResult, FsBlobStore};
    use crate::identity::FixedIdentity;

    struct BrokenStore;

    impl BlobStore for BrokenStore {
        fn upload(&self, _path: &str, _bytes: &[u8]) -> BlobResult<()> {
            Err(BlobError::Io(std::io::Error::other("disk full")))
        }
        fn download(&self, path: &str) -> BlobResult<Vec<u8>> {
            Err(BlobError::NotFound(path.to_string()))
        }
        fn remove(&self, _path: &str) -> BlobResult<()> {
            Err(BlobError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn test_upload_download_delete() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");
        let blobs = FsBlobStore::new(dir.path());
        let library = RecordLibrary::new(&db, &identity, &blobs);

        let doc = library.upload("MRI report", "mri.pdf", b"%PDF-1.3 scan").unwrap();
        assert_eq!(doc.storage_path, format!("user-1/{}/mri.pdf", doc.id));
        assert_eq!(doc.size_bytes, 13);
        assert_eq!(doc.sha256.len(), 64);

        let (fetched, bytes) = library.download(&doc.id).unwrap();
        assert_eq!(fetched, doc);
        assert_eq!(bytes, b"%PDF-1.3 scan");
        assert_eq!(library.list().unwrap().len(), 1);

        library.delete(&doc.id).unwrap();
        assert!(library.list().unwrap().is_empty());
        assert!(!dir.path().join(&doc.storage_path).exists());
    }

    #[test]
    fn test_delete_with_missing_blob_removes_row() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");
        let blobs = FsBlobStore::new(dir.path());
        let library = RecordLibrary::new(&db, &identity, &blobs);

        let doc = library.upload("Scan", "scan.pdf", b"%PDF-1.3 scan").unwrap();
        blobs.remove(&doc.storage_path).unwrap();

        library.delete(&doc.id).unwrap();
        assert!(library.list().unwrap().is_empty());
        assert!(db.get_document(&doc.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_keeps_row_when_blob_removal_fails() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");
        let blobs = FsBlobStore::new(dir.path());
        let doc = RecordLibrary::new(&db, &identity, &blobs)
            .upload("Scan", "scan.pdf", b"%PDF-1.3 scan")
            .unwrap();

        let library = RecordLibrary::new(&db, &identity, &BrokenStore);
        assert!(matches!(library.delete(&doc.id), Err(WorkflowError::Blob(_))));
        assert!(db.get_document(&doc.id).unwrap().is_some());
    }

    #[test]
    fn test_failed_upload_removes_row() {
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");
        let library = RecordLibrary::new(&db, &identity, &BrokenStore);

        let err = library.upload("Labs", "labs.pdf", b"data").unwrap_err();
        assert!(matches!(err, WorkflowError::Blob(_)));
        assert!(library.list().unwrap().is_empty());
    }

    #[test]
    fn test_other_user_cannot_download() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let blobs = FsBlobStore::new(dir.path());
        let owner = FixedIdentity::signed_in("user-1");
        let doc = RecordLibrary::new(&db, &owner, &blobs)
            .upload("Labs", "labs.pdf", b"data")
            .unwrap();

        let other = FixedIdentity::signed_in("user-2");
        let library = RecordLibrary::new(&db, &other, &blobs);
        assert!(matches!(
            library.download(&doc.id),
            Err(WorkflowError::NotFound(_))
        ));
    }

    #[test]
    fn test_rejects_path_in_file_name() {
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::signed_in("user-1");
        let library = RecordLibrary::new(&db, &identity, &BrokenStore);

        assert!(matches!(
            library.upload("Labs", "../labs.pdf", b"data"),
            Err(WorkflowError::Validation(_))
        ));
    }
}
