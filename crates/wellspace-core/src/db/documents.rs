//! Medical document metadata operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{timestamp_from_sql, timestamp_to_sql, Database, DbError, DbResult};
use crate::models::MedicalDocument;

impl Database {
    /// Insert document metadata. The file itself is already in blob storage.
    pub fn insert_document(&self, document: &MedicalDocument) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medical_documents (
                id, user_id, title, file_name, storage_path, size_bytes, sha256, uploaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                document.id,
                document.user_id,
                document.title,
                document.file_name,
                document.storage_path,
                document.size_bytes as i64,
                document.sha256,
                timestamp_to_sql(&document.uploaded_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_document(&self, id: &str) -> DbResult<Option<MedicalDocument>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, user_id, title, file_name, storage_path, size_bytes, sha256, uploaded_at
                FROM medical_documents WHERE id = ?
                "#,
                [id],
                DocumentRow::from_row,
            )
            .optional()?;

        row.map(MedicalDocument::try_from).transpose()
    }

    /// A user's documents, newest upload first.
    pub fn list_documents(&self, user_id: &str) -> DbResult<Vec<MedicalDocument>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, title, file_name, storage_path, size_bytes, sha256, uploaded_at
            FROM medical_documents
            WHERE user_id = ?
            ORDER BY uploaded_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([user_id], DocumentRow::from_row)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?.try_into()?);
        }
        Ok(documents)
    }

    pub fn delete_document(&self, id: &str) -> DbResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM medical_documents WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(DbError::NotFound(format!("Document {}", id)));
        }
        Ok(())
    }
}

struct DocumentRow {
    id: String,
    user_id: String,
    title: String,
    file_name: String,
    storage_path: String,
    size_bytes: i64,
    sha256: String,
    uploaded_at: String,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            file_name: row.get(3)?,
            storage_path: row.get(4)?,
            size_bytes: row.get(5)?,
            sha256: row.get(6)?,
            uploaded_at: row.get(7)?,
        })
    }
}

impl TryFrom<DocumentRow> for MedicalDocument {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(MedicalDocument {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            file_name: row.file_name,
            storage_path: row.storage_path,
            size_bytes: row.size_bytes.max(0) as u64,
            sha256: row.sha256,
            uploaded_at: timestamp_from_sql("uploaded_at", &row.uploaded_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;

    fn make_document(user_id: &str, title: &str) -> MedicalDocument {
        let id = uuid::Uuid::new_v4().to_string();
        MedicalDocument {
            storage_path: format!("{}/{}/scan.pdf", user_id, id),
            id,
            user_id: user_id.into(),
            title: title.into(),
            file_name: "scan.pdf".into(),
            size_bytes: 2048,
            sha256: "ab".repeat(32),
            uploaded_at: now(),
        }
    }

    #[test]
    fn test_insert_get_delete() {
        let db = Database::open_in_memory().unwrap();
        let doc = make_document("user-1", "MRI report");
        db.insert_document(&doc).unwrap();

        assert_eq!(db.get_document(&doc.id).unwrap(), Some(doc.clone()));

        db.delete_document(&doc.id).unwrap();
        assert_eq!(db.get_document(&doc.id).unwrap(), None);
        assert!(matches!(
            db.delete_document(&doc.id),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_newest_first_per_user() {
        let db = Database::open_in_memory().unwrap();
        let first = make_document("user-1", "Bloodwork");
        let second = make_document("user-1", "Gastric emptying study");
        db.insert_document(&first).unwrap();
        db.insert_document(&second).unwrap();
        db.insert_document(&make_document("user-2", "Other")).unwrap();

        let docs = db.list_documents("user-1").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, second.id);
    }

    #[test]
    fn test_storage_path_unique() {
        let db = Database::open_in_memory().unwrap();
        let doc = make_document("user-1", "MRI report");
        db.insert_document(&doc).unwrap();

        let mut dup = make_document("user-1", "Copy");
        dup.storage_path = doc.storage_path.clone();
        assert!(db.insert_document(&dup).is_err());
    }
}
