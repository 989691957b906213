//! Quality-of-life assessment database operations.

use rusqlite::{params, OptionalExtension};

use super::{timestamp_from_sql, timestamp_to_sql, Database, DbError, DbResult};
use crate::models::{QualityOfLifeAssessment, Rating};

impl Database {
    /// Insert an assessment. Fails with a constraint error if the visit
    /// already has one.
    pub fn insert_assessment(&self, assessment: &QualityOfLifeAssessment) -> DbResult<()> {
        let ratings_json = serde_json::to_string(&assessment.ratings)?;

        self.conn.execute(
            r#"
            INSERT INTO quality_of_life (
                id, record_id, user_id, ratings, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                assessment.id,
                assessment.record_id,
                assessment.user_id,
                ratings_json,
                assessment.notes,
                timestamp_to_sql(&assessment.created_at),
                timestamp_to_sql(&assessment.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Insert or overwrite the visit's assessment, keyed by record id.
    ///
    /// On overwrite the original id and created_at are kept.
    pub fn upsert_assessment(&self, assessment: &QualityOfLifeAssessment) -> DbResult<()> {
        let ratings_json = serde_json::to_string(&assessment.ratings)?;

        self.conn.execute(
            r#"
            INSERT INTO quality_of_life (
                id, record_id, user_id, ratings, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(record_id) DO UPDATE SET
                ratings = excluded.ratings,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
            params![
                assessment.id,
                assessment.record_id,
                assessment.user_id,
                ratings_json,
                assessment.notes,
                timestamp_to_sql(&assessment.created_at),
                timestamp_to_sql(&assessment.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Get the assessment for a visit, if any.
    pub fn get_assessment(&self, record_id: &str) -> DbResult<Option<QualityOfLifeAssessment>> {
        self.conn
            .query_row(
                r#"
                SELECT id, record_id, user_id, ratings, notes, created_at, updated_at
                FROM quality_of_life
                WHERE record_id = ?
                "#,
                [record_id],
                |row| {
                    Ok(AssessmentRow {
                        id: row.get(0)?,
                        record_id: row.get(1)?,
                        user_id: row.get(2)?,
                        ratings: row.get(3)?,
                        notes: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Intermediate row struct for database mapping.
struct AssessmentRow {
    id: String,
    record_id: String,
    user_id: String,
    ratings: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<AssessmentRow> for QualityOfLifeAssessment {
    type Error = DbError;

    fn try_from(row: AssessmentRow) -> Result<Self, Self::Error> {
        let ratings: Vec<Rating> = serde_json::from_str(&row.ratings)?;

        Ok(QualityOfLifeAssessment {
            id: row.id,
            record_id: row.record_id,
            user_id: row.user_id,
            ratings,
            notes: row.notes,
            created_at: timestamp_from_sql("created_at", &row.created_at)?,
            updated_at: timestamp_from_sql("updated_at", &row.updated_at)?,
        })
    }
}
