//! Medication and medication history database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    date_from_sql, date_to_sql, invalid, timestamp_from_sql, timestamp_to_sql, Database, DbError,
    DbResult,
};
use crate::models::{HistoryKind, Medication, MedicationHistoryEvent, MedicationStatus};

const MEDICATION_COLUMNS: &str = r#"
    id, user_id, name, dosage, frequency, timing, indication, start_date,
    stop_date, still_using, as_needed, condition_specific, target_symptoms,
    notes, status, created_at, updated_at
"#;

impl Database {
    /// Insert a new medication.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<()> {
        let targets_json = serde_json::to_string(&medication.target_symptoms)?;

        self.conn.execute(
            r#"
            INSERT INTO medications (
                id, user_id, name, dosage, frequency, timing, indication, start_date,
                stop_date, still_using, as_needed, condition_specific, target_symptoms,
                notes, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                medication.id,
                medication.user_id,
                medication.name,
                medication.dosage,
                medication.frequency,
                medication.timing,
                medication.indication,
                date_to_sql(&medication.start_date),
                date_to_sql(&medication.stop_date),
                medication.still_using,
                medication.as_needed,
                medication.condition_specific,
                targets_json,
                medication.notes,
                medication.status.as_str(),
                timestamp_to_sql(&medication.created_at),
                timestamp_to_sql(&medication.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Update editable fields. Status, stop date and `still_using` are not touched.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<()> {
        let targets_json = serde_json::to_string(&medication.target_symptoms)?;

        let rows = self.conn.execute(
            r#"
            UPDATE medications SET
                name = ?2, dosage = ?3, frequency = ?4, timing = ?5, indication = ?6,
                start_date = ?7, as_needed = ?8, condition_specific = ?9,
                target_symptoms = ?10, notes = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                medication.id,
                medication.name,
                medication.dosage,
                medication.frequency,
                medication.timing,
                medication.indication,
                date_to_sql(&medication.start_date),
                medication.as_needed,
                medication.condition_specific,
                targets_json,
                medication.notes,
                timestamp_to_sql(&medication.updated_at),
            ],
        )?;

        if rows == 0 {
            return Err(DbError::NotFound(format!("Medication {}", medication.id)));
        }
        Ok(())
    }

    /// Mark a medication discontinued as of `stop_date`.
    pub fn mark_discontinued(&self, id: &str, stop_date: NaiveDate) -> DbResult<()> {
        let rows = self.conn.execute(
            r#"
            UPDATE medications SET
                status = 'discontinued', still_using = 0, stop_date = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
            params![
                id,
                date_to_sql(&Some(stop_date)),
                timestamp_to_sql(&crate::models::now()),
            ],
        )?;

        if rows == 0 {
            return Err(DbError::NotFound(format!("Medication {}", id)));
        }
        Ok(())
    }

    /// Get medication by ID.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<Medication>> {
        let sql = format!("SELECT {} FROM medications WHERE id = ?", MEDICATION_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, [id], MedicationRow::from_row)
            .optional()?;

        row.map(Medication::try_from).transpose()
    }

    /// List a user's medications, newest first, optionally filtered by status.
    pub fn list_medications(
        &self,
        user_id: &str,
        status: Option<MedicationStatus>,
    ) -> DbResult<Vec<Medication>> {
        let sql = format!(
            r#"
            SELECT {} FROM medications
            WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
            ORDER BY created_at DESC, rowid DESC
            "#,
            MEDICATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![user_id, status.map(|s| s.as_str())],
            MedicationRow::from_row,
        )?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// Append a history event.
    pub fn insert_history_event(&self, event: &MedicationHistoryEvent) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medication_history (
                id, medication_id, user_id, kind, previous_dosage, previous_frequency,
                reason, snapshot, event_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                event.id,
                event.medication_id,
                event.user_id,
                event.kind.as_str(),
                event.previous_dosage,
                event.previous_frequency,
                event.reason,
                event.snapshot,
                timestamp_to_sql(&event.event_date),
            ],
        )?;
        Ok(())
    }

    /// History for one medication, newest first.
    pub fn list_history(&self, medication_id: &str) -> DbResult<Vec<MedicationHistoryEvent>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, medication_id, user_id, kind, previous_dosage, previous_frequency,
                   reason, snapshot, event_date
            FROM medication_history
            WHERE medication_id = ?
            ORDER BY event_date DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([medication_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, medication_id, user_id, kind, dosage, frequency, reason, snapshot, date) =
                row?;
            events.push(MedicationHistoryEvent {
                id,
                medication_id,
                user_id,
                kind: HistoryKind::parse(&kind).ok_or_else(|| invalid("kind", &kind))?,
                previous_dosage: dosage,
                previous_frequency: frequency,
                reason,
                snapshot,
                event_date: timestamp_from_sql("event_date", &date)?,
            });
        }
        Ok(events)
    }
}

/// Intermediate row struct for database mapping.
struct MedicationRow {
    id: String,
    user_id: String,
    name: String,
    dosage: String,
    frequency: String,
    timing: Option<String>,
    indication: Option<String>,
    start_date: Option<String>,
    stop_date: Option<String>,
    still_using: bool,
    as_needed: bool,
    condition_specific: bool,
    target_symptoms: String,
    notes: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl MedicationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            dosage: row.get(3)?,
            frequency: row.get(4)?,
            timing: row.get(5)?,
            indication: row.get(6)?,
            start_date: row.get(7)?,
            stop_date: row.get(8)?,
            still_using: row.get(9)?,
            as_needed: row.get(10)?,
            condition_specific: row.get(11)?,
            target_symptoms: row.get(12)?,
            notes: row.get(13)?,
            status: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }
}

impl TryFrom<MedicationRow> for Medication {
    type Error = DbError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        let status =
            MedicationStatus::parse(&row.status).ok_or_else(|| invalid("status", &row.status))?;

        Ok(Medication {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            dosage: row.dosage,
            frequency: row.frequency,
            timing: row.timing,
            indication: row.indication,
            start_date: date_from_sql("start_date", row.start_date)?,
            stop_date: date_from_sql("stop_date", row.stop_date)?,
            still_using: row.still_using,
            as_needed: row.as_needed,
            condition_specific: row.condition_specific,
            target_symptoms: serde_json::from_str(&row.target_symptoms)?,
            notes: row.notes,
            status,
            created_at: timestamp_from_sql("created_at", &row.created_at)?,
            updated_at: timestamp_from_sql("updated_at", &row.updated_at)?,
        })
    }
}
