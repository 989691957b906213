//! Symptom entry database operations.

use rusqlite::{params, Connection, Row};

use super::{
    date_from_sql, date_to_sql, invalid, timestamp_from_sql, timestamp_to_sql, Database, DbError,
    DbResult,
};
use crate::models::{Frequency, Intensity, SymptomCategory, SymptomEntry, TimeOfDay, Trigger};

impl Database {
    /// Append one symptom entry.
    pub fn insert_symptom_entry(&self, entry: &SymptomEntry) -> DbResult<()> {
        insert_entry(&self.conn, entry)
    }

    /// Append a batch of entries in one transaction: all or nothing.
    pub fn insert_symptom_entries(&self, entries: &[SymptomEntry]) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for entry in entries {
            insert_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// All entries for a visit in submission order.
    pub fn list_symptom_entries(&self, record_id: &str) -> DbResult<Vec<SymptomEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, record_id, user_id, category, frequency, intensity, notes,
                   treatments, context_answers, time_of_day, has_trigger,
                   trigger_description, onset_date, created_at
            FROM symptom_entries
            WHERE record_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;

        let rows = stmt.query_map([record_id], SymptomRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// Count entries for a visit.
    pub fn count_symptom_entries(&self, record_id: &str) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM symptom_entries WHERE record_id = ?",
            [record_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn insert_entry(conn: &Connection, entry: &SymptomEntry) -> DbResult<()> {
    let treatments_json = serde_json::to_string(&entry.treatments)?;
    let answers_json = serde_json::to_string(&entry.context_answers)?;
    let time_of_day_json = serde_json::to_string(&entry.time_of_day)?;

    conn.execute(
        r#"
        INSERT INTO symptom_entries (
            id, record_id, user_id, category, frequency, intensity, notes,
            treatments, context_answers, time_of_day, has_trigger,
            trigger_description, onset_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            entry.id,
            entry.record_id,
            entry.user_id,
            entry.category.as_str(),
            entry.frequency.as_str(),
            entry.intensity.as_storage(),
            entry.notes,
            treatments_json,
            answers_json,
            time_of_day_json,
            entry.trigger.present,
            entry.trigger.description,
            date_to_sql(&entry.onset_date),
            timestamp_to_sql(&entry.created_at),
        ],
    )?;
    Ok(())
}

/// Intermediate row struct for database mapping.
struct SymptomRow {
    id: String,
    record_id: String,
    user_id: String,
    category: String,
    frequency: String,
    intensity: String,
    notes: Option<String>,
    treatments: String,
    context_answers: String,
    time_of_day: String,
    has_trigger: bool,
    trigger_description: Option<String>,
    onset_date: Option<String>,
    created_at: String,
}

impl SymptomRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            record_id: row.get(1)?,
            user_id: row.get(2)?,
            category: row.get(3)?,
            frequency: row.get(4)?,
            intensity: row.get(5)?,
            notes: row.get(6)?,
            treatments: row.get(7)?,
            context_answers: row.get(8)?,
            time_of_day: row.get(9)?,
            has_trigger: row.get(10)?,
            trigger_description: row.get(11)?,
            onset_date: row.get(12)?,
            created_at: row.get(13)?,
        })
    }
}

impl TryFrom<SymptomRow> for SymptomEntry {
    type Error = DbError;

    fn try_from(row: SymptomRow) -> Result<Self, Self::Error> {
        let category =
            SymptomCategory::parse(&row.category).ok_or_else(|| invalid("category", &row.category))?;
        let frequency =
            Frequency::parse(&row.frequency).ok_or_else(|| invalid("frequency", &row.frequency))?;
        let intensity =
            Intensity::parse(&row.intensity).ok_or_else(|| invalid("intensity", &row.intensity))?;
        let time_of_day: TimeOfDay = serde_json::from_str(&row.time_of_day)?;

        Ok(SymptomEntry {
            id: row.id,
            record_id: row.record_id,
            user_id: row.user_id,
            category,
            frequency,
            intensity,
            notes: row.notes,
            treatments: serde_json::from_str(&row.treatments)?,
            context_answers: serde_json::from_str(&row.context_answers)?,
            time_of_day,
            trigger: Trigger {
                present: row.has_trigger,
                description: row.trigger_description,
            },
            onset_date: date_from_sql("onset_date", row.onset_date)?,
            created_at: timestamp_from_sql("created_at", &row.created_at)?,
        })
    }
}
