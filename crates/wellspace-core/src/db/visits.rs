//! Visit record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{invalid, timestamp_from_sql, timestamp_to_sql, Database, DbError, DbResult};
use crate::models::{Program, VisitRecord};

const VISIT_COLUMNS: &str = r#"
    id, user_id, program, first_name, last_name, email, phone, address,
    date_of_birth, years_with_condition, diagnosis, visit_reason, created_at, updated_at
"#;

impl Database {
    /// Insert a new visit record.
    pub fn insert_visit(&self, visit: &VisitRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO visit_records (
                id, user_id, program, first_name, last_name, email, phone, address,
                date_of_birth, years_with_condition, diagnosis, visit_reason, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                visit.id,
                visit.user_id,
                visit.program.as_str(),
                visit.first_name,
                visit.last_name,
                visit.email,
                visit.phone,
                visit.address,
                visit.date_of_birth,
                visit.years_with_condition,
                visit.diagnosis,
                visit.visit_reason,
                timestamp_to_sql(&visit.created_at),
                timestamp_to_sql(&visit.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Update the demographic fields of an existing visit record.
    pub fn update_visit(&self, visit: &VisitRecord) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE visit_records SET
                first_name = ?2,
                last_name = ?3,
                email = ?4,
                phone = ?5,
                address = ?6,
                date_of_birth = ?7,
                years_with_condition = ?8,
                diagnosis = ?9,
                visit_reason = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                visit.id,
                visit.first_name,
                visit.last_name,
                visit.email,
                visit.phone,
                visit.address,
                visit.date_of_birth,
                visit.years_with_condition,
                visit.diagnosis,
                visit.visit_reason,
                timestamp_to_sql(&visit.updated_at),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a visit record by ID.
    pub fn get_visit(&self, id: &str) -> DbResult<Option<VisitRecord>> {
        let sql = format!("SELECT {VISIT_COLUMNS} FROM visit_records WHERE id = ?");
        self.conn
            .query_row(&sql, [id], VisitRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Most recently created visit for a user in a program.
    pub fn latest_visit(&self, user_id: &str, program: Program) -> DbResult<Option<VisitRecord>> {
        let sql = format!(
            "SELECT {VISIT_COLUMNS} FROM visit_records
             WHERE user_id = ?1 AND program = ?2
             ORDER BY created_at DESC, rowid DESC
             LIMIT 1"
        );
        self.conn
            .query_row(&sql, params![user_id, program.as_str()], VisitRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// All visits for a user in a program, newest first.
    pub fn list_visits(&self, user_id: &str, program: Program) -> DbResult<Vec<VisitRecord>> {
        let sql = format!(
            "SELECT {VISIT_COLUMNS} FROM visit_records
             WHERE user_id = ?1 AND program = ?2
             ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, program.as_str()], VisitRow::from_row)?;

        let mut visits = Vec::new();
        for row in rows {
            visits.push(row?.try_into()?);
        }
        Ok(visits)
    }
}

/// Intermediate row struct for database mapping.
struct VisitRow {
    id: String,
    user_id: String,
    program: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    date_of_birth: Option<String>,
    years_with_condition: Option<u32>,
    diagnosis: Option<String>,
    visit_reason: Option<String>,
    created_at: String,
    updated_at: String,
}

impl VisitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            program: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            email: row.get(5)?,
            phone: row.get(6)?,
            address: row.get(7)?,
            date_of_birth: row.get(8)?,
            years_with_condition: row.get(9)?,
            diagnosis: row.get(10)?,
            visit_reason: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

impl TryFrom<VisitRow> for VisitRecord {
    type Error = DbError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        let program = Program::parse(&row.program).ok_or_else(|| invalid("program", &row.program))?;

        Ok(VisitRecord {
            id: row.id,
            user_id: row.user_id,
            program,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            date_of_birth: row.date_of_birth,
            years_with_condition: row.years_with_condition,
            diagnosis: row.diagnosis,
            visit_reason: row.visit_reason,
            created_at: timestamp_from_sql("created_at", &row.created_at)?,
            updated_at: timestamp_from_sql("updated_at", &row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IntakeForm;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut form = IntakeForm::new("Jane", "Doe", "jane@x.com");
        form.years_with_condition = Some(4);
        let visit = VisitRecord::new("user-1", Program::Gpact, &form);
        db.insert_visit(&visit).unwrap();

        let retrieved = db.get_visit(&visit.id).unwrap().unwrap();
        assert_eq!(retrieved, visit);
    }

    #[test]
    fn test_update_visit() {
        let db = setup_db();

        let mut visit =
            VisitRecord::new("user-1", Program::Generic, &IntakeForm::new("Jane", "Doe", "jane@x.com"));
        db.insert_visit(&visit).unwrap();

        let mut form = IntakeForm::new("Jane", "Doe", "jane@x.com");
        form.visit_reason = Some("Follow-up".into());
        visit.apply(&form);
        assert!(db.update_visit(&visit).unwrap());

        let retrieved = db.get_visit(&visit.id).unwrap().unwrap();
        assert_eq!(retrieved.visit_reason, Some("Follow-up".into()));
    }

    #[test]
    fn test_latest_visit_scoped_by_user_and_program() {
        let db = setup_db();
        let form = IntakeForm::new("Jane", "Doe", "jane@x.com");

        let first = VisitRecord::new("user-1", Program::Generic, &form);
        db.insert_visit(&first).unwrap();
        let second = VisitRecord::new("user-1", Program::Generic, &form);
        db.insert_visit(&second).unwrap();
        db.insert_visit(&VisitRecord::new("user-1", Program::Mg, &form)).unwrap();
        db.insert_visit(&VisitRecord::new("user-2", Program::Generic, &form)).unwrap();

        let latest = db.latest_visit("user-1", Program::Generic).unwrap().unwrap();
        assert_eq!(latest.id, second.id);

        let all = db.list_visits("user-1", Program::Generic).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, first.id);

        assert!(db.latest_visit("user-3", Program::Generic).unwrap().is_none());
    }
}
