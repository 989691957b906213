//! SQLite schema definition.

/// Complete database schema for Wellspace.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Visit Records (one per doctor-visit intake)
-- ============================================================================

CREATE TABLE IF NOT EXISTS visit_records (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    program TEXT NOT NULL CHECK (program IN ('gpact', 'mg', 'generic')),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    address TEXT,
    date_of_birth TEXT,
    years_with_condition INTEGER,
    diagnosis TEXT,
    visit_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_visits_user_program ON visit_records(user_id, program, created_at);

-- ============================================================================
-- Symptom Entries (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS symptom_entries (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL REFERENCES visit_records(id),
    user_id TEXT NOT NULL,
    category TEXT NOT NULL,
    frequency TEXT NOT NULL,
    intensity TEXT NOT NULL,                     -- mild|moderate|severe or numeric score
    notes TEXT,
    treatments TEXT NOT NULL DEFAULT '[]',       -- JSON array of strings
    context_answers TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    time_of_day TEXT NOT NULL DEFAULT '{}',      -- JSON object {morning, afternoon, evening, night}
    has_trigger INTEGER NOT NULL DEFAULT 0,
    trigger_description TEXT,
    onset_date TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_symptoms_record ON symptom_entries(record_id, created_at);

CREATE TRIGGER IF NOT EXISTS symptom_entries_no_update BEFORE UPDATE ON symptom_entries
BEGIN
    SELECT RAISE(ABORT, 'Symptom entries are append-only');
END;

-- ============================================================================
-- Quality-of-Life Assessments (at most one per visit)
-- ============================================================================

CREATE TABLE IF NOT EXISTS quality_of_life (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL UNIQUE REFERENCES visit_records(id),
    user_id TEXT NOT NULL,
    ratings TEXT NOT NULL DEFAULT '[]',          -- JSON array of {dimension, value}
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- ============================================================================
-- Medications
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    dosage TEXT NOT NULL,
    frequency TEXT NOT NULL,
    timing TEXT,
    indication TEXT,
    start_date TEXT,
    stop_date TEXT,
    still_using INTEGER NOT NULL DEFAULT 1,
    as_needed INTEGER NOT NULL DEFAULT 0,
    condition_specific INTEGER NOT NULL DEFAULT 0,
    target_symptoms TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    notes TEXT,
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'discontinued')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_medications_user ON medications(user_id, status);

-- Discontinued is terminal
CREATE TRIGGER IF NOT EXISTS medications_no_reactivate BEFORE UPDATE OF status ON medications
WHEN old.status = 'discontinued' AND new.status <> 'discontinued'
BEGIN
    SELECT RAISE(ABORT, 'Discontinued medications cannot be reactivated');
END;

-- ============================================================================
-- Medication History (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medication_history (
    id TEXT PRIMARY KEY,
    medication_id TEXT NOT NULL REFERENCES medications(id),
    user_id TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('change', 'stop')),
    previous_dosage TEXT,
    previous_frequency TEXT,
    reason TEXT NOT NULL,
    snapshot TEXT NOT NULL,                      -- JSON of the medication at event time
    event_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_medication_history ON medication_history(medication_id, event_date);

CREATE TRIGGER IF NOT EXISTS medication_history_no_update BEFORE UPDATE ON medication_history
BEGIN
    SELECT RAISE(ABORT, 'Medication history is append-only');
END;

-- ============================================================================
-- Health Profiles (one per user, upserted whole)
-- ============================================================================

CREATE TABLE IF NOT EXISTS health_profiles (
    user_id TEXT PRIMARY KEY,
    profile TEXT NOT NULL,                       -- JSON HealthProfile
    updated_at TEXT NOT NULL
);

-- ============================================================================
-- Glossary (shared)
-- ============================================================================

CREATE TABLE IF NOT EXISTS glossary_terms (
    term TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    definition TEXT NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS glossary_terms_fts USING fts5(
    term,
    definition,
    content='glossary_terms',
    content_rowid='rowid'
);

CREATE TRIGGER IF NOT EXISTS glossary_terms_ai AFTER INSERT ON glossary_terms BEGIN
    INSERT INTO glossary_terms_fts(rowid, term, definition)
    VALUES (new.rowid, new.term, new.definition);
END;

CREATE TRIGGER IF NOT EXISTS glossary_terms_ad AFTER DELETE ON glossary_terms BEGIN
    INSERT INTO glossary_terms_fts(glossary_terms_fts, rowid, term, definition)
    VALUES ('delete', old.rowid, old.term, old.definition);
END;

CREATE TRIGGER IF NOT EXISTS glossary_terms_au AFTER UPDATE ON glossary_terms BEGIN
    INSERT INTO glossary_terms_fts(glossary_terms_fts, rowid, term, definition)
    VALUES ('delete', old.rowid, old.term, old.definition);
    INSERT INTO glossary_terms_fts(rowid, term, definition)
    VALUES (new.rowid, new.term, new.definition);
END;

CREATE INDEX IF NOT EXISTS idx_glossary_category ON glossary_terms(category);

-- ============================================================================
-- Medical Documents (file bytes live in blob storage)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medical_documents (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    file_name TEXT NOT NULL,
    storage_path TEXT NOT NULL UNIQUE,
    size_bytes INTEGER NOT NULL,
    sha256 TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_user ON medical_documents(user_id, uploaded_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    fn insert_visit(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO visit_records (id, user_id, program, first_name, last_name, email, created_at, updated_at)
             VALUES (?1, 'user-1', 'generic', 'Jane', 'Doe', 'jane@x.com', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            [id],
        )
        .unwrap();
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = setup();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_symptom_entries_append_only() {
        let conn = setup();
        insert_visit(&conn, "rec-1");

        conn.execute(
            "INSERT INTO symptom_entries (id, record_id, user_id, category, frequency, intensity, created_at)
             VALUES ('s1', 'rec-1', 'user-1', 'fatigue', 'often', 'moderate', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let result = conn.execute("UPDATE symptom_entries SET notes = 'x' WHERE id = 's1'", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_symptom_requires_existing_visit() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO symptom_entries (id, record_id, user_id, category, frequency, intensity, created_at)
             VALUES ('s1', 'missing', 'user-1', 'fatigue', 'often', 'moderate', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_one_assessment_per_visit() {
        let conn = setup();
        insert_visit(&conn, "rec-1");

        let insert = |id: &str| {
            conn.execute(
                "INSERT INTO quality_of_life (id, record_id, user_id, created_at, updated_at)
                 VALUES (?1, 'rec-1', 'user-1', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
                [id],
            )
        };
        assert!(insert("q1").is_ok());
        assert!(insert("q2").is_err());
    }

    #[test]
    fn test_medication_cannot_be_reactivated() {
        let conn = setup();
        conn.execute(
            "INSERT INTO medications (id, user_id, name, dosage, frequency, status, created_at, updated_at)
             VALUES ('m1', 'user-1', 'Mestinon', '60mg', 'daily', 'discontinued', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let result = conn.execute("UPDATE medications SET status = 'active' WHERE id = 'm1'", []);
        assert!(result.is_err());

        // Other edits are still allowed
        let result = conn.execute("UPDATE medications SET notes = 'old' WHERE id = 'm1'", []);
        assert!(result.is_ok());
    }

    #[test]
    fn test_glossary_fts_trigger() {
        let conn = setup();
        conn.execute(
            "INSERT INTO glossary_terms (term, category, definition) VALUES (?, ?, ?)",
            ["Gastroparesis", "condition", "Delayed emptying of the stomach"],
        )
        .unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM glossary_terms_fts WHERE glossary_terms_fts MATCH 'stomach'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
