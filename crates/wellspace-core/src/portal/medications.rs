//! Medication log.
//!
//! Status moves one way: `active -> discontinued`. Edits to dosage or
//! frequency and every discontinuation append a history event. A failed
//! history write is logged and reported in the outcome but never rolls back
//! the medication row.

use serde::{Deserialize, Serialize};

use crate::db::{Database, DbError};
use crate::error::{WorkflowError, WorkflowResult};
use crate::identity::{require_user, IdentityProvider};
use crate::models::{
    Medication, MedicationForm, MedicationHistoryEvent, MedicationStatus,
};
use crate::validation::{validate_discontinue_reason, validate_medication};

/// Whether the accompanying history event was written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryWrite {
    /// Nothing history-worthy changed
    NotNeeded,
    Recorded,
    /// Medication saved, event lost (already logged)
    Failed,
}

/// Result of an update or discontinuation.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationOutcome {
    pub medication: Medication,
    pub history: HistoryWrite,
}

pub struct MedicationLog<'a> {
    db: &'a Database,
    identity: &'a dyn IdentityProvider,
}

impl<'a> MedicationLog<'a> {
    pub fn new(db: &'a Database, identity: &'a dyn IdentityProvider) -> Self {
        Self { db, identity }
    }

    pub fn add(&self, form: &MedicationForm) -> WorkflowResult<Medication> {
        let user_id = require_user(self.identity)?;
        validate_medication(form)?;

        let medication = Medication::new(&user_id, form);
        self.db.insert_medication(&medication)?;
        tracing::info!(medication_id = %medication.id, "Medication added");
        Ok(medication)
    }

    /// Edit a medication. Changing dosage or frequency records a `change`
    /// event carrying the previous values.
    pub fn update(&self, id: &str, form: &MedicationForm) -> WorkflowResult<MedicationOutcome> {
        let user_id = require_user(self.identity)?;
        validate_medication(form)?;

        let previous = self.owned(id, &user_id)?;
        let mut medication = previous.clone();
        medication.apply(form);
        self.db.update_medication(&medication)?;

        let changed =
            previous.dosage != medication.dosage || previous.frequency != medication.frequency;
        let history = if changed {
            self.record(MedicationHistoryEvent::change(&previous).map_err(DbError::from))
        } else {
            HistoryWrite::NotNeeded
        };

        tracing::info!(medication_id = %id, ?history, "Medication updated");
        Ok(MedicationOutcome {
            medication,
            history,
        })
    }

    /// Stop taking a medication. Requires a reason; terminal.
    pub fn discontinue(&self, id: &str, reason: &str) -> WorkflowResult<MedicationOutcome> {
        let user_id = require_user(self.identity)?;
        validate_discontinue_reason(reason)?;

        let medication = self.owned(id, &user_id)?;
        if !medication.is_active() {
            return Err(WorkflowError::AlreadyDiscontinued(id.to_string()));
        }

        let today = chrono::Local::now().date_naive();
        self.db.mark_discontinued(id, today)?;

        let stopped = self
            .db
            .get_medication(id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("Medication {}", id)))?;
        let history =
            self.record(MedicationHistoryEvent::stop(&medication, reason).map_err(DbError::from));

        tracing::info!(medication_id = %id, ?history, "Medication discontinued");
        Ok(MedicationOutcome {
            medication: stopped,
            history,
        })
    }

    /// The user's medications, newest first, optionally by status.
    pub fn list(&self, status: Option<MedicationStatus>) -> WorkflowResult<Vec<Medication>> {
        let user_id = require_user(self.identity)?;
        Ok(self.db.list_medications(&user_id, status)?)
    }

    /// History of one medication, newest first.
    pub fn history(&self, id: &str) -> WorkflowResult<Vec<MedicationHistoryEvent>> {
        let user_id = require_user(self.identity)?;
        self.owned(id, &user_id)?;
        Ok(self.db.list_history(id)?)
    }

    fn owned(&self, id: &str, user_id: &str) -> WorkflowResult<Medication> {
        self.db
            .get_medication(id)?
            .filter(|m| m.user_id == user_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("Medication {}", id)))
    }

    fn record(&self, event: Result<MedicationHistoryEvent, DbError>) -> HistoryWrite {
        match event.and_then(|e| self.db.insert_history_event(&e).map(|_| e)) {
            Ok(event) => {
                tracing::debug!(event_id = %event.id, kind = event.kind.as_str(), "History recorded");
                HistoryWrite::Recorded
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to write medication history");
                HistoryWrite::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::models::HistoryKind;

    fn form(dosage: &str) -> MedicationForm {
        MedicationForm {
            name: "Pyridostigmine".into(),
            dosage: dosage.into(),
            frequency: "3x daily".into(),
            ..Default::default()
        }
    }

    fn setup() -> (Database, FixedIdentity) {
        (
            Database::open_in_memory().unwrap(),
            FixedIdentity::signed_in("user-1"),
        )
    }

    #[test]
    fn test_add_validates() {
        let (db, identity) = setup();
        let log = MedicationLog::new(&db, &identity);

        assert!(matches!(
            log.add(&form("")),
            Err(WorkflowError::Validation(_))
        ));
        assert!(log.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_dosage_change_writes_history() {
        let (db, identity) = setup();
        let log = MedicationLog::new(&db, &identity);
        let med = log.add(&form("60mg")).unwrap();

        let outcome = log.update(&med.id, &form("90mg")).unwrap();
        assert_eq!(outcome.history, HistoryWrite::Recorded);
        assert_eq!(outcome.medication.dosage, "90mg");

        let history = log.history(&med.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, HistoryKind::Change);
        assert_eq!(history[0].previous_dosage.as_deref(), Some("60mg"));
    }

    #[test]
    fn test_note_edit_needs_no_history() {
        let (db, identity) = setup();
        let log = MedicationLog::new(&db, &identity);
        let med = log.add(&form("60mg")).unwrap();

        let mut edited = form("60mg");
        edited.notes = Some("with food".into());
        let outcome = log.update(&med.id, &edited).unwrap();
        assert_eq!(outcome.history, HistoryWrite::NotNeeded);
        assert!(log.history(&med.id).unwrap().is_empty());
    }

    #[test]
    fn test_history_failure_keeps_update() {
        let (db, identity) = setup();
        let log = MedicationLog::new(&db, &identity);
        let med = log.add(&form("60mg")).unwrap();
        db.conn().execute("DROP TABLE medication_history", []).unwrap();

        let outcome = log.update(&med.id, &form("90mg")).unwrap();
        assert_eq!(outcome.history, HistoryWrite::Failed);
        assert_eq!(db.get_medication(&med.id).unwrap().unwrap().dosage, "90mg");
    }

    #[test]
    fn test_discontinue_is_terminal() {
        let (db, identity) = setup();
        let log = MedicationLog::new(&db, &identity);
        let med = log.add(&form("60mg")).unwrap();

        assert!(matches!(
            log.discontinue(&med.id, "  "),
            Err(WorkflowError::Validation(_))
        ));

        let outcome = log.discontinue(&med.id, "side effects").unwrap();
        assert_eq!(outcome.medication.status, MedicationStatus::Discontinued);
        assert!(!outcome.medication.still_using);
        assert!(outcome.medication.stop_date.is_some());
        assert_eq!(outcome.history, HistoryWrite::Recorded);

        assert!(matches!(
            log.discontinue(&med.id, "again"),
            Err(WorkflowError::AlreadyDiscontinued(_))
        ));
        assert_eq!(log.list(Some(MedicationStatus::Active)).unwrap().len(), 0);
        assert_eq!(log.list(Some(MedicationStatus::Discontinued)).unwrap().len(), 1);
    }

    #[test]
    fn test_stop_snapshot_is_pre_stop_row() {
        let (db, identity) = setup();
        let log = MedicationLog::new(&db, &identity);
        let med = log.add(&form("60mg")).unwrap();
        log.discontinue(&med.id, "switched to IVIG").unwrap();

        let history = log.history(&med.id).unwrap();
        let snapshot: Medication = serde_json::from_str(&history[0].snapshot).unwrap();
        assert_eq!(snapshot.status, MedicationStatus::Active);
        assert!(snapshot.still_using);
        assert_eq!(snapshot.stop_date, None);
        assert_eq!(snapshot.dosage, "60mg");
    }

    #[test]
    fn test_other_users_medication_not_found() {
        let (db, identity) = setup();
        let med = MedicationLog::new(&db, &identity).add(&form("60mg")).unwrap();

        let other = FixedIdentity::signed_in("user-2");
        let log = MedicationLog::new(&db, &other);
        assert!(matches!(
            log.discontinue(&med.id, "not mine"),
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(log.history(&med.id), Err(WorkflowError::NotFound(_))));
    }
}
