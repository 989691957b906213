//! Medication log models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Medication status. `Discontinued` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MedicationStatus {
    Active,
    Discontinued,
}

impl MedicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationStatus::Active => "active",
            MedicationStatus::Discontinued => "discontinued",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(MedicationStatus::Active),
            "discontinued" => Some(MedicationStatus::Discontinued),
            _ => None,
        }
    }
}

/// Medication form contents (create and edit).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MedicationForm {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub timing: Option<String>,
    pub indication: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub as_needed: bool,
    pub condition_specific: bool,
    pub target_symptoms: Vec<String>,
    pub notes: Option<String>,
}

/// A medication the user takes or has taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub timing: Option<String>,
    pub indication: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub stop_date: Option<NaiveDate>,
    pub still_using: bool,
    pub as_needed: bool,
    pub condition_specific: bool,
    pub target_symptoms: Vec<String>,
    pub notes: Option<String>,
    pub status: MedicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medication {
    /// Create an active medication from a validated form.
    pub fn new(user_id: &str, form: &MedicationForm) -> Self {
        let now = super::now();
        let mut medication = Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: String::new(),
            dosage: String::new(),
            frequency: String::new(),
            timing: None,
            indication: None,
            start_date: None,
            stop_date: None,
            still_using: true,
            as_needed: false,
            condition_specific: false,
            target_symptoms: Vec::new(),
            notes: None,
            status: MedicationStatus::Active,
            created_at: now,
            updated_at: now,
        };
        medication.apply(form);
        medication.updated_at = medication.created_at;
        medication
    }

    /// Apply edited form fields. Status and stop date are untouched.
    pub fn apply(&mut self, form: &MedicationForm) {
        self.name = form.name.trim().to_string();
        self.dosage = form.dosage.trim().to_string();
        self.frequency = form.frequency.trim().to_string();
        self.timing = optional(&form.timing);
        self.indication = optional(&form.indication);
        self.start_date = form.start_date;
        self.as_needed = form.as_needed;
        self.condition_specific = form.condition_specific;
        self.target_symptoms = form
            .target_symptoms
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.notes = optional(&form.notes);
        self.updated_at = super::now();
    }

    pub fn is_active(&self) -> bool {
        self.status == MedicationStatus::Active
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Kind of history event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    /// Dosage or frequency edited
    Change,
    /// Medication discontinued
    Stop,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Change => "change",
            HistoryKind::Stop => "stop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "change" => Some(HistoryKind::Change),
            "stop" => Some(HistoryKind::Stop),
            _ => None,
        }
    }
}

/// Append-only record of a medication change or stop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationHistoryEvent {
    pub id: String,
    pub medication_id: String,
    pub user_id: String,
    pub kind: HistoryKind,
    pub previous_dosage: Option<String>,
    pub previous_frequency: Option<String>,
    pub reason: String,
    /// Medication as JSON at the time of the event
    pub snapshot: String,
    pub event_date: DateTime<Utc>,
}

impl MedicationHistoryEvent {
    /// Event for an edit, capturing the values before the edit.
    pub fn change(previous: &Medication) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id: previous.id.clone(),
            user_id: previous.user_id.clone(),
            kind: HistoryKind::Change,
            previous_dosage: Some(previous.dosage.clone()),
            previous_frequency: Some(previous.frequency.clone()),
            reason: format!(
                "Previous dosage: {}, previous frequency: {}",
                previous.dosage, previous.frequency
            ),
            snapshot: serde_json::to_string(previous)?,
            event_date: super::now(),
        })
    }

    /// Event for a discontinuation. The snapshot is the row as it stood just
    /// before the stop was applied.
    pub fn stop(medication: &Medication, reason: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id: medication.id.clone(),
            user_id: medication.user_id.clone(),
            kind: HistoryKind::Stop,
            previous_dosage: Some(medication.dosage.clone()),
            previous_frequency: Some(medication.frequency.clone()),
            reason: reason.trim().to_string(),
            snapshot: serde_json::to_string(medication)?,
            event_date: super::now(),
        })
    }
}
