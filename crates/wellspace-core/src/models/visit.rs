//! Visit record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::program::Program;

/// Intake form contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntakeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// `yyyy-MM-dd`
    pub date_of_birth: Option<String>,
    pub years_with_condition: Option<u32>,
    pub diagnosis: Option<String>,
    pub visit_reason: Option<String>,
}

impl IntakeForm {
    /// Minimal form with the required identifying fields.
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }
}

/// Parent record for one doctor-visit intake session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub program: Program,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub years_with_condition: Option<u32>,
    pub diagnosis: Option<String>,
    pub visit_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VisitRecord {
    /// Create a new visit record from a validated intake form.
    pub fn new(user_id: &str, program: Program, form: &IntakeForm) -> Self {
        let now = super::now();
        let mut record = Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            program,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: None,
            address: None,
            date_of_birth: None,
            years_with_condition: None,
            diagnosis: None,
            visit_reason: None,
            created_at: now,
            updated_at: now,
        };
        record.apply(form);
        record.updated_at = record.created_at;
        record
    }

    /// Overwrite demographic fields from a resubmitted form.
    pub fn apply(&mut self, form: &IntakeForm) {
        self.first_name = form.first_name.trim().to_string();
        self.last_name = form.last_name.trim().to_string();
        self.email = form.email.trim().to_string();
        self.phone = optional(&form.phone);
        self.address = optional(&form.address);
        self.date_of_birth = optional(&form.date_of_birth);
        self.years_with_condition = form.years_with_condition;
        self.diagnosis = optional(&form.diagnosis);
        self.visit_reason = optional(&form.visit_reason);
        self.updated_at = super::now();
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_visit_record() {
        let form = IntakeForm::new("Jane", "Doe", "jane@x.com");
        let record = VisitRecord::new("user-1", Program::Generic, &form);

        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.last_name, "Doe");
        assert_eq!(record.email, "jane@x.com");
        assert_eq!(record.id.len(), 36);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.full_name(), "Jane Doe");
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut record =
            VisitRecord::new("user-1", Program::Mg, &IntakeForm::new("Jane", "Doe", "jane@x.com"));
        let id = record.id.clone();

        let mut form = IntakeForm::new("Jane", "Smith", "jane@y.com");
        form.phone = Some("   ".into());
        form.diagnosis = Some(" generalized MG ".into());
        record.apply(&form);

        assert_eq!(record.id, id);
        assert_eq!(record.last_name, "Smith");
        assert_eq!(record.phone, None);
        assert_eq!(record.diagnosis, Some("generalized MG".into()));
    }
}
