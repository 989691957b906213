//! Quality-of-life assessment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::program::{ProgramSchema, QolDimension};

/// One rated dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    pub dimension: QolDimension,
    pub value: u8,
}

/// Assessment form contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentForm {
    pub ratings: Vec<Rating>,
    pub notes: Option<String>,
}

impl AssessmentForm {
    /// A fresh form: every program dimension at the scale midpoint.
    pub fn defaults(schema: &ProgramSchema) -> Self {
        let midpoint = schema.rating_scale.midpoint();
        Self {
            ratings: schema
                .dimensions
                .iter()
                .map(|&dimension| Rating {
                    dimension,
                    value: midpoint,
                })
                .collect(),
            notes: None,
        }
    }

    /// Set a dimension's rating, adding it if absent.
    pub fn set(&mut self, dimension: QolDimension, value: u8) {
        match self.ratings.iter_mut().find(|r| r.dimension == dimension) {
            Some(rating) => rating.value = value,
            None => self.ratings.push(Rating { dimension, value }),
        }
    }
}

/// Stored assessment, at most one per visit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityOfLifeAssessment {
    pub id: String,
    pub record_id: String,
    pub user_id: String,
    pub ratings: Vec<Rating>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QualityOfLifeAssessment {
    pub fn new(record_id: &str, user_id: &str, form: &AssessmentForm) -> Self {
        let now = super::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            record_id: record_id.to_string(),
            user_id: user_id.to_string(),
            ratings: form.ratings.clone(),
            notes: form
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rating(&self, dimension: QolDimension) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.dimension == dimension)
            .map(|r| r.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Program;

    #[test]
    fn test_defaults_use_midpoint() {
        let form = AssessmentForm::defaults(Program::Gpact.schema());
        assert_eq!(form.ratings.len(), 13);
        assert!(form.ratings.iter().all(|r| r.value == 5));

        let form = AssessmentForm::defaults(Program::Mg.schema());
        assert_eq!(form.ratings.len(), 10);
        assert!(form.ratings.iter().all(|r| r.value == 3));
    }

    #[test]
    fn test_set_rating() {
        let mut form = AssessmentForm::defaults(Program::Mg.schema());
        form.set(QolDimension::Sleep, 1);
        let assessment = QualityOfLifeAssessment::new("rec-1", "user-1", &form);
        assert_eq!(assessment.rating(QolDimension::Sleep), Some(1));
        assert_eq!(assessment.rating(QolDimension::SideEffects), None);
    }
}
