//! Doctor-visit wizard.
//!
//! One engine drives all three programs; the [`ProgramSchema`] plugged in
//! decides the symptom set, scales, navigation mode and assessment policy.
//!
//! ```text
//!   ┌──────┐ submit  ┌──────────┐ go to   ┌─────────┐ submit  ┌─────────┐
//!   │ info │ ──────▶ │ symptoms │ ──────▶ │ quality │ ──────▶ │ summary │
//!   └──────┘         └──────────┘ ───────────────────────────▶└─────────┘
//!      ▲        select prior visit ──▶ symptoms                     │
//!      └──────────────────── start new visit ────────────────────────┘
//! ```
//!
//! [`ProgramSchema`]: crate::models::ProgramSchema

mod wizard;

pub use wizard::*;

use serde::{Deserialize, Serialize};

use crate::models::{QualityOfLifeAssessment, SymptomEntry, VisitRecord};

/// Wizard step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Info,
    Symptoms,
    Quality,
    Summary,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Info => "info",
            Step::Symptoms => "symptoms",
            Step::Quality => "quality",
            Step::Summary => "summary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Step::Info),
            "symptoms" => Some(Step::Symptoms),
            "quality" => Some(Step::Quality),
            "summary" => Some(Step::Summary),
            _ => None,
        }
    }
}

/// Session state for one wizard: the current step and the active visit with
/// its loaded children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitSession {
    step: Step,
    visit: Option<VisitRecord>,
    entries: Vec<SymptomEntry>,
    assessment: Option<QualityOfLifeAssessment>,
}

impl VisitSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn visit(&self) -> Option<&VisitRecord> {
        self.visit.as_ref()
    }

    /// Id of the active visit record.
    pub fn record_id(&self) -> Option<&str> {
        self.visit.as_ref().map(|v| v.id.as_str())
    }

    pub fn entries(&self) -> &[SymptomEntry] {
        &self.entries
    }

    pub fn assessment(&self) -> Option<&QualityOfLifeAssessment> {
        self.assessment.as_ref()
    }

    fn load(
        &mut self,
        visit: VisitRecord,
        entries: Vec<SymptomEntry>,
        assessment: Option<QualityOfLifeAssessment>,
    ) {
        self.visit = Some(visit);
        self.entries = entries;
        self.assessment = assessment;
        self.step = Step::Symptoms;
    }

    /// Drop the active visit and return to the intake step.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IntakeForm, Program};

    #[test]
    fn test_step_parse() {
        for step in [Step::Info, Step::Symptoms, Step::Quality, Step::Summary] {
            assert_eq!(Step::parse(step.as_str()), Some(step));
        }
        assert_eq!(Step::parse("review"), None);
    }

    #[test]
    fn test_load_and_clear() {
        let mut session = VisitSession::new();
        assert_eq!(session.step(), Step::Info);
        assert_eq!(session.record_id(), None);

        let visit =
            VisitRecord::new("user-1", Program::Generic, &IntakeForm::new("Jane", "Doe", "j@x.io"));
        let id = visit.id.clone();
        session.load(visit, Vec::new(), None);
        assert_eq!(session.step(), Step::Symptoms);
        assert_eq!(session.record_id(), Some(id.as_str()));

        session.clear();
        assert_eq!(session, VisitSession::new());
    }
}
