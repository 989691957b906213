//! The wizard engine.

use super::{Step, VisitSession};
use crate::db::{Database, DbResult};
use crate::error::{WorkflowError, WorkflowResult};
use crate::identity::{require_user, IdentityProvider};
use crate::models::{
    AssessmentForm, AssessmentPolicy, IntakeForm, NavigationMode, Program, ProgramSchema,
    QualityOfLifeAssessment, SymptomDraft, SymptomEntry, VisitRecord,
};
use crate::report::{compose_report, layout_report, render_pdf, VisitReport};
use crate::timeline::{clinical_overview, group_by_day, ClinicalOverview, DayGroup, TimelineFilter};
use crate::validation::{
    validate_assessment, validate_intake, validate_symptoms, ValidationError, ValidationIssue,
};

type LoadedVisit = (VisitRecord, Vec<SymptomEntry>, Option<QualityOfLifeAssessment>);

/// Visit wizard for one program, bound to a store and an identity source.
pub struct VisitWizard<'a> {
    db: &'a Database,
    identity: &'a dyn IdentityProvider,
    schema: &'static ProgramSchema,
    policy: AssessmentPolicy,
}

impl<'a> VisitWizard<'a> {
    pub fn new(db: &'a Database, identity: &'a dyn IdentityProvider, program: Program) -> Self {
        let schema = program.schema();
        Self {
            db,
            identity,
            schema,
            policy: schema.assessment_policy,
        }
    }

    /// Override the program's assessment write policy.
    pub fn with_policy(mut self, policy: AssessmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn schema(&self) -> &'static ProgramSchema {
        self.schema
    }

    pub fn policy(&self) -> AssessmentPolicy {
        self.policy
    }

    // =========================================================================
    // Entry
    // =========================================================================

    /// Pick the starting step for a fresh page load.
    ///
    /// With a prior visit for this program the session fast-forwards to
    /// symptoms with that visit loaded. A failed lookup is logged and the
    /// session starts at intake.
    pub fn resume(&self, session: &mut VisitSession) -> WorkflowResult<Step> {
        let user_id = require_user(self.identity)?;

        let latest = self
            .db
            .latest_visit(&user_id, self.schema.program)
            .and_then(|visit| visit.map(|v| self.load_children(v)).transpose());

        match latest {
            Ok(Some((visit, entries, assessment))) => {
                tracing::info!(record_id = %visit.id, entries = entries.len(), "Resuming visit");
                session.load(visit, entries, assessment);
            }
            Ok(None) => session.clear(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load latest visit; starting at intake");
                session.clear();
            }
        }
        Ok(session.step())
    }

    fn load_children(&self, visit: VisitRecord) -> DbResult<LoadedVisit> {
        let entries = self.db.list_symptom_entries(&visit.id)?;
        let assessment = self.db.get_assessment(&visit.id)?;
        Ok((visit, entries, assessment))
    }

    fn active_visit<'s>(
        &self,
        session: &'s VisitSession,
        user_id: &str,
    ) -> WorkflowResult<&'s VisitRecord> {
        session
            .visit()
            .filter(|v| v.user_id == user_id)
            .ok_or(WorkflowError::NoActiveVisit)
    }

    /// Linear programs only accept a form on its own step.
    fn require_step(
        &self,
        session: &VisitSession,
        form_step: Step,
        to: Step,
    ) -> WorkflowResult<()> {
        let from = session.step();
        if matches!(self.schema.navigation, NavigationMode::Linear) && from != form_step {
            tracing::debug!(from = from.as_str(), to = to.as_str(), "Submit out of step");
            return Err(WorkflowError::InvalidTransition { from, to });
        }
        Ok(())
    }

    // =========================================================================
    // Intake
    // =========================================================================

    /// Submit the intake form and move to symptoms.
    ///
    /// Within a session the first submit creates the visit record; later
    /// submits update that same record. Linear programs accept intake only
    /// on the intake step.
    pub fn submit_intake(
        &self,
        session: &mut VisitSession,
        form: &IntakeForm,
    ) -> WorkflowResult<VisitRecord> {
        let user_id = require_user(self.identity)?;
        self.require_step(session, Step::Info, Step::Symptoms)?;
        validate_intake(form)?;

        let record = self.write_intake(session, &user_id, form)?;
        session.step = Step::Symptoms;
        Ok(record)
    }

    /// Submit intake together with the first symptoms.
    ///
    /// Both forms are validated before any write. If the visit is saved but
    /// the symptom batch fails, the visit stays in the session (so a retry
    /// updates it rather than creating another) and the error is
    /// [`WorkflowError::PartialWrite`].
    pub fn submit_intake_with_symptoms(
        &self,
        session: &mut VisitSession,
        form: &IntakeForm,
        drafts: &[SymptomDraft],
    ) -> WorkflowResult<Vec<SymptomEntry>> {
        let user_id = require_user(self.identity)?;
        self.require_step(session, Step::Info, Step::Symptoms)?;

        let mut issues = Vec::new();
        if let Err(e) = validate_intake(form) {
            issues.extend(e.issues);
        }
        if let Err(e) = validate_symptoms(self.schema, drafts) {
            issues.extend(e.issues);
        }
        if !issues.is_empty() {
            return Err(ValidationError::new(issues).into());
        }

        let record = self.write_intake(session, &user_id, form)?;
        let entries = build_entries(&record.id, &user_id, drafts)?;

        if let Err(source) = self.db.insert_symptom_entries(&entries) {
            tracing::error!(
                record_id = %record.id,
                error = %source,
                "Visit saved but symptom entries failed"
            );
            return Err(WorkflowError::PartialWrite {
                record_id: record.id,
                source,
            });
        }

        session.entries = self.db.list_symptom_entries(&record.id)?;
        session.step = Step::Symptoms;
        tracing::info!(record_id = %record.id, count = entries.len(), "Symptoms recorded");
        Ok(session.entries.clone())
    }

    fn write_intake(
        &self,
        session: &mut VisitSession,
        user_id: &str,
        form: &IntakeForm,
    ) -> WorkflowResult<VisitRecord> {
        let existing = session
            .visit()
            .filter(|v| v.user_id == user_id && v.program == self.schema.program)
            .cloned();

        match existing {
            Some(mut record) => {
                record.apply(form);
                if !self.db.update_visit(&record)? {
                    return Err(WorkflowError::NotFound(format!("Visit {}", record.id)));
                }
                tracing::info!(record_id = %record.id, "Visit record updated");
                session.visit = Some(record.clone());
                Ok(record)
            }
            None => {
                let record = VisitRecord::new(user_id, self.schema.program, form);
                self.db.insert_visit(&record)?;
                tracing::info!(
                    record_id = %record.id,
                    program = self.schema.program.as_str(),
                    "Visit record created"
                );
                session.visit = Some(record.clone());
                session.entries.clear();
                session.assessment = None;
                Ok(record)
            }
        }
    }

    // =========================================================================
    // Symptoms
    // =========================================================================

    /// Append a batch of symptoms to the active visit and return the
    /// reloaded entry list.
    pub fn submit_symptoms(
        &self,
        session: &mut VisitSession,
        drafts: &[SymptomDraft],
    ) -> WorkflowResult<Vec<SymptomEntry>> {
        let user_id = require_user(self.identity)?;
        let record_id = self.active_visit(session, &user_id)?.id.clone();
        self.require_step(session, Step::Symptoms, Step::Symptoms)?;
        validate_symptoms(self.schema, drafts)?;

        let entries = build_entries(&record_id, &user_id, drafts)?;
        self.db.insert_symptom_entries(&entries)?;
        tracing::info!(record_id = %record_id, count = entries.len(), "Symptoms recorded");

        session.entries = self.db.list_symptom_entries(&record_id)?;
        Ok(session.entries.clone())
    }

    /// Active visit's entries grouped by day after filtering.
    pub fn timeline(&self, session: &VisitSession, filter: &TimelineFilter) -> Vec<DayGroup> {
        group_by_day(&filter.apply(session.entries(), crate::models::now()))
    }

    pub fn overview(&self, session: &VisitSession) -> ClinicalOverview {
        clinical_overview(session.entries())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Whether `target` is reachable from the session's current step.
    pub fn can_go_to(&self, session: &VisitSession, target: Step) -> bool {
        if target == session.step() {
            return true;
        }
        if session.visit().is_none() {
            return false;
        }
        match self.schema.navigation {
            NavigationMode::Tabbed => true,
            NavigationMode::Linear => matches!(
                (session.step(), target),
                (Step::Symptoms, Step::Quality) | (Step::Symptoms, Step::Summary)
            ),
        }
    }

    pub fn go_to(&self, session: &mut VisitSession, target: Step) -> WorkflowResult<Step> {
        if !self.can_go_to(session, target) {
            return Err(WorkflowError::InvalidTransition {
                from: session.step(),
                to: target,
            });
        }
        tracing::debug!(from = session.step().as_str(), to = target.as_str(), "Step change");
        session.step = target;
        Ok(target)
    }

    /// Load one of the user's earlier visits and show its symptoms.
    pub fn select_visit(&self, session: &mut VisitSession, visit_id: &str) -> WorkflowResult<()> {
        let user_id = require_user(self.identity)?;
        let visit = self
            .db
            .get_visit(visit_id)?
            .filter(|v| v.user_id == user_id && v.program == self.schema.program)
            .ok_or_else(|| WorkflowError::NotFound(format!("Visit {}", visit_id)))?;

        let (visit, entries, assessment) = self.load_children(visit)?;
        tracing::info!(record_id = %visit.id, "Selected prior visit");
        session.load(visit, entries, assessment);
        Ok(())
    }

    /// Forget the active visit and return to intake.
    pub fn start_new_visit(&self, session: &mut VisitSession) -> Step {
        session.clear();
        session.step()
    }

    /// The user's visits for this program, newest first.
    pub fn list_visits(&self) -> WorkflowResult<Vec<VisitRecord>> {
        let user_id = require_user(self.identity)?;
        Ok(self.db.list_visits(&user_id, self.schema.program)?)
    }

    // =========================================================================
    // Quality of life
    // =========================================================================

    /// Submit the assessment for the active visit and move to summary.
    pub fn submit_assessment(
        &self,
        session: &mut VisitSession,
        form: &AssessmentForm,
    ) -> WorkflowResult<QualityOfLifeAssessment> {
        let user_id = require_user(self.identity)?;
        let record_id = self.active_visit(session, &user_id)?.id.clone();
        self.require_step(session, Step::Quality, Step::Summary)?;
        validate_assessment(self.schema, form)?;

        let assessment = QualityOfLifeAssessment::new(&record_id, &user_id, form);
        let stored = match self.policy {
            AssessmentPolicy::InsertOnce => {
                if session.assessment().is_some() || self.db.get_assessment(&record_id)?.is_some()
                {
                    return Err(WorkflowError::AlreadyAssessed(record_id));
                }
                self.db.insert_assessment(&assessment)?;
                assessment
            }
            AssessmentPolicy::Upsert => {
                self.db.upsert_assessment(&assessment)?;
                self.db.get_assessment(&record_id)?.ok_or_else(|| {
                    WorkflowError::NotFound(format!("Assessment for visit {}", record_id))
                })?
            }
        };

        tracing::info!(record_id = %record_id, policy = self.policy.as_str(), "Assessment saved");
        session.assessment = Some(stored.clone());
        session.step = Step::Summary;
        Ok(stored)
    }

    // =========================================================================
    // Summary
    // =========================================================================

    /// Compose the report for the active visit from freshly read records.
    pub fn report(&self, session: &VisitSession) -> WorkflowResult<VisitReport> {
        let user_id = require_user(self.identity)?;
        let visit = self.active_visit(session, &user_id)?.clone();
        let (visit, entries, assessment) = self.load_children(visit)?;

        Ok(compose_report(
            self.schema,
            &visit,
            &entries,
            assessment.as_ref(),
            crate::models::now(),
        ))
    }

    /// Render the active visit's report to PDF bytes.
    pub fn export_pdf(&self, session: &VisitSession) -> WorkflowResult<Vec<u8>> {
        Ok(self.export_report(session)?.1)
    }

    /// Compose the report once and render it, returning both.
    pub fn export_report(&self, session: &VisitSession) -> WorkflowResult<(VisitReport, Vec<u8>)> {
        let report = self.report(session)?;
        let layout = layout_report(&report);
        let bytes = render_pdf(&layout)?;
        tracing::info!(
            record_id = %report.record_id,
            pages = layout.page_count(),
            "Visit report exported"
        );
        Ok((report, bytes))
    }
}

fn build_entries(
    record_id: &str,
    user_id: &str,
    drafts: &[SymptomDraft],
) -> WorkflowResult<Vec<SymptomEntry>> {
    drafts
        .iter()
        .map(|draft| SymptomEntry::from_draft(record_id, user_id, draft))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            ValidationError::new(vec![ValidationIssue::new(
                "symptoms",
                "Every symptom needs a frequency and an intensity",
            )])
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::models::{Frequency, Intensity, IntensityLevel, QolDimension, SymptomCategory};

    fn setup() -> (Database, FixedIdentity) {
        (
            Database::open_in_memory().unwrap(),
            FixedIdentity::signed_in("user-1"),
        )
    }

    fn jane() -> IntakeForm {
        IntakeForm::new("Jane", "Doe", "jane@x.com")
    }

    fn draft(category: SymptomCategory) -> SymptomDraft {
        let mut draft = SymptomDraft::new(category);
        draft.frequency = Some(Frequency::Often);
        draft.intensity = Some(Intensity::Level(IntensityLevel::Moderate));
        draft
    }

    #[test]
    fn test_resume_without_history_starts_at_info() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        let mut session = VisitSession::new();

        assert_eq!(wizard.resume(&mut session).unwrap(), Step::Info);
        assert!(session.visit().is_none());
    }

    #[test]
    fn test_resume_requires_sign_in() {
        let db = Database::open_in_memory().unwrap();
        let identity = FixedIdentity::anonymous();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);

        assert!(matches!(
            wizard.resume(&mut VisitSession::new()),
            Err(WorkflowError::NotSignedIn)
        ));
    }

    #[test]
    fn test_resume_fast_forwards_to_latest_visit() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);

        let mut first = VisitSession::new();
        let record = wizard.submit_intake(&mut first, &jane()).unwrap();
        wizard
            .submit_symptoms(&mut first, &[draft(SymptomCategory::Fatigue)])
            .unwrap();

        let mut session = VisitSession::new();
        assert_eq!(wizard.resume(&mut session).unwrap(), Step::Symptoms);
        assert_eq!(session.record_id(), Some(record.id.as_str()));
        assert_eq!(session.entries().len(), 1);
    }

    #[test]
    fn test_resume_lookup_failure_stays_at_info() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        wizard
            .submit_intake(&mut VisitSession::new(), &jane())
            .unwrap();
        db.conn().execute("DROP TABLE quality_of_life", []).unwrap();

        let mut session = VisitSession::new();
        assert_eq!(wizard.resume(&mut session).unwrap(), Step::Info);
        assert!(session.visit().is_none());
    }

    #[test]
    fn test_resubmitting_intake_updates_same_record() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Gpact);
        let mut session = VisitSession::new();

        let first = wizard.submit_intake(&mut session, &jane()).unwrap();
        wizard.go_to(&mut session, Step::Info).unwrap();
        let mut form = jane();
        form.visit_reason = Some("Follow-up".into());
        let second = wizard.submit_intake(&mut session, &form).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(wizard.list_visits().unwrap().len(), 1);
        let stored = db.get_visit(&first.id).unwrap().unwrap();
        assert_eq!(stored.visit_reason, Some("Follow-up".into()));
    }

    #[test]
    fn test_invalid_intake_keeps_step_and_writes_nothing() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        let mut session = VisitSession::new();

        let err = wizard
            .submit_intake(&mut session, &IntakeForm::new("", "Doe", "jane@x.com"))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(session.step(), Step::Info);
        assert!(wizard.list_visits().unwrap().is_empty());
    }

    #[test]
    fn test_symptoms_need_active_visit() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);

        assert!(matches!(
            wizard.submit_symptoms(&mut VisitSession::new(), &[draft(SymptomCategory::Fatigue)]),
            Err(WorkflowError::NoActiveVisit)
        ));
    }

    #[test]
    fn test_intake_with_symptoms_partial_write() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        let mut session = VisitSession::new();
        db.conn().execute("DROP TABLE symptom_entries", []).unwrap();

        let err = wizard
            .submit_intake_with_symptoms(&mut session, &jane(), &[draft(SymptomCategory::Fatigue)])
            .unwrap_err();

        let record_id = match err {
            WorkflowError::PartialWrite { record_id, .. } => record_id,
            other => panic!("expected partial write, got {other:?}"),
        };
        assert_eq!(session.record_id(), Some(record_id.as_str()));
        assert_eq!(session.step(), Step::Info);
        assert!(db.get_visit(&record_id).unwrap().is_some());

        // Retry reuses the saved visit
        db.conn().execute_batch(crate::db::SCHEMA).unwrap();
        let entries = wizard
            .submit_intake_with_symptoms(&mut session, &jane(), &[draft(SymptomCategory::Fatigue)])
            .unwrap();
        assert_eq!(entries[0].record_id, record_id);
        assert_eq!(wizard.list_visits().unwrap().len(), 1);
    }

    #[test]
    fn test_linear_navigation() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Mg);
        let mut session = VisitSession::new();

        assert!(wizard.go_to(&mut session, Step::Symptoms).is_err());
        wizard.submit_intake(&mut session, &jane()).unwrap();

        assert!(wizard.go_to(&mut session, Step::Info).is_err());
        assert_eq!(wizard.go_to(&mut session, Step::Quality).unwrap(), Step::Quality);
        assert!(matches!(
            wizard.go_to(&mut session, Step::Symptoms),
            Err(WorkflowError::InvalidTransition {
                from: Step::Quality,
                to: Step::Symptoms
            })
        ));
    }

    #[test]
    fn test_tabbed_navigation() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Gpact);
        let mut session = VisitSession::new();

        assert!(wizard.go_to(&mut session, Step::Summary).is_err());
        wizard.submit_intake(&mut session, &jane()).unwrap();

        for step in [Step::Summary, Step::Info, Step::Quality, Step::Symptoms] {
            assert_eq!(wizard.go_to(&mut session, step).unwrap(), step);
        }
    }

    #[test]
    fn test_linear_submits_stay_on_their_step() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Mg);
        let mut session = VisitSession::new();
        let form = AssessmentForm::defaults(wizard.schema());

        let record = wizard.submit_intake(&mut session, &jane()).unwrap();
        assert!(matches!(
            wizard.submit_assessment(&mut session, &form),
            Err(WorkflowError::InvalidTransition {
                from: Step::Symptoms,
                to: Step::Summary
            })
        ));
        assert!(wizard.submit_intake(&mut session, &jane()).is_err());

        wizard.go_to(&mut session, Step::Quality).unwrap();
        assert!(wizard
            .submit_symptoms(&mut session, &[draft(SymptomCategory::Fatigue)])
            .is_err());
        wizard.submit_assessment(&mut session, &form).unwrap();

        // From summary nothing rewrites the visit or moves back
        let mut changed = jane();
        changed.visit_reason = Some("Changed".into());
        assert!(matches!(
            wizard.submit_intake(&mut session, &changed),
            Err(WorkflowError::InvalidTransition {
                from: Step::Summary,
                to: Step::Symptoms
            })
        ));
        assert_eq!(session.step(), Step::Summary);
        let stored = db.get_visit(&record.id).unwrap().unwrap();
        assert_eq!(stored.visit_reason, jane().visit_reason);
        assert_eq!(db.count_symptom_entries(&record.id).unwrap(), 0);
    }

    #[test]
    fn test_tabbed_submits_from_any_step() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Gpact);
        let mut session = VisitSession::new();

        wizard.submit_intake(&mut session, &jane()).unwrap();
        wizard
            .submit_assessment(&mut session, &AssessmentForm::defaults(wizard.schema()))
            .unwrap();
        assert_eq!(session.step(), Step::Summary);

        let mut nausea = SymptomDraft::new(SymptomCategory::Nausea);
        nausea.frequency = Some(Frequency::Often);
        nausea.intensity = Some(Intensity::Score(3));
        let entries = wizard.submit_symptoms(&mut session, &[nausea]).unwrap();
        assert_eq!(entries.len(), 1);
        wizard.submit_intake(&mut session, &jane()).unwrap();
        assert_eq!(session.step(), Step::Symptoms);
    }

    #[test]
    fn test_insert_once_rejects_second_assessment() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Mg);
        let mut session = VisitSession::new();
        let record = wizard.submit_intake(&mut session, &jane()).unwrap();
        wizard.go_to(&mut session, Step::Quality).unwrap();

        let form = AssessmentForm::defaults(wizard.schema());
        wizard.submit_assessment(&mut session, &form).unwrap();
        assert_eq!(session.step(), Step::Summary);

        // Come back to the same visit and try again
        wizard.select_visit(&mut session, &record.id).unwrap();
        wizard.go_to(&mut session, Step::Quality).unwrap();
        assert!(matches!(
            wizard.submit_assessment(&mut session, &form),
            Err(WorkflowError::AlreadyAssessed(_))
        ));
    }

    #[test]
    fn test_upsert_overwrites_assessment() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Gpact);
        let mut session = VisitSession::new();
        let record = wizard.submit_intake(&mut session, &jane()).unwrap();

        let mut form = AssessmentForm::defaults(wizard.schema());
        let first = wizard.submit_assessment(&mut session, &form).unwrap();
        form.set(QolDimension::Sleep, 9);
        let second = wizard.submit_assessment(&mut session, &form).unwrap();

        assert_eq!(first.id, second.id);
        let stored = db.get_assessment(&record.id).unwrap().unwrap();
        assert_eq!(stored.rating(QolDimension::Sleep), Some(9));
    }

    #[test]
    fn test_policy_override() {
        let (db, identity) = setup();
        let wizard =
            VisitWizard::new(&db, &identity, Program::Gpact).with_policy(AssessmentPolicy::InsertOnce);
        let mut session = VisitSession::new();
        wizard.submit_intake(&mut session, &jane()).unwrap();

        let form = AssessmentForm::defaults(wizard.schema());
        wizard.submit_assessment(&mut session, &form).unwrap();
        assert!(matches!(
            wizard.submit_assessment(&mut session, &form),
            Err(WorkflowError::AlreadyAssessed(_))
        ));
    }

    #[test]
    fn test_out_of_range_rating_rejected_before_store() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Mg);
        let mut session = VisitSession::new();
        let record = wizard.submit_intake(&mut session, &jane()).unwrap();
        wizard.go_to(&mut session, Step::Quality).unwrap();
        // Any store call would fail loudly
        db.conn().execute("DROP TABLE quality_of_life", []).unwrap();

        let mut form = AssessmentForm::defaults(wizard.schema());
        form.set(QolDimension::Mood, 0);
        let err = wizard.submit_assessment(&mut session, &form).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(session.record_id(), Some(record.id.as_str()));
    }

    #[test]
    fn test_select_visit_checks_owner() {
        let (db, identity) = setup();
        let other = FixedIdentity::signed_in("user-2");
        let theirs = VisitWizard::new(&db, &other, Program::Generic)
            .submit_intake(&mut VisitSession::new(), &jane())
            .unwrap();

        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        let mut session = VisitSession::new();
        assert!(matches!(
            wizard.select_visit(&mut session, &theirs.id),
            Err(WorkflowError::NotFound(_))
        ));

        let mine = wizard.submit_intake(&mut session, &jane()).unwrap();
        wizard.start_new_visit(&mut session);
        assert_eq!(session.step(), Step::Info);

        wizard.select_visit(&mut session, &mine.id).unwrap();
        assert_eq!(session.step(), Step::Symptoms);
        assert_eq!(session.record_id(), Some(mine.id.as_str()));
    }

    #[test]
    fn test_export_pdf() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        let mut session = VisitSession::new();
        wizard.submit_intake(&mut session, &jane()).unwrap();
        wizard
            .submit_symptoms(&mut session, &[draft(SymptomCategory::Fatigue)])
            .unwrap();

        let bytes = wizard.export_pdf(&session).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn test_export_report_pairs_name_with_body() {
        let (db, identity) = setup();
        let wizard = VisitWizard::new(&db, &identity, Program::Generic);
        let mut session = VisitSession::new();
        let record = wizard.submit_intake(&mut session, &jane()).unwrap();

        let (report, bytes) = wizard.export_report(&session).unwrap();
        assert_eq!(report.record_id, record.id);
        assert_eq!(
            report.file_name(),
            format!("visit-summary-{}.pdf", report.generated_at.format("%Y-%m-%d"))
        );
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}
