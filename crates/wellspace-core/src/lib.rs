//! Wellspace Core Library
//!
//! Patient-portal backend: doctor-visit wizard, symptom timeline, medication
//! log, health profile, glossary and medical record files.
//!
//! # Architecture
//!
//! ```text
//!   Host UI shell (FFI)
//!          │
//!   ┌──────▼──────────────────────────────────────────────┐
//!   │ WellspaceCore                                       │
//!   │   VisitWizard ── ProgramSchema (gpact | mg | generic)│
//!   │   MedicationLog · Glossary · RecordLibrary · profile│
//!   └──────┬───────────────┬───────────────┬──────────────┘
//!          │               │               │
//!       Database        BlobStore      report → PDF
//!       (SQLite)       (filesystem)     (printpdf)
//! ```
//!
//! # Core Principle
//!
//! **One wizard engine for every program.** Category sets, scales,
//! navigation and the assessment write policy come from the program schema,
//! never from per-program copies of the flow.
//!
//! # Modules
//!
//! - [`db`]: SQLite record store with FTS5 glossary search
//! - [`models`]: Domain types and program schemas
//! - [`workflow`]: Visit wizard state machine and session
//! - [`timeline`]: Day grouping, filters and clinical analytics
//! - [`report`]: Report composition, layout and PDF rendering
//! - [`portal`]: Medications, health profile, glossary, record files
//! - [`validation`], [`identity`], [`blob`], [`config`], [`error`]

pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod portal;
pub mod report;
pub mod timeline;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use blob::{BlobStore, FsBlobStore};
pub use config::WellspaceConfig;
pub use db::Database;
pub use error::{Notice, Severity, WorkflowError};
pub use identity::{FixedIdentity, IdentityProvider};
pub use models::{
    AssessmentPolicy, IntakeForm, Medication, MedicationStatus, Program, SymptomCategory,
    SymptomDraft, SymptomEntry, VisitRecord,
};
pub use portal::{Glossary, MedicationLog, RecordLibrary};
pub use workflow::{Step, VisitSession, VisitWizard};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use models::{
    AssessmentForm, Frequency, GlossaryTerm, Intensity, MedicalDocument,
    MedicationForm, MedicationHistoryEvent, QolDimension, QualityOfLifeAssessment, Rating,
    TimeOfDay, Trigger,
};
use portal::{GlossaryHit, HistoryWrite, MedicationOutcome};
use timeline::{intensity_color, DateRange, DayGroup, TimelineFilter};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum WellspaceError {
    #[error("Please sign in to continue.")]
    NotSignedIn,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Partially saved: {0}")]
    PartialWrite(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for WellspaceError {
    fn from(e: db::DbError) -> Self {
        WellspaceError::DatabaseError(e.to_string())
    }
}

impl From<WorkflowError> for WellspaceError {
    fn from(e: WorkflowError) -> Self {
        let message = e.notice().message;
        match e {
            WorkflowError::NotSignedIn => WellspaceError::NotSignedIn,
            WorkflowError::Store(inner) => inner.into(),
            WorkflowError::Validation(inner) => WellspaceError::InvalidInput(inner.to_string()),
            WorkflowError::PartialWrite { record_id, source } => {
                WellspaceError::PartialWrite(format!("visit {}: {}", record_id, source))
            }
            WorkflowError::Export(inner) => WellspaceError::ExportError(inner.to_string()),
            WorkflowError::Blob(inner) => WellspaceError::StorageError(inner.to_string()),
            WorkflowError::NotFound(what) => WellspaceError::NotFound(what),
            WorkflowError::NoActiveVisit
            | WorkflowError::InvalidTransition { .. }
            | WorkflowError::AlreadyDiscontinued(_)
            | WorkflowError::AlreadyAssessed(_) => WellspaceError::InvalidState(message),
        }
    }
}

impl From<config::ConfigError> for WellspaceError {
    fn from(e: config::ConfigError) -> Self {
        WellspaceError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for WellspaceError {
    fn from(e: serde_json::Error) -> Self {
        WellspaceError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for WellspaceError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        WellspaceError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn invalid_input(field: &str, value: &str) -> WellspaceError {
    WellspaceError::InvalidInput(format!("{}: {}", field, value))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path for one program.
#[uniffi::export]
pub fn open_database(path: String, program: String) -> Result<Arc<WellspaceCore>, WellspaceError> {
    let program = parse_program(&program)?;
    let db = Database::open(&path)?;
    Ok(Arc::new(WellspaceCore::new(
        db,
        program,
        program.schema().assessment_policy,
        None,
    )))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(program: String) -> Result<Arc<WellspaceCore>, WellspaceError> {
    let program = parse_program(&program)?;
    let db = Database::open_in_memory()?;
    Ok(Arc::new(WellspaceCore::new(
        db,
        program,
        program.schema().assessment_policy,
        None,
    )))
}

/// Build a core from a JSON config file, or from `WELLSPACE_*` variables when
/// no path is given. Also installs logging.
#[uniffi::export]
pub fn open_with_config(config_path: Option<String>) -> Result<Arc<WellspaceCore>, WellspaceError> {
    let settings = match config_path {
        Some(path) => WellspaceConfig::from_json_file(path)?,
        None => WellspaceConfig::from_env()?,
    };
    config::init_logging(&settings.log_filter);

    let db = match &settings.db_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    tracing::info!(
        program = settings.program.as_str(),
        policy = settings.assessment_policy().as_str(),
        "Core opened"
    );
    Ok(Arc::new(WellspaceCore::new(
        db,
        settings.program,
        settings.assessment_policy(),
        settings.blob_dir.as_ref().map(FsBlobStore::new),
    )))
}

fn parse_program(value: &str) -> Result<Program, WellspaceError> {
    Program::parse(value).ok_or_else(|| invalid_input("program", value))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe handle for one signed-in portal session.
#[derive(uniffi::Object)]
pub struct WellspaceCore {
    db: Arc<Mutex<Database>>,
    user: Mutex<Option<String>>,
    session: Mutex<VisitSession>,
    blobs: Option<FsBlobStore>,
    program: Program,
    policy: AssessmentPolicy,
}

impl WellspaceCore {
    fn new(
        db: Database,
        program: Program,
        policy: AssessmentPolicy,
        blobs: Option<FsBlobStore>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            user: Mutex::new(None),
            session: Mutex::new(VisitSession::new()),
            blobs,
            program,
            policy,
        }
    }

    fn identity(&self) -> Result<FixedIdentity, WellspaceError> {
        let user = self.user.lock()?;
        Ok(match user.as_deref() {
            Some(id) => FixedIdentity::signed_in(id),
            None => FixedIdentity::anonymous(),
        })
    }

    fn blobs(&self) -> Result<&FsBlobStore, WellspaceError> {
        self.blobs
            .as_ref()
            .ok_or_else(|| WellspaceError::ConfigError("Blob storage is not configured".into()))
    }

    /// Run `f` with a wizard and the session, holding the database lock
    /// first and the session lock second.
    fn with_wizard<T>(
        &self,
        f: impl FnOnce(&VisitWizard<'_>, &mut VisitSession) -> Result<T, WorkflowError>,
    ) -> Result<T, WellspaceError> {
        let identity = self.identity()?;
        let db = self.db.lock()?;
        let mut session = self.session.lock()?;
        let wizard = VisitWizard::new(&db, &identity, self.program).with_policy(self.policy);
        Ok(f(&wizard, &mut session)?)
    }
}

#[uniffi::export]
impl WellspaceCore {
    // =========================================================================
    // Identity
    // =========================================================================

    /// Set the signed-in user. Switching users drops the active visit.
    pub fn sign_in(&self, user_id: String) -> Result<(), WellspaceError> {
        let mut user = self.user.lock()?;
        if user.as_deref() != Some(user_id.as_str()) {
            *self.session.lock()? = VisitSession::new();
        }
        *user = Some(user_id);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), WellspaceError> {
        *self.user.lock()? = None;
        *self.session.lock()? = VisitSession::new();
        Ok(())
    }

    pub fn program(&self) -> String {
        self.program.as_str().to_string()
    }

    // =========================================================================
    // Visit Wizard
    // =========================================================================

    pub fn current_step(&self) -> Result<String, WellspaceError> {
        Ok(self.session.lock()?.step().as_str().to_string())
    }

    pub fn active_record_id(&self) -> Result<Option<String>, WellspaceError> {
        Ok(self.session.lock()?.record_id().map(str::to_string))
    }

    /// Pick the starting step: `info`, or `symptoms` with the latest visit loaded.
    pub fn resume(&self) -> Result<String, WellspaceError> {
        self.with_wizard(|wizard, session| wizard.resume(session))
            .map(|step| step.as_str().to_string())
    }

    pub fn submit_intake(&self, form: FfiIntakeForm) -> Result<FfiVisitRecord, WellspaceError> {
        let form: IntakeForm = form.into();
        self.with_wizard(|wizard, session| wizard.submit_intake(session, &form))
            .map(Into::into)
    }

    /// Intake and first symptoms in one submit.
    pub fn submit_intake_with_symptoms(
        &self,
        form: FfiIntakeForm,
        drafts: Vec<FfiSymptomDraft>,
    ) -> Result<Vec<FfiSymptomEntry>, WellspaceError> {
        let form: IntakeForm = form.into();
        let drafts = drafts
            .into_iter()
            .map(SymptomDraft::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let entries = self.with_wizard(|wizard, session| {
            wizard.submit_intake_with_symptoms(session, &form, &drafts)
        })?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    pub fn submit_symptoms(
        &self,
        drafts: Vec<FfiSymptomDraft>,
    ) -> Result<Vec<FfiSymptomEntry>, WellspaceError> {
        let drafts = drafts
            .into_iter()
            .map(SymptomDraft::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let entries =
            self.with_wizard(|wizard, session| wizard.submit_symptoms(session, &drafts))?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Active visit's symptom entries in submission order.
    pub fn symptom_entries(&self) -> Result<Vec<FfiSymptomEntry>, WellspaceError> {
        let session = self.session.lock()?;
        Ok(session.entries().iter().cloned().map(Into::into).collect())
    }

    pub fn go_to(&self, step: String) -> Result<String, WellspaceError> {
        let target = Step::parse(&step).ok_or_else(|| invalid_input("step", &step))?;
        self.with_wizard(|wizard, session| wizard.go_to(session, target))
            .map(|step| step.as_str().to_string())
    }

    /// Midpoint defaults for the assessment form.
    pub fn assessment_defaults(&self) -> Vec<FfiRating> {
        AssessmentForm::defaults(self.program.schema())
            .ratings
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub fn submit_assessment(
        &self,
        ratings: Vec<FfiRating>,
        notes: Option<String>,
    ) -> Result<FfiAssessment, WellspaceError> {
        let form = AssessmentForm {
            ratings: ratings
                .into_iter()
                .map(Rating::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            notes,
        };
        self.with_wizard(|wizard, session| wizard.submit_assessment(session, &form))
            .map(Into::into)
    }

    pub fn list_visits(&self) -> Result<Vec<FfiVisitRecord>, WellspaceError> {
        let visits = self.with_wizard(|wizard, _| wizard.list_visits())?;
        Ok(visits.into_iter().map(Into::into).collect())
    }

    pub fn select_visit(&self, visit_id: String) -> Result<(), WellspaceError> {
        self.with_wizard(|wizard, session| wizard.select_visit(session, &visit_id))
    }

    pub fn start_new_visit(&self) -> Result<String, WellspaceError> {
        self.with_wizard(|wizard, session| Ok(wizard.start_new_visit(session)))
            .map(|step| step.as_str().to_string())
    }

    // =========================================================================
    // Timeline
    // =========================================================================

    /// Entries grouped by day, newest day first.
    ///
    /// `category` is a category key or `None` for all; `range` is one of
    /// `7d`, `30d`, `90d`, `all`.
    pub fn timeline(
        &self,
        category: Option<String>,
        range: String,
    ) -> Result<Vec<FfiDayGroup>, WellspaceError> {
        let category = category
            .map(|c| SymptomCategory::parse(&c).ok_or_else(|| invalid_input("category", &c)))
            .transpose()?;
        let range = DateRange::parse(&range).ok_or_else(|| invalid_input("range", &range))?;
        let filter = TimelineFilter { category, range };

        let groups = self.with_wizard(|wizard, session| Ok(wizard.timeline(session, &filter)))?;
        Ok(groups.into_iter().map(Into::into).collect())
    }

    /// Clinical overview of the active visit as JSON.
    pub fn clinical_overview_json(&self) -> Result<String, WellspaceError> {
        let overview = self.with_wizard(|wizard, session| Ok(wizard.overview(session)))?;
        Ok(serde_json::to_string(&overview)?)
    }

    // =========================================================================
    // Report Export
    // =========================================================================

    /// Extractable text of the laid-out report.
    pub fn report_text(&self) -> Result<String, WellspaceError> {
        let visit_report = self.with_wizard(|wizard, session| wizard.report(session))?;
        Ok(report::layout_report(&visit_report).plain_text())
    }

    pub fn export_report_pdf(&self) -> Result<Vec<u8>, WellspaceError> {
        self.with_wizard(|wizard, session| wizard.export_pdf(session))
    }

    /// Export and write the PDF into `dir`; returns the written path.
    pub fn save_report_pdf(&self, dir: String) -> Result<String, WellspaceError> {
        let (visit_report, bytes) =
            self.with_wizard(|wizard, session| wizard.export_report(session))?;
        let path = std::path::Path::new(&dir).join(visit_report.file_name());
        let written = report::save_pdf(&bytes, &path)
            .map_err(|e| WellspaceError::ExportError(e.to_string()))?;
        Ok(written.to_string_lossy().into_owned())
    }

    // =========================================================================
    // Medications
    // =========================================================================

    pub fn add_medication(&self, form: FfiMedicationForm) -> Result<FfiMedication, WellspaceError> {
        let form = MedicationForm::try_from(form)?;
        let identity = self.identity()?;
        let db = self.db.lock()?;
        Ok(MedicationLog::new(&db, &identity).add(&form)?.into())
    }

    pub fn update_medication(
        &self,
        id: String,
        form: FfiMedicationForm,
    ) -> Result<FfiMedicationOutcome, WellspaceError> {
        let form = MedicationForm::try_from(form)?;
        let identity = self.identity()?;
        let db = self.db.lock()?;
        Ok(MedicationLog::new(&db, &identity).update(&id, &form)?.into())
    }

    pub fn discontinue_medication(
        &self,
        id: String,
        reason: String,
    ) -> Result<FfiMedicationOutcome, WellspaceError> {
        let identity = self.identity()?;
        let db = self.db.lock()?;
        Ok(MedicationLog::new(&db, &identity)
            .discontinue(&id, &reason)?
            .into())
    }

    /// `status` is `active`, `discontinued` or `None` for both.
    pub fn list_medications(
        &self,
        status: Option<String>,
    ) -> Result<Vec<FfiMedication>, WellspaceError> {
        let status = status
            .map(|s| MedicationStatus::parse(&s).ok_or_else(|| invalid_input("status", &s)))
            .transpose()?;
        let identity = self.identity()?;
        let db = self.db.lock()?;
        let medications = MedicationLog::new(&db, &identity).list(status)?;
        Ok(medications.into_iter().map(Into::into).collect())
    }

    pub fn medication_history(&self, id: String) -> Result<Vec<FfiHistoryEvent>, WellspaceError> {
        let identity = self.identity()?;
        let db = self.db.lock()?;
        let events = MedicationLog::new(&db, &identity).history(&id)?;
        Ok(events.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Health Profile
    // =========================================================================

    /// The user's health profile as JSON.
    pub fn health_profile_json(&self) -> Result<String, WellspaceError> {
        let identity = self.identity()?;
        let db = self.db.lock()?;
        let profile = portal::load_health_profile(&db, &identity)?;
        Ok(serde_json::to_string(&profile)?)
    }

    pub fn save_health_profile_json(&self, json: String) -> Result<(), WellspaceError> {
        let profile = serde_json::from_str(&json)?;
        let identity = self.identity()?;
        let db = self.db.lock()?;
        portal::save_health_profile(&db, &identity, profile)?;
        Ok(())
    }

    // =========================================================================
    // Glossary
    // =========================================================================

    /// Administrative import of a glossary term.
    pub fn upsert_glossary_term(&self, term: FfiGlossaryTerm) -> Result<(), WellspaceError> {
        let db = self.db.lock()?;
        db.upsert_glossary_term(&term.into())?;
        Ok(())
    }

    pub fn list_glossary(
        &self,
        category: Option<String>,
    ) -> Result<Vec<FfiGlossaryTerm>, WellspaceError> {
        let db = self.db.lock()?;
        let terms = Glossary::new(&db).list(category.as_deref())?;
        Ok(terms.into_iter().map(Into::into).collect())
    }

    pub fn search_glossary(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiGlossaryHit>, WellspaceError> {
        let db = self.db.lock()?;
        let hits = Glossary::new(&db).search(&query, limit as usize)?;
        Ok(hits.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Medical Records
    // =========================================================================

    pub fn upload_document(
        &self,
        title: String,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<FfiDocument, WellspaceError> {
        let identity = self.identity()?;
        let blobs = self.blobs()?;
        let db = self.db.lock()?;
        Ok(RecordLibrary::new(&db, &identity, blobs)
            .upload(&title, &file_name, &bytes)?
            .into())
    }

    pub fn list_documents(&self) -> Result<Vec<FfiDocument>, WellspaceError> {
        let identity = self.identity()?;
        let blobs = self.blobs()?;
        let db = self.db.lock()?;
        let documents = RecordLibrary::new(&db, &identity, blobs).list()?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    pub fn download_document(&self, id: String) -> Result<Vec<u8>, WellspaceError> {
        let identity = self.identity()?;
        let blobs = self.blobs()?;
        let db = self.db.lock()?;
        let (_, bytes) = RecordLibrary::new(&db, &identity, blobs).download(&id)?;
        Ok(bytes)
    }

    pub fn delete_document(&self, id: String) -> Result<(), WellspaceError> {
        let identity = self.identity()?;
        let blobs = self.blobs()?;
        let db = self.db.lock()?;
        RecordLibrary::new(&db, &identity, blobs).delete(&id)?;
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

fn parse_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, WellspaceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| invalid_input(field, &v))
        })
        .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// FFI-safe intake form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIntakeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub years_with_condition: Option<u32>,
    pub diagnosis: Option<String>,
    pub visit_reason: Option<String>,
}

impl From<FfiIntakeForm> for IntakeForm {
    fn from(form: FfiIntakeForm) -> Self {
        IntakeForm {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            address: form.address,
            date_of_birth: form.date_of_birth,
            years_with_condition: form.years_with_condition,
            diagnosis: form.diagnosis,
            visit_reason: form.visit_reason,
        }
    }
}

/// FFI-safe visit record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitRecord {
    pub id: String,
    pub program: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub years_with_condition: Option<u32>,
    pub diagnosis: Option<String>,
    pub visit_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<VisitRecord> for FfiVisitRecord {
    fn from(visit: VisitRecord) -> Self {
        Self {
            id: visit.id,
            program: visit.program.as_str().to_string(),
            first_name: visit.first_name,
            last_name: visit.last_name,
            email: visit.email,
            phone: visit.phone,
            address: visit.address,
            date_of_birth: visit.date_of_birth,
            years_with_condition: visit.years_with_condition,
            diagnosis: visit.diagnosis,
            visit_reason: visit.visit_reason,
            created_at: visit.created_at.to_rfc3339(),
            updated_at: visit.updated_at.to_rfc3339(),
        }
    }
}

/// FFI-safe symptom draft. Enums travel as their storage keys.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptomDraft {
    pub category: String,
    pub frequency: Option<String>,
    /// `mild` / `moderate` / `severe` or a number
    pub intensity: Option<String>,
    pub notes: Option<String>,
    pub treatments: Vec<String>,
    pub context_answers: Vec<String>,
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
    pub night: bool,
    pub trigger_present: bool,
    pub trigger_description: Option<String>,
    pub onset_date: Option<String>,
}

impl TryFrom<FfiSymptomDraft> for SymptomDraft {
    type Error = WellspaceError;

    fn try_from(draft: FfiSymptomDraft) -> Result<Self, Self::Error> {
        let category = SymptomCategory::parse(&draft.category)
            .ok_or_else(|| invalid_input("category", &draft.category))?;
        let frequency = draft
            .frequency
            .filter(|f| !f.trim().is_empty())
            .map(|f| Frequency::parse(&f).ok_or_else(|| invalid_input("frequency", &f)))
            .transpose()?;
        let intensity = draft
            .intensity
            .filter(|i| !i.trim().is_empty())
            .map(|i| Intensity::parse(&i).ok_or_else(|| invalid_input("intensity", &i)))
            .transpose()?;

        Ok(SymptomDraft {
            category,
            frequency,
            intensity,
            notes: draft.notes,
            treatments: draft.treatments,
            context_answers: draft.context_answers,
            time_of_day: TimeOfDay {
                morning: draft.morning,
                afternoon: draft.afternoon,
                evening: draft.evening,
                night: draft.night,
            },
            trigger: Trigger {
                present: draft.trigger_present,
                description: draft.trigger_description,
            },
            onset_date: parse_date("onset_date", draft.onset_date)?,
        })
    }
}

/// FFI-safe symptom entry with display fields resolved.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptomEntry {
    pub id: String,
    pub record_id: String,
    pub category: String,
    pub category_label: String,
    pub frequency: String,
    pub intensity: String,
    pub intensity_label: String,
    /// `#rrggbb` on the green-to-red scale
    pub intensity_color: String,
    pub notes: Option<String>,
    pub treatments: Vec<String>,
    pub context_answers: Vec<String>,
    pub time_of_day: Vec<String>,
    pub trigger_present: bool,
    pub trigger_description: Option<String>,
    pub onset_date: Option<String>,
    pub created_at: String,
}

impl From<SymptomEntry> for FfiSymptomEntry {
    fn from(entry: SymptomEntry) -> Self {
        Self {
            id: entry.id,
            record_id: entry.record_id,
            category: entry.category.as_str().to_string(),
            category_label: entry.category.label().to_string(),
            frequency: entry.frequency.as_str().to_string(),
            intensity: entry.intensity.as_storage(),
            intensity_label: entry.intensity.label(),
            intensity_color: intensity_color(entry.intensity.level()).hex(),
            notes: entry.notes,
            treatments: entry.treatments,
            context_answers: entry.context_answers,
            time_of_day: entry
                .time_of_day
                .labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
            trigger_present: entry.trigger.present,
            trigger_description: entry.trigger.description,
            onset_date: format_date(entry.onset_date),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// FFI-safe timeline day.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDayGroup {
    /// `yyyy-MM-dd`
    pub date: String,
    pub entries: Vec<FfiSymptomEntry>,
}

impl From<DayGroup> for FfiDayGroup {
    fn from(group: DayGroup) -> Self {
        Self {
            date: group.key(),
            entries: group.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-safe rating.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRating {
    pub dimension: String,
    pub label: String,
    pub value: u8,
}

impl From<Rating> for FfiRating {
    fn from(rating: Rating) -> Self {
        Self {
            dimension: rating.dimension.as_str().to_string(),
            label: rating.dimension.label().to_string(),
            value: rating.value,
        }
    }
}

impl TryFrom<FfiRating> for Rating {
    type Error = WellspaceError;

    fn try_from(rating: FfiRating) -> Result<Self, Self::Error> {
        let dimension = QolDimension::parse(&rating.dimension)
            .ok_or_else(|| invalid_input("dimension", &rating.dimension))?;
        Ok(Rating {
            dimension,
            value: rating.value,
        })
    }
}

/// FFI-safe quality-of-life assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssessment {
    pub id: String,
    pub record_id: String,
    pub ratings: Vec<FfiRating>,
    pub notes: Option<String>,
    pub updated_at: String,
}

impl From<QualityOfLifeAssessment> for FfiAssessment {
    fn from(assessment: QualityOfLifeAssessment) -> Self {
        Self {
            id: assessment.id,
            record_id: assessment.record_id,
            ratings: assessment.ratings.into_iter().map(Into::into).collect(),
            notes: assessment.notes,
            updated_at: assessment.updated_at.to_rfc3339(),
        }
    }
}

/// FFI-safe medication form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationForm {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub timing: Option<String>,
    pub indication: Option<String>,
    pub start_date: Option<String>,
    pub as_needed: bool,
    pub condition_specific: bool,
    pub target_symptoms: Vec<String>,
    pub notes: Option<String>,
}

impl TryFrom<FfiMedicationForm> for MedicationForm {
    type Error = WellspaceError;

    fn try_from(form: FfiMedicationForm) -> Result<Self, Self::Error> {
        Ok(MedicationForm {
            name: form.name,
            dosage: form.dosage,
            frequency: form.frequency,
            timing: form.timing,
            indication: form.indication,
            start_date: parse_date("start_date", form.start_date)?,
            as_needed: form.as_needed,
            condition_specific: form.condition_specific,
            target_symptoms: form.target_symptoms,
            notes: form.notes,
        })
    }
}

/// FFI-safe medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub timing: Option<String>,
    pub indication: Option<String>,
    pub start_date: Option<String>,
    pub stop_date: Option<String>,
    pub still_using: bool,
    pub as_needed: bool,
    pub condition_specific: bool,
    pub target_symptoms: Vec<String>,
    pub notes: Option<String>,
    pub status: String,
}

impl From<Medication> for FfiMedication {
    fn from(medication: Medication) -> Self {
        Self {
            id: medication.id,
            name: medication.name,
            dosage: medication.dosage,
            frequency: medication.frequency,
            timing: medication.timing,
            indication: medication.indication,
            start_date: format_date(medication.start_date),
            stop_date: format_date(medication.stop_date),
            still_using: medication.still_using,
            as_needed: medication.as_needed,
            condition_specific: medication.condition_specific,
            target_symptoms: medication.target_symptoms,
            notes: medication.notes,
            status: medication.status.as_str().to_string(),
        }
    }
}

/// FFI-safe update/discontinue outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationOutcome {
    pub medication: FfiMedication,
    /// `not_needed`, `recorded` or `failed`
    pub history: String,
}

impl From<MedicationOutcome> for FfiMedicationOutcome {
    fn from(outcome: MedicationOutcome) -> Self {
        let history = match outcome.history {
            HistoryWrite::NotNeeded => "not_needed",
            HistoryWrite::Recorded => "recorded",
            HistoryWrite::Failed => "failed",
        };
        Self {
            medication: outcome.medication.into(),
            history: history.to_string(),
        }
    }
}

/// FFI-safe medication history event.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryEvent {
    pub id: String,
    pub medication_id: String,
    pub kind: String,
    pub previous_dosage: Option<String>,
    pub previous_frequency: Option<String>,
    pub reason: String,
    pub snapshot: String,
    pub event_date: String,
}

impl From<MedicationHistoryEvent> for FfiHistoryEvent {
    fn from(event: MedicationHistoryEvent) -> Self {
        Self {
            id: event.id,
            medication_id: event.medication_id,
            kind: event.kind.as_str().to_string(),
            previous_dosage: event.previous_dosage,
            previous_frequency: event.previous_frequency,
            reason: event.reason,
            snapshot: event.snapshot,
            event_date: event.event_date.to_rfc3339(),
        }
    }
}

/// FFI-safe glossary term.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGlossaryTerm {
    pub term: String,
    pub category: String,
    pub definition: String,
}

impl From<GlossaryTerm> for FfiGlossaryTerm {
    fn from(term: GlossaryTerm) -> Self {
        Self {
            term: term.term,
            category: term.category,
            definition: term.definition,
        }
    }
}

impl From<FfiGlossaryTerm> for GlossaryTerm {
    fn from(term: FfiGlossaryTerm) -> Self {
        GlossaryTerm {
            term: term.term,
            category: term.category,
            definition: term.definition,
        }
    }
}

/// FFI-safe glossary search hit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGlossaryHit {
    pub term: FfiGlossaryTerm,
    pub score: f64,
}

impl From<GlossaryHit> for FfiGlossaryHit {
    fn from(hit: GlossaryHit) -> Self {
        Self {
            term: hit.term.into(),
            score: hit.score,
        }
    }
}

/// FFI-safe medical document metadata.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDocument {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub uploaded_at: String,
}

impl From<MedicalDocument> for FfiDocument {
    fn from(document: MedicalDocument) -> Self {
        Self {
            id: document.id,
            title: document.title,
            file_name: document.file_name,
            size_bytes: document.size_bytes,
            sha256: document.sha256,
            uploaded_at: document.uploaded_at.to_rfc3339(),
        }
    }
}
