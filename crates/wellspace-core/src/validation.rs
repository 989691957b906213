//! Form validation.
//!
//! Every submit runs through one of these before any store call. A failure
//! carries every problem found, not just the first.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use crate::models::{
    AssessmentForm, IntakeForm, MedicationForm, ProgramSchema, SymptomDraft,
};

/// One problem with a submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Form field (or `symptoms[i]` for a batch entry)
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// All problems found in one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.issues.iter().map(|i| i.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

fn finish(issues: Vec<ValidationIssue>) -> ValidationResult {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(issues))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

// ============================================================================
// Intake
// ============================================================================

pub fn validate_intake(form: &IntakeForm) -> ValidationResult {
    let mut issues = Vec::new();

    if is_blank(&form.first_name) {
        issues.push(ValidationIssue::new("first_name", "First name is required"));
    }
    if is_blank(&form.last_name) {
        issues.push(ValidationIssue::new("last_name", "Last name is required"));
    }
    if is_blank(&form.email) {
        issues.push(ValidationIssue::new("email", "Email is required"));
    } else if !looks_like_email(&form.email) {
        issues.push(ValidationIssue::new("email", "Email address is not valid"));
    }

    if let Some(dob) = form.date_of_birth.as_deref().filter(|d| !is_blank(d)) {
        if NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d").is_err() {
            issues.push(ValidationIssue::new(
                "date_of_birth",
                "Date of birth must be yyyy-MM-dd",
            ));
        }
    }

    if let Some(years) = form.years_with_condition {
        if years > 120 {
            issues.push(ValidationIssue::new(
                "years_with_condition",
                "Years with condition is out of range",
            ));
        }
    }

    finish(issues)
}

// ============================================================================
// Symptoms
// ============================================================================

/// Validate a batch of symptom drafts against the program's closed sets.
///
/// Intensity is always required; context answers are required when the
/// category defines context questions.
pub fn validate_symptoms(schema: &ProgramSchema, drafts: &[SymptomDraft]) -> ValidationResult {
    if drafts.is_empty() {
        return finish(vec![ValidationIssue::new(
            "symptoms",
            "Add at least one symptom",
        )]);
    }

    let mut issues = Vec::new();
    for (i, draft) in drafts.iter().enumerate() {
        let field = format!("symptoms[{}]", i);
        let label = draft.category.label();

        if !schema.has_category(draft.category) {
            issues.push(ValidationIssue::new(
                &field,
                &format!("{} is not tracked in {}", label, schema.display_name),
            ));
        }

        match draft.frequency {
            None => issues.push(ValidationIssue::new(
                &field,
                &format!("{}: frequency is required", label),
            )),
            Some(frequency) if !schema.has_frequency(frequency) => {
                issues.push(ValidationIssue::new(
                    &field,
                    &format!("{}: frequency '{}' is not allowed", label, frequency.label()),
                ))
            }
            Some(_) => {}
        }

        match draft.intensity {
            None => issues.push(ValidationIssue::new(
                &field,
                &format!("{}: intensity is required", label),
            )),
            Some(intensity) if !schema.intensity.accepts(&intensity) => {
                issues.push(ValidationIssue::new(
                    &field,
                    &format!(
                        "{}: intensity must be {}",
                        label,
                        schema.intensity.describe()
                    ),
                ))
            }
            Some(_) => {}
        }

        let questions = schema.context_questions(draft.category);
        if !questions.is_empty() && draft.context_answers.iter().all(|a| is_blank(a)) {
            issues.push(ValidationIssue::new(
                &field,
                &format!("{}: answer at least one follow-up question", label),
            ));
        }
    }

    finish(issues)
}

// ============================================================================
// Quality of life
// ============================================================================

/// Every program dimension rated exactly once, within the rating scale.
pub fn validate_assessment(schema: &ProgramSchema, form: &AssessmentForm) -> ValidationResult {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let scale = schema.rating_scale;

    for rating in &form.ratings {
        let field = rating.dimension.as_str();
        if !schema.dimensions.contains(&rating.dimension) {
            issues.push(ValidationIssue::new(
                field,
                &format!("{} is not rated in {}", rating.dimension.label(), schema.display_name),
            ));
        } else if !seen.insert(rating.dimension) {
            issues.push(ValidationIssue::new(
                field,
                &format!("{} is rated more than once", rating.dimension.label()),
            ));
        }
        if !scale.contains(rating.value) {
            issues.push(ValidationIssue::new(
                field,
                &format!(
                    "{} must be between {} and {}",
                    rating.dimension.label(),
                    scale.min,
                    scale.max
                ),
            ));
        }
    }

    for dimension in schema.dimensions {
        if !seen.contains(dimension) {
            issues.push(ValidationIssue::new(
                dimension.as_str(),
                &format!("{} needs a rating", dimension.label()),
            ));
        }
    }

    finish(issues)
}

// ============================================================================
// Medications and documents
// ============================================================================

pub fn validate_medication(form: &MedicationForm) -> ValidationResult {
    let mut issues = Vec::new();

    if is_blank(&form.name) {
        issues.push(ValidationIssue::new("name", "Medication name is required"));
    }
    if is_blank(&form.dosage) {
        issues.push(ValidationIssue::new("dosage", "Dosage is required"));
    }
    if is_blank(&form.frequency) {
        issues.push(ValidationIssue::new("frequency", "Frequency is required"));
    }

    finish(issues)
}

pub fn validate_discontinue_reason(reason: &str) -> ValidationResult {
    if is_blank(reason) {
        return finish(vec![ValidationIssue::new(
            "reason",
            "Please give a reason for stopping this medication",
        )]);
    }
    Ok(())
}

pub fn validate_document(title: &str, file_name: &str, bytes: &[u8]) -> ValidationResult {
    let mut issues = Vec::new();

    if is_blank(title) {
        issues.push(ValidationIssue::new("title", "Title is required"));
    }
    if is_blank(file_name) {
        issues.push(ValidationIssue::new("file_name", "File name is required"));
    } else if file_name.contains(['/', '\\']) || file_name.trim() == ".." {
        issues.push(ValidationIssue::new(
            "file_name",
            "File name must not contain path separators",
        ));
    }
    if bytes.is_empty() {
        issues.push(ValidationIssue::new("file", "File is empty"));
    }

    finish(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Frequency, Intensity, IntensityLevel, Program, QolDimension, Rating, SymptomCategory,
    };

    fn complete(category: SymptomCategory) -> SymptomDraft {
        let mut draft = SymptomDraft::new(category);
        draft.frequency = Some(Frequency::Often);
        draft.intensity = Some(Intensity::Level(IntensityLevel::Moderate));
        draft
    }

    #[test]
    fn test_intake_requires_identity_fields() {
        let err = validate_intake(&IntakeForm::default()).unwrap_err();
        assert_eq!(err.fields(), vec!["first_name", "last_name", "email"]);

        assert!(validate_intake(&IntakeForm::new("Jane", "Doe", "jane@x.com")).is_ok());
    }

    #[test]
    fn test_intake_checks_formats() {
        let mut form = IntakeForm::new("Jane", "Doe", "jane.x.com");
        form.date_of_birth = Some("01/02/1980".into());
        let err = validate_intake(&form).unwrap_err();
        assert_eq!(err.fields(), vec!["email", "date_of_birth"]);
    }

    #[test]
    fn test_symptoms_lists_every_incomplete_entry() {
        let schema = Program::Generic.schema();
        let mut missing_intensity = complete(SymptomCategory::Fatigue);
        missing_intensity.intensity = None;
        let missing_frequency = SymptomDraft {
            frequency: None,
            ..complete(SymptomCategory::Anxiety)
        };

        let err = validate_symptoms(
            schema,
            &[complete(SymptomCategory::Fatigue), missing_intensity, missing_frequency],
        )
        .unwrap_err();

        assert_eq!(err.fields(), vec!["symptoms[1]", "symptoms[2]"]);
        assert!(err.to_string().contains("Fatigue: intensity is required"));
        assert!(err.to_string().contains("Anxiety: frequency is required"));
    }

    #[test]
    fn test_symptoms_enforce_program_sets() {
        let mg = Program::Mg.schema();

        // Frequency outside the MG scale, category from another program
        let mut draft = complete(SymptomCategory::Bloating);
        draft.frequency = Some(Frequency::Rarely);
        let err = validate_symptoms(mg, &[draft]).unwrap_err();
        assert_eq!(err.issues.len(), 2);

        let mut numeric = complete(SymptomCategory::Nausea);
        numeric.intensity = Some(Intensity::Score(7));
        let err = validate_symptoms(Program::Gpact.schema(), &[numeric]).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.to_string().contains("1 to 5"));
    }

    #[test]
    fn test_symptoms_require_context_answers() {
        let schema = Program::Generic.schema();
        let mut pain = complete(SymptomCategory::Pain);
        let err = validate_symptoms(schema, &[pain.clone()]).unwrap_err();
        assert!(err.to_string().contains("follow-up"));

        pain.context_answers = vec!["lower back".into()];
        assert!(validate_symptoms(schema, &[pain]).is_ok());
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(validate_symptoms(Program::Generic.schema(), &[]).is_err());
    }

    #[test]
    fn test_assessment_range_and_coverage() {
        let schema = Program::Mg.schema();
        let mut form = AssessmentForm::defaults(schema);
        assert!(validate_assessment(schema, &form).is_ok());

        form.set(QolDimension::Sleep, 6);
        let err = validate_assessment(schema, &form).unwrap_err();
        assert_eq!(err.fields(), vec!["sleep"]);

        let mut partial = AssessmentForm::defaults(schema);
        partial.ratings.pop();
        partial.ratings.push(Rating {
            dimension: QolDimension::Work,
            value: 2,
        });
        let err = validate_assessment(schema, &partial).unwrap_err();
        assert_eq!(err.issues.len(), 2);
    }

    #[test]
    fn test_medication_and_reason() {
        assert!(validate_medication(&MedicationForm::default()).is_err());
        assert!(validate_discontinue_reason("   ").is_err());
        assert!(validate_discontinue_reason("side effects").is_ok());
    }

    #[test]
    fn test_document_file_name() {
        assert!(validate_document("MRI", "scan.pdf", b"%PDF").is_ok());
        let err = validate_document("MRI", "../scan.pdf", b"").unwrap_err();
        assert_eq!(err.fields(), vec!["file_name", "file"]);
    }
}
