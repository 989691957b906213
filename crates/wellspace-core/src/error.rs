//! Workflow errors and how they surface to the user.

use thiserror::Error;

use crate::blob::BlobError;
use crate::db::DbError;
use crate::report::ExportError;
use crate::validation::ValidationError;
use crate::workflow::Step;

/// Errors from wizard and portal operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The parent record is committed; a dependent write failed.
    #[error("Record {record_id} saved but a dependent write failed: {source}")]
    PartialWrite {
        record_id: String,
        #[source]
        source: DbError,
    },

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Blob storage error: {0}")]
    Blob(#[from] BlobError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active visit")]
    NoActiveVisit,

    #[error("Cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: Step, to: Step },

    #[error("Medication {0} is already discontinued")]
    AlreadyDiscontinued(String),

    #[error("Visit {0} already has a quality-of-life assessment")]
    AlreadyAssessed(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// How a UI shell should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Stop the page; nothing else can proceed.
    Blocking,
    /// Transient message; the form keeps its state.
    Toast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl WorkflowError {
    /// User-facing classification of this error.
    pub fn notice(&self) -> Notice {
        let (severity, message) = match self {
            WorkflowError::NotSignedIn => (
                Severity::Blocking,
                "Please sign in to continue.".to_string(),
            ),
            WorkflowError::Store(_) => (
                Severity::Toast,
                "We couldn't reach your records. Please try again.".to_string(),
            ),
            WorkflowError::Validation(e) => (Severity::Toast, e.to_string()),
            WorkflowError::PartialWrite { .. } => (
                Severity::Toast,
                "Your visit was saved, but some symptoms were not. Please submit them again."
                    .to_string(),
            ),
            WorkflowError::Export(_) => (
                Severity::Toast,
                "The PDF report could not be generated.".to_string(),
            ),
            WorkflowError::Blob(_) => (
                Severity::Toast,
                "The file could not be stored. Please try again.".to_string(),
            ),
            WorkflowError::NotFound(what) => (Severity::Toast, format!("{} was not found.", what)),
            WorkflowError::NoActiveVisit => (
                Severity::Toast,
                "Please fill in your information first.".to_string(),
            ),
            WorkflowError::InvalidTransition { .. } => (
                Severity::Toast,
                "That step isn't available yet.".to_string(),
            ),
            WorkflowError::AlreadyDiscontinued(_) => (
                Severity::Toast,
                "This medication has already been discontinued.".to_string(),
            ),
            WorkflowError::AlreadyAssessed(_) => (
                Severity::Toast,
                "You've already submitted a quality-of-life assessment for this visit."
                    .to_string(),
            ),
        };
        Notice { severity, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationIssue;

    #[test]
    fn test_not_signed_in_blocks() {
        let notice = WorkflowError::NotSignedIn.notice();
        assert_eq!(notice.severity, Severity::Blocking);
        assert_eq!(notice.message, "Please sign in to continue.");
    }

    #[test]
    fn test_store_errors_are_toasts() {
        let err = WorkflowError::from(DbError::NotFound("visit".into()));
        assert_eq!(err.notice().severity, Severity::Toast);
    }

    #[test]
    fn test_validation_notice_lists_issues() {
        let err = WorkflowError::from(ValidationError::new(vec![
            ValidationIssue::new("first_name", "First name is required"),
            ValidationIssue::new("email", "Email is required"),
        ]));
        let notice = err.notice();
        assert_eq!(notice.severity, Severity::Toast);
        assert!(notice.message.contains("First name is required"));
        assert!(notice.message.contains("Email is required"));
    }
}
