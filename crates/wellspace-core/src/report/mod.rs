//! Visit report: composition, layout and PDF export.
//!
//! ```text
//! VisitRecord + SymptomEntry[] + Assessment
//!         │ compose_report
//!         ▼
//!   VisitReport (blocks) ──layout_report──▶ ReportLayout ──render_pdf──▶ PDF bytes
//! ```

mod compose;
mod layout;
mod metrics;
mod pdf;

pub use compose::*;
pub use layout::*;
pub use metrics::*;
pub use pdf::*;

use thiserror::Error;

/// Document export errors. Any of these aborts the whole export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
