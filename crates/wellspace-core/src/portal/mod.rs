//! Portal pages outside the visit wizard.
//!
//! Each service borrows the store and the identity source for one call
//! sequence, the same way [`VisitWizard`](crate::workflow::VisitWizard) does.

mod glossary;
mod medications;
mod profile;
mod records;

pub use glossary::*;
pub use medications::*;
pub use profile::*;
pub use records::*;
