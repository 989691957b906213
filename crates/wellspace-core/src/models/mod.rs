//! Domain models for the Wellspace portal.

mod assessment;
mod medication;
mod profile;
mod program;
mod reference;
mod symptom;
mod visit;

pub use assessment::*;
pub use medication::*;
pub use profile::*;
pub use program::*;
pub use reference::*;
pub use symptom::*;
pub use visit::*;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the store keeps (microseconds).
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
