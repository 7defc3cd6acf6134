//! Quality gate over stored price history.
//!
//! Four independent checks run against storage; the report's verdict is the
//! conjunction of the critical ones.

pub mod checks;
mod model;
mod traits;
mod validator;


pub use model::{CheckName, ValidationCheck, ValidationConfig, ValidationReport};
pub use traits::{CheckOutcome, QualityCheck, ValidationContext};
pub use validator::QualityValidator;
