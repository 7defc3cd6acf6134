//! Pipeline controller: directory, then ingestion, then the quality gate.

mod analytics;
mod controller;
mod errors;
mod model;


pub use analytics::{AnalyticsTrigger, LoggingAnalyticsTrigger};
pub use controller::PipelineController;
pub use errors::PipelineError;
pub use model::{PipelineFailure, PipelineOutcome, PipelineRun, PipelineStatus, RunSettings};
