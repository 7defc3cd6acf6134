use thiserror::Error;

use super::model::PipelineStatus;

/// Errors from driving the controller itself. A run that fails validation
/// is not an error; it is a `PipelineOutcome` with `success == false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid pipeline transition: {from} -> {to}")]
    InvalidTransition {
        from: PipelineStatus,
        to: PipelineStatus,
    },

    #[error("Pipeline is paused")]
    Paused,

    #[error("A pipeline run is already in progress ({0})")]
    RunInProgress(PipelineStatus),
}
