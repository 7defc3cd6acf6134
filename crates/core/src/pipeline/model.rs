//! Pipeline domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use eodgate_market_data::Interval;

use crate::constants::DEFAULT_LOOKBACK_DAYS;
use crate::ingestion::{FetchOutcome, IngestionStats};
use crate::validation::ValidationReport;

// =============================================================================
// Pipeline Status
// =============================================================================

/// Lifecycle of one pipeline run.
///
/// `Idle -> Running -> Validating -> {Completed | Failed}`, with `Running`
/// also allowed to fail directly on a fatal precondition. `Paused` is entered
/// and left only by an operator, between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Running,
    Validating,
    Completed,
    Failed,
    Paused,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Running => "running",
            PipelineStatus::Validating => "validating",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Paused => "paused",
        }
    }

    pub fn can_transition_to(&self, next: PipelineStatus) -> bool {
        use PipelineStatus::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Idle, Failed)
                | (Idle, Paused)
                | (Running, Validating)
                | (Running, Failed)
                | (Validating, Completed)
                | (Validating, Failed)
                | (Completed, Idle)
                | (Completed, Paused)
                | (Failed, Idle)
                | (Failed, Paused)
                | (Paused, Idle)
        )
    }

    /// True while ingestion or validation is executing.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, PipelineStatus::Running | PipelineStatus::Validating)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStatus::Completed | PipelineStatus::Failed)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pipeline Failure
// =============================================================================

/// Why a run ended with `success == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum PipelineFailure {
    /// The directory returned no active assets.
    NoActiveAssets,
    /// The directory could not be read.
    DirectoryUnavailable(String),
    /// Ingestion hit a fatal error (e.g. storage unreachable).
    IngestionAborted(String),
    /// The quality gate did not pass.
    ValidationFailed,
    /// The run future was dropped before it finished.
    Interrupted,
}

impl PipelineFailure {
    /// Fatal preconditions abort before or during ingestion; a validation
    /// failure is a normal gated outcome.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineFailure::ValidationFailed)
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineFailure::NoActiveAssets => write!(f, "No active assets found"),
            PipelineFailure::DirectoryUnavailable(e) => {
                write!(f, "Asset directory unavailable: {}", e)
            }
            PipelineFailure::IngestionAborted(e) => write!(f, "Ingestion aborted: {}", e),
            PipelineFailure::ValidationFailed => write!(f, "Data validation failed"),
            PipelineFailure::Interrupted => write!(f, "Run interrupted before completion"),
        }
    }
}

// =============================================================================
// Pipeline Run
// =============================================================================

/// Record of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: String,
    pub status: PipelineStatus,
    pub stats: Option<IngestionStats>,
    pub validation: Option<ValidationReport>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub failure: Option<PipelineFailure>,
}

impl PipelineRun {
    pub(crate) fn start(status: PipelineStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status,
            stats: None,
            validation: None,
            started_at: Utc::now(),
            ended_at: None,
            failure: None,
        }
    }

    /// Wall-clock duration, once the run has ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

/// What `PipelineController::run` hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub success: bool,
    pub stats: Option<IngestionStats>,
    pub validation: Option<ValidationReport>,
    /// Per-symbol outcomes behind `stats`
    pub outcomes: Vec<FetchOutcome>,
    pub run: PipelineRun,
}

impl PipelineOutcome {
    pub fn failure(&self) -> Option<&PipelineFailure> {
        self.run.failure.as_ref()
    }
}

// =============================================================================
// Run Settings
// =============================================================================

/// Range and granularity requested on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub lookback_days: u32,
    pub interval: Interval,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            interval: Interval::Daily,
        }
    }
}
