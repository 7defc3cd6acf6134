//! Pipeline controller.
//!
//! Sequences one run: list active assets, ingest, validate, and hand off to
//! analytics only when the quality gate passed. Status changes go through
//! [`PipelineStatus::can_transition_to`]; nothing else mutates them.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use super::analytics::AnalyticsTrigger;
use super::errors::PipelineError;
use super::model::{PipelineFailure, PipelineOutcome, PipelineRun, PipelineStatus, RunSettings};
use crate::assets::AssetDirectory;
use crate::ingestion::{FetchOutcome, IngestionOrchestrator};
use crate::validation::QualityValidator;

#[derive(Debug, Default)]
struct ControllerState {
    status: PipelineStatus,
    last_run: Option<PipelineRun>,
}

pub struct PipelineController {
    directory: Arc<dyn AssetDirectory>,
    orchestrator: IngestionOrchestrator,
    validator: QualityValidator,
    analytics: Arc<dyn AnalyticsTrigger>,
    settings: RunSettings,
    state: Mutex<ControllerState>,
}

impl PipelineController {
    pub fn new(
        directory: Arc<dyn AssetDirectory>,
        orchestrator: IngestionOrchestrator,
        validator: QualityValidator,
        analytics: Arc<dyn AnalyticsTrigger>,
        settings: RunSettings,
    ) -> Self {
        Self {
            directory,
            orchestrator,
            validator,
            analytics,
            settings,
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Lock the state mutex, recovering from poison if necessary.
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Pipeline state mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn status(&self) -> PipelineStatus {
        self.lock_state().status
    }

    pub fn last_run(&self) -> Option<PipelineRun> {
        self.lock_state().last_run.clone()
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Operator pause. Only accepted between runs.
    pub fn pause(&self) -> Result<(), PipelineError> {
        let mut state = self.lock_state();
        if state.status.is_in_flight() {
            return Err(PipelineError::RunInProgress(state.status));
        }
        Self::transition(&mut state.status, PipelineStatus::Paused)?;
        info!("Pipeline paused");
        Ok(())
    }

    /// Operator resume. Returns the pipeline to `Idle`.
    pub fn resume(&self) -> Result<(), PipelineError> {
        let mut state = self.lock_state();
        if state.status != PipelineStatus::Paused {
            return Err(PipelineError::InvalidTransition {
                from: state.status,
                to: PipelineStatus::Idle,
            });
        }
        Self::transition(&mut state.status, PipelineStatus::Idle)?;
        info!("Pipeline resumed");
        Ok(())
    }

    /// Execute one full run.
    ///
    /// Returns `Err` only when the controller refuses to start (paused or a
    /// run already in flight). Every started run yields an outcome.
    pub async fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let mut run = self.begin_run()?;
        let _guard = RunGuard {
            controller: self,
            run_id: run.id.clone(),
            started_at: run.started_at,
        };
        info!("Pipeline run {} started", run.id);

        let assets = match self.directory.list_active().await {
            Ok(assets) => assets,
            Err(e) => {
                return self.finish_failed(
                    run,
                    PipelineFailure::DirectoryUnavailable(e.to_string()),
                    Vec::new(),
                )
            }
        };

        if assets.is_empty() {
            return self.finish_failed(run, PipelineFailure::NoActiveAssets, Vec::new());
        }
        info!("Found {} active assets", assets.len());

        let summary = match self
            .orchestrator
            .ingest(&assets, self.settings.lookback_days, self.settings.interval)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                return self.finish_failed(
                    run,
                    PipelineFailure::IngestionAborted(e.to_string()),
                    Vec::new(),
                )
            }
        };
        run.stats = Some(summary.stats.clone());

        self.advance(&mut run, PipelineStatus::Validating)?;
        let report = self.validator.validate().await;
        let passed = report.passed();
        run.validation = Some(report);

        if !passed {
            error!("Data validation failed; analytics will not run");
            return self.finish_failed(run, PipelineFailure::ValidationFailed, summary.outcomes);
        }

        self.advance(&mut run, PipelineStatus::Completed)?;
        run.ended_at = Some(Utc::now());

        if let Err(e) = self.analytics.on_validated(&run).await {
            warn!("Analytics hand-off for run {} failed: {}", run.id, e);
        }

        info!(
            "Pipeline run {} completed: {}",
            run.id,
            summary.stats.summary()
        );
        Ok(self.finish(run, summary.outcomes))
    }

    /// Atomically move from a resting state into `Running`.
    fn begin_run(&self) -> Result<PipelineRun, PipelineError> {
        let mut state = self.lock_state();
        match state.status {
            PipelineStatus::Paused => return Err(PipelineError::Paused),
            status if status.is_in_flight() => return Err(PipelineError::RunInProgress(status)),
            status if status.is_terminal() => {
                Self::transition(&mut state.status, PipelineStatus::Idle)?
            }
            _ => {}
        }
        Self::transition(&mut state.status, PipelineStatus::Running)?;
        Ok(PipelineRun::start(PipelineStatus::Running))
    }

    fn transition(current: &mut PipelineStatus, next: PipelineStatus) -> Result<(), PipelineError> {
        if !current.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: *current,
                to: next,
            });
        }
        *current = next;
        Ok(())
    }

    fn advance(&self, run: &mut PipelineRun, next: PipelineStatus) -> Result<(), PipelineError> {
        let mut state = self.lock_state();
        Self::transition(&mut state.status, next)?;
        run.status = next;
        Ok(())
    }

    fn finish_failed(
        &self,
        mut run: PipelineRun,
        failure: PipelineFailure,
        outcomes: Vec<FetchOutcome>,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.advance(&mut run, PipelineStatus::Failed)?;
        run.ended_at = Some(Utc::now());
        error!("Pipeline run {} failed: {}", run.id, failure);
        run.failure = Some(failure);
        Ok(self.finish(run, outcomes))
    }

    fn finish(&self, run: PipelineRun, outcomes: Vec<FetchOutcome>) -> PipelineOutcome {
        let outcome = PipelineOutcome {
            success: run.status == PipelineStatus::Completed,
            stats: run.stats.clone(),
            validation: run.validation.clone(),
            outcomes,
            run: run.clone(),
        };
        self.lock_state().last_run = Some(run);
        outcome
    }
}

/// Fails the in-flight run if `run()` is dropped before reaching a terminal
/// status, so the next invocation starts from a resting state.
struct RunGuard<'a> {
    controller: &'a PipelineController,
    run_id: String,
    started_at: DateTime<Utc>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock_state();
        if !state.status.is_in_flight() {
            return;
        }
        warn!(
            "Pipeline run {} dropped while {}; marking it failed",
            self.run_id, state.status
        );
        if let Err(e) = PipelineController::transition(&mut state.status, PipelineStatus::Failed) {
            error!("Could not fail dropped run {}: {}", self.run_id, e);
            return;
        }
        state.last_run = Some(PipelineRun {
            id: self.run_id.clone(),
            status: PipelineStatus::Failed,
            stats: None,
            validation: None,
            started_at: self.started_at,
            ended_at: Some(Utc::now()),
            failure: Some(PipelineFailure::Interrupted),
        });
    }
}
