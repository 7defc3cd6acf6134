use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_GROUP_SIZE};
use crate::errors::{Error, Result};

/// Status of one symbol's ingestion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// New rows were stored.
    Success,
    /// Rows were fetched but every timestamp already existed.
    Skipped,
    /// Group error, no data from the source, or a failed write.
    Failed,
}

/// Per-symbol result of one ingestion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub symbol: String,
    pub status: FetchStatus,
    pub records_stored: usize,
    pub detail: String,
}

impl FetchOutcome {
    pub fn success(symbol: impl Into<String>, records_stored: usize) -> Self {
        Self {
            symbol: symbol.into(),
            status: FetchStatus::Success,
            records_stored,
            detail: format!("{} new records", records_stored),
        }
    }

    pub fn skipped(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            status: FetchStatus::Skipped,
            records_stored: 0,
            detail: "0 new records (all timestamps already stored)".to_string(),
        }
    }

    pub fn failed(symbol: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            status: FetchStatus::Failed,
            records_stored: 0,
            detail: detail.into(),
        }
    }
}

/// Aggregate counters for one run.
///
/// `successful + failed + skipped == total_assets` once every asset has been
/// recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionStats {
    pub total_assets: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_records: usize,
}

impl IngestionStats {
    pub fn new(total_assets: usize) -> Self {
        Self {
            total_assets,
            ..Self::default()
        }
    }

    pub fn add_outcome(&mut self, outcome: &FetchOutcome) {
        match outcome.status {
            FetchStatus::Success => {
                self.successful += 1;
                self.total_records += outcome.records_stored;
            }
            FetchStatus::Skipped => {
                self.skipped += 1;
            }
            FetchStatus::Failed => {
                self.failed += 1;
            }
        }
    }

    /// Number of assets that have an outcome so far.
    pub fn processed(&self) -> usize {
        self.successful + self.failed + self.skipped
    }

    pub fn summary(&self) -> String {
        format!(
            "{}/{} assets ingested ({} skipped, {} failed), {} new records",
            self.successful, self.total_assets, self.skipped, self.failed, self.total_records
        )
    }
}

/// Stats plus the per-symbol outcomes they were computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSummary {
    pub stats: IngestionStats,
    pub outcomes: Vec<FetchOutcome>,
}

impl IngestionSummary {
    pub fn new(total_assets: usize) -> Self {
        Self {
            stats: IngestionStats::new(total_assets),
            outcomes: Vec::with_capacity(total_assets),
        }
    }

    pub fn record(&mut self, outcome: FetchOutcome) {
        self.stats.add_outcome(&outcome);
        self.outcomes.push(outcome);
    }

    pub fn outcome(&self, symbol: &str) -> Option<&FetchOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == FetchStatus::Failed)
    }
}

/// Partitioning policy for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    /// Assets per progress-reporting batch
    pub batch_size: usize,
    /// Symbols per `fetch_batch` call
    pub group_size: usize,
}

impl IngestionConfig {
    pub fn new(batch_size: usize, group_size: usize) -> Result<Self> {
        let config = Self {
            batch_size,
            group_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfigValue(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.group_size == 0 {
            return Err(Error::InvalidConfigValue(
                "group_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            group_size: DEFAULT_GROUP_SIZE,
        }
    }
}
