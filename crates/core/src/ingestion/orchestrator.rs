//! Ingestion orchestrator.
//!
//! Splits the asset universe into batches (progress reporting only) and each
//! batch into fetch groups. Each group is one `fetch_batch` call; groups are
//! awaited strictly in listing order because they share the source's rate
//! limit. A failed group marks its own symbols `Failed` and the run moves on.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};

use eodgate_market_data::{BarValidator, Interval, MarketDataSource, PriceBar};

use super::errors::IngestionError;
use super::model::{FetchOutcome, FetchStatus, IngestionConfig, IngestionSummary};
use crate::assets::Asset;
use crate::constants::NO_DATA_DETAIL;
use crate::prices::{PriceRecord, StorageGateway};

pub struct IngestionOrchestrator {
    source: Arc<dyn MarketDataSource>,
    storage: Arc<dyn StorageGateway>,
    validator: BarValidator,
    config: IngestionConfig,
}

impl IngestionOrchestrator {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        storage: Arc<dyn StorageGateway>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            source,
            storage,
            validator: BarValidator::new(),
            config,
        }
    }

    pub fn with_validator(mut self, validator: BarValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Ingest the last `lookback_days` of data for every asset.
    ///
    /// Partial failures are recorded in the returned summary. Only an empty
    /// universe or an unreachable store is reported as an error.
    pub async fn ingest(
        &self,
        assets: &[Asset],
        lookback_days: u32,
        interval: Interval,
    ) -> Result<IngestionSummary, IngestionError> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(lookback_days));
        self.ingest_range(assets, start, end, interval).await
    }

    /// Ingest an explicit `[start, end]` range.
    pub async fn ingest_range(
        &self,
        assets: &[Asset],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<IngestionSummary, IngestionError> {
        if assets.is_empty() {
            return Err(IngestionError::EmptyUniverse);
        }

        let batch_size = self.config.batch_size.max(1);
        let group_size = self.config.group_size.max(1);
        let total_batches = assets.len().div_ceil(batch_size);

        info!(
            "Ingesting {} assets from {} to {} ({}) in batches of {}",
            assets.len(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            interval,
            batch_size
        );

        let mut summary = IngestionSummary::new(assets.len());

        for (batch_index, batch) in assets.chunks(batch_size).enumerate() {
            info!(
                "Batch {}/{}: processing {} assets",
                batch_index + 1,
                total_batches,
                batch.len()
            );

            for group in batch.chunks(group_size) {
                self.ingest_group(group, start, end, interval, &mut summary)
                    .await?;
            }
        }

        info!("Ingestion complete: {}", summary.stats.summary());
        Ok(summary)
    }

    async fn ingest_group(
        &self,
        group: &[Asset],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
        summary: &mut IngestionSummary,
    ) -> Result<(), IngestionError> {
        let tickers: Vec<String> = group
            .iter()
            .map(|asset| asset.request_ticker().to_string())
            .collect();
        // Assets may share a provider ticker; request each one once
        let mut seen = HashSet::new();
        let requested: Vec<String> = tickers
            .iter()
            .filter(|ticker| seen.insert(ticker.as_str()))
            .cloned()
            .collect();

        let fetched = match self
            .source
            .fetch_batch(&requested, start, end, interval)
            .await
        {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("Group {:?} failed: {}", tickers, e);
                for asset in group {
                    summary.record(FetchOutcome::failed(&asset.symbol, e.to_string()));
                }
                return Ok(());
            }
        };

        for (asset, ticker) in group.iter().zip(&tickers) {
            let bars = fetched.rows(ticker).to_vec();
            let outcome = match fetched.error(ticker) {
                Some(detail) if bars.is_empty() => FetchOutcome::failed(&asset.symbol, detail),
                _ => self.store_symbol(asset, bars).await?,
            };
            match outcome.status {
                FetchStatus::Success => {
                    info!("{}: {} new records", asset.symbol, outcome.records_stored)
                }
                FetchStatus::Skipped => info!("{}: 0 new (duplicates)", asset.symbol),
                FetchStatus::Failed => warn!("{}: {}", asset.symbol, outcome.detail),
            }
            summary.record(outcome);
        }

        Ok(())
    }

    /// Validate, normalize and persist one symbol's bars.
    async fn store_symbol(
        &self,
        asset: &Asset,
        bars: Vec<PriceBar>,
    ) -> Result<FetchOutcome, IngestionError> {
        if bars.is_empty() {
            return Ok(FetchOutcome::failed(&asset.symbol, NO_DATA_DETAIL));
        }

        let fetched = bars.len();
        let accepted = self.validator.validate_batch(&asset.symbol, bars);
        if accepted.is_empty() {
            return Ok(FetchOutcome::failed(
                &asset.symbol,
                format!("all {} rows rejected by validation", fetched),
            ));
        }

        let source_id = self.source.id();
        let records: Vec<PriceRecord> = accepted
            .into_iter()
            .map(|(bar, quality)| PriceRecord::from_bar(&asset.symbol, source_id, bar, quality))
            .collect();

        debug!("Upserting {} records for {}", records.len(), asset.symbol);

        match self.storage.upsert_price_records(&records).await {
            Ok(0) => Ok(FetchOutcome::skipped(&asset.symbol)),
            Ok(new_rows) => Ok(FetchOutcome::success(&asset.symbol, new_rows)),
            Err(e) if e.is_connection_failure() => {
                error!("Storage unavailable while writing {}: {}", asset.symbol, e);
                Err(IngestionError::StorageUnavailable(e.to_string()))
            }
            Err(e) => Ok(FetchOutcome::failed(&asset.symbol, e.to_string())),
        }
    }
}
