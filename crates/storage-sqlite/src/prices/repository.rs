use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use eodgate_core::prices::{PriceRecord, StorageGateway};
use eodgate_core::Result;

use super::model::{format_timestamp, parse_timestamp, PriceRecordDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{assets, price_history};

/// Rows per `REPLACE INTO` statement
const UPSERT_CHUNK: usize = 1_000;

/// Ids per `IN (...)` list, below SQLite's bound-parameter limit
const ID_LOOKUP_CHUNK: usize = 500;

pub struct PriceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Stored rows for `symbol` with `timestamp >= since`, oldest first.
    pub fn history(&self, symbol: &str, since: DateTime<Utc>) -> Result<Vec<PriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = price_history::table
            .filter(price_history::symbol.eq(symbol))
            .filter(price_history::timestamp.ge(format_timestamp(&since)))
            .order(price_history::timestamp.asc())
            .select(PriceRecordDB::as_select())
            .load::<PriceRecordDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(PriceRecord::try_from).collect()
    }

    fn count_since(&self, since: &DateTime<Utc>, null_close_only: bool) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let since = format_timestamp(since);
        let in_window = price_history::table.filter(price_history::timestamp.ge(since));

        if null_close_only {
            in_window
                .filter(price_history::close.is_null())
                .count()
                .get_result::<i64>(&mut conn)
                .into_core()
        } else {
            in_window.count().get_result::<i64>(&mut conn).into_core()
        }
    }
}

#[async_trait]
impl StorageGateway for PriceRepository {
    async fn query_asset_count(&self, active: bool) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        assets::table
            .filter(assets::is_active.eq(active))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }

    async fn query_record_count(&self, since: DateTime<Utc>) -> Result<i64> {
        self.count_since(&since, false)
    }

    async fn query_latest_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        let mut conn = get_connection(&self.pool)?;

        let latest = price_history::table
            .select(max(price_history::timestamp))
            .first::<Option<String>>(&mut conn)
            .into_core()?;

        latest.as_deref().map(parse_timestamp).transpose()
    }

    async fn query_null_close_ratio(&self, since: DateTime<Utc>) -> Result<f64> {
        let total = self.count_since(&since, false)?;
        if total == 0 {
            return Ok(0.0);
        }
        let nulls = self.count_since(&since, true)?;
        Ok(nulls as f64 / total as f64)
    }

    async fn upsert_price_records(&self, records: &[PriceRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows: Vec<PriceRecordDB> = records.iter().map(PriceRecordDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let ids: Vec<String> = rows
                    .iter()
                    .map(|r| r.id.clone())
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .collect();

                let mut existing: i64 = 0;
                for chunk in ids.chunks(ID_LOOKUP_CHUNK) {
                    existing += price_history::table
                        .filter(price_history::id.eq_any(chunk))
                        .count()
                        .get_result::<i64>(conn)
                        .into_core()?;
                }

                for chunk in rows.chunks(UPSERT_CHUNK) {
                    diesel::replace_into(price_history::table)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }

                let new_rows = ids.len().saturating_sub(existing as usize);
                debug!(
                    "Upserted {} price rows ({} new, {} replaced)",
                    rows.len(),
                    new_rows,
                    existing
                );
                Ok(new_rows)
            })
            .await
    }
}
