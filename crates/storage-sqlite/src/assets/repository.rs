use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use eodgate_core::assets::{Asset, AssetDirectory};
use eodgate_core::Result;

use super::model::AssetDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::assets;

/// Repository for the tracked asset universe
pub struct AssetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Active assets ordered by symbol
    pub fn list_active_impl(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        let results = assets::table
            .filter(assets::is_active.eq(true))
            .order(assets::symbol.asc())
            .select(AssetDB::as_select())
            .load::<AssetDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Asset::from).collect())
    }

    /// Insert new assets or update existing ones matched by symbol.
    ///
    /// Returns the number of assets that were not tracked before.
    pub async fn upsert_assets(&self, input: &[Asset]) -> Result<usize> {
        if input.is_empty() {
            return Ok(0);
        }
        let rows: Vec<AssetDB> = input.iter().map(AssetDB::new_row).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                let mut inserted = 0;
                for row in rows {
                    let existing = assets::table
                        .filter(assets::symbol.eq(&row.symbol))
                        .select(assets::id)
                        .first::<String>(conn)
                        .optional()
                        .into_core()?;

                    match existing {
                        Some(id) => {
                            diesel::update(assets::table.find(id))
                                .set((
                                    assets::provider_ticker.eq(&row.provider_ticker),
                                    assets::name.eq(&row.name),
                                    assets::is_active.eq(row.is_active),
                                    assets::updated_at.eq(&now),
                                ))
                                .execute(conn)
                                .into_core()?;
                        }
                        None => {
                            diesel::insert_into(assets::table)
                                .values(&row)
                                .execute(conn)
                                .into_core()?;
                            inserted += 1;
                        }
                    }
                }
                Ok(inserted)
            })
            .await
    }

    /// Flip the active flag for `symbol`. Returns false if it is unknown.
    pub async fn set_active(&self, symbol: &str, active: bool) -> Result<bool> {
        let symbol = symbol.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                let updated = diesel::update(assets::table.filter(assets::symbol.eq(symbol)))
                    .set((assets::is_active.eq(active), assets::updated_at.eq(now)))
                    .execute(conn)
                    .into_core()?;
                Ok(updated > 0)
            })
            .await
    }
}

#[async_trait]
impl AssetDirectory for AssetRepository {
    async fn list_active(&self) -> Result<Vec<Asset>> {
        self.list_active_impl()
    }
}
