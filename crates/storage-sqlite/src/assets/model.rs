//! Database model for tracked assets.

use chrono::{SecondsFormat, Utc};
use diesel::prelude::*;

use eodgate_core::assets::Asset;

/// Database model for assets
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub symbol: String,
    pub provider_ticker: Option<String>,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl AssetDB {
    /// New row for `asset` with a fresh id and both timestamps set to now.
    pub fn new_row(asset: &Asset) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: asset.symbol.clone(),
            provider_ticker: asset.provider_ticker.clone(),
            name: asset.name.clone(),
            is_active: asset.active,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl From<AssetDB> for Asset {
    fn from(db: AssetDB) -> Self {
        Self {
            symbol: db.symbol,
            provider_ticker: db.provider_ticker,
            name: db.name,
            active: db.is_active,
        }
    }
}
