//! Database model for price history rows.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use eodgate_core::errors::{DatabaseError, Error};
use eodgate_core::prices::PriceRecord;

/// Fixed-width RFC 3339 UTC text, so lexical order is chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            Error::Database(DatabaseError::Internal(format!(
                "invalid stored timestamp '{}': {}",
                s, e
            )))
        })
}

fn decimal_to_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

fn text_to_decimal(value: Option<String>) -> Option<Decimal> {
    value.and_then(|s| Decimal::from_str(&s).ok())
}

/// Database model for price history
#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::price_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceRecordDB {
    pub id: String,
    pub symbol: String,
    pub timestamp: String,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
    pub adjusted_close: Option<String>,
    pub source: String,
    pub data_quality: f64,
    pub created_at: String,
}

impl From<&PriceRecord> for PriceRecordDB {
    fn from(record: &PriceRecord) -> Self {
        Self {
            id: record.record_id(),
            symbol: record.symbol.clone(),
            timestamp: format_timestamp(&record.timestamp),
            open: decimal_to_text(record.open),
            high: decimal_to_text(record.high),
            low: decimal_to_text(record.low),
            close: decimal_to_text(record.close),
            volume: decimal_to_text(record.volume),
            adjusted_close: decimal_to_text(record.adjusted_close),
            source: record.source.clone(),
            data_quality: record.data_quality,
            created_at: format_timestamp(&Utc::now()),
        }
    }
}

impl TryFrom<PriceRecordDB> for PriceRecord {
    type Error = Error;

    fn try_from(db: PriceRecordDB) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: parse_timestamp(&db.timestamp)?,
            symbol: db.symbol,
            open: text_to_decimal(db.open),
            high: text_to_decimal(db.high),
            low: text_to_decimal(db.low),
            close: text_to_decimal(db.close),
            volume: text_to_decimal(db.volume),
            adjusted_close: text_to_decimal(db.adjusted_close),
            source: db.source,
            data_quality: db.data_quality,
        })
    }
}
