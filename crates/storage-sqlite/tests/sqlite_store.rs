use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use eodgate_core::assets::{Asset, AssetDirectory};
use eodgate_core::prices::{PriceRecord, StorageGateway};
use eodgate_storage_sqlite::{open, AssetRepository, PriceRepository};

struct TestDb {
    assets: AssetRepository,
    prices: PriceRepository,
    _dir: TempDir,
}

fn open_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("db").join("eod.db");
    let (pool, writer) = open(&db_path.to_string_lossy()).expect("Failed to open database");

    TestDb {
        assets: AssetRepository::new(Arc::clone(&pool), writer.clone()),
        prices: PriceRepository::new(pool, writer),
        _dir: dir,
    }
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap()
}

fn record(symbol: &str, timestamp: DateTime<Utc>, close: Option<Decimal>) -> PriceRecord {
    PriceRecord {
        symbol: symbol.to_string(),
        timestamp,
        open: close,
        high: close,
        low: close,
        close,
        volume: Some(dec!(1000)),
        adjusted_close: close,
        source: "yfinance".to_string(),
        data_quality: if close.is_some() { 1.0 } else { 0.0 },
    }
}

#[tokio::test]
async fn test_upsert_counts_only_new_rows() {
    let db = open_test_db();
    let batch: Vec<_> = (3..8).map(|d| record("AAPL", day(d), Some(dec!(190)))).collect();

    assert_eq!(db.prices.upsert_price_records(&batch).await.unwrap(), 5);
    assert_eq!(db.prices.upsert_price_records(&batch).await.unwrap(), 0);

    // Two overlapping, one new
    let next = vec![
        record("AAPL", day(6), Some(dec!(190))),
        record("AAPL", day(7), Some(dec!(190))),
        record("AAPL", day(10), Some(dec!(191))),
    ];
    assert_eq!(db.prices.upsert_price_records(&next).await.unwrap(), 1);
    assert_eq!(db.prices.query_record_count(day(1)).await.unwrap(), 6);
}

#[tokio::test]
async fn test_upsert_overwrites_corrected_values() {
    let db = open_test_db();
    db.prices
        .upsert_price_records(&[record("MSFT", day(3), None)])
        .await
        .unwrap();

    let corrected = record("MSFT", day(3), Some(dec!(420.15)));
    assert_eq!(db.prices.upsert_price_records(&[corrected.clone()]).await.unwrap(), 0);

    let stored = db.prices.history("MSFT", day(1)).unwrap();
    assert_eq!(stored, vec![corrected]);
}

#[tokio::test]
async fn test_same_timestamp_from_other_source_is_a_new_row() {
    let db = open_test_db();
    let mut other = record("AAPL", day(3), Some(dec!(190)));
    other.source = "manual".to_string();

    db.prices
        .upsert_price_records(&[record("AAPL", day(3), Some(dec!(190)))])
        .await
        .unwrap();
    assert_eq!(db.prices.upsert_price_records(&[other]).await.unwrap(), 1);
}

#[tokio::test]
async fn test_empty_database_aggregates() {
    let db = open_test_db();

    assert_eq!(db.prices.query_latest_timestamp().await.unwrap(), None);
    assert_eq!(db.prices.query_record_count(day(1)).await.unwrap(), 0);
    assert_eq!(db.prices.query_null_close_ratio(day(1)).await.unwrap(), 0.0);
    assert_eq!(db.prices.query_asset_count(true).await.unwrap(), 0);
}

#[tokio::test]
async fn test_window_aggregates() {
    let db = open_test_db();
    let mut rows = Vec::new();
    for (i, symbol) in ["A", "B", "C", "D"].iter().enumerate() {
        for d in 1..=5 {
            // One null close per symbol, on the latest day
            let close = if d == 5 { None } else { Some(Decimal::from(10 + i)) };
            rows.push(record(symbol, day(d), close));
        }
    }
    db.prices.upsert_price_records(&rows).await.unwrap();

    assert_eq!(db.prices.query_latest_timestamp().await.unwrap(), Some(day(5)));
    assert_eq!(db.prices.query_record_count(day(3)).await.unwrap(), 12);

    let ratio = db.prices.query_null_close_ratio(day(3)).await.unwrap();
    assert!((ratio - 4.0 / 12.0).abs() < 1e-9);

    // Window boundary is inclusive
    assert_eq!(db.prices.query_record_count(day(5)).await.unwrap(), 4);
    assert_eq!(db.prices.query_record_count(day(5) + Duration::seconds(1)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_asset_directory_lists_active_by_symbol() {
    let db = open_test_db();
    let mut retired = Asset::new("ZZZ");
    retired.active = false;

    let inserted = db
        .assets
        .upsert_assets(&[
            Asset::new("MSFT"),
            Asset::new("RELIANCE").with_provider_ticker("RELIANCE.NS"),
            Asset::new("AAPL"),
            retired,
        ])
        .await
        .unwrap();
    assert_eq!(inserted, 4);

    let active = db.assets.list_active().await.unwrap();
    let symbols: Vec<_> = active.iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "RELIANCE"]);
    assert_eq!(active[2].request_ticker(), "RELIANCE.NS");

    assert_eq!(db.prices.query_asset_count(true).await.unwrap(), 3);
    assert_eq!(db.prices.query_asset_count(false).await.unwrap(), 1);
}

#[tokio::test]
async fn test_asset_upsert_updates_by_symbol() {
    let db = open_test_db();
    db.assets.upsert_assets(&[Asset::new("BTC")]).await.unwrap();

    let updated = db
        .assets
        .upsert_assets(&[Asset::new("BTC").with_provider_ticker("BTC-USD")])
        .await
        .unwrap();
    assert_eq!(updated, 0);

    assert!(db.assets.set_active("BTC", false).await.unwrap());
    assert!(!db.assets.set_active("DOGE", false).await.unwrap());
    assert!(db.assets.list_active().await.unwrap().is_empty());

    db.assets.set_active("BTC", true).await.unwrap();
    let active = db.assets.list_active().await.unwrap();
    assert_eq!(active[0].request_ticker(), "BTC-USD");
}
