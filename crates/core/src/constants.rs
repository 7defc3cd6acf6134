/// Minimum rows per asset expected inside the trailing window
pub const MIN_DATA_POINTS_REQUIRED: i64 = 5;

/// Null-close ratio above which the quality check warns
pub const MAX_MISSING_RATIO: f64 = 0.1;

/// Active assets required for the coverage check to pass
pub const MIN_ASSETS_REQUIRED: i64 = 50;

/// Share of expected rows that must be present for completeness
pub const COMPLETENESS_TOLERANCE: f64 = 0.8;

/// Maximum age of the newest stored row, in hours (closed boundary)
pub const MAX_STALENESS_HOURS: i64 = 48;

/// Window the completeness and quality checks look back over, in days
pub const TRAILING_WINDOW_DAYS: i64 = 7;

/// Days of history requested per run
pub const DEFAULT_LOOKBACK_DAYS: u32 = 5;

/// Assets per progress-reporting batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Symbols per `fetch_batch` call
pub const DEFAULT_GROUP_SIZE: usize = 5;

/// Detail recorded when the source returns no rows for a symbol
pub const NO_DATA_DETAIL: &str = "no data returned";
