use std::str::FromStr;
use std::time::Duration;

use eodgate_core::constants::{DEFAULT_BATCH_SIZE, DEFAULT_GROUP_SIZE, DEFAULT_LOOKBACK_DAYS};
use eodgate_core::{Error, IngestionConfig, Result, ValidationConfig};
use eodgate_market_data::{Interval, RateLimit};

/// Seconds between group requests when `EOD_REQUEST_DELAY_SECS` is unset
const DEFAULT_REQUEST_DELAY_SECS: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    pub log_format: String,
    pub lookback_days: u32,
    pub interval: Interval,
    pub ingestion: IngestionConfig,
    pub validation: ValidationConfig,
    pub request_delay_secs: f64,
    pub respect_server: bool,
    /// `None` runs once and exits
    pub schedule_every: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let defaults = ValidationConfig::default();

        let validation = ValidationConfig {
            trailing_window_days: env.parse("EOD_TRAILING_WINDOW_DAYS", defaults.trailing_window_days)?,
            min_data_points: env.parse("EOD_MIN_DATA_POINTS", defaults.min_data_points)?,
            min_assets: env.parse("EOD_MIN_ASSETS", defaults.min_assets)?,
            completeness_tolerance: env
                .parse("EOD_COMPLETENESS_TOLERANCE", defaults.completeness_tolerance)?,
            max_staleness_hours: env.parse("EOD_MAX_STALENESS_HOURS", defaults.max_staleness_hours)?,
            max_missing_ratio: env.parse("EOD_MAX_MISSING_RATIO", defaults.max_missing_ratio)?,
        };
        validation.validate()?;

        let ingestion = IngestionConfig::new(
            env.parse("EOD_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            env.parse("EOD_GROUP_SIZE", DEFAULT_GROUP_SIZE)?,
        )?;

        let lookback_days = env.parse("EOD_LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS)?;
        if lookback_days == 0 {
            return Err(invalid("EOD_LOOKBACK_DAYS", "0"));
        }

        let request_delay_secs = env.parse("EOD_REQUEST_DELAY_SECS", DEFAULT_REQUEST_DELAY_SECS)?;
        if !request_delay_secs.is_finite() || request_delay_secs < 0.0 {
            return Err(invalid("EOD_REQUEST_DELAY_SECS", &request_delay_secs.to_string()));
        }

        let schedule_every = match env.get("EOD_SCHEDULE_INTERVAL_SECS") {
            None => None,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => return Err(invalid("EOD_SCHEDULE_INTERVAL_SECS", &raw)),
            },
        };

        Ok(Self {
            db_path: env.get("EOD_DB_PATH").unwrap_or_else(|| "./db/eod.db".to_string()),
            log_format: env.get("EOD_LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            lookback_days,
            interval: env.parse("EOD_INTERVAL", Interval::Daily)?,
            ingestion,
            validation,
            request_delay_secs,
            respect_server: env.parse_bool("EOD_RESPECT_SERVER", true)?,
            schedule_every,
        })
    }

    pub fn rate_limit(&self) -> RateLimit {
        RateLimit::from_settings(self.request_delay_secs, self.respect_server)
    }
}

fn invalid(key: &str, raw: &str) -> Error {
    Error::InvalidConfigValue(format!("{}: '{}'", key, raw))
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Trimmed value, treating blank as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| invalid(key, &raw)),
        }
    }

    fn parse_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(key, &raw)),
            },
        }
    }
}
