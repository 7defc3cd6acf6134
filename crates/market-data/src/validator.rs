//! Price bar validation.
//!
//! Validates bars from providers before they are normalized into records:
//! - OHLC invariants (high >= low, open/close between high/low)
//! - Non-negative values
//! - Reasonable value ranges
//!
//! Hard failures reject the bar. Soft issues keep it but lower its
//! `data_quality` score.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::PriceBar;

/// Score of a bar with no issues.
pub const FULL_QUALITY: f64 = 1.0;

/// Score deducted per soft issue.
const SOFT_ISSUE_PENALTY: f64 = 0.1;

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Hard failure - reject the bar.
    Hard,
    /// Soft warning - accept the bar with a lower quality score.
    Soft,
}

#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Accepted bar's quality assessment.
#[derive(Clone, Debug, PartialEq)]
pub struct BarQuality {
    /// Score in `[0.0, 1.0]`
    pub score: f64,
    pub warnings: Vec<String>,
}

/// Bar validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Whether to reject bars with negative prices.
    pub reject_negative_prices: bool,
    /// Whether to reject bars where high < low or open/close fall outside.
    pub reject_invalid_ohlc: bool,
    /// Maximum allowed price value (for sanity check).
    pub max_price: Option<Decimal>,
    /// Whether zero volume counts as a soft issue.
    pub warn_on_zero_volume: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            reject_negative_prices: true,
            reject_invalid_ohlc: true,
            max_price: Some(Decimal::from(1_000_000_000i64)),
            warn_on_zero_volume: true,
        }
    }
}

/// Price bar validator.
#[derive(Clone, Debug, Default)]
pub struct BarValidator {
    config: ValidatorConfig,
}

impl BarValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a bar.
    ///
    /// Returns the quality assessment if the bar is acceptable, or
    /// `ValidationFailed` listing every hard issue found.
    pub fn validate(&self, bar: &PriceBar) -> Result<BarQuality, MarketDataError> {
        let mut issues: Vec<ValidationIssue> = Vec::new();

        self.validate_prices(bar, &mut issues);
        self.validate_ohlc_invariants(bar, &mut issues);
        self.validate_price_range(bar, &mut issues);
        self.validate_volume(bar, &mut issues);

        let errors: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Hard)
            .map(|i| i.message.as_str())
            .collect();

        if !errors.is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: errors.join("; "),
            });
        }

        let warnings: Vec<String> = issues.into_iter().map(|i| i.message).collect();
        let score = if bar.close.is_none() {
            0.0
        } else {
            (FULL_QUALITY - SOFT_ISSUE_PENALTY * warnings.len() as f64).max(0.0)
        };

        Ok(BarQuality { score, warnings })
    }

    /// Validate all bars in a batch.
    ///
    /// Returns accepted bars paired with their quality score. Rejected bars
    /// are logged and dropped.
    pub fn validate_batch(&self, symbol: &str, bars: Vec<PriceBar>) -> Vec<(PriceBar, f64)> {
        let mut accepted = Vec::with_capacity(bars.len());

        for bar in bars {
            match self.validate(&bar) {
                Ok(quality) => {
                    for warning in &quality.warnings {
                        warn!("Bar warning for {} at {}: {}", symbol, bar.timestamp, warning);
                    }
                    accepted.push((bar, quality.score));
                }
                Err(e) => warn!("Dropping bar for {} at {}: {}", symbol, bar.timestamp, e),
            }
        }

        accepted
    }

    fn validate_prices(&self, bar: &PriceBar, issues: &mut Vec<ValidationIssue>) {
        if bar.close.is_none() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: "Missing close price".to_string(),
            });
        }

        if !self.config.reject_negative_prices {
            return;
        }

        let fields = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("adjusted close", bar.adjusted_close),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if v < Decimal::ZERO {
                    issues.push(ValidationIssue {
                        severity: ValidationSeverity::Hard,
                        message: format!("Negative {} price: {}", name, v),
                    });
                }
            }
        }
    }

    /// - High must be >= Low
    /// - Open must be between Low and High
    /// - Close must be between Low and High
    fn validate_ohlc_invariants(&self, bar: &PriceBar, issues: &mut Vec<ValidationIssue>) {
        if !self.config.reject_invalid_ohlc {
            return;
        }

        let (Some(high), Some(low)) = (bar.high, bar.low) else {
            return;
        };

        if high < low {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!("High ({}) < Low ({})", high, low),
            });
            return;
        }

        if let Some(open) = bar.open {
            if open < low || open > high {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Hard,
                    message: format!("Open ({}) outside range [{}, {}]", open, low, high),
                });
            }
        }

        if let Some(close) = bar.close {
            if close < low || close > high {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Hard,
                    message: format!("Close ({}) outside range [{}, {}]", close, low, high),
                });
            }
        }
    }

    fn validate_price_range(&self, bar: &PriceBar, issues: &mut Vec<ValidationIssue>) {
        if let (Some(max), Some(close)) = (self.config.max_price, bar.close) {
            if close > max {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Soft,
                    message: format!("Close price {} exceeds sanity limit {}", close, max),
                });
            }
        }
    }

    fn validate_volume(&self, bar: &PriceBar, issues: &mut Vec<ValidationIssue>) {
        let Some(volume) = bar.volume else {
            return;
        };

        if volume < Decimal::ZERO {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!("Negative volume: {}", volume),
            });
        } else if volume.is_zero() && self.config.warn_on_zero_volume {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: "Zero volume".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> PriceBar {
        PriceBar::new(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(), close)
            .with_ohlc(open, high, low)
            .with_volume(dec!(1000))
    }

    #[test]
    fn test_valid_bar_scores_full_quality() {
        let validator = BarValidator::new();
        let quality = validator
            .validate(&bar(dec!(100), dec!(105), dec!(98), dec!(102)))
            .unwrap();
        assert_eq!(quality.score, FULL_QUALITY);
        assert!(quality.warnings.is_empty());
    }

    #[test]
    fn test_close_only_bar_is_valid() {
        let validator = BarValidator::new();
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let quality = validator.validate(&PriceBar::new(ts, dec!(50))).unwrap();
        assert_eq!(quality.score, FULL_QUALITY);
    }

    #[test]
    fn test_negative_close_rejected() {
        let validator = BarValidator::new();
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let result = validator.validate(&PriceBar::new(ts, dec!(-10)));
        assert!(matches!(
            result,
            Err(MarketDataError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_high_below_low_rejected() {
        let validator = BarValidator::new();
        let result = validator.validate(&bar(dec!(100), dec!(95), dec!(98), dec!(96)));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("High (95) < Low (98)"));
    }

    #[test]
    fn test_close_outside_range_rejected() {
        let validator = BarValidator::new();
        let result = validator.validate(&bar(dec!(100), dec!(105), dec!(98), dec!(110)));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_volume_lowers_quality() {
        let validator = BarValidator::new();
        let b = bar(dec!(100), dec!(105), dec!(98), dec!(102)).with_volume(dec!(0));
        let quality = validator.validate(&b).unwrap();
        assert!(quality.score < FULL_QUALITY);
        assert!(quality.score > 0.0);
        assert_eq!(quality.warnings, vec!["Zero volume".to_string()]);
    }

    #[test]
    fn test_missing_close_kept_with_zero_quality() {
        let validator = BarValidator::new();
        let mut b = bar(dec!(100), dec!(105), dec!(98), dec!(102));
        b.close = None;
        let quality = validator.validate(&b).unwrap();
        assert_eq!(quality.score, 0.0);
    }

    #[test]
    fn test_validate_batch_drops_rejected_bars() {
        let validator = BarValidator::new();
        let bars = vec![
            bar(dec!(100), dec!(105), dec!(98), dec!(102)),
            bar(dec!(100), dec!(95), dec!(98), dec!(96)),
            bar(dec!(101), dec!(104), dec!(99), dec!(103)).with_volume(dec!(0)),
        ];

        let accepted = validator.validate_batch("AAPL", bars);
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].1, FULL_QUALITY);
        assert!(accepted[1].1 < FULL_QUALITY);
    }
}
