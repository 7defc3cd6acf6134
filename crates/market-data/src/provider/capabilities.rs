//! Rate limiting configuration for a source.

use std::time::Duration;

/// Controls how aggressively we can call a source to avoid hitting its
/// rate limits and getting blocked.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimit {
    /// Minimum delay between consecutive requests. Zero disables waiting.
    pub min_delay: Duration,

    /// Upper bound on a single group request.
    pub request_timeout: Duration,
}

impl RateLimit {
    /// Build from the pipeline's request settings. When the server is not
    /// being respected no delay is applied.
    pub fn from_settings(delay_secs: f64, respect_server: bool) -> Self {
        let min_delay = if respect_server && delay_secs > 0.0 {
            Duration::from_secs_f64(delay_secs)
        } else {
            Duration::ZERO
        };
        Self {
            min_delay,
            ..Self::default()
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(20),
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let limit = RateLimit::from_settings(2.5, true);
        assert_eq!(limit.min_delay, Duration::from_millis(2500));

        let limit = RateLimit::from_settings(20.0, false);
        assert_eq!(limit.min_delay, Duration::ZERO);

        let limit = RateLimit::from_settings(0.0, true);
        assert_eq!(limit.min_delay, Duration::ZERO);
    }
}
