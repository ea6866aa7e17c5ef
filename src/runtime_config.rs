//! # Runtime Configuration Module
//!
//! Environment-driven tuning for the router.
//!
//! ## Environment Variables
//!
//! ### `MUXR_SLOW_MATCH_US`
//!
//! Route selection slower than this many microseconds is logged at `WARN`
//! ("Slow route matching detected") instead of `INFO`. Accepts values in:
//! - Decimal: `1000`
//! - Hexadecimal: `0x3e8`
//!
//! Default: `1000` (1 ms)
//!
//! ## Usage
//!
//! ```rust
//! use muxr::runtime_config::RuntimeConfig;
//! use muxr::Router;
//!
//! let router = Router::with_config(RuntimeConfig::from_env());
//! # let _ = router;
//! ```

use std::env;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Route selections slower than this are logged as warnings
    pub slow_match_threshold: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_value(env::var("MUXR_SLOW_MATCH_US").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let micros = value
            .and_then(|val| match val.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => val.parse().ok(),
            })
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        RuntimeConfig {
            slow_match_threshold: Duration::from_micros(micros),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_and_hex_values() {
        assert_eq!(
            RuntimeConfig::from_value(Some("250")).slow_match_threshold,
            Duration::from_micros(250)
        );
        assert_eq!(
            RuntimeConfig::from_value(Some("0x10")).slow_match_threshold,
            Duration::from_micros(16)
        );
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        assert_eq!(RuntimeConfig::from_value(Some("soon")), RuntimeConfig::default());
        assert_eq!(RuntimeConfig::from_value(None), RuntimeConfig::default());
    }
}
