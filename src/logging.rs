//! Structured logging setup.
//!
//! The router itself only emits `tracing` events; nothing is printed until a
//! subscriber is installed. Binaries and tests that want output call
//! [`init_logging`] once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `MUXR_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `MUXR_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `MUXR_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `MUXR_LOG_INCLUDE_LOCATION` | `false` | include file and line |
//!
//! `RUST_LOG`, when set, replaces the level entirely.

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated), e.g. `muxr::router=debug`
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Verbose human-readable configuration for local work and tests
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("MUXR_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("MUXR_LOG_FORMAT")
                .map_or(defaults.format, |s| LogFormat::parse(&s)),
            target_filter: lookup("MUXR_LOG_TARGET_FILTER"),
            include_location: lookup("MUXR_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install a global `tracing` subscriber built from `config`.
///
/// Events are written to stderr so stdout stays free for program output.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use muxr::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',').map(str::trim) {
            if filter.is_empty() {
                continue;
            }
            let directive = filter
                .parse()
                .with_context(|| format!("Invalid log filter directive: {filter}"))?;
            env_filter = env_filter.add_directive(directive);
        }
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
