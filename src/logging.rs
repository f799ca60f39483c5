//! Structured logging setup.
//!
//! The generator logs through `tracing`. The binary installs a subscriber
//! with [`init_logging`]; library users may install their own instead.
//!
//! | Variable              | Values                    | Default   |
//! |-----------------------|---------------------------|-----------|
//! | `RUST_LOG`            | any `EnvFilter` directive | unset     |
//! | `SCAFFOLD_LOG_LEVEL`  | trace, debug, info, warn, error | `warn` |
//! | `SCAFFOLD_LOG_FORMAT` | compact, pretty, json     | `compact` |
//!
//! `RUST_LOG` wins over `SCAFFOLD_LOG_LEVEL` when both are set. Logs go to
//! stderr; stdout carries progress lines and `inspect` JSON.

use anyhow::Result;
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG_LEVEL: &str = "SCAFFOLD_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "SCAFFOLD_LOG_FORMAT";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is unset
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LogConfig {
    /// Read `SCAFFOLD_LOG_LEVEL` and `SCAFFOLD_LOG_FORMAT`.
    pub fn from_env() -> Self {
        let defaults = LogConfig::default();
        LogConfig {
            log_level: env::var(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            format: env::var(ENV_LOG_FORMAT)
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
        }
    }

    /// Raise the level to at least `debug` (for `--verbose`).
    pub fn verbose(mut self) -> Self {
        if !matches!(self.level(), Level::TRACE | Level::DEBUG) {
            self.log_level = "debug".to_string();
        }
        self
    }

    /// Parsed level; unknown names fall back to `warn`.
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}
