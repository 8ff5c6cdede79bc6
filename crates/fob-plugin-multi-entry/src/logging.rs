//! Subscriber setup for binaries embedding the plugin
//!
//! Only available with the `logging` feature. Libraries should install their
//! own subscriber; the plugin itself only emits `tracing` events under the
//! `fob_plugin_multi_entry` target.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::MultiEntryError;

static INIT: Once = Once::new();

/// Environment variable read by [`init_logging_from_env`]
pub const LOG_LEVEL_ENV: &str = "FOB_MULTI_ENTRY_LOG";

/// Target every plugin event is emitted under
pub const LOG_TARGET: &str = "fob_plugin_multi_entry";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// Re-emitted stylesheets
    #[default]
    Info,
    /// Entry registration and duplicate detection
    Debug,
    /// Full generated module sources
    Trace,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directive scoped to this crate's events
    pub fn directive(&self) -> String {
        format!("{}={}", LOG_TARGET, self.as_filter())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = MultiEntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(MultiEntryError::InvalidLogLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

/// Install a global subscriber showing plugin events at `level`
///
/// `RUST_LOG` directives are added on top. Only the first call in a process
/// has any effect.
///
/// ```rust,no_run
/// use fob_plugin_multi_entry::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let directives = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(env) if !env.is_empty() => format!("{},{}", level.directive(), env),
            _ => level.directive(),
        };

        tracing_subscriber::registry()
            .with(EnvFilter::builder().parse_lossy(directives))
            .with(fmt::layer().compact().with_target(false).without_time())
            .init();
    });
}

/// Level named by `FOB_MULTI_ENTRY_LOG`, [`LogLevel::Info`] when unset
pub fn level_from_env() -> Result<LogLevel, MultiEntryError> {
    match std::env::var(LOG_LEVEL_ENV) {
        Ok(value) => value.parse(),
        Err(_) => Ok(LogLevel::default()),
    }
}

/// Install a global subscriber driven by `FOB_MULTI_ENTRY_LOG`
///
/// An invalid value falls back to [`LogLevel::Info`] and is reported as a
/// warning once the subscriber is up.
pub fn init_logging_from_env() {
    match level_from_env() {
        Ok(level) => init_logging(level),
        Err(error) => {
            init_logging(LogLevel::default());
            tracing::warn!(variable = LOG_LEVEL_ENV, %error, "falling back to info logging");
        }
    }
}
