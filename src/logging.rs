//! Logging Module
//!
//! Tracing subscriber setup driven by the configured log level.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log levels accepted by the service configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level {0:?} (expected DEBUG, INFO, WARN or ERROR)")]
pub struct UnknownLogLevel(String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl LogLevel {
    fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Filter directives for this crate and the HTTP tracing layer.
    pub fn filter_directives(&self) -> String {
        let level = self.as_directive();
        format!("lru_cache_service={level},tower_http={level}")
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.filter_directives().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
