//! Configuration Module
//!
//! Loads service configuration from command-line flags, environment variables
//! and an optional `.env` file, in that order of precedence.

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::logging::LogLevel;

const DEFAULT_SERVER_HOST_PORT: &str = "localhost:8080";
const DEFAULT_CACHE_SIZE: usize = 10;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Service configuration parameters.
#[derive(Debug, Clone, Parser)]
#[command(name = "lru_cache_service", version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "SERVER_HOST_PORT", default_value = DEFAULT_SERVER_HOST_PORT)]
    pub server_host_port: String,

    /// Maximum number of entries the cache can hold
    #[arg(long, env = "CACHE_SIZE", default_value = "10")]
    pub cache_size: NonZeroUsize,

    /// TTL for entries stored without one (e.g. 500ms, 30s, 1m30s, 2h)
    #[arg(long, env = "DEFAULT_CACHE_TTL", default_value = "1m", value_parser = parse_duration)]
    pub default_cache_ttl: Duration,

    /// Log level: DEBUG, INFO, WARN or ERROR
    #[arg(long, env = "LOG_LEVEL", default_value = "WARN")]
    pub log_level: LogLevel,
}

impl Config {
    /// Loads `.env` (if present) into the environment, then parses flags and
    /// environment variables.
    ///
    /// Returns the configuration and whether a `.env` file was found. Exits
    /// the process with a usage message on invalid input.
    pub fn load() -> (Self, bool) {
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        (Self::parse(), dotenv_loaded)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host_port: DEFAULT_SERVER_HOST_PORT.to_string(),
            cache_size: NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            default_cache_ttl: DEFAULT_CACHE_TTL,
            log_level: LogLevel::default(),
        }
    }
}

// == Duration Parsing ==
/// Errors from [`parse_duration`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("invalid number in duration {0:?}")]
    InvalidNumber(String),

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Parses durations written as a sequence of `<number><unit>` pairs, such as
/// `300ms`, `1.5s`, `1m30s` or `2h`. Units: `ns`, `us`, `µs`, `ms`, `s`, `m`,
/// `h`. A bare `0` is accepted.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = trimmed;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DurationParseError::MissingUnit(input.to_string()))?;
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() {
            return Err(DurationParseError::InvalidNumber(input.to_string()));
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let nanos_per_unit: f64 = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => {
                return Err(DurationParseError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                })
            }
        };

        let value = f64::from_str(number)
            .map_err(|_| DurationParseError::InvalidNumber(input.to_string()))?;
        let nanos = (value * nanos_per_unit).round();
        if !nanos.is_finite() || nanos > u64::MAX as f64 {
            return Err(DurationParseError::Overflow(input.to_string()));
        }
        let part = Duration::from_nanos(nanos as u64);
        total = total
            .checked_add(part)
            .ok_or_else(|| DurationParseError::Overflow(input.to_string()))?;

        rest = tail;
    }

    Ok(total)
}
