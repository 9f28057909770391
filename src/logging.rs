//! Logging setup for transformer runs
//!
//! Output goes to stderr; stdout is reserved for the printed result.
//!
//! - `LOG_FORMAT`: `compact` (default), `pretty` or `json`
//! - `RUST_LOG`: overrides the level picked from `--debug` / `--info`

use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }

    pub fn from_env() -> Self {
        env::var("LOG_FORMAT")
            .map(|format| LogFormat::parse(&format))
            .unwrap_or(LogFormat::Compact)
    }
}

/// Install the global subscriber. A subscriber that is already installed
/// (a second run in the same process, tests) is left in place.
pub fn init_logging(level: Level, format: LogFormat) {
    let mut filter = EnvFilter::new(level.to_string());

    if let Ok(rust_log) = env::var("RUST_LOG") {
        filter = EnvFilter::new(rust_log);
    }

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => subscriber
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("other"), LogFormat::Compact);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Level::WARN, LogFormat::Compact);
        init_logging(Level::DEBUG, LogFormat::Json);
    }
}
