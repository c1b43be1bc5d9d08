//! Tracing subscriber setup for Docbot binaries

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConsultError, ConsultResult};

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// How the binaries log to stderr
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Most verbose level emitted when `RUST_LOG` says nothing more specific
    pub level: Level,
    pub format: LogFormat,
    /// Prefix lines with source file and line
    pub source_location: bool,
    /// Log entry and exit of the per-call span
    pub call_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LoggingConfig {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            format: LogFormat::default(),
            source_location: false,
            call_spans: false,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_source_location(mut self, enabled: bool) -> Self {
        self.source_location = enabled;
        self
    }

    pub fn with_call_spans(mut self, enabled: bool) -> Self {
        self.call_spans = enabled;
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.call_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber. `RUST_LOG` directives are honoured on top
/// of the configured level. Fails if a subscriber is already installed.
pub fn setup_logging(config: &LoggingConfig) -> ConsultResult<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(config.span_events())
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_writer(std::io::stderr);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    result.map_err(|e| ConsultError::config(format!("failed to install logger: {}", e)))?;

    tracing::debug!("Logging initialised at {}", config.level);
    Ok(())
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> ConsultResult<Level> {
    Level::from_str(level)
        .map_err(|_| ConsultError::config(format!("Invalid log level: {}", level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert!(parse_log_level("chatty").is_err());
    }

    #[test]
    fn call_spans_select_open_and_close_events() {
        let quiet = LoggingConfig::new(Level::WARN);
        assert_eq!(quiet.format, LogFormat::Text);
        assert_eq!(quiet.span_events(), FmtSpan::NONE);

        let verbose = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_source_location(true)
            .with_call_spans(true);
        assert_eq!(verbose.level, Level::INFO);
        assert!(verbose.source_location);
        assert_eq!(verbose.span_events(), FmtSpan::NEW | FmtSpan::CLOSE);
    }
}
