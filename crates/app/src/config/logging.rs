//! Logging Config

use clap::Args;
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::ParseError,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Directives appended to every filter so HTTP client internals stay quiet.
const QUIET_DEPENDENCIES: &str = "hyper=warn,reqwest=warn,rustls=warn";

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level or directive string does not parse.
    #[error("invalid log filter {directives:?}")]
    Filter {
        /// Full directive string that was rejected.
        directives: String,

        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber")]
    Install(#[source] TryInitError),
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level or filter directives (e.g. `info`, `lealtad_app=debug`)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    /// Filter built from the configured level.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::Filter`] when a directive does not parse.
    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        let directives = format!("{},{QUIET_DEPENDENCIES}", self.log_level.trim());

        EnvFilter::try_new(&directives)
            .map_err(|source| LoggingError::Filter { directives, source })
    }

    /// Install the global subscriber.
    ///
    /// # Errors
    ///
    /// Fails on an unparseable filter or when a subscriber is already set.
    pub fn init(&self) -> Result<(), LoggingError> {
        let filter = self.filter()?;

        let output: Box<dyn Layer<Registry> + Send + Sync> = match self.log_format {
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(output)
            .with(filter)
            .try_init()
            .map_err(LoggingError::Install)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        logging: LoggingConfig,
    }

    fn config(level: &str) -> LoggingConfig {
        LoggingConfig {
            log_level: level.to_string(),
            log_format: LogFormat::Compact,
        }
    }

    #[test]
    fn level_and_directives_build_a_filter() -> TestResult {
        for level in ["info", " debug ", "warn,lealtad_app=trace"] {
            let filter = config(level).filter()?;

            assert!(filter.to_string().contains("reqwest=warn"), "{level}");
        }

        Ok(())
    }

    #[test]
    fn unparseable_level_is_reported() -> TestResult {
        let error = config("lealtad_app=loud")
            .filter()
            .err()
            .ok_or("expected filter error")?;

        assert!(matches!(error, LoggingError::Filter { .. }));
        assert!(error.to_string().starts_with("invalid log filter \"lealtad_app=loud,"));

        Ok(())
    }

    #[test]
    fn json_format_is_selectable() -> TestResult {
        let harness =
            Harness::try_parse_from(["lealtad", "--log-level", "warn", "--log-format", "json"])?;

        assert_eq!(harness.logging.log_format, LogFormat::Json);
        assert_eq!(harness.logging.log_level, "warn");

        Ok(())
    }
}
