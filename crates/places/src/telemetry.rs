//! Tracing bootstrap for the directory binaries.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, AppEnvironment};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("unusable log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber could not be installed: {0}")]
    Install(Box<dyn std::error::Error + Send + Sync>),
}

fn filter_for(spec: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(spec).map_err(|source| TelemetryError::Filter {
        value: spec.to_string(),
        source,
    })
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `APP_LOG_LEVEL` from the loaded
/// configuration seeds the filter. Production output stays compact and
/// colorless so log shippers get one line per event, while development and
/// test runs keep the human-oriented multi-line format.
pub fn init(config: &AppConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_for(&config.telemetry.log_level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match config.environment {
        AppEnvironment::Production => builder.compact().with_ansi(false).try_init(),
        AppEnvironment::Development | AppEnvironment::Test => builder.pretty().try_init(),
    }
    .map_err(TelemetryError::Install)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_level_names_make_valid_filters() {
        assert!(filter_for("warn").is_ok());
        assert!(filter_for("places=debug,tower=info").is_ok());
    }

    #[test]
    fn malformed_directives_are_rejected_with_the_offending_value() {
        let err = filter_for("places=debug=extra").expect_err("directive must not parse");
        match err {
            TelemetryError::Filter { value, .. } => assert_eq!(value, "places=debug=extra"),
            other => panic!("expected a filter error, got {other:?}"),
        }
    }
}
