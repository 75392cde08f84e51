//! Tracing subscriber setup for the binary.

use crate::domain::error::SmaCrossError;

pub const LOG_ENV_VAR: &str = "SMACROSS_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, SmaCrossError> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(SmaCrossError::ConfigInvalid {
                section: "logging".into(),
                key: "format".into(),
                reason: format!("unknown log format '{other}' (expected text or json)"),
            }),
        }
    }
}

/// Installs the global subscriber, writing to stderr. `SMACROSS_LOG`
/// overrides `log_level` when set.
pub fn init_tracing(log_level: &str, format: LogFormat) -> Result<(), SmaCrossError> {
    let filter = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter).map_err(|err| {
        SmaCrossError::ConfigInvalid {
            section: "logging".into(),
            key: "level".into(),
            reason: format!("invalid log filter '{filter}': {err}"),
        }
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|err| SmaCrossError::ConfigInvalid {
        section: "logging".into(),
        key: "level".into(),
        reason: format!("failed to install subscriber: {err}"),
    })
}
