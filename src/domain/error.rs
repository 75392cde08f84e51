//! Domain error types.

/// Top-level error type for smacross.
#[derive(Debug, thiserror::Error)]
pub enum SmaCrossError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("insufficient data for {subject}: have {bars} bars, need {minimum}")]
    InsufficientData {
        subject: String,
        bars: usize,
        minimum: usize,
    },

    #[error("{metric} is undefined: strategy returns have zero variance")]
    DegenerateVariance { metric: String },

    #[error("invalid price series: {reason}")]
    InvalidPriceSeries { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SmaCrossError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        SmaCrossError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SmaCrossError> for std::process::ExitCode {
    fn from(err: &SmaCrossError) -> Self {
        let code: u8 = match err {
            SmaCrossError::Io(_) | SmaCrossError::Report { .. } => 1,
            SmaCrossError::ConfigParse { .. }
            | SmaCrossError::ConfigMissing { .. }
            | SmaCrossError::ConfigInvalid { .. }
            | SmaCrossError::InvalidParameter { .. } => 2,
            SmaCrossError::DataSource { .. } | SmaCrossError::InvalidPriceSeries { .. } => 3,
            SmaCrossError::NoData { .. }
            | SmaCrossError::InsufficientData { .. }
            | SmaCrossError::DegenerateVariance { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
