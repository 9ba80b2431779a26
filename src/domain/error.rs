//! Domain error types.

/// Top-level error type for weekrot.
#[derive(Debug, thiserror::Error)]
pub enum WeekrotError {
    #[error("missing column: ({field}, {symbol}) in input data")]
    MissingData { field: String, symbol: String },

    #[error("malformed calendar: {reason}")]
    MalformedCalendar { reason: String },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&WeekrotError> for std::process::ExitCode {
    fn from(err: &WeekrotError) -> Self {
        let code: u8 = match err {
            WeekrotError::Io(_) => 1,
            WeekrotError::ConfigParse { .. }
            | WeekrotError::ConfigMissing { .. }
            | WeekrotError::ConfigInvalid { .. } => 2,
            WeekrotError::Data { .. } => 3,
            WeekrotError::MalformedCalendar { .. } => 4,
            WeekrotError::MissingData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
