//! Domain error types.

/// Top-level error type for stockscope.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("invalid window {window} for a series of {len} points")]
    InvalidWindow { window: usize, len: usize },

    #[error("non-finite value at index {index}")]
    NonFiniteInput { index: usize },

    #[error("insufficient data: have {have} points, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid allocation: {reason}")]
    InvalidAllocation { reason: String },

    #[error("unknown ticker {ticker}{}", format_suggestions(.suggestions))]
    UnknownTicker {
        ticker: String,
        suggestions: Vec<String>,
    },

    #[error("malformed record {line:?}: {reason}")]
    MalformedRecord { line: String, reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

impl AnalyticsError {
    pub fn invalid_allocation(reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidAllocation {
            reason: reason.into(),
        }
    }

    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AnalyticsError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&AnalyticsError> for std::process::ExitCode {
    fn from(err: &AnalyticsError) -> Self {
        let code: u8 = match err {
            AnalyticsError::Io(_) | AnalyticsError::DataSource { .. } => 1,
            AnalyticsError::ConfigParse { .. }
            | AnalyticsError::ConfigMissing { .. }
            | AnalyticsError::ConfigInvalid { .. } => 2,
            AnalyticsError::InvalidWindow { .. }
            | AnalyticsError::NonFiniteInput { .. }
            | AnalyticsError::InvalidAllocation { .. } => 3,
            AnalyticsError::UnknownTicker { .. } => 4,
            AnalyticsError::InsufficientData { .. } => 5,
            AnalyticsError::MalformedRecord { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
