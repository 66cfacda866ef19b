use thiserror::Error;

/// Malformed or out-of-range input handed to the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("{field} must be an integer score (got {value})")]
    NotAScore { field: &'static str, value: String },
    #[error("{field} must be within 0-100 (got {value})")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("Invalid timestamp '{value}' on reading {reading}")]
    InvalidTimestamp { reading: String, value: String },
    #[error("Invalid month-day '{0}', expected MM-DD")]
    InvalidMonthDay(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Lookup failure against the scoring tables, or tables that fail validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Unknown spread type: '{0}'")]
    UnknownSpread(String),
    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),
    #[error("Invalid multiplier {value} for {owner}")]
    InvalidMultiplier { owner: String, value: f64 },
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: String, reason: String },
    #[error("Failed to load {path}: {reason}")]
    SettingsFile { path: String, reason: String },
    #[error("Settings were already installed for this process")]
    SettingsAlreadyInstalled,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
