//! Error types for field validation.

use std::any::Any;

use crate::engine::RuleError;

/// Error produced when a field fails to validate.
///
/// `Rejected` is the ordinary outcome of a rule refusing the current value.
/// The other variants describe problems with the rules or the engine rather
/// than with the user's input.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    /// One or more rules rejected the value. Only the first failure per
    /// field is reported by the engine.
    #[error("field '{field}' is invalid: {message}")]
    Rejected {
        field: String,
        message: String,
        errors: Vec<RuleError>,
    },

    /// The rules handed to the engine could not be evaluated.
    #[error("field '{field}' has a bad rule: {source}")]
    Configuration {
        field: String,
        #[source]
        source: ConfigurationError,
    },

    /// The engine dropped its completion without reporting a result.
    #[error("validation engine abandoned field '{field}'")]
    Abandoned { field: String },

    /// A custom validator panicked while the field was validating.
    #[error("validation of field '{field}' panicked: {message}")]
    Panicked { field: String, message: String },
}

impl ValidationError {
    /// Build a rejection from the engine's error list, taking the first
    /// error's message (or an empty string when there is none).
    pub fn rejected(field: impl Into<String>, errors: Vec<RuleError>) -> Self {
        let message = errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_default();
        Self::Rejected {
            field: field.into(),
            message,
            errors,
        }
    }

    /// Name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            Self::Rejected { field, .. }
            | Self::Configuration { field, .. }
            | Self::Abandoned { field }
            | Self::Panicked { field, .. } => field,
        }
    }

    /// Text shown next to the field.
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Configuration { source, .. } => source.to_string(),
            Self::Abandoned { .. } => "validation did not complete".to_string(),
            Self::Panicked { message, .. } => message.clone(),
        }
    }

    /// Check if this is a plain rule rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Error raised while building or evaluating rule configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigurationError {
    /// A `pattern` did not compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The form configuration document could not be parsed.
    #[error("invalid form configuration: {0}")]
    Json(String),

    /// A rule was well-formed but cannot apply to the value it was given.
    #[error("malformed rule: {0}")]
    MalformedRule(String),
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Extract a human-readable message from a panic payload.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
