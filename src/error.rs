//! Error handling module for printquote
//!
//! Provides centralized error handling with proper error types using thiserror.
//! An incomplete selection is not an error: the engine reports it as `None`.

use thiserror::Error;

/// Main error type for the quoting library
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Malformed tariff (missing alias, bad thresholds, partial add-on prices)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input (non-numeric or non-positive budget/quantity)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A key that does not exist under the currently selected parent
    #[error("Unknown {level} option: {key}")]
    UnknownOption { level: &'static str, key: String },

    /// A level was picked before its parent level
    #[error("Cannot choose {level} before {missing}")]
    NotReady {
        level: &'static str,
        missing: &'static str,
    },

    /// IO errors while reading or writing a tariff file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for quoting operations
pub type Result<T> = std::result::Result<T, QuoteError>;

impl QuoteError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unknown option error for the given hierarchy level
    pub fn unknown_option(level: &'static str, key: impl Into<String>) -> Self {
        Self::UnknownOption {
            level,
            key: key.into(),
        }
    }

    /// True for errors the caller should answer by re-prompting the user
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::UnknownOption { .. } | Self::NotReady { .. }
        )
    }
}
