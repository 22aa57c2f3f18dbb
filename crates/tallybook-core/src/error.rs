//! Error types for tallybook-core
//!
//! Per-block parse skips never reach this layer as errors; only validation
//! failures and whole-input failures do.

use serde::{Deserialize, Serialize};
use tallybook_parser::ParseError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected by the entry formatter or an editing helper
    ValidationError,
    /// Text could not be decoded or segmented at all
    CatastrophicInput,
    /// Configuration could not be turned into an engine
    ConfigError,
    /// A report total does not fit in a decimal
    ArithmeticOverflow,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::CatastrophicInput => write!(f, "CATASTROPHIC_INPUT"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::ArithmeticOverflow => write!(f, "ARITHMETIC_OVERFLOW"),
        }
    }
}

/// Detailed error information for callers that render errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Offending field (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, " (field: {})", field)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for tallybook-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Catastrophic input: {message}")]
    CatastrophicInput { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn overflow(context: impl Into<String>) -> Self {
        CoreError::Overflow { context: context.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::CatastrophicInput { .. } => ErrorCode::CatastrophicInput,
            CoreError::Config { .. } => ErrorCode::ConfigError,
            CoreError::Overflow { .. } => ErrorCode::ArithmeticOverflow,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());
        match self {
            CoreError::Validation { field, .. } => details.with_field(field.clone()),
            CoreError::CatastrophicInput { .. } => details
                .with_suggestion("Check that the ledger file is UTF-8 text.".to_string()),
            CoreError::Config { .. } => details,
            CoreError::Overflow { .. } => details
                .with_suggestion("Narrow the period or account filter.".to_string()),
        }
    }
}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::CatastrophicInput { message } => CoreError::CatastrophicInput { message },
        }
    }
}

impl From<tallybook_config::ConfigError> for CoreError {
    fn from(err: tallybook_config::ConfigError) -> Self {
        CoreError::Config { message: err.to_string() }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
