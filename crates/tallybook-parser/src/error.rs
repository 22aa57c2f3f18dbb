//! Error types for tallybook-parser

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whole-input failures; these abort a parse
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Catastrophic input: {message}")]
    CatastrophicInput { message: String },
}

/// Reason a block was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Header or postings do not match the grammar
    StructuralParseSkip,
    /// Date has the right shape but is not a calendar date
    InvalidDate,
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticCode::StructuralParseSkip => write!(f, "STRUCTURAL_PARSE_SKIP"),
            DiagnosticCode::InvalidDate => write!(f, "INVALID_DATE"),
        }
    }
}

/// A skipped block, recoverable and local to that block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub code: DiagnosticCode,
    pub first_line: usize,
    pub last_line: usize,
    pub message: String,
}

impl ParseDiagnostic {
    pub fn structural(first_line: usize, last_line: usize, message: impl Into<String>) -> Self {
        Self {
            code: DiagnosticCode::StructuralParseSkip,
            first_line,
            last_line,
            message: message.into(),
        }
    }

    pub fn invalid_date(first_line: usize, last_line: usize, date: &str) -> Self {
        Self {
            code: DiagnosticCode::InvalidDate,
            first_line,
            last_line,
            message: format!("not a calendar date: {}", date),
        }
    }
}

impl std::fmt::Display for ParseDiagnostic {
    // Lines are shown one-based
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] lines {}-{}: {}",
            self.code,
            self.first_line + 1,
            self.last_line + 1,
            self.message
        )
    }
}
