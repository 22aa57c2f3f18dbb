//! Ledger text parser
//!
//! A lightweight, regex-based parser for the dated transaction / posting
//! ledger format. Parsing is lenient: blocks that do not match the grammar
//! are skipped without aborting the pass.

pub mod account;
pub mod blocks;
pub mod error;
pub mod parser;
pub mod types;

pub use account::{category, AccountBook, AccountType};
pub use blocks::{segment, Block, SegmentStrategy};
pub use error::{DiagnosticCode, ParseDiagnostic, ParseError};
pub use parser::{ParseOptions, ParseOutput, TransactionParser};
pub use types::{Posting, ReconcileState, SourceRange, Transaction};

// ==================== Utility Functions ====================

/// Generate a short hash (8 characters) from content
pub fn short_hash(content: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())[..8].to_string()
}

/// Transaction ID from its first line (shown one-based) and block text
pub fn generate_txn_id(first_line: usize, content: &str) -> String {
    format!("txn-{}:{}", first_line + 1, short_hash(content))
}

/// Parse with default options and no aliases
pub fn parse(content: &str) -> Result<ParseOutput, ParseError> {
    TransactionParser::default().parse(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash_is_stable() {
        assert_eq!(short_hash("abc"), short_hash("abc"));
        assert_ne!(short_hash("abc"), short_hash("abd"));
        assert_eq!(short_hash("").len(), 8);
    }

    #[test]
    fn test_txn_id_format() {
        let id = generate_txn_id(4, "2024-01-01 * \"A\"");
        assert!(id.starts_with("txn-5:"));
        assert_eq!(id.len(), "txn-5:".len() + 8);
    }
}
