//! Parsed ledger records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Zero-based, inclusive line range of a block in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub first_line: usize,
    pub last_line: usize,
}

impl SourceRange {
    pub fn new(first_line: usize, last_line: usize) -> Self {
        Self { first_line, last_line }
    }

    /// Number of lines covered by the range
    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.first_line && line <= self.last_line
    }
}

/// Reconcile marker taken from the transaction header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileState {
    /// No status marker
    #[default]
    None,
    /// `*`
    Cleared,
    /// `!`
    Pending,
}

impl ReconcileState {
    /// Header marker, empty for [`ReconcileState::None`]
    pub fn marker(&self) -> &'static str {
        match self {
            ReconcileState::None => "",
            ReconcileState::Cleared => "*",
            ReconcileState::Pending => "!",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "" => Some(ReconcileState::None),
            "*" => Some(ReconcileState::Cleared),
            "!" => Some(ReconcileState::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileState::None => write!(f, "none"),
            ReconcileState::Cleared => write!(f, "cleared"),
            ReconcileState::Pending => write!(f, "pending"),
        }
    }
}

/// One account line of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Account as written in the source
    pub account: String,
    pub amount: Decimal,
    pub currency: String,
    /// Expense category (account path without `Expenses:`), empty otherwise
    pub category: String,
    pub reconcile: ReconcileState,
    /// Trailing `; comment`, empty when absent
    pub comment: String,
    /// Account after alias resolution
    pub canonical_account: String,
}

impl Posting {
    pub fn is_expense(&self) -> bool {
        !self.category.is_empty()
    }
}

/// A dated, payee-attributed group of at least two postings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Block identifier, see [`crate::generate_txn_id`]
    pub id: String,
    pub date: NaiveDate,
    pub status: ReconcileState,
    pub payee: String,
    pub narration: Option<String>,
    pub postings: Vec<Posting>,
    pub comments: Vec<String>,
    pub source_range: SourceRange,
    /// First header tag
    pub tag: Option<String>,
    /// All header tags in order
    pub tags: Vec<String>,
}

impl Transaction {
    /// Sum of all posting amounts; zero for a balanced single-currency transfer.
    /// `None` when the sum overflows.
    pub fn residual(&self) -> Option<Decimal> {
        self.postings
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_markers() {
        assert_eq!(ReconcileState::from_marker("*"), Some(ReconcileState::Cleared));
        assert_eq!(ReconcileState::from_marker("!"), Some(ReconcileState::Pending));
        assert_eq!(ReconcileState::from_marker(""), Some(ReconcileState::None));
        assert_eq!(ReconcileState::from_marker("?"), None);
        assert_eq!(ReconcileState::Pending.marker(), "!");
    }

    #[test]
    fn test_source_range() {
        let range = SourceRange::new(3, 5);
        assert_eq!(range.line_count(), 3);
        assert!(range.contains(4));
        assert!(!range.contains(6));
    }

    #[test]
    fn test_reconcile_serializes_lowercase() {
        let json = serde_json::to_string(&ReconcileState::Cleared).unwrap();
        assert_eq!(json, "\"cleared\"");
    }
}
