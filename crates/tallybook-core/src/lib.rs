//! Core ledger processing: cache building, queries, entry formatting

pub mod cache;
pub mod edit;
pub mod entry;
pub mod error;
pub mod period;
pub mod recurring;
pub mod reports;

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tallybook_config::{Config, SegmentationMode};
use tallybook_parser::{AccountBook, ParseOptions, ParseOutput, SegmentStrategy, TransactionParser};

pub use cache::LedgerCache;
pub use edit::{append_entry, remove_range, replace_range};
pub use entry::{format_amount, format_entry, EntryForm};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails};
pub use period::{Period, PeriodFilter};
pub use recurring::{apply_due, load_rules, save_rules, RecurringPosting, RecurringRule};
pub use reports::{
    budget_lines, budget_status, category_breakdown, filtered_postings, running_balance, AccountSeries,
    BalanceSeries, BudgetLine, PostingFilter,
};

// ==================== Engine ====================

/// Parser, account book and budgets bundled for repeated use.
///
/// Every parse builds a fresh [`LedgerCache`]; the engine itself holds no
/// per-ledger state and can be shared across threads by reference.
#[derive(Debug, Clone, Default)]
pub struct LedgerEngine {
    parser: TransactionParser,
    budgets: BTreeMap<String, Decimal>,
}

impl LedgerEngine {
    pub fn new(options: ParseOptions, book: AccountBook, budgets: BTreeMap<String, Decimal>) -> Self {
        Self {
            parser: TransactionParser::new(options, book),
            budgets,
        }
    }

    /// Build an engine from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let options = ParseOptions {
            strategy: map_segmentation(config.ledger.strategy),
            collect_diagnostics: config.ledger.collect_diagnostics,
        };
        let book = AccountBook::new(config.accounts.options.clone(), config.accounts.aliases.clone());
        Self::new(options, book, config.budgets.clone())
    }

    pub fn book(&self) -> &AccountBook {
        self.parser.book()
    }

    pub fn budgets(&self) -> &BTreeMap<String, Decimal> {
        &self.budgets
    }

    /// Parse ledger text into a cache. Malformed transactions are skipped.
    pub fn parse(&self, text: &str) -> CoreResult<LedgerCache> {
        let output = self.parser.parse(text)?;
        Ok(Self::into_cache(output))
    }

    /// Parse raw file bytes; non-text input is rejected
    pub fn parse_bytes(&self, bytes: &[u8]) -> CoreResult<LedgerCache> {
        let output = self.parser.parse_bytes(bytes)?;
        Ok(Self::into_cache(output))
    }

    /// Format an entry, resolving aliased account names first
    pub fn format_entry(&self, entry: &EntryForm) -> CoreResult<String> {
        let book = self.parser.book();
        let resolved = EntryForm {
            from_account: book.resolve(&entry.from_account).to_string(),
            to_account: book.resolve(&entry.to_account).to_string(),
            ..entry.clone()
        };
        entry::format_entry(&resolved)
    }

    /// Budget status against the configured budgets
    pub fn budget_status(&self, cache: &LedgerCache, filter: &PostingFilter) -> CoreResult<Vec<BudgetLine>> {
        reports::budget_status(cache, &self.budgets, filter)
    }

    fn into_cache(output: ParseOutput) -> LedgerCache {
        let cache = LedgerCache::build(output.transactions, output.diagnostics);
        log::debug!(
            "ledger cache: {} transactions, {} accounts, {} diagnostics",
            cache.transaction_count(),
            cache.accounts.len(),
            cache.parsing_errors.len()
        );
        cache
    }
}

fn map_segmentation(mode: SegmentationMode) -> SegmentStrategy {
    match mode {
        SegmentationMode::DateLine => SegmentStrategy::DateLine,
        SegmentationMode::BlankLine => SegmentStrategy::BlankLine,
    }
}

/// Parse with default options and an empty account book
pub fn parse(text: &str) -> CoreResult<LedgerCache> {
    LedgerEngine::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tallybook_parser::ReconcileState;

    #[test]
    fn test_engine_from_config() {
        let config = Config::from_yaml(
            r#"
ledger:
  strategy: blank_line
  collect_diagnostics: true
accounts:
  aliases:
    "💵 Cash": "Assets:Cash"
budgets:
  "Food": "100.00"
"#,
        )
        .unwrap();
        let engine = LedgerEngine::from_config(&config);
        assert_eq!(engine.parser.options().strategy, SegmentStrategy::BlankLine);
        assert!(engine.parser.options().collect_diagnostics);
        assert_eq!(engine.book().resolve("💵 Cash"), "Assets:Cash");
        assert_eq!(engine.budgets()["Food"], Decimal::new(10000, 2));
    }

    #[test]
    fn test_format_entry_resolves_aliases() {
        let mut aliases = HashMap::new();
        aliases.insert("💵 Cash".to_string(), "Assets:Cash".to_string());
        let engine = LedgerEngine::new(ParseOptions::default(), AccountBook::new(vec![], aliases), BTreeMap::new());

        let entry = EntryForm {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            status: ReconcileState::Cleared,
            payee: "Bakery".to_string(),
            narration: None,
            from_account: "💵 Cash".to_string(),
            to_account: "Expenses:Food".to_string(),
            amount: 3.5,
            currency: "USD".to_string(),
            tags: vec![],
        };
        let text = engine.format_entry(&entry).unwrap();
        assert!(text.contains("    Assets:Cash   -3.50 USD\n"));

        let cache = engine.parse(&text).unwrap();
        assert_eq!(cache.accounts, vec!["Assets:Cash", "Expenses:Food"]);
    }

    #[test]
    fn test_engine_budget_status() {
        let mut budgets = BTreeMap::new();
        budgets.insert("Food".to_string(), Decimal::new(1000, 2));
        let engine = LedgerEngine::new(ParseOptions::default(), AccountBook::default(), budgets);
        let cache = engine
            .parse("2024-01-02 * \"Bakery\"\n  Expenses:Food 5.00 USD\n  Assets:Cash -5.00 USD\n")
            .unwrap();
        let lines = engine.budget_status(&cache, &PostingFilter::default()).unwrap();
        assert_eq!(lines[0].ratio, Decimal::new(5, 1));
    }

    #[test]
    fn test_parse_bytes_rejects_binary() {
        let engine = LedgerEngine::default();
        let err = engine.parse_bytes(b"2024-01-01 \x00\x01").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CatastrophicInput);
        assert!(engine.parse_bytes(&[0xc3, 0x28]).is_err());
        assert!(parse("").unwrap().is_empty());
    }
}
