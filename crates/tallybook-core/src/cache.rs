//! Ledger cache: the immutable result of one parse pass

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tallybook_parser::{AccountType, ParseDiagnostic, Posting, Transaction};

/// Transactions plus the account taxonomy derived from them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerCache {
    pub transactions: Vec<Transaction>,
    /// Every posting account, first-seen order, deduplicated
    pub accounts: Vec<String>,
    pub expense_accounts: Vec<String>,
    pub asset_accounts: Vec<String>,
    pub income_accounts: Vec<String>,
    pub liability_accounts: Vec<String>,
    pub equity_accounts: Vec<String>,
    pub parsing_errors: Vec<ParseDiagnostic>,
}

impl LedgerCache {
    /// Build the cache from already-validated transactions
    pub fn build(transactions: Vec<Transaction>, parsing_errors: Vec<ParseDiagnostic>) -> Self {
        let mut seen = HashSet::new();
        let mut accounts = Vec::new();
        for posting in transactions.iter().flat_map(|t| t.postings.iter()) {
            if seen.insert(posting.account.as_str()) {
                accounts.push(posting.account.clone());
            }
        }

        let by_prefix = |prefix: AccountType| -> Vec<String> {
            accounts
                .iter()
                .filter(|a| a.starts_with(prefix.as_str()))
                .cloned()
                .collect()
        };

        Self {
            expense_accounts: by_prefix(AccountType::Expenses),
            asset_accounts: by_prefix(AccountType::Assets),
            income_accounts: by_prefix(AccountType::Income),
            liability_accounts: by_prefix(AccountType::Liabilities),
            equity_accounts: by_prefix(AccountType::Equity),
            accounts,
            transactions,
            parsing_errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Look up a transaction by its block id
    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Transaction whose source range covers `line`
    pub fn transaction_at_line(&self, line: usize) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.source_range.contains(line))
    }

    /// Every posting paired with its transaction, source order
    pub fn postings(&self) -> impl Iterator<Item = (&Transaction, &Posting)> {
        self.transactions
            .iter()
            .flat_map(|t| t.postings.iter().map(move |p| (t, p)))
    }

    /// Accounts of one top-level type
    pub fn accounts_by_type(&self, account_type: AccountType) -> &[String] {
        match account_type {
            AccountType::Assets => &self.asset_accounts,
            AccountType::Liabilities => &self.liability_accounts,
            AccountType::Equity => &self.equity_accounts,
            AccountType::Income => &self.income_accounts,
            AccountType::Expenses => &self.expense_accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = r#"2024-01-01 * "Opening"
    Assets:Bank:Checking   1000.00 USD
    Equity:OpeningBalances   -1000.00 USD

2024-01-05 * "Market"
    Expenses:Food   25.00 USD
    Assets:Bank:Checking   -25.00 USD

2024-01-06 * "Card"
    Expenses:Food   10.00 USD
    Liabilities:CreditCard   -10.00 USD
    Misc:Thing   0.00 USD
"#;

    fn cache() -> LedgerCache {
        let output = tallybook_parser::parse(LEDGER).unwrap();
        LedgerCache::build(output.transactions, output.diagnostics)
    }

    #[test]
    fn test_accounts_first_seen_unique() {
        let cache = cache();
        assert_eq!(
            cache.accounts,
            vec![
                "Assets:Bank:Checking",
                "Equity:OpeningBalances",
                "Expenses:Food",
                "Liabilities:CreditCard",
                "Misc:Thing",
            ]
        );
    }

    #[test]
    fn test_category_subsets() {
        let cache = cache();
        assert_eq!(cache.expense_accounts, vec!["Expenses:Food"]);
        assert_eq!(cache.asset_accounts, vec!["Assets:Bank:Checking"]);
        assert_eq!(cache.liability_accounts, vec!["Liabilities:CreditCard"]);
        assert_eq!(cache.equity_accounts, vec!["Equity:OpeningBalances"]);
        assert!(cache.income_accounts.is_empty());
        // An account outside every category stays in `accounts` only
        assert!(cache.accounts.contains(&"Misc:Thing".to_string()));
        assert_eq!(cache.accounts_by_type(AccountType::Expenses), ["Expenses:Food"]);
    }

    #[test]
    fn test_lookup_helpers() {
        let cache = cache();
        assert_eq!(cache.transaction_count(), 3);
        let market = cache.transaction_at_line(5).unwrap();
        assert_eq!(market.payee, "Market");
        assert_eq!(cache.transaction(&market.id).unwrap().payee, "Market");
        assert_eq!(cache.postings().count(), 7);
    }

    #[test]
    fn test_empty_cache() {
        let cache = LedgerCache::build(vec![], vec![]);
        assert!(cache.is_empty());
        assert!(cache.accounts.is_empty());
    }
}
