//! Account classification and alias resolution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level account category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Assets => "Assets",
            AccountType::Liabilities => "Liabilities",
            AccountType::Equity => "Equity",
            AccountType::Income => "Income",
            AccountType::Expenses => "Expenses",
        }
    }

    /// Classify an account by its first path segment
    pub fn of(account: &str) -> Option<AccountType> {
        let root = account.split(':').next()?;
        root.parse().ok()
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assets" => Ok(AccountType::Assets),
            "Liabilities" => Ok(AccountType::Liabilities),
            "Equity" => Ok(AccountType::Equity),
            "Income" => Ok(AccountType::Income),
            "Expenses" => Ok(AccountType::Expenses),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget category of an account: the path after `Expenses:`, or empty
pub fn category(account: &str) -> String {
    match account.strip_prefix("Expenses:") {
        Some(rest) => rest.to_string(),
        None => String::new(),
    }
}

/// Known canonical accounts plus display aliases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountBook {
    options: Vec<String>,
    aliases: HashMap<String, String>,
}

impl AccountBook {
    pub fn new(options: Vec<String>, aliases: HashMap<String, String>) -> Self {
        Self { options, aliases }
    }

    /// Resolve a display alias; unknown input comes back unchanged
    pub fn resolve<'a>(&'a self, alias: &'a str) -> &'a str {
        self.aliases.get(alias).map(String::as_str).unwrap_or(alias)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Options and aliases containing `query`, case-insensitive, options first
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        let mut found: Vec<String> = self
            .options
            .iter()
            .filter(|o| o.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        let mut alias_hits: Vec<String> = self
            .aliases
            .keys()
            .filter(|a| a.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        alias_hits.sort();
        found.extend(alias_hits);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> AccountBook {
        let mut aliases = HashMap::new();
        aliases.insert("💵 Cash".to_string(), "Assets:Cash".to_string());
        aliases.insert("🏠 Rent".to_string(), "Expenses:Housing:Rent".to_string());
        AccountBook::new(
            vec!["Assets:Cash".to_string(), "Expenses:Housing:Rent".to_string()],
            aliases,
        )
    }

    #[test]
    fn test_account_type_of() {
        assert_eq!(AccountType::of("Assets:Bank:Checking"), Some(AccountType::Assets));
        assert_eq!(AccountType::of("Expenses:Food"), Some(AccountType::Expenses));
        assert_eq!(AccountType::of("Equity"), Some(AccountType::Equity));
        assert_eq!(AccountType::of("Misc:Thing"), None);
        assert_eq!(AccountType::of(""), None);
    }

    #[test]
    fn test_category_partition() {
        assert_eq!(category("Expenses:Food:Groceries"), "Food:Groceries");
        assert_eq!(category("Expenses:Rent"), "Rent");
        assert_eq!(category("Assets:Cash"), "");
        assert_eq!(category("Income:Expenses:Odd"), "");
        assert_eq!(category("Expenses"), "");
    }

    #[test]
    fn test_resolve_known_alias() {
        let book = book();
        assert_eq!(book.resolve("💵 Cash"), "Assets:Cash");
    }

    #[test]
    fn test_unknown_alias_falls_back() {
        let book = book();
        assert_eq!(book.resolve("🎯 Misc"), "🎯 Misc");
        assert_eq!(AccountBook::default().resolve("Assets:Cash"), "Assets:Cash");
    }

    #[test]
    fn test_search() {
        let book = book();
        assert_eq!(book.search("cash"), vec!["Assets:Cash", "💵 Cash"]);
        assert_eq!(book.search("rent"), vec!["Expenses:Housing:Rent", "🏠 Rent"]);
        assert!(book.search("nothing").is_empty());
    }
}
