//! Aggregation queries over a [`LedgerCache`]
//!
//! Every query is a pure function of the cache and its filters. Money is
//! summed as [`Decimal`] so no cent-level drift accumulates; a total that
//! does not fit is reported as [`CoreError::Overflow`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tallybook_parser::Posting;

use crate::cache::LedgerCache;
use crate::error::{CoreError, CoreResult};
use crate::period::{Period, PeriodFilter};

/// Cumulative balance of one account along the label axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSeries {
    pub account: String,
    /// One value per label
    pub balances: Vec<Decimal>,
}

/// Running balances for a set of accounts over a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSeries {
    pub year: i32,
    /// Distinct transaction dates in the year, ascending
    pub labels: Vec<NaiveDate>,
    pub series: Vec<AccountSeries>,
}

/// Spend against one budget category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: String,
    pub spent: Decimal,
    pub budget: Decimal,
    /// `spent / budget`, zero when the budget is not positive
    pub ratio: Decimal,
}

impl BudgetLine {
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budget
    }
}

/// Posting selection shared by the budget query and callers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingFilter {
    #[serde(default)]
    pub period: Period,
    /// Restrict to these accounts; empty means every account
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl PostingFilter {
    pub fn year(year: i32) -> Self {
        Self {
            period: Period::year(year),
            accounts: vec![],
        }
    }

    pub fn with_accounts(mut self, accounts: Vec<String>) -> Self {
        self.accounts = accounts;
        self
    }

    fn accepts_account(&self, account: &str) -> bool {
        self.accounts.is_empty() || self.accounts.iter().any(|a| a == account)
    }
}

fn add(total: Decimal, amount: Decimal, context: &str) -> CoreResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| CoreError::overflow(context))
}

/// Running balance per account for every posting date in `year`.
///
/// The label axis is the sorted set of transaction dates in the year; an
/// account without postings on a label carries its previous balance forward.
pub fn running_balance<S: AsRef<str>>(cache: &LedgerCache, accounts: &[S], year: i32) -> CoreResult<BalanceSeries> {
    let period = Period::year(year);

    let mut labels = BTreeSet::new();
    let mut deltas: HashMap<&str, BTreeMap<NaiveDate, Decimal>> = HashMap::new();
    for txn in cache.transactions.iter().filter(|t| t.in_period(&period)) {
        labels.insert(txn.date);
        for posting in &txn.postings {
            let delta = deltas
                .entry(posting.account.as_str())
                .or_default()
                .entry(txn.date)
                .or_insert(Decimal::ZERO);
            *delta = add(*delta, posting.amount, &posting.account)?;
        }
    }
    let labels: Vec<NaiveDate> = labels.into_iter().collect();

    let mut requested: Vec<&str> = Vec::new();
    for account in accounts {
        let account = account.as_ref();
        if !requested.contains(&account) {
            requested.push(account);
        }
    }

    let empty = BTreeMap::new();
    let mut series = Vec::with_capacity(requested.len());
    for account in requested {
        let account_deltas = deltas.get(account).unwrap_or(&empty);
        let mut balance = Decimal::ZERO;
        let mut balances = Vec::with_capacity(labels.len());
        for date in &labels {
            if let Some(delta) = account_deltas.get(date) {
                balance = add(balance, *delta, account)?;
            }
            balances.push(balance);
        }
        series.push(AccountSeries {
            account: account.to_string(),
            balances,
        });
    }

    Ok(BalanceSeries { year, labels, series })
}

/// Sum per expense category of the postings on `account` within `year`
pub fn category_breakdown(cache: &LedgerCache, account: &str, year: i32) -> CoreResult<BTreeMap<String, Decimal>> {
    let period = Period::year(year);
    let mut totals = BTreeMap::new();
    for (_, posting) in cache
        .postings()
        .filter(|(t, p)| t.in_period(&period) && p.account == account && p.is_expense())
    {
        let total = totals.entry(posting.category.clone()).or_insert(Decimal::ZERO);
        *total = add(*total, posting.amount, &posting.category)?;
    }
    Ok(totals)
}

/// Postings selected by `filter`, source order
pub fn filtered_postings<'a>(cache: &'a LedgerCache, filter: &PostingFilter) -> Vec<&'a Posting> {
    cache
        .postings()
        .filter(|(t, p)| t.in_period(&filter.period) && filter.accepts_account(&p.account))
        .map(|(_, p)| p)
        .collect()
}

/// Budget status over an explicit posting list
pub fn budget_lines<'a, I>(budgets: &BTreeMap<String, Decimal>, postings: I) -> CoreResult<Vec<BudgetLine>>
where
    I: IntoIterator<Item = &'a Posting>,
{
    let mut spent: HashMap<&str, Decimal> = HashMap::new();
    for posting in postings {
        if budgets.contains_key(&posting.category) {
            let total = spent.entry(posting.category.as_str()).or_insert(Decimal::ZERO);
            *total = add(*total, posting.amount, &posting.category)?;
        }
    }

    budgets
        .iter()
        .map(|(category, budget)| -> CoreResult<BudgetLine> {
            let spent = spent.get(category.as_str()).copied().unwrap_or(Decimal::ZERO);
            let ratio = if *budget > Decimal::ZERO {
                spent
                    .checked_div(*budget)
                    .ok_or_else(|| CoreError::overflow(format!("budget ratio for {}", category)))?
            } else {
                Decimal::ZERO
            };
            Ok(BudgetLine {
                category: category.clone(),
                spent,
                budget: *budget,
                ratio,
            })
        })
        .collect()
}

/// Budget vs. spend for each configured category, over postings matching `filter`
pub fn budget_status(
    cache: &LedgerCache,
    budgets: &BTreeMap<String, Decimal>,
    filter: &PostingFilter,
) -> CoreResult<Vec<BudgetLine>> {
    budget_lines(budgets, filtered_postings(cache, filter))
}
