//! Entry formatting: structured input back to ledger text

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tallybook_parser::ReconcileState;

use crate::error::{CoreError, CoreResult};

/// A simple two-posting transfer as collected by an entry form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ReconcileState,
    pub payee: String,
    #[serde(default)]
    pub narration: Option<String>,
    /// Debited account; receives the negated amount
    pub from_account: String,
    /// Credited account; receives the amount as is
    pub to_account: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Render an amount with exactly two fractional digits
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded.to_string()
}

/// Convert a form amount to an exact two-place decimal
pub fn entry_amount(amount: f64) -> CoreResult<Decimal> {
    if !amount.is_finite() {
        return Err(CoreError::validation("amount", "amount must be a finite number"));
    }
    let value = Decimal::from_f64(amount)
        .ok_or_else(|| CoreError::validation("amount", "amount is out of range"))?;
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // rescale leaves the scale unchanged when two decimals do not fit
    rounded.rescale(2);
    if rounded.scale() != 2 {
        return Err(CoreError::validation("amount", "amount is too large to keep two decimals"));
    }
    Ok(rounded)
}

fn require(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "must not be blank"));
    }
    Ok(())
}

fn require_account(field: &str, value: &str) -> CoreResult<()> {
    static ACCOUNT_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let account_regex = ACCOUNT_PATTERN.get_or_init(|| regex::Regex::new(r"^[\w:]+$").unwrap());
    require(field, value)?;
    if !account_regex.is_match(value) {
        return Err(CoreError::validation(field, format!("'{}' is not a valid account name", value)));
    }
    Ok(())
}

fn require_currency(value: &str) -> CoreResult<()> {
    static CURRENCY_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let currency_regex = CURRENCY_PATTERN.get_or_init(|| regex::Regex::new(r"^\w+$").unwrap());
    require("currency", value)?;
    if !currency_regex.is_match(value) {
        return Err(CoreError::validation("currency", format!("'{}' is not a valid currency", value)));
    }
    Ok(())
}

fn require_tag(value: &str) -> CoreResult<()> {
    require("tags", value)?;
    if value.chars().any(char::is_whitespace) || value.contains('"') {
        return Err(CoreError::validation("tags", "tags must not contain whitespace or quotes"));
    }
    Ok(())
}

fn require_unquoted(field: &str, value: &str) -> CoreResult<()> {
    if value.contains('"') || value.contains('\n') {
        return Err(CoreError::validation(field, "must not contain quotes or line breaks"));
    }
    Ok(())
}

/// Check every field the parser needs to read the entry back
pub fn validate_entry(entry: &EntryForm) -> CoreResult<Decimal> {
    let amount = entry_amount(entry.amount)?;
    if !(0..=9999).contains(&entry.date.year()) {
        return Err(CoreError::validation("date", "year must have four digits"));
    }
    require("payee", &entry.payee)?;
    require_unquoted("payee", &entry.payee)?;
    if let Some(narration) = entry.narration.as_deref() {
        require_unquoted("narration", narration)?;
    }
    require_account("from_account", &entry.from_account)?;
    require_account("to_account", &entry.to_account)?;
    require_currency(&entry.currency)?;
    for tag in &entry.tags {
        require_tag(tag)?;
    }
    Ok(amount)
}

/// Format a transfer as ledger text, ending with a blank line
pub fn format_entry(entry: &EntryForm) -> CoreResult<String> {
    let amount = validate_entry(entry)?;

    let mut text = entry.date.format("%Y-%m-%d").to_string();
    let marker = entry.status.marker();
    if !marker.is_empty() {
        text.push(' ');
        text.push_str(marker);
    }
    text.push_str(&format!(" \"{}\"", entry.payee));
    if let Some(narration) = entry.narration.as_deref().filter(|n| !n.is_empty()) {
        text.push_str(&format!(" \"{}\"", narration));
    }
    if !entry.tags.is_empty() {
        text.push(' ');
        text.push_str(&entry.tags.join(" "));
    }
    text.push('\n');

    text.push_str(&format!(
        "    {}   {} {}\n",
        entry.from_account,
        format_amount(-amount),
        entry.currency
    ));
    text.push_str(&format!(
        "    {}   {} {}\n",
        entry.to_account,
        format_amount(amount),
        entry.currency
    ));
    text.push('\n');

    Ok(text)
}
