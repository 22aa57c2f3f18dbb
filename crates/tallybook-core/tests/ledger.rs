use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tallybook_core::{
    append_entry, category_breakdown, format_entry, remove_range, running_balance, EntryForm, LedgerEngine,
    PostingFilter,
};
use tallybook_parser::{AccountBook, DiagnosticCode, ParseOptions, ReconcileState, SegmentStrategy};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(amount: f64) -> EntryForm {
    EntryForm {
        date: date(2024, 7, 4),
        status: ReconcileState::Pending,
        payee: "Hardware Store".to_string(),
        narration: Some("Paint".to_string()),
        from_account: "Liabilities:CreditCard".to_string(),
        to_account: "Expenses:Home:Repairs".to_string(),
        amount,
        currency: "EUR".to_string(),
        tags: vec!["diy".to_string()],
    }
}

#[test]
fn test_formatted_entry_round_trips() {
    let text = format_entry(&entry(42.1)).unwrap();
    let cache = tallybook_core::parse(&text).unwrap();
    assert_eq!(cache.transaction_count(), 1);

    let txn = &cache.transactions[0];
    assert_eq!(txn.date, date(2024, 7, 4));
    assert_eq!(txn.status, ReconcileState::Pending);
    assert_eq!(txn.payee, "Hardware Store");
    assert_eq!(txn.narration.as_deref(), Some("Paint"));
    assert_eq!(txn.tags, vec!["diy"]);
    assert_eq!(txn.postings.len(), 2);
    assert_eq!(txn.postings[0].account, "Liabilities:CreditCard");
    assert_eq!(txn.postings[0].amount, Decimal::new(-4210, 2));
    assert_eq!(txn.postings[1].amount, Decimal::new(4210, 2));
    assert_eq!(txn.postings[1].category, "Home:Repairs");
    assert_eq!(txn.residual(), Some(Decimal::ZERO));
}

#[test]
fn test_malformed_neighbours_do_not_abort() {
    let text = r#"2024-01-01 "no postings here"

2024-01-02 * "Kept"
    Assets:Cash   -1.00 USD
    Expenses:Food   1.00 USD

garbage between blocks
2024-02-30 * "Impossible date"
    Assets:Cash   -1.00 USD
    Expenses:Food   1.00 USD
2024-01-03 * "Also kept"
    Assets:Cash   -2.00 USD
    Expenses:Food   2.00 USD
"#;
    let cache = tallybook_core::parse(text).unwrap();
    let payees: Vec<&str> = cache.transactions.iter().map(|t| t.payee.as_str()).collect();
    assert_eq!(payees, vec!["Kept", "Also kept"]);
    assert!(cache.parsing_errors.is_empty());
}

#[test]
fn test_diagnostics_report_skipped_blocks() {
    let engine = LedgerEngine::new(
        ParseOptions {
            strategy: SegmentStrategy::DateLine,
            collect_diagnostics: true,
        },
        AccountBook::default(),
        BTreeMap::new(),
    );
    let text = "2024-02-30 * \"Bad\"\n  A 1.00 USD\n  B -1.00 USD\n2024-03-01 * \"Good\"\n  A 1.00 USD\n  B -1.00 USD\n";
    let cache = engine.parse(text).unwrap();
    assert_eq!(cache.transaction_count(), 1);
    assert_eq!(cache.parsing_errors.len(), 1);
    assert_eq!(cache.parsing_errors[0].code, DiagnosticCode::InvalidDate);
    assert_eq!(cache.parsing_errors[0].first_line, 0);
    assert_eq!(cache.parsing_errors[0].last_line, 2);
}

#[test]
fn test_many_small_amounts_sum_exactly() {
    let mut text = String::new();
    for _ in 0..1000 {
        text = append_entry(
            &text,
            "2024-03-01 * \"Coin\"\n    Expenses:Fees   0.10 USD\n    Assets:Cash   -0.10 USD\n\n",
        );
    }
    let cache = tallybook_core::parse(&text).unwrap();
    assert_eq!(cache.transaction_count(), 1000);

    let totals = category_breakdown(&cache, "Expenses:Fees", 2024).unwrap();
    assert_eq!(totals["Fees"], Decimal::new(10000, 2));

    let series = running_balance(&cache, &["Assets:Cash"], 2024).unwrap();
    assert_eq!(series.labels, vec![date(2024, 3, 1)]);
    assert_eq!(series.series[0].balances, vec![Decimal::new(-10000, 2)]);
}

#[test]
fn test_alias_lookup_falls_back_to_input() {
    let mut aliases = HashMap::new();
    aliases.insert("💳 Card".to_string(), "Liabilities:CreditCard".to_string());
    let book = AccountBook::new(vec!["Assets:Cash".to_string()], aliases);
    assert_eq!(book.resolve("💳 Card"), "Liabilities:CreditCard");
    assert_eq!(book.resolve("🎯 Misc"), "🎯 Misc");
}

#[test]
fn test_append_then_remove_transaction() {
    let engine = LedgerEngine::default();
    let first = format_entry(&entry(10.0)).unwrap();
    let second = format_entry(&entry(20.0)).unwrap();
    let source = append_entry(&append_entry("", &first), &second);

    let cache = engine.parse(&source).unwrap();
    assert_eq!(cache.transaction_count(), 2);

    let doomed = cache.transactions[0].source_range;
    let edited = remove_range(&source, &doomed).unwrap();
    let cache = engine.parse(&edited).unwrap();
    assert_eq!(cache.transaction_count(), 1);
    assert_eq!(cache.transactions[0].postings[1].amount, Decimal::new(2000, 2));
}

#[test]
fn test_budget_status_by_year() {
    let mut budgets = BTreeMap::new();
    budgets.insert("Home:Repairs".to_string(), Decimal::new(10000, 2));
    let engine = LedgerEngine::new(ParseOptions::default(), AccountBook::default(), budgets);

    let cache = engine.parse(&format_entry(&entry(25.0)).unwrap()).unwrap();
    let lines = engine.budget_status(&cache, &PostingFilter::year(2024)).unwrap();
    assert_eq!(lines[0].spent, Decimal::new(2500, 2));
    assert_eq!(lines[0].ratio, Decimal::new(25, 2));
    assert!(engine.budget_status(&cache, &PostingFilter::year(2023)).unwrap()[0].spent.is_zero());
}
