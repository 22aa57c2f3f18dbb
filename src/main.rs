//! Tallybook main entry point

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tallybook_config::{Config, ConfigError};
use tallybook_core::{
    append_entry, apply_due, category_breakdown, load_rules, running_balance, save_rules, EntryForm,
    LedgerCache, LedgerEngine, Period, PostingFilter,
};
use tallybook_parser::ReconcileState;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "tallybook")]
#[command(author = "Tallybook Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Budget and balance reports over a plain-text ledger", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transaction, account and diagnostic counts
    Summary,
    /// Running balance per account over a year
    Balance {
        #[arg(long = "account", required = true)]
        accounts: Vec<String>,
        #[arg(long)]
        year: i32,
    },
    /// Spend per expense category for one account
    Categories {
        #[arg(long)]
        account: String,
        #[arg(long)]
        year: i32,
    },
    /// Spend against the configured budgets
    Budget {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long = "account")]
        accounts: Vec<String>,
    },
    /// Format a two-posting entry, optionally appending it to the ledger
    Add {
        /// Entry date, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        payee: String,
        #[arg(long)]
        narration: Option<String>,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Defaults to the configured currency
        #[arg(long)]
        currency: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Mark the entry `!` instead of `*`
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        append: bool,
    },
    /// Evaluate recurring rules for a day
    Recurring {
        /// Evaluation day, defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Append due entries to the ledger and record the run
        #[arg(long)]
        apply: bool,
    },
    /// Search configured accounts and aliases
    Accounts { query: Option<String> },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (config, config_found) = load_config(&args.config)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    if config_found {
        log::info!("Config loaded: {}", args.config.display());
    } else {
        log::warn!("Config file not found, using defaults: {}", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(run(args.command, config))
}

/// A missing config file falls back to defaults; any other failure is fatal
fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    match Config::load(path) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), false)),
        Err(e) => Err(anyhow::anyhow!("{}", e.to_details())),
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let engine = LedgerEngine::from_config(&config);
    let ledger_path = config.ledger.path.clone();

    match command {
        Command::Summary => {
            let cache = read_ledger(&engine, &ledger_path).await?;
            print_json(&json!({
                "ledger": ledger_path,
                "empty": cache.is_empty(),
                "transactions": cache.transaction_count(),
                "accounts": cache.accounts.len(),
                "expense_accounts": cache.expense_accounts,
                "asset_accounts": cache.asset_accounts,
                "income_accounts": cache.income_accounts,
                "liability_accounts": cache.liability_accounts,
                "equity_accounts": cache.equity_accounts,
                "diagnostics": cache.parsing_errors,
            }))
        }
        Command::Balance { accounts, year } => {
            let cache = read_ledger(&engine, &ledger_path).await?;
            print_json(&running_balance(&cache, &accounts, year)?)
        }
        Command::Categories { account, year } => {
            let cache = read_ledger(&engine, &ledger_path).await?;
            print_json(&category_breakdown(&cache, engine.book().resolve(&account), year)?)
        }
        Command::Budget { year, accounts } => {
            let cache = read_ledger(&engine, &ledger_path).await?;
            let filter = PostingFilter {
                period: year.map(Period::year).unwrap_or_default(),
                accounts,
            };
            let lines = engine.budget_status(&cache, &filter)?;
            print_json(&json!({ "period": filter.period.description(), "lines": lines }))
        }
        Command::Add {
            date,
            payee,
            narration,
            from,
            to,
            amount,
            currency,
            tags,
            pending,
            append,
        } => {
            let entry = EntryForm {
                date: date.unwrap_or_else(today),
                status: if pending { ReconcileState::Pending } else { ReconcileState::Cleared },
                payee,
                narration,
                from_account: from,
                to_account: to,
                amount,
                currency: currency.unwrap_or_else(|| config.defaults.currency.clone()),
                tags,
            };
            let text = engine.format_entry(&entry).map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;
            if append {
                append_to_ledger(&ledger_path, &text).await?;
                log::info!("Appended entry to {}", ledger_path.display());
            }
            print_json(&json!({ "entry": text, "appended": append }))
        }
        Command::Recurring { today: day, apply } => {
            let rules_path = &config.recurring.rules_file;
            let mut rules = match tokio::fs::read_to_string(rules_path).await {
                Ok(content) => load_rules(&content)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::warn!("Recurring rules file not found: {}", rules_path.display());
                    vec![]
                }
                Err(e) => return Err(e).with_context(|| format!("reading {}", rules_path.display())),
            };

            let due = apply_due(&mut rules, day.unwrap_or_else(today));
            if apply && !due.is_empty() {
                let text: String = due.iter().map(|p| p.text.as_str()).collect();
                append_to_ledger(&ledger_path, &text).await?;
                tokio::fs::write(rules_path, save_rules(&rules)?)
                    .await
                    .with_context(|| format!("writing {}", rules_path.display()))?;
                log::info!("Applied {} recurring entries", due.len());
            }
            print_json(&json!({ "due": due, "applied": apply && !due.is_empty() }))
        }
        Command::Accounts { query } => print_json(&engine.book().search(query.as_deref().unwrap_or(""))),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

async fn read_ledger(engine: &LedgerEngine, path: &Path) -> anyhow::Result<LedgerCache> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading ledger {}", path.display()))?;
    let cache = engine.parse_bytes(&bytes)?;
    if cache.is_empty() {
        log::warn!("Ledger {} contains no transactions", path.display());
    }
    Ok(cache)
}

async fn append_to_ledger(path: &Path, text: &str) -> anyhow::Result<()> {
    let existing = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("reading ledger {}", path.display())),
    };
    tokio::fs::write(path, append_entry(&existing, text))
        .await
        .with_context(|| format!("writing ledger {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
