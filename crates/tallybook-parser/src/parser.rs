//! Transaction parser

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::{category, AccountBook};
use crate::blocks::{segment, Block, SegmentStrategy};
use crate::error::{ParseDiagnostic, ParseError};
use crate::types::{Posting, ReconcileState, Transaction};
use crate::generate_txn_id;

/// Knobs for a parse pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub strategy: SegmentStrategy,
    /// Record skipped blocks instead of dropping them silently
    pub collect_diagnostics: bool,
}

/// Result of one parse pass
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub transactions: Vec<Transaction>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub blocks_seen: usize,
}

struct Header<'a> {
    date: &'a str,
    status: ReconcileState,
    payee: &'a str,
    narration: Option<&'a str>,
    tags: Vec<String>,
}

/// Line-based parser for the ledger grammar
#[derive(Debug, Clone, Default)]
pub struct TransactionParser {
    options: ParseOptions,
    book: AccountBook,
}

impl TransactionParser {
    pub fn new(options: ParseOptions, book: AccountBook) -> Self {
        Self { options, book }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn book(&self) -> &AccountBook {
        &self.book
    }

    /// Parse a whole ledger. Malformed blocks are skipped, never fatal.
    pub fn parse(&self, content: &str) -> Result<ParseOutput, ParseError> {
        if let Some(pos) = content.find('\0') {
            return Err(ParseError::CatastrophicInput {
                message: format!("NUL byte at offset {}, input is not text", pos),
            });
        }

        let blocks = segment(content, self.options.strategy);
        let mut output = ParseOutput {
            blocks_seen: blocks.len(),
            ..ParseOutput::default()
        };

        for block in &blocks {
            match self.parse_block(block) {
                Ok(txn) => output.transactions.push(txn),
                Err(diagnostic) => {
                    log::debug!("skipping block: {}", diagnostic);
                    if self.options.collect_diagnostics && !block.is_filler() {
                        output.diagnostics.push(diagnostic);
                    }
                }
            }
        }

        log::info!(
            "parsed {} transactions from {} blocks",
            output.transactions.len(),
            output.blocks_seen
        );
        Ok(output)
    }

    /// Decode raw bytes and parse them
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParseOutput, ParseError> {
        let content = std::str::from_utf8(bytes).map_err(|e| ParseError::CatastrophicInput {
            message: format!("input is not valid UTF-8: {}", e),
        })?;
        self.parse(content)
    }

    /// Interpret one block as a transaction
    pub fn parse_block(&self, block: &Block) -> Result<Transaction, ParseDiagnostic> {
        let mut lines = block.lines();
        let first = lines.next().unwrap_or_default();

        let header = Self::parse_header(first).ok_or_else(|| {
            ParseDiagnostic::structural(block.first_line, block.last_line, "header does not match")
        })?;

        let date = NaiveDate::parse_from_str(header.date, "%Y-%m-%d")
            .map_err(|_| ParseDiagnostic::invalid_date(block.first_line, block.last_line, header.date))?;

        let mut postings = Vec::new();
        let mut comments = Vec::new();

        for line in lines {
            let trimmed = line.trim();
            if let Some(comment) = trimmed.strip_prefix(';') {
                comments.push(comment.trim_start().to_string());
                continue;
            }
            if let Some(posting) = self.parse_posting(trimmed, header.status) {
                postings.push(posting);
            }
        }

        if postings.len() < 2 {
            return Err(ParseDiagnostic::structural(
                block.first_line,
                block.last_line,
                format!("{} posting(s), at least 2 required", postings.len()),
            ));
        }

        Ok(Transaction {
            id: generate_txn_id(block.first_line, &block.text),
            date,
            status: header.status,
            payee: header.payee.to_string(),
            narration: header.narration.map(str::to_string),
            postings,
            comments,
            source_range: block.range(),
            tag: header.tags.first().cloned(),
            tags: header.tags,
        })
    }

    /// `DATE [STATUS] "PAYEE" ["NARRATION"] [TAGS]`
    fn parse_header(line: &str) -> Option<Header<'_>> {
        static TXN_HEADER: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
        let header_regex = TXN_HEADER.get_or_init(|| {
            regex::Regex::new(
                r#"^([0-9]{4}-[0-9]{2}-[0-9]{2})\s+(?:([*!])\s+)?"([^"]+)"(?:\s*"([^"]+)")?(?:\s+(.+))?$"#,
            )
            .unwrap()
        });

        let caps = header_regex.captures(line.trim_end())?;
        let status = caps
            .get(2)
            .and_then(|m| ReconcileState::from_marker(m.as_str()))
            .unwrap_or_default();
        let tags = caps
            .get(5)
            .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Some(Header {
            date: caps.get(1)?.as_str(),
            status,
            payee: caps.get(3)?.as_str(),
            narration: caps.get(4).map(|m| m.as_str()),
            tags,
        })
    }

    /// `ACCOUNT AMOUNT CURRENCY [; COMMENT]`
    fn parse_posting(&self, line: &str, reconcile: ReconcileState) -> Option<Posting> {
        static POSTING_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
        let posting_regex = POSTING_PATTERN.get_or_init(|| {
            regex::Regex::new(r"^([\w:]+)\s+(-?[0-9]+\.[0-9]{2})\s+(\w+)(?:\s+;\s*(.*))?$").unwrap()
        });

        let caps = posting_regex.captures(line)?;
        let account = caps.get(1)?.as_str();
        let amount: Decimal = caps.get(2)?.as_str().parse().ok()?;
        // Values too wide for Decimal come back rounded with fewer decimals
        if amount.scale() != 2 {
            return None;
        }

        Some(Posting {
            account: account.to_string(),
            amount,
            currency: caps.get(3)?.as_str().to_string(),
            category: category(account),
            reconcile,
            comment: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
            canonical_account: self.book.resolve(account).to_string(),
        })
    }
}

// ==================== Tests ====================
