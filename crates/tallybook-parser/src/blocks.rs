//! Splitting ledger text into record blocks

use serde::{Deserialize, Serialize};

use crate::types::SourceRange;

/// A run of source lines with its original position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub text: String,
    pub first_line: usize,
    pub last_line: usize,
}

impl Block {
    pub fn range(&self) -> SourceRange {
        SourceRange::new(self.first_line, self.last_line)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// True when every line is blank or a `;` comment
    pub fn is_filler(&self) -> bool {
        self.lines().all(|l| {
            let t = l.trim();
            t.is_empty() || t.starts_with(';')
        })
    }
}

/// How block boundaries are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStrategy {
    /// A block starts at every `YYYY-MM-DD ` line
    #[default]
    DateLine,
    /// A block ends at the first whitespace-only line
    BlankLine,
}

/// Split text on `\n`, dropping a `\r` before it; a trailing newline does not start a line
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Split `text` into blocks according to `strategy`
pub fn segment(text: &str, strategy: SegmentStrategy) -> Vec<Block> {
    let lines = split_lines(text);
    match strategy {
        SegmentStrategy::DateLine => segment_by_date(&lines),
        SegmentStrategy::BlankLine => segment_by_blank(&lines),
    }
}

fn segment_by_date(lines: &[&str]) -> Vec<Block> {
    static DATE_LINE: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let date_regex = DATE_LINE.get_or_init(|| regex::Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}\s").unwrap());

    let mut blocks = Vec::new();
    let mut start = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        if idx > start && date_regex.is_match(line) {
            blocks.push(make_block(lines, start, idx - 1));
            start = idx;
        }
    }
    if start < lines.len() {
        blocks.push(make_block(lines, start, lines.len() - 1));
    }
    blocks
}

fn segment_by_blank(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                blocks.push(make_block(lines, s, idx - 1));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        blocks.push(make_block(lines, s, lines.len() - 1));
    }
    blocks
}

fn make_block(lines: &[&str], first: usize, last: usize) -> Block {
    Block {
        text: lines[first..=last].join("\n"),
        first_line: first,
        last_line: last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = "; header comment
2024-01-01 * \"Shop\"
    Assets:Cash   -5.00 USD
    Expenses:Food   5.00 USD

2024-01-02 * \"Work\"
    Assets:Cash   100.00 USD
    Income:Job   -100.00 USD";

    #[test]
    fn test_empty_input() {
        assert!(segment("", SegmentStrategy::DateLine).is_empty());
        assert!(segment("", SegmentStrategy::BlankLine).is_empty());
    }

    #[test]
    fn test_date_line_strategy() {
        let blocks = segment(LEDGER, SegmentStrategy::DateLine);
        assert_eq!(blocks.len(), 3);
        assert_eq!((blocks[0].first_line, blocks[0].last_line), (0, 0));
        assert_eq!((blocks[1].first_line, blocks[1].last_line), (1, 4));
        assert_eq!((blocks[2].first_line, blocks[2].last_line), (5, 7));
        // The blank separator stays with the preceding block
        assert!(blocks[1].text.ends_with('\n'));
        assert!(blocks[0].is_filler());
    }

    #[test]
    fn test_hash_lines_are_not_filler() {
        let blocks = segment("# not a comment

; a comment
", SegmentStrategy::BlankLine);
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].is_filler());
        assert!(blocks[1].is_filler());
    }

    #[test]
    fn test_date_line_ranges_are_gap_free() {
        let blocks = segment(LEDGER, SegmentStrategy::DateLine);
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].last_line + 1, pair[1].first_line);
        }
        assert_eq!(blocks.last().unwrap().last_line, 7);
    }

    #[test]
    fn test_blank_line_strategy() {
        let blocks = segment(LEDGER, SegmentStrategy::BlankLine);
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].first_line, blocks[0].last_line), (0, 3));
        // Last block has no trailing blank line and is still emitted
        assert_eq!((blocks[1].first_line, blocks[1].last_line), (5, 7));
        assert!(blocks[1].text.starts_with("2024-01-02"));
    }

    #[test]
    fn test_blank_line_whitespace_only_separator() {
        let text = "a\n   \t\nb\n\n\nc\n";
        let blocks = segment(text, SegmentStrategy::BlankLine);
        let ranges: Vec<(usize, usize)> = blocks.iter().map(|b| (b.first_line, b.last_line)).collect();
        assert_eq!(ranges, vec![(0, 0), (2, 2), (5, 5)]);
    }

    #[test]
    fn test_crlf_input() {
        let text = "2024-01-01 * \"A\"\r\n  x\r\n2024-01-02 * \"B\"\r\n";
        let blocks = segment(text, SegmentStrategy::DateLine);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "2024-01-01 * \"A\"\n  x");
        assert_eq!((blocks[1].first_line, blocks[1].last_line), (2, 2));
    }

    #[test]
    fn test_date_needs_trailing_whitespace() {
        let text = "2024-01-01x not a header\n2024-01-02 ok";
        let blocks = segment(text, SegmentStrategy::DateLine);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].first_line, 0);
        assert_eq!(blocks[1].first_line, 1);
    }
}
