//! Line-range edits on ledger source text
//!
//! Used to rewrite or delete a transaction through its `SourceRange`.
//! Lines outside the range are carried over byte for byte, line endings
//! included.

use tallybook_parser::SourceRange;

use crate::error::{CoreError, CoreResult};

fn check_range(lines: &[&str], range: &SourceRange) -> CoreResult<()> {
    if range.first_line > range.last_line || range.last_line >= lines.len() {
        return Err(CoreError::validation(
            "range",
            format!(
                "lines {}..={} out of bounds for {} line(s)",
                range.first_line,
                range.last_line,
                lines.len()
            ),
        ));
    }
    Ok(())
}

/// Replace the lines covered by `range` with `replacement`
pub fn replace_range(source: &str, range: &SourceRange, replacement: &str) -> CoreResult<String> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    check_range(&lines, range)?;

    let mut result = String::with_capacity(source.len() + replacement.len());
    for line in &lines[..range.first_line] {
        result.push_str(line);
    }
    result.push_str(replacement);

    let rest = &lines[range.last_line + 1..];
    if !rest.is_empty() && !replacement.is_empty() && !replacement.ends_with('\n') {
        result.push('\n');
    }
    for line in rest {
        result.push_str(line);
    }
    Ok(result)
}

/// Delete the lines covered by `range`
pub fn remove_range(source: &str, range: &SourceRange) -> CoreResult<String> {
    replace_range(source, range, "")
}

/// Append an entry after the last line of `source`
pub fn append_entry(source: &str, entry_text: &str) -> String {
    let mut result = String::with_capacity(source.len() + entry_text.len() + 1);
    result.push_str(source);
    if !source.is_empty() && !source.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(entry_text);
    result
}
