//! Monthly recurring entries
//!
//! A rule renders one ledger entry per month once its day has passed.
//! `last_run` records the due date that was last rendered, so evaluating
//! the same rules twice on one day never produces a duplicate.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, CoreResult};

/// A monthly rule as stored in the rules file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: String,
    /// Header text after the date, e.g. `* "Landlord" "Rent"`
    pub label: String,
    /// Day of month the entry falls due (1 = the 1st)
    #[serde(rename = "day")]
    pub day_of_month: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Posting lines, one per line
    pub template: String,
    #[serde(
        rename = "lastRun",
        default,
        deserialize_with = "deserialize_last_run",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_run: Option<NaiveDate>,
}

fn default_active() -> bool {
    true
}

/// Accept a missing, empty or ISO date value
fn deserialize_last_run<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// An entry produced by a due rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPosting {
    pub rule_id: String,
    pub due_date: NaiveDate,
    /// Ledger text ready to append
    pub text: String,
}

impl RecurringRule {
    /// The rule day in `today`'s month, clamped to the month's last day
    pub fn due_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        if !(1..=31).contains(&self.day_of_month) {
            log::warn!(
                "recurring rule '{}' has invalid day {}",
                self.id,
                self.day_of_month
            );
            return None;
        }
        (1..=self.day_of_month)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(today.year(), today.month(), day))
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        if !self.active {
            return false;
        }
        match self.due_date(today) {
            Some(due) => today >= due && self.last_run.map_or(true, |last| last < due),
            None => false,
        }
    }

    /// Ledger text for the entry due on `due_date`
    pub fn render(&self, due_date: NaiveDate) -> String {
        let mut text = format!("{} {}\n", due_date.format("%Y-%m-%d"), self.label.trim());
        for line in self.template.lines().map(str::trim).filter(|l| !l.is_empty()) {
            text.push_str("    ");
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');
        text
    }
}

/// Render every due rule and mark it as run
pub fn apply_due(rules: &mut [RecurringRule], today: NaiveDate) -> Vec<RecurringPosting> {
    let mut produced = Vec::new();
    for rule in rules.iter_mut() {
        if !rule.is_due(today) {
            continue;
        }
        let Some(due_date) = rule.due_date(today) else {
            continue;
        };
        log::info!("recurring rule '{}' due on {}", rule.id, due_date);
        produced.push(RecurringPosting {
            rule_id: rule.id.clone(),
            due_date,
            text: rule.render(due_date),
        });
        rule.last_run = Some(due_date);
    }
    produced
}

/// Parse a JSON rules file
pub fn load_rules(json: &str) -> CoreResult<Vec<RecurringRule>> {
    if json.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(json).map_err(|e| CoreError::validation("recurring", e.to_string()))
}

/// Serialize rules back to pretty JSON
pub fn save_rules(rules: &[RecurringRule]) -> CoreResult<String> {
    serde_json::to_string_pretty(rules).map_err(|e| CoreError::validation("recurring", e.to_string()))
}
