//! Date periods for filtering transactions

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tallybook_parser::Transaction;

/// Inclusive date window used by the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Period {
    /// No restriction
    #[default]
    All,
    /// One calendar year
    Year { year: i32 },
    /// Custom range, both ends inclusive
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn year(year: i32) -> Self {
        Period::Year { year }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Period::Range { start, end }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        match *self {
            Period::All => true,
            Period::Year { year } => date.year() == year,
            Period::Range { start, end } => *date >= start && *date <= end,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match self {
            Period::All => "All Time".to_string(),
            Period::Year { year } => format!("Year {}", year),
            Period::Range { start, end } => format!("{} to {}", start, end),
        }
    }
}

/// Period filtering trait
pub trait PeriodFilter {
    fn in_period(&self, period: &Period) -> bool;
}

impl PeriodFilter for Transaction {
    fn in_period(&self, period: &Period) -> bool {
        period.contains(&self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_period() {
        let period = Period::year(2024);
        assert!(period.contains(&date(2024, 1, 1)));
        assert!(period.contains(&date(2024, 12, 31)));
        assert_eq!(period.description(), "Year 2024");
        assert!(period.contains(&date(2024, 6, 15)));
        assert!(!period.contains(&date(2023, 12, 31)));
        assert!(!period.contains(&date(2025, 1, 1)));
    }

    #[test]
    fn test_range_period_inclusive() {
        let period = Period::range(date(2024, 1, 1), date(2024, 3, 31));
        assert!(period.contains(&date(2024, 1, 1)));
        assert!(period.contains(&date(2024, 3, 31)));
        assert!(!period.contains(&date(2024, 4, 1)));
        assert!(period.description().contains("2024-03-31"));
    }

    #[test]
    fn test_all_period() {
        let period = Period::All;
        assert!(period.contains(&date(1970, 1, 1)));
        assert_eq!(period.description(), "All Time");
    }
}
