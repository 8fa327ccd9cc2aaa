//! Billing period and generation-run domain types.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::BillingError;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A (year, month) billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a billing period.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidMonth` unless `month` is 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self, BillingError> {
        if !(1..=12).contains(&month) {
            return Err(BillingError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The period year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The period month (1-12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Human label for the period, e.g. "January 2025".
    #[must_use]
    pub fn description(&self) -> String {
        let index = (self.month - 1) as usize;
        format!("{} {}", MONTH_NAMES[index], self.year)
    }

    /// The number of days in this period's month.
    #[must_use]
    pub const fn last_day(&self) -> u32 {
        match self.month {
            2 => {
                if is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// The calendar date for a schedule's day-of-month, clamped into
    /// this month (day 31 in February becomes the 28th or 29th).
    #[must_use]
    pub fn date_with_day(&self, day: u32) -> NaiveDate {
        let clamped = day.clamp(1, self.last_day());
        NaiveDate::from_ymd_opt(self.year, self.month, clamped)
            .expect("month and day are validated")
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Outcome status of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Every unit in scope produced a quota (or was skipped as a
    /// duplicate).
    Completed,
    /// Some units produced quotas, some failed.
    Partial,
    /// No quota was created.
    Failed,
}

impl GenerationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "completed" => Some(Self::Completed),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accumulator for one generation run.
///
/// Per-unit failures are recorded as diagnostics and never abort the
/// run; the overall status is derived from the final counts.
#[derive(Debug, Clone, Default)]
pub struct RunTally {
    created: u32,
    failed: u32,
    total_amount: Decimal,
    affected_unit_ids: Vec<Uuid>,
    errors: Vec<String>,
}

impl RunTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully created quota.
    pub fn record_created(&mut self, unit_id: Uuid, amount: Decimal) {
        self.created += 1;
        self.total_amount += amount;
        self.affected_unit_ids.push(unit_id);
    }

    /// Records a per-unit failure with its diagnostic.
    pub fn record_failure(&mut self, unit_id: Uuid, message: &str) {
        self.failed += 1;
        self.errors.push(format!("Unit {unit_id}: {message}"));
    }

    /// Number of quotas created.
    #[must_use]
    pub const fn created(&self) -> u32 {
        self.created
    }

    /// Number of units that failed.
    #[must_use]
    pub const fn failed(&self) -> u32 {
        self.failed
    }

    /// Sum of all created quota amounts.
    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Ids of the units that received a quota.
    #[must_use]
    pub fn affected_unit_ids(&self) -> &[Uuid] {
        &self.affected_unit_ids
    }

    /// Derives the run status from the counts.
    ///
    /// `completed` when nothing failed, `partial` when both counters are
    /// non-zero, `failed` when nothing was created.
    #[must_use]
    pub const fn status(&self) -> GenerationStatus {
        if self.failed == 0 {
            GenerationStatus::Completed
        } else if self.created > 0 {
            GenerationStatus::Partial
        } else {
            GenerationStatus::Failed
        }
    }

    /// Concatenated diagnostics, or `None` when the run was clean.
    #[must_use]
    pub fn error_details(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_period_rejects_invalid_month() {
        assert_eq!(
            BillingPeriod::new(2025, 0),
            Err(BillingError::InvalidMonth(0))
        );
        assert_eq!(
            BillingPeriod::new(2025, 13),
            Err(BillingError::InvalidMonth(13))
        );
        assert!(BillingPeriod::new(2025, 12).is_ok());
    }

    #[test]
    fn test_period_description() {
        let period = BillingPeriod::new(2025, 1).unwrap();
        assert_eq!(period.description(), "January 2025");
        let period = BillingPeriod::new(2024, 12).unwrap();
        assert_eq!(period.description(), "December 2024");
    }

    #[rstest]
    #[case(2025, 2, 31, 28)] // February
    #[case(2024, 2, 31, 29)] // leap February
    #[case(2025, 4, 31, 30)] // April
    #[case(2025, 1, 31, 31)] // day exists, unchanged
    fn test_clamps_day_into_month(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected_day: u32,
    ) {
        let period = BillingPeriod::new(year, month).unwrap();
        assert_eq!(
            period.date_with_day(day),
            NaiveDate::from_ymd_opt(year, month, expected_day).unwrap()
        );
    }

    #[test]
    fn test_day_within_month_is_unchanged() {
        let period = BillingPeriod::new(2025, 2).unwrap();
        assert_eq!(
            period.date_with_day(15),
            NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
        );
    }

    #[test]
    fn test_century_leap_rules() {
        assert_eq!(BillingPeriod::new(1900, 2).unwrap().last_day(), 28);
        assert_eq!(BillingPeriod::new(2000, 2).unwrap().last_day(), 29);
    }

    #[test]
    fn test_period_display() {
        let period = BillingPeriod::new(2025, 4).unwrap();
        assert_eq!(period.to_string(), "2025-04");
    }

    #[test]
    fn test_generation_status_strings() {
        assert_eq!(GenerationStatus::Completed.as_str(), "completed");
        assert_eq!(GenerationStatus::Partial.as_str(), "partial");
        assert_eq!(GenerationStatus::Failed.as_str(), "failed");
        assert_eq!(
            GenerationStatus::parse("PARTIAL"),
            Some(GenerationStatus::Partial)
        );
        assert_eq!(GenerationStatus::parse("done"), None);
    }

    #[test]
    fn test_tally_clean_run_is_completed() {
        let mut tally = RunTally::new();
        tally.record_created(Uuid::new_v4(), dec!(100));
        tally.record_created(Uuid::new_v4(), dec!(100));
        assert_eq!(tally.status(), GenerationStatus::Completed);
        assert_eq!(tally.created(), 2);
        assert_eq!(tally.failed(), 0);
        assert_eq!(tally.total_amount(), dec!(200));
        assert_eq!(tally.affected_unit_ids().len(), 2);
        assert!(tally.error_details().is_none());
    }

    #[test]
    fn test_tally_empty_run_is_completed() {
        // Nothing failed, so an all-duplicates run still completes.
        let tally = RunTally::new();
        assert_eq!(tally.status(), GenerationStatus::Completed);
    }

    #[test]
    fn test_tally_mixed_run_is_partial() {
        let mut tally = RunTally::new();
        tally.record_created(Uuid::new_v4(), dec!(50));
        tally.record_failure(Uuid::new_v4(), "no amount configured");
        assert_eq!(tally.status(), GenerationStatus::Partial);
    }

    #[test]
    fn test_tally_all_failures_is_failed() {
        let mut tally = RunTally::new();
        tally.record_failure(Uuid::new_v4(), "boom");
        tally.record_failure(Uuid::new_v4(), "boom");
        assert_eq!(tally.status(), GenerationStatus::Failed);
    }

    #[test]
    fn test_tally_error_details_are_joined() {
        let unit_a = Uuid::new_v4();
        let unit_b = Uuid::new_v4();
        let mut tally = RunTally::new();
        tally.record_failure(unit_a, "first");
        tally.record_failure(unit_b, "second");

        let details = tally.error_details().unwrap();
        assert!(details.contains(&format!("Unit {unit_a}: first")));
        assert!(details.contains(&format!("Unit {unit_b}: second")));
        assert_eq!(details.lines().count(), 2);
    }
}
