//! Property tests for billing periods and run tallies.

use chrono::Datelike;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{BillingPeriod, GenerationStatus, RunTally};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any schedule day lands inside the period's month, on the
    /// requested day whenever that day exists.
    #[test]
    fn prop_clamped_date_stays_in_month(
        year in 1990i32..2100i32,
        month in 1u32..=12u32,
        day in 1u32..=31u32,
    ) {
        let period = BillingPeriod::new(year, month).unwrap();
        let date = period.date_with_day(day);

        prop_assert_eq!(date.year(), year);
        prop_assert_eq!(date.month(), month);
        prop_assert!(date.day() <= day);
        if day <= period.last_day() {
            prop_assert_eq!(date.day(), day);
        } else {
            prop_assert_eq!(date.day(), period.last_day());
        }
    }

    /// Status derivation matches the counts table:
    /// no failures -> completed; both -> partial; no creations -> failed.
    #[test]
    fn prop_status_derivation(created in 0u32..50u32, failed in 0u32..50u32) {
        let mut tally = RunTally::new();
        for _ in 0..created {
            tally.record_created(Uuid::new_v4(), Decimal::ONE);
        }
        for _ in 0..failed {
            tally.record_failure(Uuid::new_v4(), "unit failed");
        }

        let expected = if failed == 0 {
            GenerationStatus::Completed
        } else if created > 0 {
            GenerationStatus::Partial
        } else {
            GenerationStatus::Failed
        };
        prop_assert_eq!(tally.status(), expected);
        prop_assert_eq!(tally.created(), created);
        prop_assert_eq!(tally.failed(), failed);
        prop_assert_eq!(tally.total_amount(), Decimal::from(created));
    }

    /// The tally records one diagnostic line per failure, each naming
    /// its unit.
    #[test]
    fn prop_tally_diagnostics_count(failed in 1usize..20usize) {
        let mut tally = RunTally::new();
        let ids: Vec<Uuid> = (0..failed).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            tally.record_failure(*id, "evaluation failed");
        }

        let details = tally.error_details().unwrap();
        prop_assert_eq!(details.lines().count(), failed);
        for id in &ids {
            prop_assert!(details.contains(&id.to_string()));
        }
    }
}
