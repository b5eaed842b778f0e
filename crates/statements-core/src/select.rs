//! Period selection.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use tracing::warn;

use crate::period::PeriodType;

/// Picks the period ends a statement is built on, most recent first.
///
/// Annual requests keep only ends in `fiscal_month`. When fewer than `count` ends match,
/// every available end becomes eligible instead, so a short fiscal history is padded
/// with the most recent interim ends rather than returning fewer columns. Quarterly and
/// year-to-date requests consider every end. At most `count` ends are returned.
#[must_use]
pub fn select_periods(
    available: &BTreeSet<NaiveDate>,
    period_type: PeriodType,
    fiscal_month: u32,
    count: usize,
) -> Vec<NaiveDate> {
    let eligible: Vec<NaiveDate> = match period_type {
        PeriodType::Annual => {
            let fiscal: Vec<NaiveDate> = available
                .iter()
                .rev()
                .filter(|end| end.month() == fiscal_month)
                .copied()
                .collect();
            if fiscal.len() < count && fiscal.len() < available.len() {
                warn!(
                    fiscal_month,
                    matched = fiscal.len(),
                    available = available.len(),
                    requested = count,
                    "Too few periods end in the fiscal month, using all periods"
                );
                available.iter().rev().copied().collect()
            } else {
                fiscal
            }
        }
        PeriodType::Quarterly | PeriodType::Ytd => available.iter().rev().copied().collect(),
    };

    eligible.into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ends(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        dates.iter().copied().collect()
    }

    #[test]
    fn test_annual_keeps_fiscal_month() {
        let available = ends(&[
            date(2023, 12, 31),
            date(2023, 9, 30),
            date(2022, 12, 31),
            date(2022, 9, 30),
            date(2021, 12, 31),
        ]);
        let selected = select_periods(&available, PeriodType::Annual, 12, 2);
        assert_eq!(selected, vec![date(2023, 12, 31), date(2022, 12, 31)]);
    }

    #[test]
    fn test_annual_falls_back_when_short() {
        // one of five ends matches the fiscal month
        let available = ends(&[
            date(2023, 12, 31),
            date(2023, 9, 30),
            date(2023, 6, 30),
            date(2023, 3, 31),
            date(2022, 9, 30),
        ]);
        let selected = select_periods(&available, PeriodType::Annual, 12, 3);
        assert_eq!(
            selected,
            vec![date(2023, 12, 31), date(2023, 9, 30), date(2023, 6, 30)]
        );
    }

    #[test]
    fn test_annual_short_history_includes_interim_ends() {
        // two fiscal year ends, ten annual periods requested
        let available = ends(&[
            date(2023, 12, 31),
            date(2023, 9, 30),
            date(2023, 6, 30),
            date(2023, 3, 31),
            date(2022, 12, 31),
        ]);
        let selected = select_periods(&available, PeriodType::Annual, 12, 10);
        assert_eq!(selected.len(), 5);
        assert_eq!(selected[0], date(2023, 12, 31));
        assert!(selected.contains(&date(2023, 9, 30)));
    }

    #[test]
    fn test_annual_falls_back_when_empty() {
        let available = ends(&[date(2023, 9, 30), date(2022, 9, 30)]);
        let selected = select_periods(&available, PeriodType::Annual, 12, 1);
        assert_eq!(selected, vec![date(2023, 9, 30)]);
    }

    #[rstest]
    #[case(PeriodType::Quarterly)]
    #[case(PeriodType::Ytd)]
    fn test_all_ends_eligible(#[case] period_type: PeriodType) {
        let available = ends(&[date(2023, 3, 31), date(2023, 6, 30), date(2023, 9, 30)]);
        let selected = select_periods(&available, period_type, 12, 2);
        assert_eq!(selected, vec![date(2023, 9, 30), date(2023, 6, 30)]);
    }

    #[test]
    fn test_strictly_descending_and_bounded() {
        let available: BTreeSet<_> = (1..=12).map(|m| date(2023, m, 1)).collect();
        for count in 1..=15 {
            let selected = select_periods(&available, PeriodType::Quarterly, 12, count);
            assert!(selected.len() <= count);
            assert!(selected.windows(2).all(|w| w[0] > w[1]));
        }
    }

    #[test]
    fn test_empty_input() {
        let selected = select_periods(&BTreeSet::new(), PeriodType::Annual, 12, 3);
        assert!(selected.is_empty());
    }
}
