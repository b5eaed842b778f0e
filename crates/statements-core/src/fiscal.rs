//! Fiscal calendar inference.

use chrono::{Datelike, NaiveDate};

/// Month assumed when there is nothing to infer from.
pub const DEFAULT_FISCAL_MONTH: u32 = 12;

/// Infers a company's fiscal-year-end month (1-12) from its observed period ends.
///
/// Returns the most frequent end month. Ties go to the month seen first, and an empty
/// input yields December.
#[must_use]
pub fn infer_fiscal_month(period_ends: impl IntoIterator<Item = NaiveDate>) -> u32 {
    // (month, count) in order of first appearance
    let mut tally: Vec<(u32, usize)> = Vec::with_capacity(12);
    for end in period_ends {
        let month = end.month();
        match tally.iter_mut().find(|(m, _)| *m == month) {
            Some((_, count)) => *count += 1,
            None => tally.push((month, 1)),
        }
    }

    let mut best: Option<(u32, usize)> = None;
    for (month, count) in tally {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((month, count));
        }
    }
    best.map_or(DEFAULT_FISCAL_MONTH, |(month, _)| month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_june_fiscal_year() {
        let ends = [
            date(2023, 6, 30),
            date(2022, 6, 30),
            date(2021, 6, 30),
            date(2023, 12, 31),
        ];
        assert_eq!(infer_fiscal_month(ends), 6);
    }

    #[test]
    fn test_empty_defaults_to_december() {
        assert_eq!(infer_fiscal_month(std::iter::empty()), 12);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let ends = [
            date(2023, 9, 30),
            date(2023, 3, 31),
            date(2022, 3, 31),
            date(2022, 9, 30),
        ];
        assert_eq!(infer_fiscal_month(ends), 9);
        assert_eq!(infer_fiscal_month(ends.into_iter().rev()), 9);

        let ends = [date(2023, 3, 31), date(2023, 9, 30)];
        assert_eq!(infer_fiscal_month(ends), 3);
    }

    #[test]
    fn test_deterministic() {
        let ends: Vec<_> = (0..20)
            .map(|i| date(2000 + i, 1 + (i as u32 % 4) * 3, 28))
            .collect();
        let first = infer_fiscal_month(ends.iter().copied());
        for _ in 0..5 {
            assert_eq!(infer_fiscal_month(ends.iter().copied()), first);
        }
    }
}
