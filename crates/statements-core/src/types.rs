//! Core fact types.
//!
//! This module defines the input side of the normalization engine:
//!
//! - [`RawFact`] - One observation of a financial concept
//! - [`Unit`] - Measurement unit of a fact
//! - [`Category`] - Statement category a canonical metric belongs to

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Measurement unit of a fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// A monetary amount (USD, EUR, ...).
    Currency,
    /// A monetary amount per share (EPS and friends).
    PerShare,
    /// A dimensionless ratio.
    Pure,
}

impl Unit {
    /// Maps a company-facts unit name onto a [`Unit`].
    ///
    /// Accepts ISO currency codes (`USD`), per-share currency units (`USD/shares`) and
    /// `pure`. Share counts and anything else return `None`.
    #[must_use]
    pub fn from_api_unit(unit: &str) -> Option<Self> {
        fn is_currency(code: &str) -> bool {
            code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
        }

        if unit.eq_ignore_ascii_case("pure") {
            return Some(Self::Pure);
        }
        match unit.split_once('/') {
            Some((code, per)) if is_currency(code) && per.eq_ignore_ascii_case("shares") => {
                Some(Self::PerShare)
            }
            Some(_) => None,
            None if is_currency(unit) => Some(Self::Currency),
            None => None,
        }
    }
}

/// One observation of a financial concept.
///
/// Facts are produced by an extractor and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Concept identifier namespaced by taxonomy (e.g. `us-gaap:Assets`).
    pub concept: String,
    /// Value in base units (already scaled).
    pub value: f64,
    /// End date of the reporting period.
    pub period_end: NaiveDate,
    /// Start date for duration facts, `None` for instant facts.
    pub period_start: Option<NaiveDate>,
    /// Measurement unit.
    pub unit: Unit,
}

impl RawFact {
    /// Creates an instant fact (balance-sheet style).
    #[must_use]
    pub fn instant(concept: impl Into<String>, value: f64, period_end: NaiveDate) -> Self {
        Self {
            concept: concept.into(),
            value,
            period_end,
            period_start: None,
            unit: Unit::Currency,
        }
    }

    /// Creates a duration fact (income or cash-flow style).
    #[must_use]
    pub fn duration(
        concept: impl Into<String>,
        value: f64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            concept: concept.into(),
            value,
            period_end,
            period_start: Some(period_start),
            unit: Unit::Currency,
        }
    }

    /// Sets the unit of this fact.
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Returns the concept name without its taxonomy prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.concept)
    }

    /// Returns true if this is an instant fact.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.period_start.is_none()
    }

    /// Returns the elapsed days between start and end for duration facts.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.period_start
            .map(|start| self.period_end.signed_duration_since(start).num_days())
    }
}

/// Strips the taxonomy prefix from a concept identifier.
///
/// `us-gaap:Assets` and `Assets` both yield `Assets`.
#[must_use]
pub fn local_name(concept: &str) -> &str {
    concept.rsplit_once(':').map_or(concept, |(_, name)| name)
}

/// Removes facts that repeat an earlier (concept, period end, period start) key.
///
/// The first occurrence of each key is kept and input order is preserved, so callers
/// put the authoritative observation first.
#[must_use]
pub fn dedupe_facts(facts: impl IntoIterator<Item = RawFact>) -> Vec<RawFact> {
    let mut seen = HashSet::new();
    facts
        .into_iter()
        .filter(|fact| {
            seen.insert((
                fact.concept.clone(),
                fact.period_end,
                fact.period_start,
            ))
        })
        .collect()
}

/// Statement category of a canonical metric.
///
/// Declaration order is the fixed cross-category display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Balance sheet assets.
    Assets,
    /// Balance sheet liabilities.
    Liabilities,
    /// Balance sheet equity.
    Equity,
    /// Income statement revenue lines.
    Revenue,
    /// Income statement expense and income lines.
    Income,
    /// Per-share earnings.
    #[serde(rename = "EPS")]
    Eps,
    /// Cash flow from operating activities.
    OperatingCashFlow,
    /// Cash flow from investing activities.
    InvestingCashFlow,
    /// Cash flow from financing activities.
    FinancingCashFlow,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 9] = [
        Self::Assets,
        Self::Liabilities,
        Self::Equity,
        Self::Revenue,
        Self::Income,
        Self::Eps,
        Self::OperatingCashFlow,
        Self::InvestingCashFlow,
        Self::FinancingCashFlow,
    ];

    /// Returns the category name used in metric keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assets => "Assets",
            Self::Liabilities => "Liabilities",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Income => "Income",
            Self::Eps => "EPS",
            Self::OperatingCashFlow => "OperatingCashFlow",
            Self::InvestingCashFlow => "InvestingCashFlow",
            Self::FinancingCashFlow => "FinancingCashFlow",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unit_mapping() {
        assert_eq!(Unit::from_api_unit("USD"), Some(Unit::Currency));
        assert_eq!(Unit::from_api_unit("EUR"), Some(Unit::Currency));
        assert_eq!(Unit::from_api_unit("USD/shares"), Some(Unit::PerShare));
        assert_eq!(Unit::from_api_unit("pure"), Some(Unit::Pure));
        assert_eq!(Unit::from_api_unit("shares"), None);
        assert_eq!(Unit::from_api_unit("USD/Contract"), None);
    }

    #[test]
    fn test_fact_shapes() {
        let assets = RawFact::instant("us-gaap:Assets", 100.0, date(2023, 12, 31));
        assert!(assets.is_instant());
        assert_eq!(assets.duration_days(), None);
        assert_eq!(assets.local_name(), "Assets");

        let revenue = RawFact::duration("Revenues", 10.0, date(2023, 1, 1), date(2023, 12, 31));
        assert!(!revenue.is_instant());
        assert_eq!(revenue.duration_days(), Some(364));
        assert_eq!(revenue.local_name(), "Revenues");
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let end = date(2023, 12, 31);
        let facts = vec![
            RawFact::instant("us-gaap:Assets", 100.0, end),
            RawFact::instant("us-gaap:AssetsCurrent", 40.0, end),
            RawFact::instant("us-gaap:Assets", 99.0, end),
        ];

        let deduped = dedupe_facts(facts);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].value, 100.0);
        assert_eq!(deduped[1].concept, "us-gaap:AssetsCurrent");
    }

    #[test]
    fn test_dedupe_distinguishes_durations() {
        let end = date(2023, 9, 30);
        let facts = vec![
            RawFact::duration("Revenues", 30.0, date(2023, 7, 1), end),
            RawFact::duration("Revenues", 90.0, date(2023, 1, 1), end),
        ];
        assert_eq!(dedupe_facts(facts).len(), 2);
    }

    #[test]
    fn test_category_order() {
        let mut shuffled = vec![Category::FinancingCashFlow, Category::Eps, Category::Assets];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Category::Assets, Category::Eps, Category::FinancingCashFlow]
        );
        assert_eq!(Category::ALL.iter().position(|c| *c == Category::Eps), Some(5));
        assert_eq!(Category::Eps.to_string(), "EPS");
    }
}
