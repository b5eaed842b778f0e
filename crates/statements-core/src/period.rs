//! Reporting period definitions.
//!
//! This module defines [`PeriodType`], the requested periodicity of a statement, and
//! the duration rules used to decide which facts belong to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatementError;

/// Minimum elapsed days for a duration fact to count as a fiscal year.
pub const ANNUAL_MIN_DAYS: i64 = 350;

/// Elapsed-day window for a duration fact to count as a fiscal quarter.
pub const QUARTERLY_DAYS: std::ops::RangeInclusive<i64> = 80..=100;

/// Period type for normalized statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Fiscal-year periods (10-K).
    #[default]
    Annual,
    /// Three-month periods (10-Q).
    Quarterly,
    /// Cumulative year-to-date periods of any length.
    Ytd,
}

impl PeriodType {
    /// All period types, in declaration order.
    pub const ALL: [Self; 3] = [Self::Annual, Self::Quarterly, Self::Ytd];

    /// Returns the lowercase request name (`annual`, `quarterly`, `ytd`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
            Self::Ytd => "ytd",
        }
    }

    /// Returns the largest number of periods a request may ask for.
    #[must_use]
    pub const fn max_periods(&self) -> usize {
        match self {
            Self::Annual => 10,
            Self::Quarterly | Self::Ytd => 40,
        }
    }

    /// Returns the number of periods used when a request does not say.
    #[must_use]
    pub const fn default_periods(&self) -> usize {
        match self {
            Self::Annual => 3,
            Self::Quarterly | Self::Ytd => 4,
        }
    }

    /// Returns true if a fact spanning `days` elapsed days belongs to this period type.
    ///
    /// `None` marks an instant fact, which every period type accepts.
    #[must_use]
    pub fn accepts_duration(&self, days: Option<i64>) -> bool {
        let Some(days) = days else {
            return true;
        };
        match self {
            Self::Annual => days >= ANNUAL_MIN_DAYS,
            Self::Quarterly => QUARTERLY_DAYS.contains(&days),
            Self::Ytd => true,
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "quarterly" => Ok(Self::Quarterly),
            "ytd" => Ok(Self::Ytd),
            other => Err(StatementError::invalid(
                "period_type",
                format!("expected one of annual, quarterly, ytd; got {other:?}"),
            )),
        }
    }
}
