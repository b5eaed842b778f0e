//! Statement request parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    error::{Result, StatementError},
    period::PeriodType,
    types::Category,
};

/// Which statement to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementType {
    /// Balance sheet.
    #[default]
    Bs,
    /// Income statement.
    Is,
    /// Cash flow statement.
    Cf,
    /// Statement of stockholders' equity.
    Eq,
    /// Statement of comprehensive income.
    Ci,
    /// Every category.
    All,
}

impl StatementType {
    /// Returns the request code (`BS`, `IS`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bs => "BS",
            Self::Is => "IS",
            Self::Cf => "CF",
            Self::Eq => "EQ",
            Self::Ci => "CI",
            Self::All => "ALL",
        }
    }

    /// Returns the categories included in this statement, in display order.
    #[must_use]
    pub const fn categories(&self) -> &'static [Category] {
        match self {
            Self::Bs => &[Category::Assets, Category::Liabilities, Category::Equity],
            Self::Is => &[Category::Revenue, Category::Income, Category::Eps],
            Self::Cf => &[
                Category::OperatingCashFlow,
                Category::InvestingCashFlow,
                Category::FinancingCashFlow,
            ],
            Self::Eq => &[Category::Equity],
            Self::Ci => &[Category::Income],
            Self::All => &Category::ALL,
        }
    }

    /// Returns true if metrics of `category` belong to this statement.
    #[must_use]
    pub fn includes(&self, category: Category) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BS" => Ok(Self::Bs),
            "IS" => Ok(Self::Is),
            "CF" => Ok(Self::Cf),
            "EQ" => Ok(Self::Eq),
            "CI" => Ok(Self::Ci),
            "ALL" => Ok(Self::All),
            other => Err(StatementError::invalid(
                "statement_type",
                format!("expected one of BS, IS, CF, EQ, CI, ALL; got {other:?}"),
            )),
        }
    }
}

/// A validated statement request.
///
/// Construction is the only place parameters are checked. A request that exists is
/// always within bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StatementRequest {
    statement_type: StatementType,
    period_type: PeriodType,
    num_periods: usize,
}

impl StatementRequest {
    /// Creates a request, rejecting a period count outside `1..=period_type.max_periods()`.
    pub fn new(
        statement_type: StatementType,
        period_type: PeriodType,
        num_periods: usize,
    ) -> Result<Self> {
        let max = period_type.max_periods();
        if num_periods == 0 || num_periods > max {
            return Err(StatementError::invalid(
                "num_periods",
                format!("must be between 1 and {max} for {period_type} periods, got {num_periods}"),
            ));
        }
        Ok(Self {
            statement_type,
            period_type,
            num_periods,
        })
    }

    /// Creates a request with the default period count for `period_type`.
    #[must_use]
    pub const fn with_default_periods(statement_type: StatementType, period_type: PeriodType) -> Self {
        Self {
            statement_type,
            period_type,
            num_periods: period_type.default_periods(),
        }
    }

    /// Parses and validates a request from its textual parameters.
    pub fn parse(statement_type: &str, period_type: &str, num_periods: usize) -> Result<Self> {
        Self::new(statement_type.parse()?, period_type.parse()?, num_periods)
    }

    /// Returns the requested statement type.
    #[must_use]
    pub const fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    /// Returns the requested period type.
    #[must_use]
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// Returns the requested number of periods.
    #[must_use]
    pub const fn num_periods(&self) -> usize {
        self.num_periods
    }
}
