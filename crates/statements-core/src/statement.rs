//! Normalized statement output.
//!
//! A [`NormalizedStatement`] is a rectangular metric × period grid: every [`Metric`]
//! holds exactly one entry (value or `None`) per period, and periods run most recent
//! first. [`Normalization`] wraps it together with the explicit insufficient-data
//! outcome.

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, NamedFrom, PlSmallStr};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::{
    error::{Result, StatementError},
    period::PeriodType,
    request::StatementType,
    types::Category,
};

/// How a metric value was obtained for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "concept", rename_all = "snake_case")]
pub enum Provenance {
    /// Reported under the group's preferred concept.
    Reported,
    /// Reported under a lower-ranked synonym.
    Synonym(String),
    /// Taken from a related concept through a documented substitution.
    Substituted(String),
}

impl Provenance {
    /// Returns true for values taken from a substitute concept.
    #[must_use]
    pub const fn is_substituted(&self) -> bool {
        matches!(self, Self::Substituted(_))
    }
}

/// One canonical metric row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Unique key (`Category_Label`). Serialized as the map key.
    #[serde(skip)]
    pub key: String,
    /// Display label.
    pub label: String,
    /// Catalog group that produced the row.
    pub group: String,
    /// Statement category.
    pub category: Category,
    /// Sort order within the category.
    pub order: u32,
    /// Value per period end, `None` where nothing was reported.
    pub values: BTreeMap<NaiveDate, Option<f64>>,
    /// Origin of each present value.
    pub provenance: BTreeMap<NaiveDate, Provenance>,
}

impl Metric {
    /// Returns the value for `period`, if any.
    #[must_use]
    pub fn value(&self, period: NaiveDate) -> Option<f64> {
        self.values.get(&period).copied().flatten()
    }
}

/// Statement-wide metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Inferred fiscal-year-end month (1-12).
    pub fiscal_year_end_month: u32,
    /// Requested period type.
    pub period_type: PeriodType,
    /// Requested statement type.
    pub statement_type: StatementType,
}

/// A normalized, period-aligned financial statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedStatement {
    /// Period ends, most recent first.
    pub periods: Vec<NaiveDate>,
    /// Metrics in display order.
    #[serde(with = "metric_map")]
    pub metrics: Vec<Metric>,
    /// Fiscal calendar and request details.
    pub metadata: Metadata,
}

impl NormalizedStatement {
    /// Returns the metric with the given key.
    #[must_use]
    pub fn metric(&self, key: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.key == key)
    }

    /// Iterates over metrics in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Returns the number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if the statement has no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Converts the statement into a DataFrame.
    ///
    /// Columns are `category`, `metric`, then one nullable `f64` column per period named
    /// by its ISO date. Rows follow display order.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let categories: Vec<&str> = self.metrics.iter().map(|m| m.category.as_str()).collect();
        let labels: Vec<&str> = self.metrics.iter().map(|m| m.label.as_str()).collect();

        let mut columns = Vec::with_capacity(self.periods.len() + 2);
        columns.push(Column::new("category".into(), categories));
        columns.push(Column::new("metric".into(), labels));
        for period in &self.periods {
            let values: Vec<Option<f64>> = self.metrics.iter().map(|m| m.value(*period)).collect();
            columns.push(Column::new(
                PlSmallStr::from(period.format("%Y-%m-%d").to_string()),
                values,
            ));
        }

        DataFrame::new(columns).map_err(|e| StatementError::Other(e.to_string()))
    }
}

/// Why a statement could not be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficiencyReason {
    /// The source produced no facts.
    NoFacts,
    /// None of the facts matched a catalog concept of the requested statement.
    NoCatalogMatches {
        /// Number of facts that were considered.
        facts: usize,
    },
    /// Period selection left nothing to report.
    NoPeriods,
}

impl fmt::Display for InsufficiencyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFacts => f.write_str("no facts"),
            Self::NoCatalogMatches { facts } => {
                write!(f, "none of {facts} facts matched the concept catalog")
            }
            Self::NoPeriods => f.write_str("no periods available"),
        }
    }
}

/// Explicit outcome for inputs that cannot produce a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientData {
    /// What was missing.
    pub reason: InsufficiencyReason,
    /// Statement that was requested.
    pub statement_type: StatementType,
    /// Period type that was requested.
    pub period_type: PeriodType,
}

impl fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insufficient data for {} {} statement: {}",
            self.period_type, self.statement_type, self.reason
        )
    }
}

/// Result of normalizing a fact set.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum Normalization {
    /// A statement with at least one period and one metric.
    Complete(NormalizedStatement),
    /// The facts could not support a statement.
    InsufficientData(InsufficientData),
}

impl Normalization {
    /// Returns true for a complete statement.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Returns the statement, if complete.
    #[must_use]
    pub fn statement(&self) -> Option<&NormalizedStatement> {
        match self {
            Self::Complete(statement) => Some(statement),
            Self::InsufficientData(_) => None,
        }
    }

    /// Converts into the statement, if complete.
    #[must_use]
    pub fn into_statement(self) -> Option<NormalizedStatement> {
        match self {
            Self::Complete(statement) => Some(statement),
            Self::InsufficientData(_) => None,
        }
    }
}

mod metric_map {
    use super::*;

    pub(super) fn serialize<S: Serializer>(
        metrics: &[Metric],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(metrics.len()))?;
        for metric in metrics {
            map.serialize_entry(&metric.key, metric)?;
        }
        map.end()
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<Metric>, D::Error> {
        struct MetricsVisitor;

        impl<'de> Visitor<'de> for MetricsVisitor {
            type Value = Vec<Metric>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of metric key to metric")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut metrics = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, mut metric)) = access.next_entry::<String, Metric>()? {
                    metric.key = key;
                    metrics.push(metric);
                }
                Ok(metrics)
            }
        }

        deserializer.deserialize_map(MetricsVisitor)
    }
}
