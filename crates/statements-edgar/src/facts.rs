//! SEC API response types.

use serde::Deserialize;
use std::collections::BTreeMap;

use statements_core::{Result, StatementError};

/// Response from the SEC EDGAR Company Facts API
/// (`/api/xbrl/companyfacts/CIK##########.json`).
///
/// Maps are ordered so extraction is deterministic.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFacts {
    /// CIK number
    #[serde(default)]
    pub cik: u64,
    /// Entity name
    #[serde(default)]
    pub entity_name: String,
    /// Facts organized by taxonomy, then concept
    #[serde(default)]
    pub facts: BTreeMap<String, BTreeMap<String, ConceptFacts>>,
}

impl CompanyFacts {
    /// Parses a company-facts JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StatementError::Parse(format!("Failed to parse company facts: {e}")))
    }

    /// Returns the number of observations across all taxonomies, concepts and units.
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.facts
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(|concept| concept.units.values())
            .map(Vec::len)
            .sum()
    }
}

/// Facts reported for one concept.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConceptFacts {
    /// Label
    #[serde(default)]
    pub label: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Observations keyed by unit (USD, USD/shares, shares, ...)
    #[serde(default)]
    pub units: BTreeMap<String, Vec<Observation>>,
}

/// A single reported value with filing metadata.
///
/// Value and end date are optional here because the extractor drops incomplete
/// observations rather than failing the whole document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Observation {
    /// End date of the period (`YYYY-MM-DD`)
    #[serde(default)]
    pub end: Option<String>,
    /// Value
    #[serde(default)]
    pub val: Option<f64>,
    /// Start date for duration facts
    #[serde(default)]
    pub start: Option<String>,
    /// Accession number
    #[serde(default)]
    pub accn: Option<String>,
    /// Fiscal year
    #[serde(default)]
    pub fy: Option<i32>,
    /// Fiscal period (FY, Q1, ...)
    #[serde(default)]
    pub fp: Option<String>,
    /// Form type
    #[serde(default)]
    pub form: Option<String>,
    /// Filed date
    #[serde(default)]
    pub filed: Option<String>,
    /// Frame (e.g. CY2023Q4I)
    #[serde(default)]
    pub frame: Option<String>,
}

/// Company ticker entry from `company_tickers.json`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CompanyTicker {
    /// CIK as a number (SEC returns this as an integer)
    pub cik_str: u64,
    /// Ticker symbol
    pub ticker: String,
    /// Company name
    pub title: String,
}

impl CompanyTicker {
    /// Returns the CIK zero-padded to 10 digits.
    #[must_use]
    pub fn cik(&self) -> String {
        format!("{:0>10}", self.cik_str)
    }
}
