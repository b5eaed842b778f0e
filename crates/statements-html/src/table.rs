//! Scraped statement tables and their extractor.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use statements_core::{FactExtractor, RawFact, Unit, dedupe_facts};

// --- Concept token patterns ---
// R pages link each row to its element definition: `showAr( this, 'defref_us-gaap_Assets', window )`
static DEFREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"defref_([a-z][a-z0-9\-]*)_([A-Z][A-Za-z0-9]*)")
        .expect("Failed to compile DEFREF_RE")
});

// Bare `us-gaap:Assets` or `us-gaap_Assets` labels
static BARE_CONCEPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z][a-z0-9\-]*)[_:]([A-Z][A-Za-z0-9]*)$")
        .expect("Failed to compile BARE_CONCEPT_RE")
});

// Currency-specific scale: `$ in Millions`, `€ in Thousands`, `CHF in Millions`
static CURRENCY_SCALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\p{Sc}|\b[A-Z]{3})\s+(?i:in)\s+(?i:(thousands|millions))")
        .expect("Failed to compile CURRENCY_SCALE_RE")
});

/// A statement page: its ordered period columns and the tables it contains.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapedStatement {
    /// Period ends, in column order.
    pub periods: Vec<NaiveDate>,
    /// Tables on the page.
    pub tables: Vec<ScrapedTable>,
}

/// One statement table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapedTable {
    /// Header text, which carries the unit scale (`$ in Millions`).
    pub header: String,
    /// Data rows.
    pub rows: Vec<ScrapedRow>,
}

/// One table row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapedRow {
    /// Row label carrying the concept token.
    pub label: String,
    /// Cell texts aligned with the statement's periods.
    pub cells: Vec<String>,
}

impl ScrapedRow {
    /// Creates a row.
    pub fn new<I, S>(label: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parses a statement cell into a number.
///
/// Currency symbols, thousands separators and footnote markers are ignored, and
/// parentheses mean negative. Blank cells, dashes and text yield `None`.
#[must_use]
pub fn parse_cell(text: &str) -> Option<f64> {
    let mut cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if let Some(footnote) = cleaned.find('[') {
        cleaned.truncate(footnote);
    }

    let negative = cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')');
    let digits = if negative {
        &cleaned[1..cleaned.len() - 1]
    } else {
        cleaned.as_str()
    };
    if digits.is_empty() || digits.chars().all(|c| matches!(c, '-' | '\u{2013}' | '\u{2014}')) {
        return None;
    }

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value.abs() } else { value })
}

/// Returns the scale implied by a table header (`in Thousands`, `in Millions`).
///
/// A currency scale (`$ in Millions`, `€ in Millions`) takes precedence over other
/// scales in the same header (`shares in Thousands`).
#[must_use]
pub fn unit_multiplier(header: &str) -> f64 {
    if let Some(caps) = CURRENCY_SCALE_RE.captures(header) {
        return scale_of(&caps[1]);
    }
    let header = header.to_ascii_lowercase();
    if header.contains("in thousands") {
        1_000.0
    } else if header.contains("in millions") {
        1_000_000.0
    } else {
        1.0
    }
}

fn scale_of(word: &str) -> f64 {
    if word.eq_ignore_ascii_case("millions") {
        1_000_000.0
    } else {
        1_000.0
    }
}

/// Extracts the namespaced concept (`us-gaap:Assets`) from a row label.
#[must_use]
pub fn concept_token(label: &str) -> Option<String> {
    DEFREF_RE
        .captures(label)
        .or_else(|| BARE_CONCEPT_RE.captures(label.trim()))
        .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
}

/// Extracts [`RawFact`]s from a [`ScrapedStatement`].
///
/// Rows without a concept token are logged and skipped, and unparseable cells are
/// absent. Per-share rows are not scaled by the table multiplier. The first occurrence
/// of a concept and period wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableExtractor;

impl FactExtractor for TableExtractor {
    type Source = ScrapedStatement;

    fn extract(&self, source: &ScrapedStatement) -> Vec<RawFact> {
        let mut facts = Vec::new();

        for table in &source.tables {
            let multiplier = unit_multiplier(&table.header);
            for row in &table.rows {
                let Some(concept) = concept_token(&row.label) else {
                    warn!(label = %row.label, "Skipping row without a concept token");
                    continue;
                };
                if row.cells.len() > source.periods.len() {
                    debug!(
                        %concept,
                        cells = row.cells.len(),
                        periods = source.periods.len(),
                        "Row has more cells than periods, ignoring the extra cells"
                    );
                }

                let per_share = concept.contains("PerShare");
                let (unit, scale) = if per_share {
                    (Unit::PerShare, 1.0)
                } else {
                    (Unit::Currency, multiplier)
                };

                for (cell, period_end) in row.cells.iter().zip(&source.periods) {
                    if let Some(value) = parse_cell(cell) {
                        facts.push(
                            RawFact::instant(concept.as_str(), value * scale, *period_end)
                                .with_unit(unit),
                        );
                    }
                }
            }
        }

        let facts = dedupe_facts(facts);
        debug!(
            tables = source.tables.len(),
            periods = source.periods.len(),
            facts = facts.len(),
            "Extracted scraped statement"
        );
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("(1,234)", Some(-1234.0))]
    #[case("$ 1,234", Some(1234.0))]
    #[case("1,234.56", Some(1234.56))]
    #[case("$ (0.5)", Some(-0.5))]
    #[case("-42", Some(-42.0))]
    #[case("383,285 [1]", Some(383_285.0))]
    #[case("", None)]
    #[case("  ", None)]
    #[case("—", None)]
    #[case("-", None)]
    #[case("Yes", None)]
    #[case("()", None)]
    fn test_parse_cell(#[case] text: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_cell(text), expected);
    }

    #[rstest]
    #[case("Consolidated Balance Sheets - USD ($) $ in Thousands", 1_000.0)]
    #[case("CONSOLIDATED STATEMENTS OF OPERATIONS - USD ($) shares in Thousands, $ in Millions", 1_000_000.0)]
    #[case("Cash Flows - EUR (€) € in Thousands", 1_000.0)]
    #[case("Income Statement - USD ($) $ in Millions", 1_000_000.0)]
    #[case("Balance Sheet - EUR (€) shares in Thousands, € in Millions", 1_000_000.0)]
    #[case("Balance Sheet - CHF shares in Thousands, CHF in Millions", 1_000_000.0)]
    #[case("SHARES IN THOUSANDS, $ IN MILLIONS", 1_000_000.0)]
    #[case("Statement - USD ($) shares in Millions", 1_000_000.0)]
    #[case("Balance Sheet - USD ($)", 1.0)]
    fn test_unit_multiplier(#[case] header: &str, #[case] expected: f64) {
        assert_eq!(unit_multiplier(header), expected);
    }

    #[rstest]
    #[case("javascript:void(0); top.Show.showAr( this, 'defref_us-gaap_Assets', window );", Some("us-gaap:Assets"))]
    #[case("showAr( this, 'defref_aapl_NonTradeReceivablesCurrent', window )", Some("aapl:NonTradeReceivablesCurrent"))]
    #[case("us-gaap:LiabilitiesCurrent", Some("us-gaap:LiabilitiesCurrent"))]
    #[case(" us-gaap_Goodwill ", Some("us-gaap:Goodwill"))]
    #[case("Total assets", None)]
    fn test_concept_token(#[case] label: &str, #[case] expected: Option<&str>) {
        assert_eq!(concept_token(label).as_deref(), expected);
    }

    fn statement() -> ScrapedStatement {
        ScrapedStatement {
            periods: vec![date(2023, 12, 31), date(2022, 12, 31)],
            tables: vec![
                ScrapedTable {
                    header: "Income Statement - USD ($) $ in Millions, except Per Share data"
                        .to_string(),
                    rows: vec![
                        ScrapedRow::new("defref_us-gaap_Revenues", ["$ 1,000", "$ 900"]),
                        ScrapedRow::new("defref_us-gaap_NetIncomeLoss", ["(5)", "12"]),
                        ScrapedRow::new("defref_us-gaap_EarningsPerShareBasic", ["$ 1.25", "—"]),
                        ScrapedRow::new("Unlabelled subtotal", ["1", "2"]),
                    ],
                },
                ScrapedTable {
                    header: "Parenthetical - USD ($) $ in Thousands".to_string(),
                    rows: vec![ScrapedRow::new("defref_us-gaap_Revenues", ["7", "8", "9"])],
                },
            ],
        }
    }

    #[test]
    fn test_extract() {
        let facts = TableExtractor.extract(&statement());

        let find = |concept: &str, end: NaiveDate| {
            facts
                .iter()
                .find(|f| f.concept == concept && f.period_end == end)
                .map(|f| (f.value, f.unit))
        };

        assert_eq!(
            find("us-gaap:Revenues", date(2023, 12, 31)),
            Some((1_000_000_000.0, Unit::Currency))
        );
        assert_eq!(
            find("us-gaap:NetIncomeLoss", date(2023, 12, 31)),
            Some((-5_000_000.0, Unit::Currency))
        );
        assert_eq!(
            find("us-gaap:EarningsPerShareBasic", date(2023, 12, 31)),
            Some((1.25, Unit::PerShare))
        );
        assert_eq!(find("us-gaap:EarningsPerShareBasic", date(2022, 12, 31)), None);
        // the second table repeats Revenues, first occurrence wins
        assert_eq!(
            find("us-gaap:Revenues", date(2022, 12, 31)),
            Some((900_000_000.0, Unit::Currency))
        );
        assert_eq!(facts.len(), 5);
        assert!(facts.iter().all(RawFact::is_instant));
    }

    #[test]
    fn test_extract_without_periods() {
        let mut statement = statement();
        statement.periods.clear();
        assert!(TableExtractor.extract(&statement).is_empty());
    }
}
