//! EDGAR "R" statement pages.
//!
//! Filings rendered by the SEC viewer split each financial statement into an `R<n>.htm`
//! page. A page lists its period columns in `th.th` header cells and one row per line
//! item, where the row's `td.pl` link names the reported concept.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

use statements_core::{FactExtractor, RawFact, StatementType};

use crate::table::{ScrapedRow, ScrapedStatement, ScrapedTable, TableExtractor};

// --- CSS Selectors ---
static PERIOD_HEADER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("th.th").expect("Failed to compile PERIOD_HEADER_SELECTOR")
});

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));

static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("Failed to compile HEADER_SELECTOR"));

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static LABEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.pl a").expect("Failed to compile LABEL_SELECTOR"));

static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td.nump, td.num, td.text").expect("Failed to compile CELL_SELECTOR")
});

// FilingSummary short names, lowercased
const BALANCE_SHEET_NAMES: &[&str] = &[
    "balance sheet",
    "balance sheets",
    "statement of financial position",
    "consolidated balance sheets",
    "consolidated balance sheet",
    "consolidated financial position",
    "consolidated balance sheets - southern",
    "consolidated statements of financial position",
    "consolidated statement of financial position",
    "consolidated statements of financial condition",
    "combined and consolidated balance sheet",
    "condensed consolidated balance sheets",
    "consolidated balance sheets, as of december 31",
];

const INCOME_STATEMENT_NAMES: &[&str] = &[
    "income statement",
    "income statements",
    "statement of earnings (loss)",
    "statements of consolidated income",
    "consolidated statements of operations",
    "consolidated statement of operations",
    "consolidated statements of earnings",
    "consolidated statement of earnings",
    "consolidated statements of income",
    "consolidated statement of income",
    "consolidated income statements",
    "consolidated income statement",
    "condensed consolidated statements of earnings",
    "consolidated results of operations",
    "consolidated statements of income (loss)",
    "consolidated statements of income - southern",
    "consolidated statements of operations and comprehensive income",
    "consolidated statements of comprehensive income",
];

const CASH_FLOW_NAMES: &[&str] = &[
    "cash flows statement",
    "cash flows statements",
    "statement of cash flows",
    "statements of consolidated cash flows",
    "consolidated statements of cash flows",
    "consolidated statement of cash flows",
    "consolidated statement of cash flow",
    "consolidated cash flows statements",
    "consolidated cash flow statements",
    "condensed consolidated statements of cash flows",
    "consolidated statements of cash flows (unaudited)",
    "consolidated statements of cash flows - southern",
];

/// Classifies a FilingSummary report short name as a balance sheet, income statement
/// or cash flow statement.
#[must_use]
pub fn statement_kind(short_name: &str) -> Option<StatementType> {
    let name = normalize_text(short_name).to_lowercase();
    let name = name.as_str();
    if BALANCE_SHEET_NAMES.contains(&name) {
        Some(StatementType::Bs)
    } else if INCOME_STATEMENT_NAMES.contains(&name) {
        Some(StatementType::Is)
    } else if CASH_FLOW_NAMES.contains(&name) {
        Some(StatementType::Cf)
    } else {
        None
    }
}

/// Parses an R page into its period columns and tables.
#[must_use]
pub fn parse_statement_page(html: &str) -> ScrapedStatement {
    let document = Html::parse_document(html);

    let periods: Vec<NaiveDate> = document
        .select(&PERIOD_HEADER_SELECTOR)
        .filter_map(|th| {
            let text = element_text(th);
            let date = parse_period_date(&text);
            if date.is_none() {
                debug!(header = %text, "Skipping non-date column header");
            }
            date
        })
        .collect();

    let tables: Vec<ScrapedTable> = document
        .select(&TABLE_SELECTOR)
        .filter_map(|table| {
            let header = table
                .select(&HEADER_SELECTOR)
                .next()
                .map(element_text)
                .unwrap_or_default();
            let rows: Vec<ScrapedRow> = table.select(&ROW_SELECTOR).filter_map(parse_row).collect();
            (!rows.is_empty()).then_some(ScrapedTable { header, rows })
        })
        .collect();

    if periods.is_empty() && !tables.is_empty() {
        warn!(tables = tables.len(), "Statement page has no parseable period columns");
    }

    ScrapedStatement { periods, tables }
}

/// Parses an R page and extracts its facts.
#[must_use]
pub fn extract_statement_page(html: &str) -> Vec<RawFact> {
    TableExtractor.extract(&parse_statement_page(html))
}

fn parse_row(row: ElementRef<'_>) -> Option<ScrapedRow> {
    let link = row.select(&LABEL_SELECTOR).next()?;
    let label = link
        .value()
        .attr("onclick")
        .map(str::to_string)
        .unwrap_or_else(|| element_text(link));
    let cells = row.select(&CELL_SELECTOR).map(element_text).collect();
    Some(ScrapedRow { label, cells })
}

/// Parses a column header such as `Dec. 31, 2023` or `September 30, 2023`.
fn parse_period_date(text: &str) -> Option<NaiveDate> {
    let cleaned = text.replace('.', "");
    let cleaned = cleaned.trim();
    ["%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cleaned, format).ok())
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Collapses runs of whitespace (including non-breaking spaces) into single spaces.
fn normalize_text(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use statements_core::Unit;

    const BALANCE_SHEET_PAGE: &str = r#"<html><body>
<table class="report" border="0" cellspacing="2" id="idm1">
  <tr>
    <th class="tl" colspan="1" rowspan="1"><div style="width: 200px;"><strong>CONSOLIDATED BALANCE SHEETS - USD ($)<br> $ in Millions</strong></div></th>
    <th class="th"><div>Sep. 30, 2023</div></th>
    <th class="th"><div>Sep. 24, 2022</div></th>
  </tr>
  <tr class="re">
    <td class="pl" style="border-bottom: 0px;" valign="top"><a class="a" href="javascript:void(0);" onclick="top.Show.showAr( this, 'defref_us-gaap_CashAndCashEquivalentsAtCarryingValue', window );">Cash and cash equivalents</a></td>
    <td class="nump">$ 29,965<span></span></td>
    <td class="nump">$ 23,646<span></span></td>
  </tr>
  <tr class="ro">
    <td class="pl" style="border-bottom: 0px;" valign="top"><a class="a" href="javascript:void(0);" onclick="top.Show.showAr( this, 'defref_us-gaap_Assets', window );">Total assets</a></td>
    <td class="nump">352,583<span></span></td>
    <td class="nump">352,755<span></span></td>
  </tr>
  <tr class="re">
    <td class="pl" style="border-bottom: 0px;" valign="top"><a class="a" href="javascript:void(0);" onclick="top.Show.showAr( this, 'defref_us-gaap_AccumulatedOtherComprehensiveIncomeLossNetOfTax', window );">Accumulated other comprehensive loss</a></td>
    <td class="num">(11,452)<span></span></td>
    <td class="num">(11,109)<span></span></td>
  </tr>
  <tr class="rh">
    <td class="pl"><a class="a" href="javascript:void(0);">Commitments and contingencies</a></td>
    <td class="text">&#160;<span></span></td>
    <td class="text">&#160;<span></span></td>
  </tr>
  <tr class="rh"><td class="text" colspan="3">Footnote without a link</td></tr>
</table>
</body></html>"#;

    const INCOME_STATEMENT_PAGE: &str = r#"<html><body>
<table class="report" border="0" cellspacing="2" id="idm2">
  <tr>
    <th class="tl" colspan="1" rowspan="2"><div style="width: 200px;"><strong>CONSOLIDATED STATEMENTS OF OPERATIONS - USD ($)<br> shares in Thousands, $ in Millions</strong></div></th>
    <th class="th" colspan="2">12 Months Ended</th>
  </tr>
  <tr>
    <th class="th"><div>Dec. 31, 2023</div></th>
    <th class="th"><div>December 31, 2022</div></th>
  </tr>
  <tr class="re">
    <td class="pl"><a class="a" onclick="top.Show.showAr( this, 'defref_us-gaap_Revenues', window );">Revenues</a></td>
    <td class="nump">$ 1,200<span></span></td>
    <td class="nump">$ 1,100<span></span></td>
  </tr>
  <tr class="ro">
    <td class="pl"><a class="a" onclick="top.Show.showAr( this, 'defref_us-gaap_EarningsPerShareDiluted', window );">Diluted (in dollars per share)</a></td>
    <td class="nump">$ 6.13<span></span></td>
    <td class="nump">$ 6.11<span></span></td>
  </tr>
</table>
</body></html>"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_balance_sheet_page() {
        let page = parse_statement_page(BALANCE_SHEET_PAGE);
        assert_eq!(page.periods, vec![date(2023, 9, 30), date(2022, 9, 24)]);
        assert_eq!(page.tables.len(), 1);

        let table = &page.tables[0];
        assert_eq!(table.header, "CONSOLIDATED BALANCE SHEETS - USD ($) $ in Millions");
        assert_eq!(table.rows.len(), 4);
        assert!(table.rows[1].label.contains("defref_us-gaap_Assets"));
        assert_eq!(table.rows[1].cells, vec!["352,583", "352,755"]);
        // rows without an onclick fall back to the link text
        assert_eq!(table.rows[3].label, "Commitments and contingencies");
    }

    #[test]
    fn test_extract_balance_sheet_page() {
        let facts = extract_statement_page(BALANCE_SHEET_PAGE);
        assert_eq!(facts.len(), 6);

        let assets = facts
            .iter()
            .find(|f| f.concept == "us-gaap:Assets" && f.period_end == date(2023, 9, 30))
            .unwrap();
        assert_eq!(assets.value, 352_583_000_000.0);

        let aoci = facts
            .iter()
            .find(|f| f.local_name() == "AccumulatedOtherComprehensiveIncomeLossNetOfTax")
            .unwrap();
        assert_eq!(aoci.value, -11_452_000_000.0);
    }

    #[test]
    fn test_skips_non_date_headers() {
        let page = parse_statement_page(INCOME_STATEMENT_PAGE);
        assert_eq!(page.periods, vec![date(2023, 12, 31), date(2022, 12, 31)]);

        let facts = TableExtractor.extract(&page);
        let revenue = facts
            .iter()
            .find(|f| f.concept == "us-gaap:Revenues" && f.period_end == date(2022, 12, 31))
            .unwrap();
        assert_eq!(revenue.value, 1_100_000_000.0);

        let eps = facts
            .iter()
            .find(|f| f.concept == "us-gaap:EarningsPerShareDiluted")
            .unwrap();
        assert_eq!(eps.value, 6.13);
        assert_eq!(eps.unit, Unit::PerShare);
    }

    #[test]
    fn test_empty_page() {
        let page = parse_statement_page("<html><body><p>No tables</p></body></html>");
        assert!(page.periods.is_empty());
        assert!(page.tables.is_empty());
    }

    #[rstest]
    #[case("CONSOLIDATED BALANCE SHEETS", Some(StatementType::Bs))]
    #[case("Consolidated Statements of Operations", Some(StatementType::Is))]
    #[case("  consolidated   statements of cash flows ", Some(StatementType::Cf))]
    #[case("Condensed Consolidated Statements of Earnings", Some(StatementType::Is))]
    #[case("Document and Entity Information", None)]
    fn test_statement_kind(#[case] short_name: &str, #[case] expected: Option<StatementType>) {
        assert_eq!(statement_kind(short_name), expected);
    }

    #[rstest]
    #[case("Sep. 30, 2023", Some(date(2023, 9, 30)))]
    #[case("Dec. 31, 2023", Some(date(2023, 12, 31)))]
    #[case("June 24, 2023", Some(date(2023, 6, 24)))]
    #[case("12 Months Ended", None)]
    fn test_parse_period_date(#[case] text: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_period_date(text), expected);
    }
}
