//! Statement pages scraped from a company's recent filings.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use statements_core::{
    FactSource, PeriodType, RawFact, Result, StatementError, StatementRequest, StatementType,
    dedupe_facts,
};
use statements_edgar::{EdgarClient, Filing, FilingArchive};
use statements_html::{extract_statement_page, statement_kind};

const SOURCE_NAME: &str = "SEC EDGAR filings";

/// A [`FactSource`] that reads statement pages out of recent 10-K or 10-Q filings.
///
/// For each of the newest `num_periods` filings of the matching form, the filing's
/// `FilingSummary.xml` is searched for the report whose short name names the requested
/// statement, and that report's `R` page is scraped. Facts from newer filings win over
/// restated ones from older filings.
///
/// Only balance sheets, income statements and cash flow statements have their own
/// pages; other statement types are rejected with
/// [`NotSupported`](StatementError::NotSupported).
#[derive(Debug)]
pub struct FilingStatementSource<A = EdgarClient> {
    archive: Arc<A>,
}

impl<A> Clone for FilingStatementSource<A> {
    fn clone(&self) -> Self {
        Self {
            archive: Arc::clone(&self.archive),
        }
    }
}

impl<A: FilingArchive> FilingStatementSource<A> {
    /// Creates a source reading from `archive`.
    pub const fn new(archive: Arc<A>) -> Self {
        Self { archive }
    }

    async fn filing_facts(
        &self,
        cik: &str,
        filing: &Filing,
        statement_type: StatementType,
    ) -> Result<Vec<RawFact>> {
        let summary = self
            .archive
            .filing_summary(cik, &filing.accession_number)
            .await?;

        let Some((report, page)) = summary.reports.iter().find_map(|report| {
            let page = report.html_file_name.as_deref()?;
            (statement_kind(&report.short_name) == Some(statement_type)).then_some((report, page))
        }) else {
            debug!(
                accession = %filing.accession_number,
                %statement_type,
                reports = summary.reports.len(),
                "No statement page in filing"
            );
            return Ok(Vec::new());
        };

        let html = self
            .archive
            .filing_document(cik, &filing.accession_number, page)
            .await?;
        let facts = extract_statement_page(&html);
        debug!(
            accession = %filing.accession_number,
            report = %report.short_name,
            page,
            facts = facts.len(),
            "Scraped statement page"
        );
        Ok(facts)
    }
}

/// Form type whose filings carry statements for `period_type`.
const fn form_for(period_type: PeriodType) -> &'static str {
    match period_type {
        PeriodType::Annual => "10-K",
        PeriodType::Quarterly | PeriodType::Ytd => "10-Q",
    }
}

#[async_trait]
impl<A: FilingArchive> FactSource for FilingStatementSource<A> {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_facts(&self, cik: &str, request: &StatementRequest) -> Result<Vec<RawFact>> {
        let statement_type = request.statement_type();
        if !matches!(
            statement_type,
            StatementType::Bs | StatementType::Is | StatementType::Cf
        ) {
            return Err(StatementError::NotSupported(format!(
                "{statement_type} has no statement page in filings"
            )));
        }

        let form = form_for(request.period_type());
        let submissions = self.archive.submissions(cik).await?;
        let filings: Vec<Filing> = submissions
            .filings_of(form)
            .take(request.num_periods())
            .collect();
        debug!(cik, form, filings = filings.len(), "Found filings");

        let mut facts = Vec::new();
        for filing in &filings {
            match self.filing_facts(cik, filing, statement_type).await {
                Ok(found) => facts.extend(found),
                Err(e) => warn!(
                    accession = %filing.accession_number,
                    error = %e,
                    "Skipping filing"
                ),
            }
        }

        Ok(dedupe_facts(facts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use statements_core::StatementType;
    use statements_edgar::{FilingSummary, Submissions};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::StatementService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Filing archive served from memory, recording the documents requested.
    #[derive(Debug, Default)]
    struct MemoryArchive {
        submissions: String,
        summaries: HashMap<String, String>,
        documents: HashMap<(String, String), String>,
        requested: Mutex<Vec<String>>,
    }

    impl MemoryArchive {
        fn with_filing(mut self, accession: &str, summary: &str, pages: &[(&str, &str)]) -> Self {
            self.summaries.insert(accession.to_string(), summary.to_string());
            for (name, html) in pages {
                self.documents
                    .insert((accession.to_string(), (*name).to_string()), (*html).to_string());
            }
            self
        }
    }

    #[async_trait]
    impl FilingArchive for MemoryArchive {
        async fn submissions(&self, _cik: &str) -> Result<Submissions> {
            Submissions::from_json(&self.submissions)
        }

        async fn filing_summary(&self, _cik: &str, accession_number: &str) -> Result<FilingSummary> {
            let xml = self.summaries.get(accession_number).ok_or_else(|| {
                StatementError::SourceUnavailable(format!("{accession_number} has no summary"))
            })?;
            FilingSummary::from_xml(xml)
        }

        async fn filing_document(
            &self,
            _cik: &str,
            accession_number: &str,
            file_name: &str,
        ) -> Result<String> {
            self.requested
                .lock()
                .unwrap()
                .push(format!("{accession_number}/{file_name}"));
            self.documents
                .get(&(accession_number.to_string(), file_name.to_string()))
                .cloned()
                .ok_or_else(|| StatementError::SourceUnavailable(file_name.to_string()))
        }
    }

    const SUBMISSIONS: &str = r#"{
        "name": "Example Corp",
        "filings": {"recent": {
            "accessionNumber": ["0000000001-24-000003", "0000000001-24-000002", "0000000001-23-000001"],
            "form": ["10-Q", "10-K", "10-K"],
            "filingDate": ["2024-05-01", "2024-02-01", "2023-02-01"]
        }}
    }"#;

    fn summary(short_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<FilingSummary><MyReports>
  <Report><HtmlFileName>R1.htm</HtmlFileName><ShortName>Cover Page</ShortName></Report>
  <Report><HtmlFileName>R2.htm</HtmlFileName><ShortName>{short_name}</ShortName></Report>
</MyReports></FilingSummary>"#
        )
    }

    fn balance_sheet_page(columns: &[(&str, &str)]) -> String {
        let headers: String = columns
            .iter()
            .map(|(period, _)| format!(r#"<th class="th"><div>{period}</div></th>"#))
            .collect();
        let cells: String = columns
            .iter()
            .map(|(_, value)| format!(r#"<td class="nump">{value}</td>"#))
            .collect();
        format!(
            r#"<html><body><table class="report">
<tr><th class="tl"><div><strong>CONSOLIDATED BALANCE SHEETS - USD ($)<br> $ in Millions</strong></div></th>{headers}</tr>
<tr class="re"><td class="pl"><a onclick="top.Show.showAr( this, 'defref_us-gaap_Assets', window );">Total assets</a></td>{cells}</tr>
</table></body></html>"#
        )
    }

    fn archive() -> MemoryArchive {
        MemoryArchive {
            submissions: SUBMISSIONS.to_string(),
            ..MemoryArchive::default()
        }
        .with_filing(
            "0000000001-24-000002",
            &summary("Consolidated Balance Sheets"),
            &[(
                "R2.htm",
                &balance_sheet_page(&[("Dec. 31, 2023", "$ 1,250"), ("Dec. 31, 2022", "$ 1,105")]),
            )],
        )
        .with_filing(
            "0000000001-23-000001",
            &summary("CONSOLIDATED BALANCE SHEETS"),
            &[(
                "R2.htm",
                &balance_sheet_page(&[("Dec. 31, 2022", "$ 1,100"), ("Dec. 31, 2021", "$ 900")]),
            )],
        )
    }

    fn request(statement_type: StatementType, n: usize) -> StatementRequest {
        StatementRequest::new(statement_type, PeriodType::Annual, n).unwrap()
    }

    #[tokio::test]
    async fn test_scrapes_annual_filings() {
        let archive = Arc::new(archive());
        let source = FilingStatementSource::new(Arc::clone(&archive));

        let facts = source
            .fetch_facts("0000000001", &request(StatementType::Bs, 3))
            .await
            .unwrap();

        // the 10-Q is skipped, and the newer filing's restated 2022 value wins
        let value = |end: NaiveDate| {
            facts
                .iter()
                .find(|f| f.concept == "us-gaap:Assets" && f.period_end == end)
                .map(|f| f.value)
        };
        assert_eq!(facts.len(), 3);
        assert_eq!(value(date(2023, 12, 31)), Some(1_250_000_000.0));
        assert_eq!(value(date(2022, 12, 31)), Some(1_105_000_000.0));
        assert_eq!(value(date(2021, 12, 31)), Some(900_000_000.0));
        assert_eq!(
            *archive.requested.lock().unwrap(),
            vec!["0000000001-24-000002/R2.htm", "0000000001-23-000001/R2.htm"]
        );
    }

    #[tokio::test]
    async fn test_takes_at_most_num_periods_filings() {
        let archive = Arc::new(archive());
        let source = FilingStatementSource::new(Arc::clone(&archive));

        let facts = source
            .fetch_facts("0000000001", &request(StatementType::Bs, 1))
            .await
            .unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(archive.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_statement_page_yields_no_facts() {
        let source = FilingStatementSource::new(Arc::new(archive()));
        let facts = source
            .fetch_facts("0000000001", &request(StatementType::Cf, 2))
            .await
            .unwrap();
        assert!(facts.is_empty());
    }

    #[tokio::test]
    async fn test_statement_without_page_is_not_supported() {
        let source = FilingStatementSource::new(Arc::new(archive()));
        let err = source
            .fetch_facts("0000000001", &request(StatementType::Eq, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StatementError::NotSupported(_)));
    }

    #[tokio::test]
    async fn test_broken_filing_is_skipped() {
        let mut archive = archive();
        archive.summaries.insert(
            "0000000001-24-000002".to_string(),
            "<FilingSummary><Report></FilingSummary>".to_string(),
        );
        let source = FilingStatementSource::new(Arc::new(archive));

        let facts = source
            .fetch_facts("0000000001", &request(StatementType::Bs, 2))
            .await
            .unwrap();
        assert_eq!(facts.len(), 2);
        assert!(facts.iter().all(|f| f.period_end <= date(2022, 12, 31)));
    }

    #[tokio::test]
    async fn test_service_falls_back_from_filings() {
        #[derive(Debug)]
        struct CompanyFactsStub;

        #[async_trait]
        impl FactSource for CompanyFactsStub {
            fn name(&self) -> &str {
                "company facts"
            }

            async fn fetch_facts(&self, _cik: &str, _request: &StatementRequest) -> Result<Vec<RawFact>> {
                Ok(vec![RawFact::instant(
                    "us-gaap:NetCashProvidedByUsedInOperatingActivities",
                    42.0,
                    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                )])
            }
        }

        let service = StatementService::new()
            .with_source(Arc::new(FilingStatementSource::new(Arc::new(archive()))))
            .with_source(Arc::new(CompanyFactsStub));

        // balance sheet pages exist, so the scraped source answers
        let balance_sheet = service
            .fetch_statement("0000000001", &request(StatementType::Bs, 2))
            .await
            .unwrap()
            .into_statement()
            .unwrap();
        assert_eq!(balance_sheet.periods, vec![date(2023, 12, 31), date(2022, 12, 31)]);

        // no cash flow page, so company facts answer
        let cash_flow = service
            .fetch_statement("0000000001", &request(StatementType::Cf, 1))
            .await
            .unwrap()
            .into_statement()
            .unwrap();
        assert_eq!(cash_flow.len(), 1);
    }
}
