//! Filing index types: company submissions and FilingSummary reports.

use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use std::fmt::Debug;

use statements_core::{Result, StatementError};

/// Response from the SEC submissions API (`/submissions/CIK##########.json`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Submissions {
    /// Company name
    #[serde(default)]
    pub name: String,
    /// Filing history
    #[serde(default)]
    pub filings: SubmissionFilings,
}

impl Submissions {
    /// Parses a submissions JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StatementError::Parse(format!("Failed to parse submissions: {e}")))
    }

    /// Returns the recent filings of `form` (e.g. `10-K`), newest first.
    pub fn filings_of<'a>(&'a self, form: &'a str) -> impl Iterator<Item = Filing> + 'a {
        self.filings
            .recent
            .filings()
            .filter(move |filing| filing.form.eq_ignore_ascii_case(form))
    }
}

/// Filing history section of [`Submissions`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmissionFilings {
    /// The most recent filings
    #[serde(default)]
    pub recent: RecentFilings,
}

/// Recent filings in the SEC's columnar layout: one array per field, aligned by index.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    /// Accession numbers (`0000320193-23-000106`)
    #[serde(default)]
    pub accession_number: Vec<String>,
    /// Form types
    #[serde(default)]
    pub form: Vec<String>,
    /// Filing dates
    #[serde(default)]
    pub filing_date: Vec<String>,
    /// Period report dates
    #[serde(default)]
    pub report_date: Vec<String>,
    /// Primary document file names
    #[serde(default)]
    pub primary_document: Vec<String>,
}

impl RecentFilings {
    /// Iterates the filings row by row. Rows without an accession number are skipped.
    pub fn filings(&self) -> impl Iterator<Item = Filing> + '_ {
        let field = |column: &[String], i: usize| column.get(i).cloned().unwrap_or_default();
        let date = |column: &[String], i: usize| {
            column
                .get(i)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        };

        self.accession_number
            .iter()
            .enumerate()
            .filter(|(_, accession)| !accession.is_empty())
            .map(move |(i, accession)| Filing {
                accession_number: accession.clone(),
                form: field(&self.form, i),
                filing_date: date(&self.filing_date, i),
                report_date: date(&self.report_date, i),
                primary_document: field(&self.primary_document, i),
            })
    }
}

/// One filing from the submissions index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filing {
    /// Accession number with dashes
    pub accession_number: String,
    /// Form type
    pub form: String,
    /// Date filed
    pub filing_date: Option<NaiveDate>,
    /// End of the reporting period
    pub report_date: Option<NaiveDate>,
    /// Primary document file name
    pub primary_document: String,
}

/// The report index of a filing (`FilingSummary.xml`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilingSummary {
    /// Reports in filing order
    pub reports: Vec<FilingReport>,
}

/// One rendered report (`R2.htm`) listed in a [`FilingSummary`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilingReport {
    /// Short name, e.g. `Consolidated Balance Sheets`
    pub short_name: String,
    /// Long name, e.g. `1002 - Statement - Consolidated Balance Sheets`
    pub long_name: String,
    /// HTML page, when rendered
    pub html_file_name: Option<String>,
    /// XML page, for older filings
    pub xml_file_name: Option<String>,
}

#[derive(Clone, Copy)]
enum ReportField {
    ShortName,
    LongName,
    HtmlFileName,
    XmlFileName,
}

impl FilingSummary {
    /// Parses `FilingSummary.xml`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut reports = Vec::new();
        let mut current: Option<FilingReport> = None;
        let mut field: Option<ReportField> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    field = match e.local_name().as_ref() {
                        b"Report" => {
                            current = Some(FilingReport::default());
                            None
                        }
                        b"ShortName" => Some(ReportField::ShortName),
                        b"LongName" => Some(ReportField::LongName),
                        b"HtmlFileName" => Some(ReportField::HtmlFileName),
                        b"XmlFileName" => Some(ReportField::XmlFileName),
                        _ => None,
                    };
                }
                Ok(Event::Text(text)) => {
                    let (Some(report), Some(field)) = (current.as_mut(), field) else {
                        continue;
                    };
                    let text = text
                        .unescape()
                        .map_err(|e| StatementError::Parse(format!("Invalid FilingSummary text: {e}")))?
                        .trim()
                        .to_string();
                    match field {
                        ReportField::ShortName => report.short_name = text,
                        ReportField::LongName => report.long_name = text,
                        ReportField::HtmlFileName => report.html_file_name = Some(text),
                        ReportField::XmlFileName => report.xml_file_name = Some(text),
                    }
                }
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"Report"
                        && let Some(report) = current.take()
                    {
                        reports.push(report);
                    }
                    field = None;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(StatementError::Parse(format!("Invalid FilingSummary XML: {e}")));
                }
            }
        }

        Ok(Self { reports })
    }
}

/// Access to a company's filing index and filing documents.
///
/// [`EdgarClient`](crate::EdgarClient) implements this against the SEC archives.
#[async_trait]
pub trait FilingArchive: Send + Sync + Debug {
    /// Fetches the company's submissions index.
    async fn submissions(&self, cik: &str) -> Result<Submissions>;

    /// Fetches and parses the `FilingSummary.xml` of one filing.
    async fn filing_summary(&self, cik: &str, accession_number: &str) -> Result<FilingSummary>;

    /// Fetches one document of a filing as text.
    async fn filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        file_name: &str,
    ) -> Result<String>;
}
