//! SEC EDGAR HTTP client.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{Instant, sleep};
use tracing::debug;

use statements_core::{
    CompanyLookup, FactExtractor, FactSource, RawFact, Result, StatementError, StatementRequest,
};

use crate::extract::{CompanyFactsExtractor, DEFAULT_TAXONOMIES};
use crate::facts::{CompanyFacts, CompanyTicker};
use crate::filings::{FilingArchive, FilingSummary, Submissions};

/// SEC EDGAR API base URL
pub const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC filing archive URL
pub const ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// SEC company tickers URL
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "SEC EDGAR";

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_request: now.checked_sub(min_interval).unwrap_or(now),
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`EdgarClient`].
#[derive(Debug)]
pub struct EdgarClientBuilder {
    user_agent: String,
    request_interval: Duration,
    timeout: Duration,
    base_url: String,
    archives_url: String,
    tickers_url: String,
    taxonomies: Vec<String>,
    client: Option<reqwest::Client>,
}

impl EdgarClientBuilder {
    fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            request_interval: DEFAULT_REQUEST_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            base_url: EDGAR_BASE_URL.to_string(),
            archives_url: ARCHIVES_URL.to_string(),
            tickers_url: COMPANY_TICKERS_URL.to_string(),
            taxonomies: DEFAULT_TAXONOMIES.iter().map(ToString::to_string).collect(),
            client: None,
        }
    }

    /// Sets the minimum delay between two requests.
    #[must_use]
    pub fn request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the API base URL (company facts and submissions).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the filing archive URL.
    #[must_use]
    pub fn archives_url(mut self, url: impl Into<String>) -> Self {
        self.archives_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the company tickers file URL.
    #[must_use]
    pub fn tickers_url(mut self, url: impl Into<String>) -> Self {
        self.tickers_url = url.into();
        self
    }

    /// Sets the taxonomies read from company facts.
    #[must_use]
    pub fn taxonomies<I, S>(mut self, taxonomies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taxonomies = taxonomies.into_iter().map(Into::into).collect();
        self
    }

    /// Uses a pre-configured HTTP client. Timeout and user agent are then the client's.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the client.
    ///
    /// The SEC requires an identifying user agent, so an empty one is rejected.
    pub fn build(self) -> Result<EdgarClient> {
        if self.user_agent.trim().is_empty() {
            return Err(StatementError::invalid(
                "user_agent",
                "the SEC requires a user agent such as \"AppName/1.0 (contact@example.com)\"",
            ));
        }

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(self.user_agent.as_str())
                .timeout(self.timeout)
                .build()
                .map_err(|e| StatementError::Network(format!("Failed to build HTTP client: {e}")))?,
        };

        Ok(EdgarClient {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(self.request_interval))),
            base_url: self.base_url,
            archives_url: self.archives_url,
            tickers_url: self.tickers_url,
            taxonomies: self.taxonomies,
            tickers: OnceCell::new(),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// SEC EDGAR client.
///
/// Fetches company facts, submissions and filing documents, and resolves companies to
/// CIKs. Requests are serialized through
/// a shared rate limiter (10 requests/second by default, the SEC's limit). The ticker
/// file is downloaded once per client.
///
/// # Example
///
/// ```no_run
/// use statements_core::{FactSource, PeriodType, StatementRequest, StatementType};
/// use statements_edgar::EdgarClient;
///
/// # async fn run() -> statements_core::Result<()> {
/// let client = EdgarClient::new("MyApp/1.0 (contact@example.com)")?;
/// let cik = client.get_cik("AAPL").await?;
/// let request = StatementRequest::with_default_periods(StatementType::Bs, PeriodType::Annual);
/// let facts = client.fetch_facts(&cik, &request).await?;
/// println!("{} facts", facts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    archives_url: String,
    tickers_url: String,
    taxonomies: Vec<String>,
    tickers: OnceCell<Vec<CompanyTicker>>,
}

impl EdgarClient {
    /// Creates a client with default settings.
    ///
    /// The user agent should read `"AppName/Version (contact@email.com)"`.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::builder(user_agent).build()
    }

    /// Starts building a client with the given user agent.
    pub fn builder(user_agent: impl Into<String>) -> EdgarClientBuilder {
        EdgarClientBuilder::new(user_agent)
    }

    /// Looks up a company's CIK from its ticker symbol.
    ///
    /// Returns the CIK zero-padded to 10 digits.
    pub async fn get_cik(&self, ticker: &str) -> Result<String> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(StatementError::invalid("ticker", "empty ticker"));
        }

        let tickers = self.company_tickers().await?;
        let company = tickers
            .iter()
            .find(|c| c.ticker.eq_ignore_ascii_case(ticker))
            .ok_or_else(|| StatementError::CompanyNotFound(ticker.to_string()))?;

        let cik = company.cik();
        debug!(%cik, ticker, "Resolved ticker");
        Ok(cik)
    }

    /// Fetches the company-facts document for `cik` (padded if needed).
    pub async fn fetch_company_facts(&self, cik: &str) -> Result<CompanyFacts> {
        let cik_padded = format!("{:0>10}", cik.trim());
        let url = format!("{}/api/xbrl/companyfacts/CIK{}.json", self.base_url, cik_padded);
        self.get_json(&url, &cik_padded).await
    }

    /// Fetches the submissions index for `cik` (padded if needed).
    pub async fn fetch_submissions(&self, cik: &str) -> Result<Submissions> {
        let cik_padded = format!("{:0>10}", cik.trim());
        let url = format!("{}/submissions/CIK{}.json", self.base_url, cik_padded);
        self.get_json(&url, &cik_padded).await
    }

    /// Fetches one document of a filing, e.g. `FilingSummary.xml` or `R2.htm`.
    pub async fn fetch_filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        file_name: &str,
    ) -> Result<String> {
        let url = archive_url(&self.archives_url, cik, accession_number, file_name);
        self.get_text(&url, &url).await.map_err(|e| match e {
            StatementError::CompanyNotFound(subject) => {
                StatementError::SourceUnavailable(format!("{subject} not found"))
            }
            e => e,
        })
    }

    /// Fetches and parses the report index of a filing.
    pub async fn fetch_filing_summary(
        &self,
        cik: &str,
        accession_number: &str,
    ) -> Result<FilingSummary> {
        let xml = self
            .fetch_filing_document(cik, accession_number, "FilingSummary.xml")
            .await?;
        FilingSummary::from_xml(&xml)
    }

    /// Returns the SEC ticker list, downloading it on first use.
    pub async fn company_tickers(&self) -> Result<&[CompanyTicker]> {
        let tickers = self
            .tickers
            .get_or_try_init(|| async {
                let raw: HashMap<String, CompanyTicker> =
                    self.get_json(&self.tickers_url, "company tickers").await?;
                Ok::<_, StatementError>(order_tickers(raw))
            })
            .await?;
        Ok(tickers.as_slice())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, subject: &str) -> Result<T> {
        let text = self.get_text(url, subject).await?;
        serde_json::from_str(&text)
            .map_err(|e| StatementError::Parse(format!("Failed to parse {subject}: {e}")))
    }

    async fn get_text(&self, url: &str, subject: &str) -> Result<String> {
        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        debug!(url, "Fetching from SEC");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StatementError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(status_error(status, subject, retry_after));
        }

        response
            .text()
            .await
            .map_err(|e| StatementError::Network(e.to_string()))
    }
}

/// Builds `{archives}/{cik without padding}/{accession without dashes}/{file}`.
fn archive_url(archives_url: &str, cik: &str, accession_number: &str, file_name: &str) -> String {
    let cik = cik.trim().trim_start_matches('0');
    let cik = if cik.is_empty() { "0" } else { cik };
    let accession = accession_number.trim().replace('-', "");
    format!("{archives_url}/{cik}/{accession}/{file_name}")
}

/// Maps a non-success HTTP status onto a [`StatementError`].
fn status_error(status: StatusCode, subject: &str, retry_after: Option<Duration>) -> StatementError {
    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => StatementError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after,
        },
        StatusCode::NOT_FOUND => StatementError::CompanyNotFound(subject.to_string()),
        _ => StatementError::Network(format!("Failed to fetch {subject}: HTTP {status}")),
    }
}

/// Orders the ticker file entries by their numeric key, which is the SEC's file order.
fn order_tickers(raw: HashMap<String, CompanyTicker>) -> Vec<CompanyTicker> {
    let mut entries: Vec<(u64, CompanyTicker)> = raw
        .into_iter()
        .map(|(key, ticker)| (key.parse().unwrap_or(u64::MAX), ticker))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cik_str.cmp(&b.1.cik_str)));
    entries.into_iter().map(|(_, ticker)| ticker).collect()
}

/// Finds a company by ticker, then exact title, then the first title containing `query`.
///
/// Matching ignores ASCII case.
pub fn find_company<'a>(tickers: &'a [CompanyTicker], query: &str) -> Option<&'a CompanyTicker> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let lowered = query.to_lowercase();

    tickers
        .iter()
        .find(|c| c.ticker.eq_ignore_ascii_case(query))
        .or_else(|| tickers.iter().find(|c| c.title.to_lowercase() == lowered))
        .or_else(|| tickers.iter().find(|c| c.title.to_lowercase().contains(&lowered)))
}

#[async_trait]
impl FactSource for EdgarClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_facts(&self, cik: &str, request: &StatementRequest) -> Result<Vec<RawFact>> {
        let document = self.fetch_company_facts(cik).await?;
        let facts = CompanyFactsExtractor::new(request.period_type())
            .with_taxonomies(self.taxonomies.iter().cloned())
            .extract(&document);
        debug!(
            cik,
            entity = %document.entity_name,
            observations = document.observation_count(),
            facts = facts.len(),
            "Fetched company facts"
        );
        Ok(facts)
    }
}

#[async_trait]
impl FilingArchive for EdgarClient {
    async fn submissions(&self, cik: &str) -> Result<Submissions> {
        self.fetch_submissions(cik).await
    }

    async fn filing_summary(&self, cik: &str, accession_number: &str) -> Result<FilingSummary> {
        self.fetch_filing_summary(cik, accession_number).await
    }

    async fn filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        file_name: &str,
    ) -> Result<String> {
        self.fetch_filing_document(cik, accession_number, file_name).await
    }
}

#[async_trait]
impl CompanyLookup for EdgarClient {
    async fn lookup(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if !name.is_empty() && name.len() <= 10 && name.chars().all(|c| c.is_ascii_digit()) {
            return Ok(format!("{name:0>10}"));
        }

        let tickers = self.company_tickers().await?;
        let company = find_company(tickers, name)
            .ok_or_else(|| StatementError::CompanyNotFound(name.to_string()))?;
        debug!(query = name, title = %company.title, cik = company.cik_str, "Resolved company");
        Ok(company.cik())
    }
}
