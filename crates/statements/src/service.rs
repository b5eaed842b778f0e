//! Statement service: ordered fact sources with fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use statements_core::{
    ConceptCatalog, FactSource, Normalization, Normalizer, Result, StatementError,
    StatementRequest,
};

/// Fetches company facts from registered sources and normalizes them.
///
/// Sources are tried in registration order. A source that fails, or whose facts cannot
/// produce the requested statement, hands over to the next one. The first complete
/// statement wins.
///
/// # Example
///
/// ```rust,no_run
/// use statements::{StatementRequest, StatementService, StatementType, PeriodType};
///
/// # async fn run() -> statements::Result<()> {
/// let service = StatementService::new().with_edgar("MyApp/1.0 (contact@example.com)")?;
///
/// let request = StatementRequest::new(StatementType::Bs, PeriodType::Annual, 3)?;
/// let outcome = service.fetch_statement("0000320193", &request).await?;
/// if let Some(statement) = outcome.statement() {
///     println!("{}", statement.to_dataframe()?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct StatementService {
    sources: Vec<Arc<dyn FactSource>>,
    catalog: &'static ConceptCatalog,
}

impl Default for StatementService {
    fn default() -> Self {
        Self::with_catalog(ConceptCatalog::standard())
    }
}

impl std::fmt::Debug for StatementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementService")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("catalog_groups", &self.catalog.len())
            .finish()
    }
}

impl StatementService {
    /// Create a service with no sources over the standard catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with no sources over a custom catalog.
    #[must_use]
    pub const fn with_catalog(catalog: &'static ConceptCatalog) -> Self {
        Self {
            sources: Vec::new(),
            catalog,
        }
    }

    /// Register a fact source after the existing ones.
    pub fn register_source(&mut self, source: Arc<dyn FactSource>) {
        debug!(source = source.name(), "Registering fact source");
        self.sources.push(source);
    }

    /// Register a fact source, builder style.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FactSource>) -> Self {
        self.register_source(source);
        self
    }

    /// Returns the registered sources in the order they are tried.
    pub fn sources(&self) -> &[Arc<dyn FactSource>] {
        &self.sources
    }

    /// Returns the catalog statements are normalized against.
    #[must_use]
    pub const fn catalog(&self) -> &'static ConceptCatalog {
        self.catalog
    }

    /// Fetch and normalize a statement for the company with the given CIK.
    ///
    /// Returns the first complete statement. When every source answered but none had
    /// enough data, the last [`Normalization::InsufficientData`] is returned; when no
    /// source answered at all, the last error is.
    pub async fn fetch_statement(
        &self,
        cik: &str,
        request: &StatementRequest,
    ) -> Result<Normalization> {
        if self.sources.is_empty() {
            return Err(StatementError::ProviderNotConfigured(
                "No fact sources registered".to_string(),
            ));
        }

        let normalizer = Normalizer::new(self.catalog);
        let mut last_insufficient = None;
        let mut last_error = None;

        for source in &self.sources {
            debug!(
                source = source.name(),
                cik,
                statement_type = %request.statement_type(),
                period_type = %request.period_type(),
                "Fetching facts"
            );

            let facts = match source.fetch_facts(cik, request).await {
                Ok(facts) => facts,
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                    continue;
                }
            };

            match normalizer.normalize(&facts, request) {
                Normalization::Complete(statement) => {
                    debug!(
                        source = source.name(),
                        metrics = statement.len(),
                        periods = statement.periods.len(),
                        "Statement complete"
                    );
                    return Ok(Normalization::Complete(statement));
                }
                Normalization::InsufficientData(insufficient) => {
                    warn!(
                        source = source.name(),
                        reason = %insufficient.reason,
                        "Insufficient data from source, trying next"
                    );
                    last_insufficient = Some(insufficient);
                }
            }
        }

        match (last_insufficient, last_error) {
            (Some(insufficient), _) => Ok(Normalization::InsufficientData(insufficient)),
            (None, Some(e)) => Err(e),
            (None, None) => Err(StatementError::Other(
                "All sources failed with no error".to_string(),
            )),
        }
    }

    /// Add SEC EDGAR as a fact source.
    ///
    /// With the `html` feature, statement pages scraped from recent filings are tried
    /// first and the company-facts API second. Both share one rate-limited client.
    #[cfg(feature = "edgar")]
    pub fn with_edgar(self, user_agent: &str) -> Result<Self> {
        let client = Arc::new(statements_edgar::EdgarClient::new(user_agent)?);

        #[cfg(feature = "html")]
        let service = self.with_source(Arc::new(crate::FilingStatementSource::new(Arc::clone(
            &client,
        ))));
        #[cfg(not(feature = "html"))]
        let service = self;

        Ok(service.with_source(client))
    }
}

/// Normalizes a company-facts document that is already in memory.
#[cfg(feature = "edgar")]
#[must_use]
pub fn normalize_company_facts(
    document: &statements_edgar::CompanyFacts,
    request: &StatementRequest,
) -> Normalization {
    use statements_core::FactExtractor;

    let facts = statements_edgar::CompanyFactsExtractor::new(request.period_type()).extract(document);
    Normalizer::default().normalize(&facts, request)
}

/// Normalizes scraped statement tables.
#[cfg(feature = "html")]
#[must_use]
pub fn normalize_scraped(
    statement: &statements_html::ScrapedStatement,
    request: &StatementRequest,
) -> Normalization {
    use statements_core::FactExtractor;

    let facts = statements_html::TableExtractor.extract(statement);
    Normalizer::default().normalize(&facts, request)
}
