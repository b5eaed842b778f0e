//! Fact source traits.
//!
//! This module defines the seams between the normalization engine and the outside world:
//!
//! - [`FactExtractor`] - Turns one raw document shape into [`RawFact`]s
//! - [`FactSource`] - Fetches a company's facts (usually over the network)
//! - [`CompanyLookup`] - Resolves a company name or ticker to a CIK

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, request::StatementRequest, types::RawFact};

/// Adapts a raw document into a uniform fact stream.
///
/// Extraction is best-effort: malformed parts of the input are logged and skipped, never
/// reported as errors. Implementations dedupe on (concept, period end, period start)
/// before returning.
pub trait FactExtractor {
    /// The document shape this extractor reads.
    type Source: ?Sized;

    /// Extracts facts from `source`.
    fn extract(&self, source: &Self::Source) -> Vec<RawFact>;
}

/// A source of company facts.
///
/// Sources are tried in order by the statement service, so a failing source should
/// return an error rather than an empty list when it could not reach its data.
#[async_trait]
pub trait FactSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Fetches the facts the company with the given CIK reported for `request`.
    ///
    /// Sources may use the request to narrow what they fetch (one statement's filing
    /// pages, durations of the requested period type). Returning facts outside the
    /// request is harmless; the normalizer discards them.
    async fn fetch_facts(&self, cik: &str, request: &StatementRequest) -> Result<Vec<RawFact>>;
}

/// Resolves a company name or ticker to its zero-padded CIK.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    /// Looks up `name`, returning [`CompanyNotFound`](crate::StatementError::CompanyNotFound)
    /// when nothing matches.
    async fn lookup(&self, name: &str) -> Result<String>;
}
