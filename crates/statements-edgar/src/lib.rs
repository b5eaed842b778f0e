#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR company facts for financial statements.
//!
//! This crate provides:
//!
//! - [`CompanyFacts`] - The company-facts JSON document
//! - [`CompanyFactsExtractor`] - Turns that document into [`RawFact`](statements_core::RawFact)s
//! - [`EdgarClient`] - Rate-limited HTTP client with CIK lookup, usable as a
//!   [`FactSource`](statements_core::FactSource) and a [`FilingArchive`]
//! - [`Submissions`] and [`FilingSummary`] - Filing indexes used to locate statement pages

/// HTTP client, rate limiting and company lookup.
pub mod client;
/// Company-facts extraction.
pub mod extract;
/// SEC API response types.
pub mod facts;
/// Filing indexes and archive access.
pub mod filings;

pub use client::{ARCHIVES_URL, EdgarClient, EdgarClientBuilder, find_company};
pub use extract::{CompanyFactsExtractor, DEFAULT_TAXONOMIES};
pub use facts::{CompanyFacts, CompanyTicker, ConceptFacts, Observation};
pub use filings::{
    Filing, FilingArchive, FilingReport, FilingSummary, RecentFilings, SubmissionFilings,
    Submissions,
};
