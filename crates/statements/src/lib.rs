#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Normalized, periodized financial statements.
//!
//! This crate re-exports the normalization engine and the source adapters, and provides
//! a [`StatementService`] that tries fact sources in order until one yields a complete
//! statement.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR company facts and the EDGAR HTTP client
//! - `html` - Statement tables scraped from EDGAR filing pages
//!
//! With both features, [`FilingStatementSource`] scrapes statement pages out of a
//! company's recent 10-K and 10-Q filings.

// Core types and traits
pub use statements_core::*;

// Source adapters
#[cfg(feature = "edgar")]
pub use statements_edgar::{
    CompanyFacts, CompanyFactsExtractor, EdgarClient, EdgarClientBuilder, FilingArchive,
    FilingSummary, Submissions,
};
#[cfg(feature = "html")]
pub use statements_html::{
    ScrapedRow, ScrapedStatement, ScrapedTable, TableExtractor, extract_statement_page,
    parse_statement_page, statement_kind,
};

#[cfg(all(feature = "edgar", feature = "html"))]
mod filings;
#[cfg(all(feature = "edgar", feature = "html"))]
pub use filings::FilingStatementSource;

mod service;
pub use service::StatementService;
#[cfg(feature = "edgar")]
pub use service::normalize_company_facts;
#[cfg(feature = "html")]
pub use service::normalize_scraped;
