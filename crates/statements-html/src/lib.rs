#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Scraped EDGAR statement tables.
//!
//! This crate provides:
//!
//! - [`ScrapedStatement`] - Period columns and tables of one statement page
//! - [`TableExtractor`] - Turns scraped tables into [`RawFact`](statements_core::RawFact)s
//! - [`parse_statement_page`] - Reads an EDGAR `R` page into a [`ScrapedStatement`]

/// EDGAR `R` page parsing.
pub mod document;
/// Scraped tables and cell parsing.
pub mod table;

pub use document::{extract_statement_page, parse_statement_page, statement_kind};
pub use table::{
    ScrapedRow, ScrapedStatement, ScrapedTable, TableExtractor, concept_token, parse_cell,
    unit_multiplier,
};
