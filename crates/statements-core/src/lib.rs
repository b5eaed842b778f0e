#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/statements/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and the normalization engine for financial statements.
//!
//! This crate provides the source-independent half of the pipeline:
//!
//! - [`RawFact`](types::RawFact) - One observation of a financial concept
//! - [`ConceptCatalog`](catalog::ConceptCatalog) - Canonical metrics and their synonyms
//! - [`infer_fiscal_month`](fiscal::infer_fiscal_month) - Fiscal-year-end inference
//! - [`select_periods`](select::select_periods) - Period filtering and ranking
//! - [`Normalizer`](normalize::Normalizer) - Builds a [`NormalizedStatement`]
//! - [`FactExtractor`](source::FactExtractor) and [`FactSource`](source::FactSource) -
//!   Seams for source adapters

/// Concept catalog: canonical metrics and the concepts that report them.
pub mod catalog;
/// Error types for statement operations.
pub mod error;
/// Fiscal calendar inference.
pub mod fiscal;
/// Normalization engine.
pub mod normalize;
/// Period type definitions and duration rules.
pub mod period;
/// Statement request parameters.
pub mod request;
/// Period selection.
pub mod select;
/// Extractor and source traits.
pub mod source;
/// Normalized statement output.
pub mod statement;
/// Core fact types (RawFact, Unit, Category).
pub mod types;

// Re-export commonly used items at crate root
pub use catalog::{ConceptCatalog, ConceptGroup};
pub use error::{Result, StatementError};
pub use fiscal::infer_fiscal_month;
pub use normalize::Normalizer;
pub use period::PeriodType;
pub use request::{StatementRequest, StatementType};
pub use select::select_periods;
pub use source::{CompanyLookup, FactExtractor, FactSource};
pub use statement::{
    InsufficiencyReason, InsufficientData, Metadata, Metric, Normalization, NormalizedStatement,
    Provenance,
};
pub use types::{Category, RawFact, Unit, dedupe_facts};
