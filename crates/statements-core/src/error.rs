//! Error types for statement operations.
//!
//! This module defines [`StatementError`] which covers the failures that can occur
//! when validating a request or fetching facts from a source. Running out of data is
//! not an error: the normalizer reports it through
//! [`Normalization::InsufficientData`](crate::Normalization::InsufficientData).

use thiserror::Error;

/// Errors that can occur during statement operations.
#[derive(Error, Debug)]
pub enum StatementError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a source.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The source that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// No company matched the requested name, ticker or CIK.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// The source could not deliver a fact set.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Error parsing data from a source.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request parameter is outside its allowed set.
    #[error("Invalid parameter `{parameter}`: {message}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// No fact source is configured.
    #[error("Source not configured: {0}")]
    ProviderNotConfigured(String),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl StatementError {
    /// Builds an [`InvalidParameter`](Self::InvalidParameter) error.
    pub fn invalid(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            message: message.into(),
        }
    }
}

/// Result type alias using [`StatementError`].
pub type Result<T> = std::result::Result<T, StatementError>;
