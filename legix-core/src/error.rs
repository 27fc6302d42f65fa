//! Error types for the legislation pipeline

use crate::diagnostics::Report;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, validating or transforming a legislation document
#[derive(Debug, Error)]
pub enum LegixError {
    /// The source is not well-formed markup
    #[error("Parse error at {line}:{column}: {message}")]
    Markup {
        message: String,
        line: u32,
        column: u32,
    },
    /// The document root is not a `NODE` element
    #[error("Invalid root element in XML: \"{0}\" instead of \"NODE\"")]
    InvalidRoot(String),
    /// The document was read but failed validation
    #[error("Validation failed with {0}")]
    Validation(Report),
    /// The transformer met a value the validator should have rejected
    #[error("Internal consistency error: {0}")]
    Internal(String),
    #[error("Error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
