//! Error types for the docbr-core library.

use thiserror::Error;

/// Main error type for the docbr library.
#[derive(Error, Debug)]
pub enum DocbrError {
    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error (configuration loading only; the pipeline itself does no I/O).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to document field extraction.
///
/// None of these escape the orchestrator: every variant is folded into the
/// `errors` list of the returned record.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A candidate matched a rule but failed normalization.
    #[error("normalization failed for {field}: {reason}")]
    Normalization { field: String, reason: String },

    /// Failed to parse a matched value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// A later candidate for an already-resolved field was discarded.
    #[error("superseded candidate for {field}: {value}")]
    Superseded { field: String, value: String },

    /// An internal stage faulted; the pipeline degraded to an empty record.
    #[error("pipeline fault: {0}")]
    PipelineFault(String),
}

/// Result type for the docbr library.
pub type Result<T> = std::result::Result<T, DocbrError>;
