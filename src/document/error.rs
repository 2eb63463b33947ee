//! Document error types
//!
//! Unified error handling for every codec (PDF, HTML) and the page cache.

use thiserror::Error;

/// Unified document error type
///
/// Cloneable so that a single decode failure can be handed to every caller
/// waiting on the same in-flight page.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocumentError {
    /// Page number outside `1..=page_count`
    #[error("Page not found: number {0}")]
    PageNotFound(u32),

    /// The external engine rejected the data or failed an operation
    #[error("Engine error: {0}")]
    Engine(String),

    /// Failed to decode a page
    #[error("Decode error on page {page}: {message}")]
    PageDecode { page: u32, message: String },

    /// HTML processing error
    #[error("HTML error: {0}")]
    Html(String),

    /// Operation not offered by this codec
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Task join error
    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Alias for Result
pub type DocumentResult<T> = Result<T>;

impl DocumentError {
    /// Wrap an engine failure, keeping the whole context chain
    pub fn engine(err: anyhow::Error) -> Self {
        DocumentError::Engine(format!("{:#}", err))
    }

    /// Wrap a failure that happened while decoding one page
    pub fn page_decode(page: u32, err: impl std::fmt::Display) -> Self {
        DocumentError::PageDecode {
            page,
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for DocumentError {
    fn from(err: tokio::task::JoinError) -> Self {
        DocumentError::Task(err.to_string())
    }
}
