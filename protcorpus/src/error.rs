use std::result;

use thiserror::Error;

/// Error types for corpus retrieval operations
#[derive(Error, Debug)]
pub enum CorpusError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing or merging failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// IO error for file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid PMID format
    #[error("Invalid PMID format: {pmid}")]
    InvalidPmid { pmid: String },

    /// Invalid query structure or parameters
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// API rate limit exceeded
    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// History session (WebEnv) was not returned by the server
    #[error("History session not available in server response")]
    SessionNotAvailable,
}

pub type Result<T> = result::Result<T, CorpusError>;

impl CorpusError {
    /// Whether this error was raised at the network boundary rather than
    /// while interpreting a response. Transport errors stop a paginated
    /// stage with partial results; structural errors skip dependent
    /// computations instead.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CorpusError::RequestError(_)
                | CorpusError::ApiError { .. }
                | CorpusError::RateLimitExceeded
        )
    }
}
