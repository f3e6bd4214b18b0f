//! Error types for index and query operations.

use thiserror::Error;

use crate::DocId;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Negative or duplicate document id, control characters in text,
    /// or a malformed minus term.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested document is not in the index.
    #[error("document {0} not found")]
    NotFound(DocId),

    /// A dedicated worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SearchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
