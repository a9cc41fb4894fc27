//! Error types for tabula-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by [`DocumentEngine`](crate::DocumentEngine) implementations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to callers of a session
#[derive(Debug, Error)]
pub enum Error {
    /// Operation attempted with no open document or no active sheet
    #[error("Invalid document state: {0}")]
    InvalidDocumentState(String),

    /// The document engine signalled a failure
    #[error("Engine failure: {0}")]
    Engine(#[from] EngineError),
}

impl Error {
    /// Create an invalid-state error with a message
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidDocumentState(msg.into())
    }

    /// Check whether this error came from the engine
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Error::Engine(_))
    }
}

/// Failures signalled by a document engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// IO error while opening or saving a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Address string the engine cannot resolve to a range
    #[error("Invalid range address: {0}")]
    InvalidAddress(String),

    /// Handle that was never issued or was already released
    #[error("Stale or unknown handle: {0}")]
    StaleHandle(String),

    /// Sheet index outside the document's sheet collection
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetIndex(usize, usize),

    /// Write attempted on a document opened read-only
    #[error("Document is read-only: {0}")]
    ReadOnly(String),

    /// Persistence format the engine does not understand
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Backend-specific failure
    #[error("{0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wrap a backend error
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::Backend(Box::new(err))
    }
}
