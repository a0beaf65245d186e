//! Crate-wide error type and `Result` alias.

use thiserror::Error;

/// Failures surfaced by the retrieval engine.
///
/// Storage errors propagate from sqlx untouched; the engine does not retry
/// internally, callers decide whether to.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Underlying persistence layer could not be opened, or a read/write failed.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Schema migration failed while opening the store.
    #[error("storage migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Insert conflicted with an already-stored chunk id.
    #[error("chunk already stored: {id}")]
    DuplicateChunk { id: String },

    /// The external embedding collaborator failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Input parameters were rejected before touching storage.
    #[error("validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
