//! Error types for the vote repository.
//! Defines specific errors that can occur while reading or writing vote events
//! and document scores.
use thiserror::Error;

/// Represents errors that can occur within the vote repository.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteRepositoryError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
