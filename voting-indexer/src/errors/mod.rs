//! Error types for the voting indexer ingest.

use thiserror::Error;
use voting_repository::VoteRepositoryError;

/// Errors that can occur in the voting indexer ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error reading the vote event source.
    #[error("Read error: {0}")]
    ReadError(String),

    /// Error parsing a vote event.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error writing recomputed scores.
    #[error("Write error: {0}")]
    WriteError(String),

    /// Error from the vote or document repository.
    #[error("Repository error: {0}")]
    RepositoryError(#[from] VoteRepositoryError),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl IngestError {
    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::ReadError(err.to_string())
    }
}
