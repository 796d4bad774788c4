//! Error types for casting votes.
//! Every error is per-action and locally recoverable; callers branch on
//! [`VoteError::kind`] rather than on message text.
use thiserror::Error;
use voting_repository::VoteRepositoryError;

use crate::errors::VoteDenial;

/// A rejected vote submission, carrying the human-readable messages returned
/// by the submit-vote boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", messages.join("; "))]
pub struct TransportError {
    pub messages: Vec<String>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

/// Represents errors that can occur while casting a vote.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("{0}")]
    PermissionDenied(#[from] VoteDenial),

    #[error("You must be logged in to vote")]
    UnauthenticatedActor,

    #[error("Error casting vote: {0}")]
    TransportFailure(#[from] TransportError),

    #[error("Voting rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] VoteRepositoryError),
}

/// The kind of a [`VoteError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteErrorKind {
    PermissionDenied,
    UnrecognizedReactionType,
    UnauthenticatedActor,
    TransportFailure,
    RateLimited,
    DocumentNotFound,
    Repository,
}

impl VoteError {
    pub fn kind(&self) -> VoteErrorKind {
        match self {
            VoteError::PermissionDenied(denial) if denial.is_unrecognized_type() => {
                VoteErrorKind::UnrecognizedReactionType
            }
            VoteError::PermissionDenied(_) => VoteErrorKind::PermissionDenied,
            VoteError::UnauthenticatedActor => VoteErrorKind::UnauthenticatedActor,
            VoteError::TransportFailure(_) => VoteErrorKind::TransportFailure,
            VoteError::RateLimited(_) => VoteErrorKind::RateLimited,
            VoteError::DocumentNotFound(_) => VoteErrorKind::DocumentNotFound,
            VoteError::Repository(_) => VoteErrorKind::Repository,
        }
    }

    /// The message to show the actor.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_reaction_has_its_own_kind() {
        let error = VoteError::from(VoteDenial::UnrecognizedReactionType("nope".to_string()));
        assert_eq!(error.kind(), VoteErrorKind::UnrecognizedReactionType);
        assert_eq!(error.message(), "Unrecognized reaction type: nope");
    }

    #[test]
    fn test_karma_denial_is_permission_denied() {
        let error = VoteError::from(VoteDenial::InsufficientKarmaToOppose { required: 20 });
        assert_eq!(error.kind(), VoteErrorKind::PermissionDenied);
        assert_eq!(error.message(), "You need at least 20 karma to antireact");
    }

    #[test]
    fn test_transport_error_joins_messages() {
        let error = VoteError::from(TransportError {
            messages: vec!["timeout".to_string(), "retry later".to_string()],
        });
        assert_eq!(error.kind(), VoteErrorKind::TransportFailure);
        assert_eq!(error.message(), "Error casting vote: timeout; retry later");
    }
}
