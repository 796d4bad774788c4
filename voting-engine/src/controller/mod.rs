//! Client-side vote orchestration.
//!
//! A controller shows the effect of a vote immediately, submits it through a
//! [`VoteSubmitter`], and reconciles the server's answer. Only the answer to
//! the most recent submission is adopted; answers to superseded submissions
//! are ignored.
mod optimistic;

pub use optimistic::{OptimisticVoteController, PendingVote, VoteReceipt};

use voting_shared::types::{ExtendedVote, VoteType, VoteableDocument};

use crate::errors::TransportError;

/// The server's answer to a submitted vote.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitVoteResponse {
    /// The document as recomputed by the server.
    pub document: VoteableDocument,
    /// Whether the voter should be warned about their voting pattern.
    pub warn_flag: bool,
}

/// The boundary votes are submitted through.
#[async_trait::async_trait]
pub trait VoteSubmitter: Send + Sync {
    async fn submit_vote(
        &self,
        document_id: &str,
        vote_type: VoteType,
        extended: Option<ExtendedVote>,
    ) -> Result<SubmitVoteResponse, TransportError>;
}

/// Whether a controller has submissions awaiting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Idle,
    Pending { in_flight: u64 },
}
