use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, ExtendedVote, UserId, VoteType};

/// Represents a user's current vote on a document.
///
/// There is at most one live `VoteEvent` per user and document: a new vote
/// supersedes the previous one and a retraction removes it. Aggregation only
/// ever looks at the current set of live events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteEvent {
    pub user_id: UserId,
    pub document_id: DocumentId,
    pub collection_name: String,
    #[serde(default)]
    pub vote_type: Option<VoteType>,
    #[serde(default, rename = "extendedVoteType")]
    pub extended_vote: Option<ExtendedVote>,
    /// Base vote weight, snapshotted from the voter's karma when cast.
    #[serde(default)]
    pub power: i64,
    /// Author and co-authors of the document when the vote was cast.
    #[serde(default)]
    pub author_ids: Vec<UserId>,
    pub cast_at: DateTime<Utc>,
}

impl VoteEvent {
    pub fn vote_type_or_neutral(&self) -> VoteType {
        VoteType::or_neutral(self.vote_type)
    }

    /// Whether the voter is one of the document's authors.
    pub fn is_self_vote(&self) -> bool {
        self.author_ids.iter().any(|id| id == &self.user_id)
    }
}
