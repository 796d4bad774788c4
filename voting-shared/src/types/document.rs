use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, DocumentScores, ExtendedScore, ExtendedVote, UserId, VoteType};

/// An already-authenticated user casting votes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: UserId,
    pub display_name: String,
    pub karma: i64,
    #[serde(default)]
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>, karma: i64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            karma,
            is_admin: false,
        }
    }
}

/// A voteable document (post, comment, tag revision, ...) and its cached scores.
///
/// The `current_user_*` fields describe the viewer's own live vote, as
/// delivered to that viewer's client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteableDocument {
    pub id: DocumentId,
    pub collection_name: String,
    #[serde(default)]
    pub author_ids: Vec<UserId>,
    /// Per-document voting system override.
    #[serde(default)]
    pub voting_system: Option<String>,
    #[serde(default)]
    pub base_score: i64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub extended_score: ExtendedScore,
    #[serde(default)]
    pub current_user_vote: Option<VoteType>,
    #[serde(default, rename = "currentUserExtendedVote")]
    pub current_user_extended_vote: Option<ExtendedVote>,
}

impl VoteableDocument {
    pub fn new(id: impl Into<DocumentId>, collection_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection_name: collection_name.into(),
            ..Default::default()
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_ids.iter().any(|id| id == user_id)
    }

    /// Replaces the cached scores with a fresh recomputation.
    pub fn apply_scores(&mut self, scores: &DocumentScores) {
        self.base_score = scores.base_score;
        self.vote_count = scores.vote_count;
        self.extended_score = scores.extended_score.clone();
    }
}
