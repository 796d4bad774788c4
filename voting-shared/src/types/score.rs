use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{QuoteLocator, ReactionName, UserId, VoteOnReaction};

/// One user's entry under a named reaction in the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserReactInfo {
    pub user_id: UserId,
    pub display_name: String,
    /// Karma of the user when the aggregate was computed.
    pub karma: i64,
    pub react_type: VoteOnReaction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<QuoteLocator>,
}

impl UserReactInfo {
    /// The single quote this entry is scoped to, once normalized.
    pub fn quote(&self) -> Option<&str> {
        self.quotes.first().map(String::as_str)
    }
}

/// Reaction name to the users who placed, seconded or opposed it.
pub type ReactionMap = BTreeMap<ReactionName, Vec<UserReactInfo>>;

/// Aggregate of the agreement axis alongside the approval vote.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TwoAxisScore {
    pub approval_vote_count: i64,
    pub agreement: i64,
    pub agreement_vote_count: i64,
}

/// Two-axis aggregate plus named reactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionsScore {
    pub approval_vote_count: i64,
    pub agreement: i64,
    pub agreement_vote_count: i64,
    #[serde(default)]
    pub reacts: ReactionMap,
}

/// Number of users toggling each emoji on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmojiScore {
    #[serde(default)]
    pub counts: BTreeMap<String, i64>,
}

/// Karma-weighted score and vote count of one ballot axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AxisTally {
    pub score: i64,
    pub vote_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BallotScore {
    pub approval_vote_count: i64,
    #[serde(default)]
    pub axes: BTreeMap<String, AxisTally>,
}

/// The denormalized extended score attached to a document.
///
/// The shape depends on the document's voting system. It is always derived
/// from the live vote events and never mutated independently, except as an
/// optimistic approximation on the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtendedScore {
    #[default]
    Empty,
    TwoAxis(TwoAxisScore),
    Reactions(ReactionsScore),
    Emoji(EmojiScore),
    Ballot(BallotScore),
}

impl ExtendedScore {
    pub fn reacts(&self) -> Option<&ReactionMap> {
        match self {
            ExtendedScore::Reactions(score) => Some(&score.reacts),
            _ => None,
        }
    }

    pub fn agreement(&self) -> Option<i64> {
        match self {
            ExtendedScore::TwoAxis(score) => Some(score.agreement),
            ExtendedScore::Reactions(score) => Some(score.agreement),
            _ => None,
        }
    }
}

/// Everything recomputed from the live vote events of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentScores {
    /// Sum of the base vote power of every live vote.
    pub base_score: i64,
    /// Number of live votes that have any effect under the voting system.
    pub vote_count: i64,
    /// Number of live votes that are not pure retractions.
    pub nonblank_vote_count: i64,
    pub extended_score: ExtendedScore,
}
