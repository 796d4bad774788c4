//! Voting strategies: one implementation per voting system.
//!
//! A strategy owns one [`ExtendedScore`] shape. It folds live vote events into
//! that shape, approximates a single vote's effect on the client, and decides
//! which extended votes it accepts.
mod ballot;
mod default;
mod emoji;
mod named_reactions;
mod two_axis;

use std::collections::HashMap;

pub use ballot::BallotStrategy;
pub use default::DefaultStrategy;
pub use emoji::EmojiStrategy;
pub use named_reactions::NamedReactionsStrategy;
pub use two_axis::TwoAxisStrategy;

use voting_shared::types::{
    Actor, CastVote, ExtendedScore, ExtendedVote, UserId, VoteEvent, VoteType, VoteableDocument,
};

pub use crate::ledger::VoterInfo;
use crate::errors::VoteDenial;

/// Voter details available while recomputing an aggregate.
///
/// Voters missing from the context are treated as unknown accounts with no karma.
#[derive(Debug, Clone, Default)]
pub struct RecomputeContext {
    voters: HashMap<UserId, VoterInfo>,
}

impl RecomputeContext {
    pub fn new(voters: impl IntoIterator<Item = VoterInfo>) -> Self {
        Self {
            voters: voters
                .into_iter()
                .map(|voter| (voter.user_id.clone(), voter))
                .collect(),
        }
    }

    pub fn insert(&mut self, voter: VoterInfo) {
        self.voters.insert(voter.user_id.clone(), voter);
    }

    pub fn voter(&self, user_id: &str) -> VoterInfo {
        self.voters
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| VoterInfo::unknown(user_id))
    }
}

/// A voting system.
///
/// `apply_vote_optimistic` and `rollback_vote_optimistic` are inverses for an
/// aggregate holding no contribution from the actor. `recompute_aggregate` is
/// a pure, order-independent fold of the live events and returns
/// [`VotingStrategy::zero_score`] for an empty input. A strategy handed a
/// score shape it does not own treats it as its zero value.
pub trait VotingStrategy: Send + Sync {
    /// The registry key of this voting system.
    fn name(&self) -> &str;

    /// The aggregate of a document nobody has voted on.
    fn zero_score(&self) -> ExtendedScore;

    /// Approximates `current` after `actor` casts `vote`.
    fn apply_vote_optimistic(&self, current: &ExtendedScore, vote: &CastVote, actor: &Actor) -> ExtendedScore;

    /// Approximates `current` after `actor`'s `cancelled` vote is withdrawn.
    fn rollback_vote_optimistic(&self, current: &ExtendedScore, cancelled: &CastVote, actor: &Actor)
    -> ExtendedScore;

    /// Folds every live vote event of a document into a fresh aggregate.
    fn recompute_aggregate(&self, events: &[VoteEvent], context: &RecomputeContext) -> ExtendedScore;

    /// Whether `actor` may submit `proposed` on `document`.
    ///
    /// # Arguments
    ///
    /// * `current` - The document's aggregate before the vote
    /// * `skip_rate_limits` - Bypasses karma gates (administrative recomputation)
    fn is_extended_vote_permitted(
        &self,
        _actor: &Actor,
        _document: &VoteableDocument,
        _current: &ExtendedScore,
        _proposed: Option<&ExtendedVote>,
        _skip_rate_limits: bool,
    ) -> Result<(), VoteDenial> {
        Ok(())
    }

    /// Whether the extended payload carries anything this voting system reads.
    fn is_nonblank_extended_vote(&self, extended: Option<&ExtendedVote>) -> bool {
        extended.is_some_and(|extended| !extended.is_blank())
    }

    /// A vote event is nonblank when its base vote is not neutral or its
    /// extended payload is nonblank.
    fn is_vote_event_nonblank(&self, event: &VoteEvent) -> bool {
        !event.vote_type_or_neutral().is_neutral()
            || self.is_nonblank_extended_vote(event.extended_vote.as_ref())
    }

    /// Whether the event counts towards the document's vote count.
    fn vote_has_any_effect(&self, _event: &VoteEvent) -> bool {
        true
    }
}

/// +1 for a non-neutral vote, 0 otherwise.
pub(crate) fn count_if_cast(vote: VoteType) -> i64 {
    i64::from(!vote.is_neutral())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};
    use voting_shared::types::{ExtendedVote, VoteEvent, VoteType};

    pub fn event(user: &str, vote_type: VoteType, extended: Option<ExtendedVote>) -> VoteEvent {
        VoteEvent {
            user_id: user.to_string(),
            document_id: "doc".to_string(),
            collection_name: "Comments".to_string(),
            vote_type: Some(vote_type),
            extended_vote: extended,
            power: crate::power::power(0, vote_type),
            author_ids: vec!["author".to_string()],
            cast_at: Utc.with_ymd_and_hms(2024, 4, 23, 8, 0, 0).unwrap(),
        }
    }
}
