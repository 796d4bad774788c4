use voting_shared::types::{Actor, CastVote, ExtendedScore, ExtendedVote, VoteEvent};

use crate::strategy::{RecomputeContext, VotingStrategy};

/// Plain up/down voting with no extended score.
pub struct DefaultStrategy;

impl VotingStrategy for DefaultStrategy {
    fn name(&self) -> &str {
        "default"
    }

    fn zero_score(&self) -> ExtendedScore {
        ExtendedScore::Empty
    }

    fn apply_vote_optimistic(&self, _current: &ExtendedScore, _vote: &CastVote, _actor: &Actor) -> ExtendedScore {
        ExtendedScore::Empty
    }

    fn rollback_vote_optimistic(
        &self,
        _current: &ExtendedScore,
        _cancelled: &CastVote,
        _actor: &Actor,
    ) -> ExtendedScore {
        ExtendedScore::Empty
    }

    fn recompute_aggregate(&self, _events: &[VoteEvent], _context: &RecomputeContext) -> ExtendedScore {
        ExtendedScore::Empty
    }

    fn is_nonblank_extended_vote(&self, _extended: Option<&ExtendedVote>) -> bool {
        false
    }

    /// Votes without power leave the score unchanged and are not counted.
    fn vote_has_any_effect(&self, event: &VoteEvent) -> bool {
        event.power != 0
    }
}
