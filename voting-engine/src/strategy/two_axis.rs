use voting_shared::types::{Actor, CastVote, ExtendedScore, ExtendedVote, TwoAxisScore, VoteEvent, VoteType};

use crate::power::VotePowerCurve;
use crate::strategy::{RecomputeContext, VotingStrategy, count_if_cast};

/// Approval plus a separate, karma-weighted agreement axis.
#[derive(Default)]
pub struct TwoAxisStrategy {
    curve: VotePowerCurve,
}

impl TwoAxisStrategy {
    pub fn new(curve: VotePowerCurve) -> Self {
        Self { curve }
    }

    fn current(score: &ExtendedScore) -> TwoAxisScore {
        match score {
            ExtendedScore::TwoAxis(score) => score.clone(),
            _ => TwoAxisScore::default(),
        }
    }

    /// Adds (`sign` = 1) or removes (`sign` = -1) one voter's contribution.
    fn tally(&self, score: &mut TwoAxisScore, vote_type: VoteType, agreement: VoteType, karma: i64, sign: i64) {
        score.approval_vote_count += sign * count_if_cast(vote_type);
        score.agreement += sign * self.curve.power(karma, agreement);
        score.agreement_vote_count += sign * count_if_cast(agreement);
    }
}

fn agreement_of(extended: Option<&ExtendedVote>) -> VoteType {
    extended.map(ExtendedVote::agreement_or_neutral).unwrap_or_default()
}

impl VotingStrategy for TwoAxisStrategy {
    fn name(&self) -> &str {
        "twoAxis"
    }

    fn zero_score(&self) -> ExtendedScore {
        ExtendedScore::TwoAxis(TwoAxisScore::default())
    }

    fn apply_vote_optimistic(&self, current: &ExtendedScore, vote: &CastVote, actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        let agreement = agreement_of(vote.extended.as_ref());
        self.tally(&mut score, vote.vote_type, agreement, actor.karma, 1);
        ExtendedScore::TwoAxis(score)
    }

    fn rollback_vote_optimistic(&self, current: &ExtendedScore, cancelled: &CastVote, actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        let agreement = agreement_of(cancelled.extended.as_ref());
        self.tally(&mut score, cancelled.vote_type, agreement, actor.karma, -1);
        ExtendedScore::TwoAxis(score)
    }

    fn recompute_aggregate(&self, events: &[VoteEvent], context: &RecomputeContext) -> ExtendedScore {
        let mut score = TwoAxisScore::default();
        for event in events {
            let karma = context.voter(&event.user_id).karma;
            let agreement = agreement_of(event.extended_vote.as_ref());
            self.tally(&mut score, event.vote_type_or_neutral(), agreement, karma, 1);
        }
        ExtendedScore::TwoAxis(score)
    }

    fn is_nonblank_extended_vote(&self, extended: Option<&ExtendedVote>) -> bool {
        !agreement_of(extended).is_neutral()
    }
}
