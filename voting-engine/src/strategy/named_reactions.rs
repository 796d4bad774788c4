use voting_shared::types::{
    Actor, CastVote, ExtendedScore, ExtendedVote, ReactionsScore, VoteEvent, VoteType, VoteableDocument,
};

use crate::errors::VoteDenial;
use crate::ledger::{self, VoterInfo};
use crate::policy::ReactionPolicy;
use crate::power::VotePowerCurve;
use crate::strategy::{RecomputeContext, VotingStrategy, count_if_cast};

/// Named reactions with the names of their reactors attached.
///
/// Used for two voting systems: `namesAttachedReactions`, which also keeps the
/// agreement axis, and `reactionsAndLikes`, which ignores it.
pub struct NamedReactionsStrategy {
    name: &'static str,
    tracks_agreement: bool,
    curve: VotePowerCurve,
    policy: ReactionPolicy,
}

impl NamedReactionsStrategy {
    pub fn names_attached(curve: VotePowerCurve, policy: ReactionPolicy) -> Self {
        Self {
            name: "namesAttachedReactions",
            tracks_agreement: true,
            curve,
            policy,
        }
    }

    pub fn reactions_and_likes(curve: VotePowerCurve, policy: ReactionPolicy) -> Self {
        Self {
            name: "reactionsAndLikes",
            tracks_agreement: false,
            curve,
            policy,
        }
    }

    fn current(score: &ExtendedScore) -> ReactionsScore {
        match score {
            ExtendedScore::Reactions(score) => score.clone(),
            _ => ReactionsScore::default(),
        }
    }

    fn agreement_of(&self, extended: Option<&ExtendedVote>) -> VoteType {
        match extended {
            Some(extended) if self.tracks_agreement => extended.agreement_or_neutral(),
            _ => VoteType::Neutral,
        }
    }

    fn tally_axes(&self, score: &mut ReactionsScore, vote: &CastVote, karma: i64, sign: i64) {
        let agreement = self.agreement_of(vote.extended.as_ref());
        score.approval_vote_count += sign * count_if_cast(vote.vote_type);
        score.agreement += sign * self.curve.power(karma, agreement);
        score.agreement_vote_count += sign * count_if_cast(agreement);
    }
}

impl VotingStrategy for NamedReactionsStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn zero_score(&self) -> ExtendedScore {
        ExtendedScore::Reactions(ReactionsScore::default())
    }

    fn apply_vote_optimistic(&self, current: &ExtendedScore, vote: &CastVote, actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        self.tally_axes(&mut score, vote, actor.karma, 1);
        if let Some(extended) = &vote.extended {
            ledger::add_user_reacts(&mut score.reacts, &VoterInfo::from(actor), &extended.reacts);
        }
        ExtendedScore::Reactions(score)
    }

    fn rollback_vote_optimistic(&self, current: &ExtendedScore, cancelled: &CastVote, actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        self.tally_axes(&mut score, cancelled, actor.karma, -1);
        ledger::remove_user_from_reactions(&mut score.reacts, &actor.id);
        ExtendedScore::Reactions(score)
    }

    fn recompute_aggregate(&self, events: &[VoteEvent], context: &RecomputeContext) -> ExtendedScore {
        let mut score = ReactionsScore::default();
        for event in events {
            let voter = context.voter(&event.user_id);
            let vote = CastVote {
                vote_type: event.vote_type_or_neutral(),
                extended: event.extended_vote.clone(),
            };
            self.tally_axes(&mut score, &vote, voter.karma, 1);
            if let Some(extended) = &event.extended_vote {
                ledger::add_user_reacts(&mut score.reacts, &voter, &extended.reacts);
            }
        }
        ledger::sort_reaction_entries(&mut score.reacts);
        ExtendedScore::Reactions(score)
    }

    fn is_extended_vote_permitted(
        &self,
        actor: &Actor,
        document: &VoteableDocument,
        current: &ExtendedScore,
        proposed: Option<&ExtendedVote>,
        skip_rate_limits: bool,
    ) -> Result<(), VoteDenial> {
        let proposed = proposed.map(|extended| extended.reacts.as_slice()).unwrap_or_default();
        self.policy
            .check(actor, document, current.reacts(), proposed, skip_rate_limits)
    }

    fn is_nonblank_extended_vote(&self, extended: Option<&ExtendedVote>) -> bool {
        extended.is_some_and(|extended| {
            !extended.reacts.is_empty() || !self.agreement_of(Some(extended)).is_neutral()
        })
    }
}
