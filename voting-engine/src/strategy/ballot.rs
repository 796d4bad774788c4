use voting_shared::types::{
    Actor, AxisTally, BallotScore, CastVote, ExtendedScore, ExtendedVote, VoteEvent, VoteType, VoteableDocument,
};

use crate::errors::VoteDenial;
use crate::power::VotePowerCurve;
use crate::strategy::{RecomputeContext, VotingStrategy, count_if_cast};

/// Approval plus a fixed set of karma-weighted axes, each voted on separately.
pub struct BallotStrategy {
    name: &'static str,
    axes: Vec<String>,
    curve: VotePowerCurve,
}

impl BallotStrategy {
    pub fn reacts_ballot(axes: Vec<String>, curve: VotePowerCurve) -> Self {
        Self {
            name: "reactsBallot",
            axes,
            curve,
        }
    }

    pub fn emoji_reactions_ballot(axes: Vec<String>, curve: VotePowerCurve) -> Self {
        Self {
            name: "emojiReactionsBallot",
            axes,
            curve,
        }
    }

    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    fn current(score: &ExtendedScore) -> BallotScore {
        match score {
            ExtendedScore::Ballot(score) => score.clone(),
            _ => BallotScore::default(),
        }
    }

    fn is_axis(&self, axis: &str) -> bool {
        self.axes.iter().any(|configured| configured == axis)
    }

    fn tally(&self, score: &mut BallotScore, vote_type: VoteType, extended: Option<&ExtendedVote>, karma: i64, sign: i64) {
        score.approval_vote_count += sign * count_if_cast(vote_type);
        let Some(extended) = extended else {
            return;
        };
        for (axis, vote) in &extended.axes {
            if vote.is_neutral() || !self.is_axis(axis) {
                continue;
            }
            let tally = score.axes.entry(axis.clone()).or_default();
            tally.score += sign * self.curve.power(karma, *vote);
            tally.vote_count += sign;
        }
        score.axes.retain(|_, tally| *tally != AxisTally::default());
    }
}

impl VotingStrategy for BallotStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn zero_score(&self) -> ExtendedScore {
        ExtendedScore::Ballot(BallotScore::default())
    }

    fn apply_vote_optimistic(&self, current: &ExtendedScore, vote: &CastVote, actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        self.tally(&mut score, vote.vote_type, vote.extended.as_ref(), actor.karma, 1);
        ExtendedScore::Ballot(score)
    }

    fn rollback_vote_optimistic(&self, current: &ExtendedScore, cancelled: &CastVote, actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        self.tally(&mut score, cancelled.vote_type, cancelled.extended.as_ref(), actor.karma, -1);
        ExtendedScore::Ballot(score)
    }

    fn recompute_aggregate(&self, events: &[VoteEvent], context: &RecomputeContext) -> ExtendedScore {
        let mut score = BallotScore::default();
        for event in events {
            let karma = context.voter(&event.user_id).karma;
            self.tally(&mut score, event.vote_type_or_neutral(), event.extended_vote.as_ref(), karma, 1);
        }
        ExtendedScore::Ballot(score)
    }

    fn is_extended_vote_permitted(
        &self,
        _actor: &Actor,
        _document: &VoteableDocument,
        _current: &ExtendedScore,
        proposed: Option<&ExtendedVote>,
        _skip_rate_limits: bool,
    ) -> Result<(), VoteDenial> {
        let Some(proposed) = proposed else {
            return Ok(());
        };
        match proposed.axes.keys().find(|axis| !self.is_axis(axis)) {
            Some(unknown) => Err(VoteDenial::UnrecognizedAxis(unknown.clone())),
            None => Ok(()),
        }
    }

    fn is_nonblank_extended_vote(&self, extended: Option<&ExtendedVote>) -> bool {
        extended.is_some_and(|extended| {
            extended
                .axes
                .iter()
                .any(|(axis, vote)| !vote.is_neutral() && self.is_axis(axis))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ledger::VoterInfo;
    use crate::strategy::test_support::event;

    fn strategy() -> BallotStrategy {
        BallotStrategy::reacts_ballot(EngineConfig::default().reacts_ballot_axes, VotePowerCurve::default())
    }

    fn ballot(axes: &[(&str, VoteType)]) -> ExtendedVote {
        let mut extended = ExtendedVote::default();
        for (axis, vote) in axes {
            extended.axes.insert(axis.to_string(), *vote);
        }
        extended
    }

    #[test]
    fn test_recompute_tallies_each_axis() {
        let strategy = strategy();
        let context = RecomputeContext::new([VoterInfo::new("a", "A", 1000)]);
        let events = vec![
            event("a", VoteType::SmallUpvote, Some(ballot(&[("truth", VoteType::BigUpvote), ("aim", VoteType::Neutral)]))),
            event("b", VoteType::Neutral, Some(ballot(&[("truth", VoteType::SmallDownvote)]))),
        ];

        let ExtendedScore::Ballot(score) = strategy.recompute_aggregate(&events, &context) else {
            panic!("expected a ballot score");
        };

        assert_eq!(score.approval_vote_count, 1);
        assert_eq!(score.axes["truth"], AxisTally { score: 5, vote_count: 2 });
        assert!(!score.axes.contains_key("aim"));
    }

    #[test]
    fn test_rollback_inverts_apply() {
        let strategy = strategy();
        let actor = Actor::new("actor", "Actor", 250);
        let start = strategy.recompute_aggregate(
            &[event("a", VoteType::SmallUpvote, Some(ballot(&[("clarity", VoteType::SmallUpvote)])))],
            &RecomputeContext::default(),
        );
        let vote = CastVote::with_extended(
            VoteType::BigUpvote,
            ballot(&[("truth", VoteType::BigDownvote), ("clarity", VoteType::SmallUpvote)]),
        );

        let applied = strategy.apply_vote_optimistic(&start, &vote, &actor);

        assert_ne!(applied, start);
        assert_eq!(strategy.rollback_vote_optimistic(&applied, &vote, &actor), start);
    }

    #[test]
    fn test_unconfigured_axis_denied() {
        let strategy = strategy();
        let actor = Actor::new("actor", "Actor", 0);
        let document = VoteableDocument::new("doc", "Posts");
        assert_eq!(
            strategy.is_extended_vote_permitted(
                &actor,
                &document,
                &strategy.zero_score(),
                Some(&ballot(&[("vibes", VoteType::SmallUpvote)])),
                false
            ),
            Err(VoteDenial::UnrecognizedAxis("vibes".to_string()))
        );
    }

    #[test]
    fn test_empty_is_zero() {
        let strategy = strategy();
        assert_eq!(
            strategy.recompute_aggregate(&[], &RecomputeContext::default()),
            strategy.zero_score()
        );
    }
}
