//! Vote power: how much a vote weighs given the voter's karma.
use serde::{Deserialize, Serialize};
use voting_shared::types::VoteType;

/// Karma thresholds and the vote power they unlock, in ascending karma order.
///
/// A voter gets the power of the highest step whose threshold their karma
/// reaches. Below the first step a vote weighs 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePowerCurve {
    pub small_vote_steps: Vec<(i64, i64)>,
    pub big_vote_steps: Vec<(i64, i64)>,
}

impl Default for VotePowerCurve {
    fn default() -> Self {
        Self {
            small_vote_steps: vec![(1000, 2), (25_000, 3)],
            big_vote_steps: vec![
                (10, 2),
                (100, 3),
                (250, 4),
                (500, 5),
                (1000, 6),
                (2500, 7),
                (5000, 8),
                (10_000, 9),
                (25_000, 10),
                (50_000, 11),
                (75_000, 12),
                (100_000, 13),
                (175_000, 14),
                (250_000, 15),
                (500_000, 16),
            ],
        }
    }
}

impl VotePowerCurve {
    /// Weight of a vote of `strength` cast by a voter with `karma`.
    ///
    /// Zero for neutral, negative for downvotes, and never smaller in
    /// magnitude for a voter with more karma.
    pub fn power(&self, karma: i64, strength: VoteType) -> i64 {
        let magnitude = |steps: &[(i64, i64)]| {
            steps
                .iter()
                .filter(|(threshold, _)| karma >= *threshold)
                .map(|(_, power)| *power)
                .max()
                .unwrap_or(1)
                .max(1)
        };
        match strength {
            VoteType::Neutral => 0,
            VoteType::SmallUpvote => magnitude(&self.small_vote_steps),
            VoteType::SmallDownvote => -magnitude(&self.small_vote_steps),
            VoteType::BigUpvote => magnitude(&self.big_vote_steps),
            VoteType::BigDownvote => -magnitude(&self.big_vote_steps),
        }
    }

    pub fn power_of(&self, karma: i64, strength: Option<VoteType>) -> i64 {
        self.power(karma, VoteType::or_neutral(strength))
    }
}

/// Vote power under the default curve.
pub fn power(karma: i64, strength: VoteType) -> i64 {
    VotePowerCurve::default().power(karma, strength)
}
