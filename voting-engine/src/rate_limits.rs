//! Voting rate limits.
//!
//! Each limit caps how many votes a user may cast within a period, either
//! overall or on content by a single author. An exceeded limit triggers its
//! consequences: a warning shown to the voter, denial of the vote, or a flag
//! for moderators.
use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use voting_shared::types::{Actor, VoteEvent, VoteType, VoteableDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CountedVotes {
    All,
    OnlyStrong,
    OnlyDown,
}

impl CountedVotes {
    fn counts(self, vote_type: VoteType) -> bool {
        match self {
            CountedVotes::All => true,
            CountedVotes::OnlyStrong => vote_type.is_strong(),
            CountedVotes::OnlyDown => vote_type.is_downvote(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitScope {
    /// Votes on any content.
    AllUsers,
    /// Votes on content sharing an author with the document being voted on.
    SingleAuthor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateLimitConsequence {
    WarningPopup,
    DenyThisVote,
    FlagForModeration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingRateLimit {
    pub vote_count: usize,
    pub period_in_minutes: i64,
    pub types: CountedVotes,
    pub users: LimitScope,
    pub consequences: Vec<RateLimitConsequence>,
    pub message: Option<String>,
}

impl VotingRateLimit {
    fn new(
        vote_count: usize,
        period_in_minutes: i64,
        types: CountedVotes,
        users: LimitScope,
        consequence: RateLimitConsequence,
        message: Option<&str>,
    ) -> Self {
        Self {
            vote_count,
            period_in_minutes,
            types,
            users,
            consequences: vec![consequence],
            message: message.map(str::to_string),
        }
    }
}

/// Consequences triggered by a vote, and the message of the first exceeded limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub consequences: BTreeSet<RateLimitConsequence>,
    pub message: Option<String>,
}

impl RateLimitOutcome {
    pub fn denies(&self) -> bool {
        self.consequences.contains(&RateLimitConsequence::DenyThisVote)
    }

    pub fn warns(&self) -> bool {
        self.consequences.contains(&RateLimitConsequence::WarningPopup)
    }

    pub fn flags_for_moderation(&self) -> bool {
        self.consequences.contains(&RateLimitConsequence::FlagForModeration)
    }

    pub fn denial_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "too many votes".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingRateLimits {
    limits: Vec<VotingRateLimit>,
}

impl Default for VotingRateLimits {
    fn default() -> Self {
        use CountedVotes::*;
        use LimitScope::*;
        use RateLimitConsequence::*;
        Self::new(vec![
            VotingRateLimit::new(200, 24 * 60, All, AllUsers, DenyThisVote, Some("too many votes in one day")),
            VotingRateLimit::new(100, 60, All, AllUsers, DenyThisVote, Some("too many votes in one hour")),
            VotingRateLimit::new(
                100,
                24 * 60,
                All,
                SingleAuthor,
                DenyThisVote,
                Some("too many votes today on content by this author"),
            ),
            VotingRateLimit::new(
                9,
                2,
                OnlyDown,
                SingleAuthor,
                FlagForModeration,
                Some("too many votes in short succession on content by this author"),
            ),
            VotingRateLimit::new(10, 3, All, SingleAuthor, WarningPopup, None),
        ])
    }
}

impl VotingRateLimits {
    pub fn new(limits: Vec<VotingRateLimit>) -> Self {
        Self { limits }
    }

    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    /// How far back votes must be fetched to evaluate every limit.
    pub fn lookback(&self) -> Duration {
        let minutes = self
            .limits
            .iter()
            .map(|limit| limit.period_in_minutes)
            .max()
            .unwrap_or(0);
        Duration::minutes(minutes)
    }

    /// Evaluates the limits for `actor` casting any vote on `document`.
    ///
    /// Every limit applies whatever the type of the vote being cast; a typed
    /// limit only narrows which recent votes are counted. Admins have no
    /// limits. Votes on one's own content are exempt and are not counted.
    ///
    /// # Arguments
    ///
    /// * `recent_votes` - The actor's live votes within [`Self::lookback`]
    pub fn check(
        &self,
        actor: &Actor,
        document: &VoteableDocument,
        recent_votes: &[VoteEvent],
        now: DateTime<Utc>,
    ) -> RateLimitOutcome {
        let mut outcome = RateLimitOutcome::default();
        if actor.is_admin || document.is_authored_by(&actor.id) {
            return outcome;
        }

        for limit in &self.limits {
            let since = now - Duration::minutes(limit.period_in_minutes);
            let counted = recent_votes
                .iter()
                .filter(|vote| vote.user_id == actor.id)
                .filter(|vote| !vote.is_self_vote() && vote.cast_at > since)
                .filter(|vote| limit.types.counts(vote.vote_type_or_neutral()))
                .filter(|vote| match limit.users {
                    LimitScope::AllUsers => true,
                    LimitScope::SingleAuthor => vote.author_ids.iter().any(|author| document.is_authored_by(author)),
                })
                .count();
            if counted < limit.vote_count {
                continue;
            }
            info!(
                user_id = %actor.id,
                document_id = %document.id,
                counted,
                period_in_minutes = limit.period_in_minutes,
                "Voting rate limit exceeded"
            );
            outcome.consequences.extend(limit.consequences.iter().copied());
            if outcome.message.is_none() {
                outcome.message = limit.message.clone();
            }
        }
        outcome
    }
}
