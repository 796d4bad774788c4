use voting_shared::types::{Actor, CastVote, EmojiScore, ExtendedScore, ExtendedVote, VoteEvent, VoteableDocument};

use crate::errors::VoteDenial;
use crate::reactions;
use crate::strategy::{RecomputeContext, VotingStrategy};

/// Emoji toggles, counted once per user who switched each one on.
#[derive(Default)]
pub struct EmojiStrategy;

impl EmojiStrategy {
    fn current(score: &ExtendedScore) -> EmojiScore {
        match score {
            ExtendedScore::Emoji(score) => score.clone(),
            _ => EmojiScore::default(),
        }
    }

    fn tally(score: &mut EmojiScore, extended: Option<&ExtendedVote>, sign: i64) {
        let Some(extended) = extended else {
            return;
        };
        for (emoji, _) in extended.emojis.iter().filter(|(_, on)| **on) {
            *score.counts.entry(emoji.clone()).or_default() += sign;
        }
        score.counts.retain(|_, count| *count != 0);
    }
}

impl VotingStrategy for EmojiStrategy {
    fn name(&self) -> &str {
        "eaEmojis"
    }

    fn zero_score(&self) -> ExtendedScore {
        ExtendedScore::Emoji(EmojiScore::default())
    }

    fn apply_vote_optimistic(&self, current: &ExtendedScore, vote: &CastVote, _actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        Self::tally(&mut score, vote.extended.as_ref(), 1);
        ExtendedScore::Emoji(score)
    }

    fn rollback_vote_optimistic(&self, current: &ExtendedScore, cancelled: &CastVote, _actor: &Actor) -> ExtendedScore {
        let mut score = Self::current(current);
        Self::tally(&mut score, cancelled.extended.as_ref(), -1);
        ExtendedScore::Emoji(score)
    }

    fn recompute_aggregate(&self, events: &[VoteEvent], _context: &RecomputeContext) -> ExtendedScore {
        let mut score = EmojiScore::default();
        for event in events {
            Self::tally(&mut score, event.extended_vote.as_ref(), 1);
        }
        ExtendedScore::Emoji(score)
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
        match proposed.emojis.keys().find(|emoji| !reactions::is_emoji(emoji)) {
            Some(unknown) => Err(VoteDenial::UnrecognizedEmoji(unknown.clone())),
            None => Ok(()),
        }
    }

    fn is_nonblank_extended_vote(&self, extended: Option<&ExtendedVote>) -> bool {
        extended.is_some_and(|extended| extended.emojis.values().any(|on| *on))
    }
}
