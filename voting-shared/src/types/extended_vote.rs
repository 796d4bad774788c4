use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{QuoteLocator, ReactionName, VoteOnReaction, VoteType};

/// A user's vote on a single named reaction, optionally scoped to quotes.
///
/// At the logical level an entry is scoped to at most one quote. An entry with
/// several quotes is a storage compaction of one entry per quote and must be
/// expanded before it is interpreted. An entry without quotes is a
/// whole-document reaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteOnSingleReaction {
    pub react: ReactionName,
    pub vote: VoteOnReaction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<QuoteLocator>,
}

impl UserVoteOnSingleReaction {
    pub fn new(react: impl Into<ReactionName>, vote: VoteOnReaction, quote: Option<QuoteLocator>) -> Self {
        Self {
            react: react.into(),
            vote,
            quotes: quote.into_iter().collect(),
        }
    }

    /// Whether this entry is the user's reaction `name` on `quote`.
    ///
    /// With a quote, any entry listing that quote matches. Without one, only
    /// whole-document entries match.
    pub fn matches(&self, name: &str, quote: Option<&str>) -> bool {
        if self.react != name {
            return false;
        }
        match quote {
            Some(quote) => self.quotes.iter().any(|q| q == quote),
            None => self.quotes.is_empty(),
        }
    }
}

/// Structured vote payload beyond the base up/down vote.
///
/// Every voting system reads only the axes it understands: the agreement axis,
/// named reactions, emoji toggles or ballot axes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedVote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement: Option<VoteType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reacts: Vec<UserVoteOnSingleReaction>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub emojis: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub axes: BTreeMap<String, VoteType>,
}

impl ExtendedVote {
    pub fn agreement(agreement: VoteType) -> Self {
        Self {
            agreement: Some(agreement),
            ..Default::default()
        }
    }

    pub fn reacts(reacts: Vec<UserVoteOnSingleReaction>) -> Self {
        Self {
            reacts,
            ..Default::default()
        }
    }

    pub fn agreement_or_neutral(&self) -> VoteType {
        VoteType::or_neutral(self.agreement)
    }

    /// True when no axis of the payload carries a vote.
    pub fn is_blank(&self) -> bool {
        self.agreement_or_neutral().is_neutral()
            && self.reacts.is_empty()
            && !self.emojis.values().any(|on| *on)
            && self.axes.values().all(|v| v.is_neutral())
    }
}

/// A vote intent: the base vote type plus an optional extended payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CastVote {
    pub vote_type: VoteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<ExtendedVote>,
}

impl CastVote {
    pub fn base(vote_type: VoteType) -> Self {
        Self {
            vote_type,
            extended: None,
        }
    }

    pub fn with_extended(vote_type: VoteType, extended: ExtendedVote) -> Self {
        Self {
            vote_type,
            extended: Some(extended),
        }
    }

    /// A neutral vote with a blank payload; removes the user's vote.
    pub fn retraction() -> Self {
        Self::base(VoteType::Neutral)
    }

    pub fn is_retraction(&self) -> bool {
        self.vote_type.is_neutral() && self.extended.as_ref().is_none_or(ExtendedVote::is_blank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_matches_quote_scope() {
        let inline = UserVoteOnSingleReaction {
            react: "typo".to_string(),
            vote: VoteOnReaction::Created,
            quotes: vec!["first".to_string(), "second".to_string()],
        };
        assert!(inline.matches("typo", Some("second")));
        assert!(!inline.matches("typo", None));
        assert!(!inline.matches("crux", Some("first")));

        let whole = UserVoteOnSingleReaction::new("typo", VoteOnReaction::Created, None);
        assert!(whole.matches("typo", None));
        assert!(!whole.matches("typo", Some("first")));
    }

    #[test]
    fn test_blank_extended_vote() {
        assert!(ExtendedVote::default().is_blank());
        assert!(ExtendedVote::agreement(VoteType::Neutral).is_blank());
        assert!(!ExtendedVote::agreement(VoteType::SmallUpvote).is_blank());

        let mut emojis = ExtendedVote::default();
        emojis.emojis.insert("heart".to_string(), false);
        assert!(emojis.is_blank());
        emojis.emojis.insert("laugh".to_string(), true);
        assert!(!emojis.is_blank());
    }

    #[test]
    fn test_extended_vote_deserializes_partial_payload() {
        let parsed: ExtendedVote = serde_json::from_str(
            r#"{"agreement":"bigUpvote","reacts":[{"react":"crux","vote":"seconded","quotes":["a quote"]}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.agreement, Some(VoteType::BigUpvote));
        assert_eq!(parsed.reacts.len(), 1);
        assert_eq!(parsed.reacts[0].quotes, vec!["a quote".to_string()]);
        assert!(parsed.emojis.is_empty());
    }

    #[test]
    fn test_cast_vote_retraction() {
        assert!(CastVote::retraction().is_retraction());
        assert!(CastVote::with_extended(VoteType::Neutral, ExtendedVote::default()).is_retraction());
        assert!(!CastVote::with_extended(VoteType::Neutral, ExtendedVote::agreement(VoteType::SmallDownvote)).is_retraction());
        assert!(!CastVote::base(VoteType::SmallUpvote).is_retraction());
    }
}
