//! Reaction ledger: per-user entries of named reactions in an aggregate, and
//! the voter's own reaction payload.
//!
//! An aggregate holds at most one entry per (user, reaction, quote). Stored
//! entries may list several quotes; those are expanded to one entry per quote
//! by [`normalize_reaction_entries`] and [`normalize_user_reacts`] before they
//! are interpreted.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use voting_shared::types::{
    Actor, ExtendedVote, ReactionMap, ReactionName, UserId, UserReactInfo, UserVoteOnSingleReaction,
    VoteOnReaction,
};

/// Who a reaction entry belongs to, as displayed next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterInfo {
    pub user_id: UserId,
    pub display_name: String,
    pub karma: i64,
}

impl VoterInfo {
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>, karma: i64) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            karma,
        }
    }

    /// Placeholder for a voter whose account is unknown.
    pub fn unknown(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, "[deleted]", 0)
    }

    fn entry(&self, react_type: VoteOnReaction, quote: Option<&str>) -> UserReactInfo {
        UserReactInfo {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            karma: self.karma,
            react_type,
            quotes: quote.map(str::to_string).into_iter().collect(),
        }
    }
}

impl From<&Actor> for VoterInfo {
    fn from(actor: &Actor) -> Self {
        Self::new(actor.id.clone(), actor.display_name.clone(), actor.karma)
    }
}

/// Records the voter's `react_type` on `reaction_name` at `quote`.
///
/// Replaces the voter's existing entry for the same reaction and quote, and
/// leaves every other entry untouched.
pub fn merge_reaction(
    reacts: &mut ReactionMap,
    voter: &VoterInfo,
    reaction_name: &str,
    react_type: VoteOnReaction,
    quote: Option<&str>,
) {
    let entries = reacts.entry(reaction_name.to_string()).or_default();
    let expanded = normalize_reaction_entries(std::mem::take(entries));
    *entries = expanded
        .into_iter()
        .filter(|entry| !(entry.user_id == voter.user_id && entry.quote() == quote))
        .collect();
    entries.push(voter.entry(react_type, quote));
}

/// Records every reaction of a voter's extended vote.
pub fn add_user_reacts(reacts: &mut ReactionMap, voter: &VoterInfo, user_reacts: &[UserVoteOnSingleReaction]) {
    for react in normalize_user_reacts(user_reacts) {
        merge_reaction(
            reacts,
            voter,
            &react.react,
            react.vote,
            react.quotes.first().map(String::as_str),
        );
    }
}

/// Removes all of a user's entries from every reaction.
///
/// Reactions left with no entries are dropped from the map.
pub fn remove_user_from_reactions(reacts: &mut ReactionMap, user_id: &str) {
    for entries in reacts.values_mut() {
        entries.retain(|entry| entry.user_id != user_id);
    }
    reacts.retain(|_, entries| !entries.is_empty());
}

/// Expands entries listing several quotes into one entry per quote.
pub fn normalize_reaction_entries(entries: Vec<UserReactInfo>) -> Vec<UserReactInfo> {
    entries
        .into_iter()
        .flat_map(|entry| {
            if entry.quotes.len() <= 1 {
                return vec![entry];
            }
            entry
                .quotes
                .iter()
                .map(|quote| UserReactInfo {
                    quotes: vec![quote.clone()],
                    ..entry.clone()
                })
                .collect()
        })
        .collect()
}

/// Expands reactions of a user's payload listing several quotes into one per quote.
pub fn normalize_user_reacts(reacts: &[UserVoteOnSingleReaction]) -> Vec<UserVoteOnSingleReaction> {
    reacts
        .iter()
        .flat_map(|react| {
            if react.quotes.len() <= 1 {
                return vec![react.clone()];
            }
            react
                .quotes
                .iter()
                .map(|quote| UserVoteOnSingleReaction::new(react.react.clone(), react.vote, Some(quote.clone())))
                .collect()
        })
        .collect()
}

/// Normalizes every reaction of an aggregate and orders its entries by
/// karma (highest first), then user and quote.
pub fn sort_reaction_entries(reacts: &mut ReactionMap) {
    for entries in reacts.values_mut() {
        let mut normalized = normalize_reaction_entries(std::mem::take(entries));
        normalized.sort_by(|a, b| {
            b.karma
                .cmp(&a.karma)
                .then_with(|| a.user_id.cmp(&b.user_id))
                .then_with(|| a.quote().cmp(&b.quote()))
        });
        *entries = normalized;
    }
}

/// Net count of each reaction: created and seconded entries add one,
/// disagreed entries subtract one.
pub fn net_reaction_counts(reacts: &ReactionMap) -> BTreeMap<ReactionName, i64> {
    reacts
        .iter()
        .map(|(name, entries)| {
            let net = entries.iter().map(|entry| entry.react_type.net_weight()).sum();
            (name.clone(), net)
        })
        .collect()
}

/// Names of the reactions already used on a document, ordered by the karma of
/// their highest-karma supporter.
///
/// Reactions only opposed are left out.
pub fn reaction_names_by_karma(reacts: &ReactionMap) -> Vec<ReactionName> {
    let mut used: Vec<(i64, &ReactionName)> = reacts
        .iter()
        .filter_map(|(name, entries)| {
            entries
                .iter()
                .filter(|entry| entry.react_type != VoteOnReaction::Disagreed)
                .map(|entry| entry.karma)
                .max()
                .map(|karma| (karma, name))
        })
        .collect();
    used.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    used.into_iter().map(|(_, name)| name.clone()).collect()
}

/// Whether anyone other than `user_id` supports `reaction_name` at `quote`.
pub fn is_used_by_others(reacts: &ReactionMap, user_id: &str, reaction_name: &str, quote: Option<&str>) -> bool {
    reacts.get(reaction_name).is_some_and(|entries| {
        normalize_reaction_entries(entries.clone()).iter().any(|entry| {
            entry.user_id != user_id && entry.react_type != VoteOnReaction::Disagreed && entry.quote() == quote
        })
    })
}

/// The user's own vote on `name` at `quote` in their extended vote, if any.
pub fn current_reaction(extended: Option<&ExtendedVote>, name: &str, quote: Option<&str>) -> Option<VoteOnReaction> {
    extended?
        .reacts
        .iter()
        .find(|react| react.matches(name, quote))
        .map(|react| react.vote)
}

/// A copy of `extended` with the user's vote on `name` at `quote` set to `vote`.
pub fn with_reaction(
    extended: Option<&ExtendedVote>,
    name: &str,
    vote: VoteOnReaction,
    quote: Option<&str>,
) -> ExtendedVote {
    let mut updated = without_reaction(extended, name, quote);
    updated
        .reacts
        .push(UserVoteOnSingleReaction::new(name, vote, quote.map(str::to_string)));
    updated
}

/// A copy of `extended` without the user's vote on `name` at `quote`.
pub fn without_reaction(extended: Option<&ExtendedVote>, name: &str, quote: Option<&str>) -> ExtendedVote {
    let mut updated = extended.cloned().unwrap_or_default();
    updated.reacts = normalize_user_reacts(&updated.reacts)
        .into_iter()
        .filter(|react| !react.matches(name, quote))
        .collect();
    updated
}
