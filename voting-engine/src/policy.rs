//! Karma gates on placing, seconding and opposing named reactions.
use tracing::warn;
use voting_shared::types::{Actor, ReactionMap, UserVoteOnSingleReaction, VoteOnReaction, VoteableDocument};

use crate::config::ReactKarmaThresholds;
use crate::errors::VoteDenial;
use crate::reactions;

/// Decides whether an actor may submit a set of reactions on a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionPolicy {
    thresholds: ReactKarmaThresholds,
}

impl ReactionPolicy {
    pub fn new(thresholds: ReactKarmaThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ReactKarmaThresholds {
        &self.thresholds
    }

    /// Checks the proposed reactions of `actor` on `document`.
    ///
    /// Rules are evaluated in order and the first failure is returned:
    /// opposing a reaction on one's own document, opposing without enough
    /// karma, reacting without enough karma, using a reaction nobody has used
    /// on the document without enough karma, and finally using a name outside
    /// the reaction palette. Karma equal to a threshold is enough.
    ///
    /// # Arguments
    ///
    /// * `current` - The document's reaction aggregate before this vote
    /// * `proposed` - The actor's full reaction payload
    /// * `skip_rate_limits` - Skips the karma rules, never the self-opposition
    ///   or palette rules
    pub fn check(
        &self,
        actor: &Actor,
        document: &VoteableDocument,
        current: Option<&ReactionMap>,
        proposed: &[UserVoteOnSingleReaction],
        skip_rate_limits: bool,
    ) -> Result<(), VoteDenial> {
        let result = self.evaluate(actor, document, current, proposed, skip_rate_limits);
        if let Err(denial) = &result {
            warn!(
                user_id = %actor.id,
                document_id = %document.id,
                karma = actor.karma,
                "Reaction denied: {}",
                denial
            );
        }
        result
    }

    fn evaluate(
        &self,
        actor: &Actor,
        document: &VoteableDocument,
        current: Option<&ReactionMap>,
        proposed: &[UserVoteOnSingleReaction],
        skip_rate_limits: bool,
    ) -> Result<(), VoteDenial> {
        let opposes = proposed
            .iter()
            .any(|react| react.vote == VoteOnReaction::Disagreed);

        if opposes && document.is_authored_by(&actor.id) {
            return Err(VoteDenial::SelfOpposition);
        }

        if !skip_rate_limits {
            let thresholds = &self.thresholds;
            if opposes && actor.karma < thresholds.downvote_existing_react {
                return Err(VoteDenial::InsufficientKarmaToOppose {
                    required: thresholds.downvote_existing_react,
                });
            }
            if !proposed.is_empty() && actor.karma < thresholds.add_name_to_existing_react {
                return Err(VoteDenial::InsufficientKarmaToReact {
                    required: thresholds.add_name_to_existing_react,
                });
            }
            let names_new_reaction = proposed
                .iter()
                .any(|react| !current.is_some_and(|reacts| reacts.contains_key(&react.react)));
            if names_new_reaction && actor.karma < thresholds.add_new_react {
                return Err(VoteDenial::InsufficientKarmaForNewReaction {
                    required: thresholds.add_new_react,
                });
            }
        }

        if let Some(unknown) = proposed
            .iter()
            .find(|react| !reactions::is_reaction(&react.react))
        {
            return Err(VoteDenial::UnrecognizedReactionType(unknown.react.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{VoterInfo, merge_reaction};

    fn document() -> VoteableDocument {
        VoteableDocument {
            author_ids: vec!["author".to_string()],
            ..VoteableDocument::new("doc", "Comments")
        }
    }

    fn existing_crux() -> ReactionMap {
        let mut reacts = ReactionMap::new();
        merge_reaction(
            &mut reacts,
            &VoterInfo::new("someone", "Someone", 100),
            "crux",
            VoteOnReaction::Created,
            None,
        );
        reacts
    }

    fn react(name: &str, vote: VoteOnReaction) -> Vec<UserVoteOnSingleReaction> {
        vec![UserVoteOnSingleReaction::new(name, vote, None)]
    }

    #[test]
    fn test_self_opposition_denied_even_when_skipping_limits() {
        let policy = ReactionPolicy::default();
        let author = Actor::new("author", "Author", 10_000);
        let result = policy.check(
            &author,
            &document(),
            Some(&existing_crux()),
            &react("crux", VoteOnReaction::Disagreed),
            true,
        );
        assert_eq!(result, Err(VoteDenial::SelfOpposition));
    }

    #[test]
    fn test_author_may_react_positively() {
        let policy = ReactionPolicy::default();
        let author = Actor::new("author", "Author", 10_000);
        let result = policy.check(
            &author,
            &document(),
            None,
            &react("thanks", VoteOnReaction::Created),
            false,
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_opposition_needs_karma() {
        let policy = ReactionPolicy::default();
        let current = existing_crux();
        let proposed = react("crux", VoteOnReaction::Disagreed);

        let low = Actor::new("voter", "Voter", 19);
        assert_eq!(
            policy.check(&low, &document(), Some(&current), &proposed, false),
            Err(VoteDenial::InsufficientKarmaToOppose { required: 20 })
        );
        let enough = Actor::new("voter", "Voter", 20);
        assert_eq!(policy.check(&enough, &document(), Some(&current), &proposed, false), Ok(()));
    }

    #[test]
    fn test_new_reaction_threshold_boundary() {
        let policy = ReactionPolicy::default();
        let proposed = react("typo", VoteOnReaction::Created);

        let at_threshold = Actor::new("voter", "Voter", 10);
        assert_eq!(
            policy.check(&at_threshold, &document(), Some(&existing_crux()), &proposed, false),
            Ok(())
        );
        let below = Actor::new("voter", "Voter", 9);
        assert_eq!(
            policy.check(&below, &document(), Some(&existing_crux()), &proposed, false),
            Err(VoteDenial::InsufficientKarmaForNewReaction { required: 10 })
        );
    }

    #[test]
    fn test_seconding_existing_reaction_needs_less_karma() {
        let policy = ReactionPolicy::default();
        let voter = Actor::new("voter", "Voter", 5);
        let current = existing_crux();
        assert_eq!(
            policy.check(&voter, &document(), Some(&current), &react("crux", VoteOnReaction::Seconded), false),
            Ok(())
        );
        let newcomer = Actor::new("voter", "Voter", 4);
        assert_eq!(
            policy.check(&newcomer, &document(), Some(&current), &react("crux", VoteOnReaction::Seconded), false),
            Err(VoteDenial::InsufficientKarmaToReact { required: 5 })
        );
    }

    #[test]
    fn test_skip_rate_limits_bypasses_karma_rules_only() {
        let policy = ReactionPolicy::default();
        let newcomer = Actor::new("voter", "Voter", 0);
        assert_eq!(
            policy.check(&newcomer, &document(), None, &react("crux", VoteOnReaction::Disagreed), true),
            Ok(())
        );
        assert_eq!(
            policy.check(&newcomer, &document(), None, &react("notAReaction", VoteOnReaction::Created), true),
            Err(VoteDenial::UnrecognizedReactionType("notAReaction".to_string()))
        );
    }

    #[test]
    fn test_empty_proposal_is_allowed() {
        let policy = ReactionPolicy::default();
        let newcomer = Actor::new("voter", "Voter", 0);
        assert_eq!(policy.check(&newcomer, &document(), None, &[], false), Ok(()));
    }
}
