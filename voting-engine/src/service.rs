//! Server-side vote casting: rate limits, permission checks, storing the vote
//! and recomputing the document's scores from its live vote events.
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use voting_repository::{DocumentRepository, VoteRepository};
use voting_shared::types::{Actor, CastVote, ExtendedVote, VoteEvent, VoteType, VoteableDocument};

use crate::config::EngineConfig;
use crate::controller::{SubmitVoteResponse, VoteSubmitter};
use crate::errors::{TransportError, VoteError};
use crate::ledger::VoterInfo;
use crate::power::VotePowerCurve;
use crate::rate_limits::VotingRateLimits;
use crate::registry::StrategyRegistry;
use crate::scoring::recalculate_document_scores;
use crate::strategy::RecomputeContext;

#[derive(Debug, Clone, Copy, Default)]
pub struct VoteOptions {
    /// Skips rate limits and karma gates.
    pub skip_rate_limits: bool,
}

/// The result of a vote accepted by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    /// The document with recomputed scores and the actor's vote as current-user fields.
    pub document: VoteableDocument,
    /// Whether the voter should be warned about their voting pattern.
    pub warn_flag: bool,
    /// Whether the vote should be brought to moderators' attention.
    pub flagged_for_moderation: bool,
}

/// `VoteService` performs votes against the vote and document repositories.
///
/// Votes on one document are not serialized here: two concurrent votes on the
/// same document may recompute from different snapshots, and the last
/// recomputation wins until the next vote.
pub struct VoteService {
    votes: Arc<dyn VoteRepository>,
    documents: Arc<dyn DocumentRepository>,
    registry: Arc<StrategyRegistry>,
    vote_power: VotePowerCurve,
    rate_limits: VotingRateLimits,
    /// Display names and karma of voters. Every actor is added when voting
    /// and never evicted, so it holds at most one entry per user.
    voters: RwLock<RecomputeContext>,
}

impl VoteService {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        documents: Arc<dyn DocumentRepository>,
        registry: Arc<StrategyRegistry>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            votes,
            documents,
            registry,
            vote_power: config.vote_power.clone(),
            rate_limits: VotingRateLimits::default(),
            voters: RwLock::new(RecomputeContext::default()),
        }
    }

    pub fn with_rate_limits(mut self, rate_limits: VotingRateLimits) -> Self {
        self.rate_limits = rate_limits;
        self
    }

    /// Starts from known voters, so that recomputations show voters who have
    /// not voted through this service.
    pub fn with_voters(mut self, voters: RecomputeContext) -> Self {
        self.voters = RwLock::new(voters);
        self
    }

    /// Records a voter's display name and karma for later recomputations.
    pub async fn register_voter(&self, voter: VoterInfo) {
        self.voters.write().await.insert(voter);
    }

    /// Casts `vote` on a document for `actor`.
    ///
    /// Repeating one's current base vote without an extended payload, or
    /// casting a retraction, removes the actor's vote. Any other vote replaces
    /// it after passing rate limits and the voting system's permission check.
    ///
    /// # Errors
    ///
    /// `UnauthenticatedActor` without an actor, `DocumentNotFound`,
    /// `RateLimited`, `PermissionDenied` or a repository error.
    pub async fn perform_vote(
        &self,
        actor: Option<&Actor>,
        document_id: &str,
        vote: CastVote,
        options: VoteOptions,
    ) -> Result<VoteOutcome, VoteError> {
        let actor = actor.ok_or(VoteError::UnauthenticatedActor)?;
        let document = self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| VoteError::DocumentNotFound(document_id.to_string()))?;
        self.register_voter(VoterInfo::from(actor)).await;

        let existing = self.votes.get_user_vote(document_id, &actor.id).await?;
        let repeats_base_vote = existing.as_ref().is_some_and(|existing| {
            existing.extended_vote.is_none()
                && vote.extended.is_none()
                && existing.vote_type_or_neutral() == vote.vote_type
        });

        let mut outcome = VoteOutcome {
            document: document.clone(),
            warn_flag: false,
            flagged_for_moderation: false,
        };

        if repeats_base_vote || vote.is_retraction() {
            self.votes.remove_vote(document_id, &actor.id).await?;
            debug!(user_id = %actor.id, document_id, "Vote removed");
        } else {
            let now = Utc::now();
            if !options.skip_rate_limits {
                let recent = self
                    .votes
                    .votes_by_user_since(&actor.id, now - self.rate_limits.lookback())
                    .await?;
                let limits = self
                    .rate_limits
                    .check(actor, &document, &recent, now);
                if limits.denies() {
                    return Err(VoteError::RateLimited(limits.denial_message()));
                }
                outcome.warn_flag = limits.warns();
                outcome.flagged_for_moderation = limits.flags_for_moderation();
            }

            let strategy = self.registry.resolve_for_document(&document);
            if vote.extended.is_some() {
                strategy.is_extended_vote_permitted(
                    actor,
                    &document,
                    &document.extended_score,
                    vote.extended.as_ref(),
                    options.skip_rate_limits,
                )?;
            }

            let event = VoteEvent {
                user_id: actor.id.clone(),
                document_id: document.id.clone(),
                collection_name: document.collection_name.clone(),
                vote_type: Some(vote.vote_type),
                power: self.vote_power.power(actor.karma, vote.vote_type),
                extended_vote: vote.extended,
                author_ids: document.author_ids.clone(),
                cast_at: now,
            };
            self.votes.upsert_vote(event).await?;
            info!(
                user_id = %actor.id,
                document_id,
                vote_type = ?vote.vote_type,
                "Vote cast"
            );
        }

        let mut updated = self.recompute_document(&document).await?;
        let live = self.votes.get_user_vote(document_id, &actor.id).await?;
        updated.current_user_vote = live.as_ref().and_then(|event| event.vote_type);
        updated.current_user_extended_vote = live.and_then(|event| event.extended_vote);
        outcome.document = updated;
        Ok(outcome)
    }

    /// Recomputes and stores a document's scores from its live vote events.
    pub async fn recompute_document(&self, document: &VoteableDocument) -> Result<VoteableDocument, VoteError> {
        let strategy = self.registry.resolve_for_document(document);
        let events = self.votes.load_current_vote_events(&document.id).await?;
        let scores = {
            let voters = self.voters.read().await;
            recalculate_document_scores(strategy.as_ref(), &events, &voters)
        };
        Ok(self.documents.update_scores(&document.id, &scores).await?)
    }
}

/// Submits votes to a [`VoteService`] in-process, as one actor.
pub struct ServiceSubmitter {
    service: Arc<VoteService>,
    actor: Actor,
}

impl ServiceSubmitter {
    pub fn new(service: Arc<VoteService>, actor: Actor) -> Self {
        Self { service, actor }
    }
}

#[async_trait::async_trait]
impl VoteSubmitter for ServiceSubmitter {
    async fn submit_vote(
        &self,
        document_id: &str,
        vote_type: VoteType,
        extended: Option<ExtendedVote>,
    ) -> Result<SubmitVoteResponse, TransportError> {
        let vote = CastVote { vote_type, extended };
        match self
            .service
            .perform_vote(Some(&self.actor), document_id, vote, VoteOptions::default())
            .await
        {
            Ok(outcome) => Ok(SubmitVoteResponse {
                document: outcome.document,
                warn_flag: outcome.warn_flag,
            }),
            Err(error) => {
                warn!(user_id = %self.actor.id, document_id, "Vote rejected: {}", error);
                Err(TransportError::new(error.message()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{VoteDenial, VoteErrorKind};
    use voting_repository::InMemoryVoteRepository;
    use voting_shared::types::{ExtendedScore, UserVoteOnSingleReaction, VoteOnReaction};

    fn service(repository: Arc<InMemoryVoteRepository>) -> VoteService {
        let config = EngineConfig::default()
            .with_collection("Comments", "namesAttachedReactions")
            .with_collection("Posts", "twoAxis");
        let registry = Arc::new(StrategyRegistry::with_builtin(&config));
        VoteService::new(repository.clone(), repository, registry, &config)
    }

    fn repository() -> Arc<InMemoryVoteRepository> {
        let comment = VoteableDocument {
            author_ids: vec!["author".to_string()],
            ..VoteableDocument::new("comment", "Comments")
        };
        let post = VoteableDocument {
            author_ids: vec!["author".to_string()],
            ..VoteableDocument::new("post", "Posts")
        };
        Arc::new(InMemoryVoteRepository::with_documents([comment, post]))
    }

    fn react(name: &str, vote: VoteOnReaction) -> ExtendedVote {
        ExtendedVote::reacts(vec![UserVoteOnSingleReaction::new(name, vote, None)])
    }

    #[tokio::test]
    async fn test_requires_actor() {
        let service = service(repository());
        let result = service
            .perform_vote(None, "post", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await;
        assert_eq!(result.unwrap_err().kind(), VoteErrorKind::UnauthenticatedActor);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let service = service(repository());
        let actor = Actor::new("voter", "Voter", 10);
        let result = service
            .perform_vote(Some(&actor), "missing", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await;
        assert_eq!(result.unwrap_err(), VoteError::DocumentNotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_vote_then_revote_is_single_membership() {
        let repository = repository();
        let service = service(repository.clone());
        let actor = Actor::new("voter", "Voter", 1000);

        service
            .perform_vote(Some(&actor), "post", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await
            .unwrap();
        let outcome = service
            .perform_vote(
                Some(&actor),
                "post",
                CastVote::with_extended(VoteType::BigUpvote, ExtendedVote::agreement(VoteType::SmallDownvote)),
                VoteOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.document.base_score, 6);
        assert_eq!(outcome.document.vote_count, 1);
        assert_eq!(outcome.document.extended_score.agreement(), Some(-2));
        assert_eq!(outcome.document.current_user_vote, Some(VoteType::BigUpvote));
        assert_eq!(repository.load_current_vote_events("post").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_repeating_base_vote_toggles_it_off() {
        let repository = repository();
        let service = service(repository.clone());
        let actor = Actor::new("voter", "Voter", 10);

        service
            .perform_vote(Some(&actor), "post", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await
            .unwrap();
        let outcome = service
            .perform_vote(Some(&actor), "post", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.document.base_score, 0);
        assert_eq!(outcome.document.vote_count, 0);
        assert_eq!(outcome.document.current_user_vote, None);
        assert!(repository.load_current_vote_events("post").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reaction_recomputed_with_voter_names() {
        let service = service(repository());
        let actor = Actor::new("voter", "Voter", 50);

        let outcome = service
            .perform_vote(
                Some(&actor),
                "comment",
                CastVote::with_extended(VoteType::Neutral, react("crux", VoteOnReaction::Created)),
                VoteOptions::default(),
            )
            .await
            .unwrap();

        let ExtendedScore::Reactions(score) = &outcome.document.extended_score else {
            panic!("expected a reactions score");
        };
        assert_eq!(score.reacts["crux"][0].display_name, "Voter");
        assert_eq!(score.reacts["crux"][0].karma, 50);
        assert_eq!(outcome.document.vote_count, 1);
        assert_eq!(outcome.document.current_user_vote, Some(VoteType::Neutral));
    }

    #[tokio::test]
    async fn test_supplied_voters_are_used_in_recomputation() {
        let repository = repository();
        let earlier = VoteEvent {
            user_id: "elder".to_string(),
            document_id: "comment".to_string(),
            collection_name: "Comments".to_string(),
            vote_type: Some(VoteType::Neutral),
            extended_vote: Some(react("crux", VoteOnReaction::Created)),
            power: 0,
            author_ids: vec!["author".to_string()],
            cast_at: Utc::now(),
        };
        repository.upsert_vote(earlier).await.unwrap();
        let service = service(repository)
            .with_voters(RecomputeContext::new([VoterInfo::new("elder", "Elder", 9000)]));
        let actor = Actor::new("voter", "Voter", 50);

        let outcome = service
            .perform_vote(
                Some(&actor),
                "comment",
                CastVote::with_extended(VoteType::Neutral, react("crux", VoteOnReaction::Seconded)),
                VoteOptions::default(),
            )
            .await
            .unwrap();

        let reacts = outcome.document.extended_score.reacts().unwrap();
        assert_eq!(reacts["crux"][0].display_name, "Elder");
        assert_eq!(reacts["crux"][0].karma, 9000);
        assert_eq!(reacts["crux"][1].display_name, "Voter");
    }

    #[tokio::test]
    async fn test_denied_reaction_is_not_stored() {
        let repository = repository();
        let service = service(repository.clone());
        let author = Actor::new("author", "Author", 5000);

        let result = service
            .perform_vote(
                Some(&author),
                "comment",
                CastVote::with_extended(VoteType::Neutral, react("crux", VoteOnReaction::Disagreed)),
                VoteOptions::default(),
            )
            .await;

        assert_eq!(result.unwrap_err(), VoteError::PermissionDenied(VoteDenial::SelfOpposition));
        assert!(repository.load_current_vote_events("comment").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_vote_is_denied() {
        let repository = repository();
        let service = service(repository.clone()).with_rate_limits(VotingRateLimits::new(vec![
            crate::rate_limits::VotingRateLimit {
                vote_count: 1,
                period_in_minutes: 60,
                types: crate::rate_limits::CountedVotes::All,
                users: crate::rate_limits::LimitScope::AllUsers,
                consequences: vec![crate::rate_limits::RateLimitConsequence::DenyThisVote],
                message: Some("slow down".to_string()),
            },
        ]));
        let actor = Actor::new("voter", "Voter", 10);

        service
            .perform_vote(Some(&actor), "post", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await
            .unwrap();
        let result = service
            .perform_vote(Some(&actor), "comment", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await;
        assert_eq!(result.unwrap_err(), VoteError::RateLimited("slow down".to_string()));

        let skipped = service
            .perform_vote(
                Some(&actor),
                "comment",
                CastVote::base(VoteType::SmallUpvote),
                VoteOptions { skip_rate_limits: true },
            )
            .await;
        assert!(skipped.is_ok());
    }

    #[tokio::test]
    async fn test_reaction_only_vote_is_rate_limited() {
        let repository = repository();
        let service = service(repository.clone()).with_rate_limits(VotingRateLimits::new(vec![
            crate::rate_limits::VotingRateLimit {
                vote_count: 1,
                period_in_minutes: 60,
                types: crate::rate_limits::CountedVotes::All,
                users: crate::rate_limits::LimitScope::AllUsers,
                consequences: vec![crate::rate_limits::RateLimitConsequence::DenyThisVote],
                message: Some("slow down".to_string()),
            },
        ]));
        let actor = Actor::new("voter", "Voter", 100);

        service
            .perform_vote(Some(&actor), "post", CastVote::base(VoteType::SmallUpvote), VoteOptions::default())
            .await
            .unwrap();
        let reacting = ExtendedVote::reacts(vec![UserVoteOnSingleReaction::new(
            "insightful",
            VoteOnReaction::Created,
            None,
        )]);
        let result = service
            .perform_vote(
                Some(&actor),
                "comment",
                CastVote::with_extended(VoteType::Neutral, reacting),
                VoteOptions::default(),
            )
            .await;
        assert_eq!(result.unwrap_err(), VoteError::RateLimited("slow down".to_string()));
        assert!(repository.load_current_vote_events("comment").await.unwrap().is_empty());
    }
}
