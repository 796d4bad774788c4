use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use voting_shared::types::{Actor, CastVote, QuoteLocator, VoteOnReaction, VoteType, VoteableDocument};

use crate::controller::{SubmitVoteResponse, VoteState, VoteSubmitter};
use crate::errors::{TransportError, VoteError};
use crate::ledger;
use crate::power::VotePowerCurve;
use crate::strategy::VotingStrategy;

struct ControllerState {
    /// The last document adopted from the server.
    server_document: VoteableDocument,
    /// Shown instead of `server_document` while submissions are in flight.
    optimistic: Option<VoteableDocument>,
    sent_count: u64,
    completed_count: u64,
    /// Sequences submitted and not completed yet.
    in_flight: BTreeSet<u64>,
}

impl ControllerState {
    fn displayed(&self) -> &VoteableDocument {
        self.optimistic.as_ref().unwrap_or(&self.server_document)
    }
}

/// A vote shown optimistically and ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVote {
    /// Position of this submission among the controller's submissions, from 1.
    pub sequence: u64,
    pub document_id: String,
    /// The vote to submit, after toggling and carrying over the current payload.
    pub vote: CastVote,
    /// The document as displayed while the vote is in flight.
    pub document: VoteableDocument,
}

/// What a completed submission left on display.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteReceipt {
    pub document: VoteableDocument,
    pub warn_flag: bool,
    /// False when a newer submission was still in flight and the answer was ignored.
    pub adopted: bool,
}

/// `OptimisticVoteController` drives the votes of one actor on one document.
///
/// The counters live behind a mutex shared by clones of the controller, so
/// several submissions can be in flight at once. The lock is never held while
/// a submission is awaited.
#[derive(Clone)]
pub struct OptimisticVoteController {
    strategy: Arc<dyn VotingStrategy>,
    vote_power: VotePowerCurve,
    submitter: Arc<dyn VoteSubmitter>,
    state: Arc<Mutex<ControllerState>>,
}

impl OptimisticVoteController {
    pub fn new(
        document: VoteableDocument,
        strategy: Arc<dyn VotingStrategy>,
        vote_power: VotePowerCurve,
        submitter: Arc<dyn VoteSubmitter>,
    ) -> Self {
        Self {
            strategy,
            vote_power,
            submitter,
            state: Arc::new(Mutex::new(ControllerState {
                server_document: document,
                optimistic: None,
                sent_count: 0,
                completed_count: 0,
                in_flight: BTreeSet::new(),
            })),
        }
    }

    /// The document as currently displayed.
    pub async fn document(&self) -> VoteableDocument {
        self.state.lock().await.displayed().clone()
    }

    pub async fn state(&self) -> VoteState {
        let state = self.state.lock().await;
        match state.in_flight.len() as u64 {
            0 => VoteState::Idle,
            in_flight => VoteState::Pending { in_flight },
        }
    }

    /// Casts a vote: shows it, submits it and reconciles the answer.
    ///
    /// # Errors
    ///
    /// `UnauthenticatedActor` and `PermissionDenied` leave the display
    /// untouched. `TransportFailure` reverts the display to the last document
    /// adopted from the server.
    pub async fn cast_vote(&self, actor: Option<&Actor>, vote: CastVote) -> Result<VoteReceipt, VoteError> {
        let pending = self.begin_vote(actor, vote).await?;
        let result = self
            .submitter
            .submit_vote(&pending.document_id, pending.vote.vote_type, pending.vote.extended.clone())
            .await;
        self.complete_vote(&pending, result).await
    }

    /// Sets the actor's vote on a named reaction, or clears it with `None`,
    /// keeping the rest of their vote.
    pub async fn set_reaction(
        &self,
        actor: Option<&Actor>,
        name: &str,
        vote: Option<VoteOnReaction>,
        quote: Option<&str>,
    ) -> Result<VoteReceipt, VoteError> {
        let displayed = self.document().await;
        let current = displayed.current_user_extended_vote.as_ref();
        let extended = match vote {
            Some(vote) => ledger::with_reaction(current, name, vote, quote),
            None => ledger::without_reaction(current, name, quote),
        };
        let vote_type = VoteType::or_neutral(displayed.current_user_vote);
        self.cast_vote(actor, CastVote::with_extended(vote_type, extended))
            .await
    }

    /// Adds the actor's name to a reaction, or removes it if already there.
    ///
    /// The actor is recorded as seconding the reaction when someone else
    /// already supports it at `quote`, and as creating it otherwise.
    pub async fn toggle_reaction(
        &self,
        actor: Option<&Actor>,
        name: &str,
        quote: Option<QuoteLocator>,
    ) -> Result<VoteReceipt, VoteError> {
        let actor = actor.ok_or(VoteError::UnauthenticatedActor)?;
        let displayed = self.document().await;
        let quote = quote.as_deref();
        let vote = match ledger::current_reaction(displayed.current_user_extended_vote.as_ref(), name, quote) {
            Some(_) => None,
            None => {
                let seconded = displayed
                    .extended_score
                    .reacts()
                    .is_some_and(|reacts| ledger::is_used_by_others(reacts, &actor.id, name, quote));
                Some(if seconded {
                    VoteOnReaction::Seconded
                } else {
                    VoteOnReaction::Created
                })
            }
        };
        self.set_reaction(Some(actor), name, vote, quote).await
    }

    /// Shows a vote optimistically and counts it as sent.
    ///
    /// Repeating the current base vote without an extended payload toggles
    /// the base vote off. A base vote without an extended payload keeps the
    /// actor's current extended vote.
    pub async fn begin_vote(&self, actor: Option<&Actor>, vote: CastVote) -> Result<PendingVote, VoteError> {
        let actor = actor.ok_or(VoteError::UnauthenticatedActor)?;
        let mut state = self.state.lock().await;
        let displayed = state.displayed().clone();
        let prior = CastVote {
            vote_type: VoteType::or_neutral(displayed.current_user_vote),
            extended: displayed.current_user_extended_vote.clone(),
        };
        let vote = match vote.extended {
            Some(_) => vote,
            None if vote.vote_type == prior.vote_type => CastVote {
                vote_type: VoteType::Neutral,
                extended: prior.extended.clone(),
            },
            None => CastVote {
                vote_type: vote.vote_type,
                extended: prior.extended.clone(),
            },
        };

        if !vote.is_retraction() && vote.extended.is_some() {
            self.strategy.is_extended_vote_permitted(
                actor,
                &displayed,
                &displayed.extended_score,
                vote.extended.as_ref(),
                false,
            )?;
        }

        let document = self.preview(&displayed, &prior, &vote, actor);
        state.sent_count += 1;
        let sequence = state.sent_count;
        state.in_flight.insert(sequence);
        state.optimistic = Some(document.clone());
        debug!(
            document_id = %displayed.id,
            sequence,
            vote_type = ?vote.vote_type,
            "Vote shown optimistically"
        );
        Ok(PendingVote {
            sequence,
            document_id: displayed.id,
            vote,
            document,
        })
    }

    /// Reconciles the answer to a submission started by [`Self::begin_vote`].
    ///
    /// A successful answer is adopted only when no other submission is in
    /// flight. A failure reverts the display to the last adopted document.
    /// Completing the same submission again changes nothing.
    pub async fn complete_vote(
        &self,
        pending: &PendingVote,
        result: Result<SubmitVoteResponse, TransportError>,
    ) -> Result<VoteReceipt, VoteError> {
        let mut state = self.state.lock().await;
        if !state.in_flight.remove(&pending.sequence) {
            debug!(
                document_id = %pending.document_id,
                sequence = pending.sequence,
                "Submission already completed"
            );
            return match result {
                Ok(response) => Ok(VoteReceipt {
                    document: state.displayed().clone(),
                    warn_flag: response.warn_flag,
                    adopted: false,
                }),
                Err(error) => Err(VoteError::TransportFailure(error)),
            };
        }
        state.completed_count += 1;
        match result {
            Ok(response) => {
                let adopted = state.completed_count == state.sent_count;
                if adopted {
                    state.server_document = response.document;
                    state.optimistic = None;
                } else {
                    debug!(
                        document_id = %pending.document_id,
                        sequence = pending.sequence,
                        "Ignoring answer to a superseded vote"
                    );
                }
                Ok(VoteReceipt {
                    document: state.displayed().clone(),
                    warn_flag: response.warn_flag,
                    adopted,
                })
            }
            Err(error) => {
                warn!(
                    document_id = %pending.document_id,
                    sequence = pending.sequence,
                    "Vote submission failed: {}",
                    error
                );
                state.optimistic = None;
                Err(VoteError::TransportFailure(error))
            }
        }
    }

    /// `displayed` with `prior` withdrawn and `vote` cast by `actor`.
    fn preview(&self, displayed: &VoteableDocument, prior: &CastVote, vote: &CastVote, actor: &Actor) -> VoteableDocument {
        let counted = |cast: &CastVote| i64::from(!cast.is_retraction());
        let rolled_back = self
            .strategy
            .rollback_vote_optimistic(&displayed.extended_score, prior, actor);
        let mut document = displayed.clone();
        document.extended_score = self.strategy.apply_vote_optimistic(&rolled_back, vote, actor);
        document.base_score += self.vote_power.power(actor.karma, vote.vote_type)
            - self.vote_power.power(actor.karma, prior.vote_type);
        document.vote_count += counted(vote) - counted(prior);
        if vote.is_retraction() {
            document.current_user_vote = None;
            document.current_user_extended_vote = None;
        } else {
            document.current_user_vote = Some(vote.vote_type);
            document.current_user_extended_vote = vote.extended.clone();
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::errors::{VoteDenial, VoteErrorKind};
    use crate::registry::StrategyRegistry;
    use crate::service::{ServiceSubmitter, VoteService};
    use voting_repository::{InMemoryVoteRepository, VoteRepository};
    use voting_shared::types::{ExtendedScore, ExtendedVote, TwoAxisScore, UserVoteOnSingleReaction};

    struct OfflineSubmitter;

    #[async_trait::async_trait]
    impl VoteSubmitter for OfflineSubmitter {
        async fn submit_vote(
            &self,
            _document_id: &str,
            _vote_type: VoteType,
            _extended: Option<ExtendedVote>,
        ) -> Result<SubmitVoteResponse, TransportError> {
            Err(TransportError::new("offline"))
        }
    }

    fn comment() -> VoteableDocument {
        VoteableDocument {
            author_ids: vec!["author".to_string()],
            ..VoteableDocument::new("comment", "Comments")
        }
    }

    fn offline_controller(system: &str) -> OptimisticVoteController {
        let registry = StrategyRegistry::with_builtin(&EngineConfig::default());
        OptimisticVoteController::new(
            comment(),
            registry.resolve(Some(system), None),
            VotePowerCurve::default(),
            Arc::new(OfflineSubmitter),
        )
    }

    fn server_answer(base_score: i64) -> SubmitVoteResponse {
        SubmitVoteResponse {
            document: VoteableDocument {
                base_score,
                ..comment()
            },
            warn_flag: false,
        }
    }

    async fn in_process(actor: &Actor) -> (OptimisticVoteController, Arc<InMemoryVoteRepository>) {
        let config = EngineConfig::default().with_collection("Comments", "namesAttachedReactions");
        let registry = Arc::new(StrategyRegistry::with_builtin(&config));
        let repository = Arc::new(InMemoryVoteRepository::with_documents([comment()]));
        let service = Arc::new(VoteService::new(
            repository.clone(),
            repository.clone(),
            registry.clone(),
            &config,
        ));
        let controller = OptimisticVoteController::new(
            comment(),
            registry.resolve_for_document(&comment()),
            config.vote_power.clone(),
            Arc::new(ServiceSubmitter::new(service, actor.clone())),
        );
        (controller, repository)
    }

    #[tokio::test]
    async fn test_unauthenticated_vote_is_discarded() {
        let controller = offline_controller("twoAxis");
        let result = controller.cast_vote(None, CastVote::base(VoteType::SmallUpvote)).await;
        assert_eq!(result.unwrap_err().kind(), VoteErrorKind::UnauthenticatedActor);
        assert_eq!(controller.state().await, VoteState::Idle);
        assert_eq!(controller.document().await, comment());
    }

    #[tokio::test]
    async fn test_denied_vote_changes_nothing() {
        let controller = offline_controller("namesAttachedReactions");
        let author = Actor::new("author", "Author", 5000);
        let opposing = ExtendedVote::reacts(vec![UserVoteOnSingleReaction::new(
            "crux",
            VoteOnReaction::Disagreed,
            None,
        )]);

        let result = controller
            .begin_vote(Some(&author), CastVote::with_extended(VoteType::Neutral, opposing))
            .await;

        assert_eq!(result.unwrap_err(), VoteError::PermissionDenied(VoteDenial::SelfOpposition));
        assert_eq!(controller.state().await, VoteState::Idle);
        assert_eq!(controller.document().await, comment());
    }

    #[tokio::test]
    async fn test_only_latest_answer_is_adopted() {
        let controller = offline_controller("twoAxis");
        let actor = Actor::new("voter", "Voter", 1000);

        let first = controller
            .begin_vote(Some(&actor), CastVote::base(VoteType::SmallUpvote))
            .await
            .unwrap();
        let second = controller
            .begin_vote(Some(&actor), CastVote::base(VoteType::BigUpvote))
            .await
            .unwrap();
        assert_eq!(second.document.base_score, 6);
        assert_eq!(controller.state().await, VoteState::Pending { in_flight: 2 });

        let stale = controller.complete_vote(&first, Ok(server_answer(2))).await.unwrap();
        assert!(!stale.adopted);
        assert_eq!(stale.document, second.document);

        let latest = controller.complete_vote(&second, Ok(server_answer(6))).await.unwrap();
        assert!(latest.adopted);
        assert_eq!(latest.document.base_score, 6);
        assert_eq!(latest.document.current_user_vote, None);
        assert_eq!(controller.state().await, VoteState::Idle);
    }

    #[tokio::test]
    async fn test_completing_twice_is_ignored() {
        let controller = offline_controller("twoAxis");
        let actor = Actor::new("voter", "Voter", 1000);

        let first = controller
            .begin_vote(Some(&actor), CastVote::base(VoteType::SmallUpvote))
            .await
            .unwrap();
        controller.complete_vote(&first, Ok(server_answer(2))).await.unwrap();
        let repeated = controller.complete_vote(&first, Ok(server_answer(2))).await.unwrap();
        assert!(!repeated.adopted);
        assert_eq!(controller.state().await, VoteState::Idle);

        let second = controller
            .begin_vote(Some(&actor), CastVote::base(VoteType::BigUpvote))
            .await
            .unwrap();
        assert_eq!(controller.state().await, VoteState::Pending { in_flight: 1 });
        let latest = controller.complete_vote(&second, Ok(server_answer(6))).await.unwrap();
        assert!(latest.adopted);
        assert_eq!(latest.document.base_score, 6);
    }

    #[tokio::test]
    async fn test_failure_reverts_to_server_document() {
        let controller = offline_controller("twoAxis");
        let actor = Actor::new("voter", "Voter", 10);

        let result = controller
            .cast_vote(Some(&actor), CastVote::base(VoteType::SmallUpvote))
            .await;

        assert_eq!(result.unwrap_err().kind(), VoteErrorKind::TransportFailure);
        assert_eq!(controller.document().await, comment());
        assert_eq!(controller.state().await, VoteState::Idle);
    }

    #[tokio::test]
    async fn test_repeating_base_vote_toggles_it_off() {
        let controller = offline_controller("twoAxis");
        let actor = Actor::new("voter", "Voter", 10);

        let up = controller
            .begin_vote(Some(&actor), CastVote::base(VoteType::SmallUpvote))
            .await
            .unwrap();
        assert_eq!(up.document.base_score, 1);
        assert_eq!(up.document.vote_count, 1);

        let off = controller
            .begin_vote(Some(&actor), CastVote::base(VoteType::SmallUpvote))
            .await
            .unwrap();
        assert!(off.vote.is_retraction());
        assert_eq!(off.document.base_score, 0);
        assert_eq!(off.document.vote_count, 0);
        assert_eq!(off.document.current_user_vote, None);
        assert_eq!(off.document.extended_score, ExtendedScore::TwoAxis(TwoAxisScore::default()));
    }

    #[tokio::test]
    async fn test_vote_round_trip_through_service() {
        let actor = Actor::new("voter", "Voter", 1000);
        let (controller, repository) = in_process(&actor).await;

        let receipt = controller
            .cast_vote(Some(&actor), CastVote::base(VoteType::SmallUpvote))
            .await
            .unwrap();

        assert!(receipt.adopted);
        assert_eq!(receipt.document.base_score, 2);
        assert_eq!(receipt.document.current_user_vote, Some(VoteType::SmallUpvote));
        assert_eq!(repository.load_current_vote_events("comment").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_reaction_adds_then_removes() {
        let actor = Actor::new("voter", "Voter", 50);
        let (controller, repository) = in_process(&actor).await;

        let added = controller
            .toggle_reaction(Some(&actor), "typo", Some("teh".to_string()))
            .await
            .unwrap();
        let reacts = added.document.extended_score.reacts().unwrap();
        assert_eq!(reacts["typo"][0].react_type, VoteOnReaction::Created);
        assert_eq!(reacts["typo"][0].quote(), Some("teh"));

        let removed = controller
            .toggle_reaction(Some(&actor), "typo", Some("teh".to_string()))
            .await
            .unwrap();
        assert!(removed.document.extended_score.reacts().unwrap().is_empty());
        assert!(repository.load_current_vote_events("comment").await.unwrap().is_empty());
    }
}
