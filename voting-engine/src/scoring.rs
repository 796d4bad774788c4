//! Full recomputation of a document's scores from its live vote events.
use tracing::debug;
use voting_shared::types::{DocumentScores, VoteEvent};

use crate::strategy::{RecomputeContext, VotingStrategy};

/// Recomputes every cached score of a document from its live vote events.
///
/// # Arguments
///
/// * `strategy` - The document's voting system
/// * `events` - Every live vote event on the document
/// * `context` - Voter names and karma for the extended score
///
/// # Returns
///
/// The base score (sum of vote power), the number of votes with any effect,
/// the number of nonblank votes and the extended score.
pub fn recalculate_document_scores(
    strategy: &dyn VotingStrategy,
    events: &[VoteEvent],
    context: &RecomputeContext,
) -> DocumentScores {
    let scores = DocumentScores {
        base_score: events.iter().map(|event| event.power).sum(),
        vote_count: events
            .iter()
            .filter(|event| strategy.vote_has_any_effect(event))
            .count() as i64,
        nonblank_vote_count: events
            .iter()
            .filter(|event| strategy.is_vote_event_nonblank(event))
            .count() as i64,
        extended_score: strategy.recompute_aggregate(events, context),
    };
    debug!(
        voting_system = strategy.name(),
        events = events.len(),
        base_score = scores.base_score,
        vote_count = scores.vote_count,
        "Recomputed document scores"
    );
    scores
}
