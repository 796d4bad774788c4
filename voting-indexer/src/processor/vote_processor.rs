use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use voting_shared::types::{CastVote, DocumentId, UserId, VoteEvent};

/// A change to the live vote set.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedVote {
    /// The event becomes the user's live vote on its document.
    Upsert(VoteEvent),
    /// The user's live vote on the document is retracted.
    Remove {
        document_id: DocumentId,
        user_id: UserId,
        cast_at: DateTime<Utc>,
    },
}

impl ProcessedVote {
    pub fn document_id(&self) -> &str {
        match self {
            ProcessedVote::Upsert(event) => &event.document_id,
            ProcessedVote::Remove { document_id, .. } => document_id,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            ProcessedVote::Upsert(event) => &event.user_id,
            ProcessedVote::Remove { user_id, .. } => user_id,
        }
    }

    /// When the change was cast.
    pub fn cast_at(&self) -> DateTime<Utc> {
        match self {
            ProcessedVote::Upsert(event) => event.cast_at,
            ProcessedVote::Remove { cast_at, .. } => *cast_at,
        }
    }
}

/// Keeps the latest vote of each user on each document.
#[derive(Debug, Default)]
pub struct VoteProcessor;

impl VoteProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Reduces a batch of vote events to one change per (user, document).
    ///
    /// The event with the latest `cast_at` wins; among events cast at the same
    /// instant, the last one in the batch wins. A neutral vote with a blank
    /// extended payload becomes a removal. Changes are ordered by document,
    /// then user.
    pub fn process_batch(&self, events: Vec<VoteEvent>) -> Vec<ProcessedVote> {
        let event_count = events.len();
        let mut latest: HashMap<(DocumentId, UserId), VoteEvent> = HashMap::new();
        for event in events {
            let key = (event.document_id.clone(), event.user_id.clone());
            let superseded = latest
                .get(&key)
                .is_some_and(|current| current.cast_at > event.cast_at);
            if !superseded {
                latest.insert(key, event);
            }
        }

        let mut changes: Vec<ProcessedVote> = latest
            .into_values()
            .map(|event| {
                let cast = CastVote {
                    vote_type: event.vote_type_or_neutral(),
                    extended: event.extended_vote.clone(),
                };
                if cast.is_retraction() {
                    ProcessedVote::Remove {
                        document_id: event.document_id,
                        user_id: event.user_id,
                        cast_at: event.cast_at,
                    }
                } else {
                    ProcessedVote::Upsert(event)
                }
            })
            .collect();
        changes.sort_by(|a, b| {
            a.document_id()
                .cmp(b.document_id())
                .then_with(|| a.user_id().cmp(b.user_id()))
        });

        debug!(event_count, change_count = changes.len(), "Processed vote events");
        changes
    }
}
