//! In-memory implementation of the voting repositories.
//!
//! The locks only make the maps safe to share between tasks. Serializing
//! concurrent writers on a single document is left to the caller.
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use voting_shared::types::{DocumentId, DocumentScores, UserId, VoteEvent, VoteableDocument};

use crate::errors::VoteRepositoryError;
use crate::interfaces::{DocumentRepository, VoteRepository};

/// Stores live vote events keyed by document, then by user, plus documents by id.
#[derive(Default)]
pub struct InMemoryVoteRepository {
    votes: RwLock<HashMap<DocumentId, BTreeMap<UserId, VoteEvent>>>,
    documents: RwLock<HashMap<DocumentId, VoteableDocument>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the given documents.
    pub fn with_documents(documents: impl IntoIterator<Item = VoteableDocument>) -> Self {
        let documents = documents.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            votes: RwLock::new(HashMap::new()),
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait::async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn load_current_vote_events(
        &self,
        document_id: &str,
    ) -> Result<Vec<VoteEvent>, VoteRepositoryError> {
        let votes = self.votes.read().await;
        Ok(votes
            .get(document_id)
            .map(|by_user| by_user.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_user_vote(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Option<VoteEvent>, VoteRepositoryError> {
        let votes = self.votes.read().await;
        Ok(votes.get(document_id).and_then(|by_user| by_user.get(user_id)).cloned())
    }

    async fn upsert_vote(&self, event: VoteEvent) -> Result<Option<VoteEvent>, VoteRepositoryError> {
        let mut votes = self.votes.write().await;
        let superseded = votes
            .entry(event.document_id.clone())
            .or_default()
            .insert(event.user_id.clone(), event);
        if let Some(previous) = &superseded {
            debug!(
                document_id = %previous.document_id,
                user_id = %previous.user_id,
                "Superseded live vote"
            );
        }
        Ok(superseded)
    }

    async fn remove_vote(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Option<VoteEvent>, VoteRepositoryError> {
        let mut votes = self.votes.write().await;
        let Some(by_user) = votes.get_mut(document_id) else {
            return Ok(None);
        };
        let removed = by_user.remove(user_id);
        if by_user.is_empty() {
            votes.remove(document_id);
        }
        Ok(removed)
    }

    async fn votes_by_user_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteEvent>, VoteRepositoryError> {
        let votes = self.votes.read().await;
        Ok(votes
            .values()
            .filter_map(|by_user| by_user.get(user_id))
            .filter(|event| event.cast_at > since)
            .cloned()
            .collect())
    }

    async fn voted_document_ids(&self) -> Result<Vec<DocumentId>, VoteRepositoryError> {
        let votes = self.votes.read().await;
        let mut ids: Vec<DocumentId> = votes.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl DocumentRepository for InMemoryVoteRepository {
    async fn get_document(
        &self,
        document_id: &str,
    ) -> Result<Option<VoteableDocument>, VoteRepositoryError> {
        Ok(self.documents.read().await.get(document_id).cloned())
    }

    async fn insert_document(&self, document: VoteableDocument) -> Result<(), VoteRepositoryError> {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document);
        Ok(())
    }

    async fn update_scores(
        &self,
        document_id: &str,
        scores: &DocumentScores,
    ) -> Result<VoteableDocument, VoteRepositoryError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(document_id)
            .ok_or_else(|| VoteRepositoryError::DocumentNotFound(document_id.to_string()))?;
        document.apply_scores(scores);
        Ok(document.clone())
    }
}
