//! This module defines the `VoteRepository` and `DocumentRepository` traits,
//! which provide an interface to the live vote events and to the cached
//! scores of voteable documents.
use chrono::{DateTime, Utc};
use voting_shared::types::{DocumentId, DocumentScores, VoteEvent, VoteableDocument};

use crate::errors::VoteRepositoryError;

/// A trait that defines the interface for interacting with live vote events.
///
/// Implementors keep at most one live event per (user, document): storing a
/// new event for the same pair supersedes the previous one.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Loads every live vote event on a document.
    ///
    /// This is the authoritative input of aggregate recomputation.
    async fn load_current_vote_events(
        &self,
        document_id: &str,
    ) -> Result<Vec<VoteEvent>, VoteRepositoryError>;

    /// Returns the user's live vote on a document, if any.
    async fn get_user_vote(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Option<VoteEvent>, VoteRepositoryError>;

    /// Stores a vote event, superseding the user's previous vote on the same document.
    ///
    /// # Returns
    ///
    /// The superseded event, if there was one.
    async fn upsert_vote(&self, event: VoteEvent) -> Result<Option<VoteEvent>, VoteRepositoryError>;

    /// Removes the user's live vote on a document.
    ///
    /// # Returns
    ///
    /// The removed event, if there was one.
    async fn remove_vote(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Option<VoteEvent>, VoteRepositoryError>;

    /// Lists the user's live votes cast after `since`, across all documents.
    ///
    /// Used by voting rate limits.
    async fn votes_by_user_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteEvent>, VoteRepositoryError>;

    /// Lists every document that has at least one live vote.
    async fn voted_document_ids(&self) -> Result<Vec<DocumentId>, VoteRepositoryError>;
}

/// A trait for reading voteable documents and writing their recomputed scores.
#[async_trait::async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn get_document(
        &self,
        document_id: &str,
    ) -> Result<Option<VoteableDocument>, VoteRepositoryError>;

    async fn insert_document(&self, document: VoteableDocument) -> Result<(), VoteRepositoryError>;

    /// Persists freshly recomputed scores on a document.
    ///
    /// # Returns
    ///
    /// The updated document, or `DocumentNotFound`.
    async fn update_scores(
        &self,
        document_id: &str,
        scores: &DocumentScores,
    ) -> Result<VoteableDocument, VoteRepositoryError>;
}
