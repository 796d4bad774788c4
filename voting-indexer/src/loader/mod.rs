//! Loader module for the voting indexer ingest.
//!
//! Stores live-vote changes and recomputes the scores of the documents they touch.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use voting_engine::scoring::recalculate_document_scores;
use voting_engine::strategy::RecomputeContext;
use voting_engine::StrategyRegistry;
use voting_repository::{DocumentRepository, VoteRepository};
use voting_shared::types::{DocumentId, UserId, VoteEvent, VoteableDocument};

use crate::errors::IngestError;
use crate::processor::ProcessedVote;

/// Loader that applies live-vote changes and recomputes document scores.
///
/// Changes are stored as they arrive; recomputation happens on [`VoteLoader::flush`],
/// once per touched document.
pub struct VoteLoader {
    votes: Arc<dyn VoteRepository>,
    documents: Arc<dyn DocumentRepository>,
    registry: Arc<StrategyRegistry>,
    context: RecomputeContext,
    scores_output: Option<PathBuf>,
    touched: BTreeSet<DocumentId>,
    /// When each retracted vote was retracted.
    removed_at: HashMap<(DocumentId, UserId), DateTime<Utc>>,
}

impl VoteLoader {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        documents: Arc<dyn DocumentRepository>,
        registry: Arc<StrategyRegistry>,
        context: RecomputeContext,
    ) -> Self {
        Self {
            votes,
            documents,
            registry,
            context,
            scores_output: None,
            touched: BTreeSet::new(),
            removed_at: HashMap::new(),
        }
    }

    /// Appends every recomputed document, one JSON object per line, to `path`.
    pub fn with_scores_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.scores_output = Some(path.into());
        self
    }

    /// Number of documents awaiting recomputation.
    pub fn pending_documents(&self) -> usize {
        self.touched.len()
    }

    /// Stores a batch of live-vote changes.
    ///
    /// A change cast before the live vote or the retraction already stored
    /// for the same user and document is skipped. A vote on a document the
    /// repository does not know yet creates the document from the event's
    /// collection and authors.
    ///
    /// # Returns
    ///
    /// The number of changes applied.
    #[instrument(skip(self, changes), fields(change_count = changes.len()))]
    pub async fn load(&mut self, changes: Vec<ProcessedVote>) -> Result<usize, IngestError> {
        let mut applied = 0;
        for change in changes {
            if self.is_superseded(&change).await? {
                debug!(
                    document_id = %change.document_id(),
                    user_id = %change.user_id(),
                    cast_at = %change.cast_at(),
                    "Skipping vote older than the stored one"
                );
                continue;
            }
            match change {
                ProcessedVote::Upsert(event) => {
                    self.ensure_document(&event).await?;
                    self.removed_at
                        .remove(&(event.document_id.clone(), event.user_id.clone()));
                    self.touched.insert(event.document_id.clone());
                    self.votes.upsert_vote(event).await?;
                }
                ProcessedVote::Remove {
                    document_id,
                    user_id,
                    cast_at,
                } => {
                    if self.votes.remove_vote(&document_id, &user_id).await?.is_none() {
                        debug!(%document_id, %user_id, "No live vote to remove");
                    }
                    self.removed_at
                        .insert((document_id.clone(), user_id), cast_at);
                    self.touched.insert(document_id);
                }
            }
            applied += 1;
        }
        Ok(applied)
    }

    async fn is_superseded(&self, change: &ProcessedVote) -> Result<bool, IngestError> {
        let key = (change.document_id().to_string(), change.user_id().to_string());
        if let Some(removed_at) = self.removed_at.get(&key) {
            if *removed_at > change.cast_at() {
                return Ok(true);
            }
        }
        let stored = self
            .votes
            .get_user_vote(change.document_id(), change.user_id())
            .await?;
        Ok(stored.is_some_and(|stored| stored.cast_at > change.cast_at()))
    }

    /// Recomputes and stores the scores of every touched document.
    ///
    /// # Returns
    ///
    /// The updated documents, ordered by id.
    #[instrument(skip(self), fields(document_count = self.touched.len()))]
    pub async fn flush(&mut self) -> Result<Vec<VoteableDocument>, IngestError> {
        let touched = std::mem::take(&mut self.touched);
        let mut updated = Vec::with_capacity(touched.len());

        for document_id in touched {
            let Some(document) = self.documents.get_document(&document_id).await? else {
                warn!(%document_id, "Votes removed from an unknown document");
                continue;
            };
            let events = self.votes.load_current_vote_events(&document_id).await?;
            let strategy = self.registry.resolve_for_document(&document);
            let scores = recalculate_document_scores(strategy.as_ref(), &events, &self.context);
            updated.push(self.documents.update_scores(&document_id, &scores).await?);
        }

        if let Some(path) = &self.scores_output {
            write_scores(path, &updated).await?;
        }
        info!(document_count = updated.len(), "Recomputed document scores");
        Ok(updated)
    }

    async fn ensure_document(&self, event: &VoteEvent) -> Result<(), IngestError> {
        if self.documents.get_document(&event.document_id).await?.is_some() {
            return Ok(());
        }
        debug!(document_id = %event.document_id, "Creating document from vote event");
        let document = VoteableDocument {
            author_ids: event.author_ids.clone(),
            ..VoteableDocument::new(event.document_id.clone(), event.collection_name.clone())
        };
        self.documents.insert_document(document).await?;
        Ok(())
    }
}

async fn write_scores(path: &Path, documents: &[VoteableDocument]) -> Result<(), IngestError> {
    let mut output = String::new();
    for document in documents {
        let line = json!({
            "documentId": document.id,
            "collectionName": document.collection_name,
            "baseScore": document.base_score,
            "voteCount": document.vote_count,
            "extendedScore": document.extended_score,
        });
        output.push_str(&line.to_string());
        output.push('\n');
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| IngestError::write(format!("{}: {e}", path.display())))?;
    file.write_all(output.as_bytes())
        .await
        .map_err(|e| IngestError::write(format!("{}: {e}", path.display())))?;
    file.flush()
        .await
        .map_err(|e| IngestError::write(format!("{}: {e}", path.display())))
}
