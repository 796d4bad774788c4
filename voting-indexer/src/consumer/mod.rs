//! Consumer module for the voting indexer ingest.
//!
//! Provides the sources vote events are read from.

mod json_lines;

pub use json_lines::JsonLinesConsumer;

use tokio::sync::mpsc;
use voting_shared::types::VoteEvent;

use crate::errors::IngestError;

/// Messages sent from a consumer to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// A batch of vote events, in source order.
    Events(Vec<VoteEvent>),
    /// A record that could not be read; the stream continues.
    Error(String),
    /// The source is exhausted.
    End,
}

/// A source of vote events.
#[async_trait::async_trait]
pub trait Consumer: Send + Sync {
    /// Sends every vote event of the source through `sender`, then `End`.
    async fn run(&self, sender: mpsc::Sender<StreamMessage>) -> Result<(), IngestError>;
}
