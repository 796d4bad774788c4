//! Orchestrator module for the voting indexer ingest.
//!
//! Coordinates the consumer, processor, and loader components.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument};
use voting_shared::types::VoteEvent;

use crate::consumer::{Consumer, StreamMessage};
use crate::errors::IngestError;
use crate::loader::VoteLoader;
use crate::processor::VoteProcessor;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
        }
    }
}

/// Totals of one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub events_read: u64,
    pub records_rejected: u64,
    pub votes_changed: u64,
    pub documents_recomputed: u64,
}

/// Orchestrator that coordinates the ingest components.
///
/// The orchestrator:
/// - Runs the consumer in the background
/// - Routes each batch through the processor and the loader
/// - Stops at the end of the source or on a shutdown signal
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    processor: VoteProcessor,
    loader: VoteLoader,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    events_read: AtomicU64,
    records_rejected: AtomicU64,
    votes_changed: AtomicU64,
    documents_recomputed: AtomicU64,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, processor: VoteProcessor, loader: VoteLoader) -> Self {
        Self::with_config(consumer, processor, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        processor: VoteProcessor,
        loader: VoteLoader,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            processor,
            loader,
            config,
            shutdown_tx,
            events_read: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            votes_changed: AtomicU64::new(0),
            documents_recomputed: AtomicU64::new(0),
        }
    }

    /// Run the orchestrator until the source is exhausted or shutdown is requested.
    ///
    /// Malformed records are logged and counted; a failure of the loader or of
    /// the source itself ends the run with an error.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<IngestSummary, IngestError> {
        info!("Starting voting indexer orchestrator");

        let (event_transmitter, mut event_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let consumer = Arc::clone(&self.consumer);
        let consumer_handle = tokio::spawn(async move { consumer.run(event_transmitter).await });

        loop {
            tokio::select! {
                msg = event_receiver.recv() => {
                    match msg {
                        Some(StreamMessage::Events(events)) => {
                            debug!(event_count = events.len(), "Received events from consumer");
                            self.process_events(events).await?;
                        }
                        Some(StreamMessage::Error(e)) => {
                            self.records_rejected.fetch_add(1, Ordering::Relaxed);
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested");
                    consumer_handle.abort();
                    return Ok(self.summary());
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    consumer_handle.abort();
                    return Ok(self.summary());
                }
            }
        }

        match consumer_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "Consumer error");
                return Err(e);
            }
            Err(e) => return Err(IngestError::ChannelError(e.to_string())),
        }

        let summary = self.summary();
        info!(
            events_read = summary.events_read,
            records_rejected = summary.records_rejected,
            votes_changed = summary.votes_changed,
            documents_recomputed = summary.documents_recomputed,
            "Orchestrator run complete"
        );
        Ok(summary)
    }

    async fn process_events(&mut self, events: Vec<VoteEvent>) -> Result<(), IngestError> {
        self.events_read
            .fetch_add(events.len() as u64, Ordering::Relaxed);

        let changes = self.processor.process_batch(events);
        if changes.is_empty() {
            return Ok(());
        }

        let applied = self.loader.load(changes).await?;
        self.votes_changed
            .fetch_add(applied as u64, Ordering::Relaxed);
        let updated = self.loader.flush().await?;
        self.documents_recomputed
            .fetch_add(updated.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Totals so far.
    pub fn summary(&self) -> IngestSummary {
        IngestSummary {
            events_read: self.events_read.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            votes_changed: self.votes_changed.load(Ordering::Relaxed),
            documents_recomputed: self.documents_recomputed.load(Ordering::Relaxed),
        }
    }

    /// Returns a sender that stops [`Orchestrator::run`] when signalled.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}
