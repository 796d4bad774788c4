use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use voting_shared::types::VoteEvent;

use crate::consumer::{Consumer, StreamMessage};
use crate::errors::IngestError;

/// Default number of vote events per batch.
const DEFAULT_BATCH_SIZE: usize = 500;

/// Reads vote events from a file holding one JSON object per line.
///
/// Blank lines are skipped. Lines that are not a valid vote event are reported
/// as [`StreamMessage::Error`] and do not stop the stream.
pub struct JsonLinesConsumer {
    path: PathBuf,
    batch_size: usize,
}

impl JsonLinesConsumer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    async fn send(sender: &mpsc::Sender<StreamMessage>, message: StreamMessage) -> Result<(), IngestError> {
        sender
            .send(message)
            .await
            .map_err(|e| IngestError::ChannelError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Consumer for JsonLinesConsumer {
    async fn run(&self, sender: mpsc::Sender<StreamMessage>) -> Result<(), IngestError> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| IngestError::read(format!("{}: {}", self.path.display(), e)))?;
        info!(path = %self.path.display(), "Reading vote events");

        let mut lines = BufReader::new(file).lines();
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut line_number = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<VoteEvent>(&line) {
                Ok(event) => batch.push(event),
                Err(e) => {
                    warn!(line = line_number, error = %e, "Skipping malformed vote event");
                    Self::send(&sender, StreamMessage::Error(format!("line {line_number}: {e}"))).await?;
                }
            }
            if batch.len() >= self.batch_size {
                debug!(count = batch.len(), "Sending batch of vote events");
                Self::send(&sender, StreamMessage::Events(std::mem::take(&mut batch))).await?;
            }
        }

        if !batch.is_empty() {
            Self::send(&sender, StreamMessage::Events(batch)).await?;
        }
        Self::send(&sender, StreamMessage::End).await
    }
}
