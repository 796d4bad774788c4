//! Processor module for the voting indexer ingest.
//!
//! Reduces vote events to changes of the live vote set.

mod vote_processor;

pub use vote_processor::{ProcessedVote, VoteProcessor};
