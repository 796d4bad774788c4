//! # Voting Repository
//! This crate provides traits and implementations for interacting with the
//! vote-event source and the document score cache. It includes definitions
//! for errors, interfaces, and an in-memory implementation.
pub mod errors;
pub mod interfaces;
pub mod memory;

pub use errors::VoteRepositoryError;
pub use interfaces::{DocumentRepository, VoteRepository};
pub use memory::InMemoryVoteRepository;
