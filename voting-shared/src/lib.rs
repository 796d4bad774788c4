//! # Voting Shared
//! This crate defines shared data structures and types used across the voting engine.
//! It includes common definitions for vote types, vote events, extended votes,
//! aggregate scores and voteable documents.
pub mod types;
