//! # Voting Engine
//! This crate implements the karma-weighted voting and reaction scoring engine.
//!
//! ## Modules
//!
//! - [`config`]: Engine settings and their defaults
//! - [`reactions`]: The reaction and emoji palettes
//! - [`power`]: Maps voter karma and vote strength to a weight
//! - [`ledger`]: Merges and removes per-user reaction entries, quote normalization
//! - [`strategy`]: The `VotingStrategy` trait and one implementation per voting system
//! - [`registry`]: Resolves which strategy applies to a document
//! - [`policy`]: Karma thresholds gating reactions
//! - [`rate_limits`]: Voting rate limits and their consequences
//! - [`scoring`]: Full recomputation of a document's scores
//! - [`service`]: Server-side vote casting against the repositories
//! - [`controller`]: Client-side optimistic vote orchestration
//! - [`errors`]: Error types for the engine
pub mod config;
pub mod controller;
pub mod errors;
pub mod ledger;
pub mod policy;
pub mod power;
pub mod rate_limits;
pub mod reactions;
pub mod registry;
pub mod scoring;
pub mod service;
pub mod strategy;

pub use config::EngineConfig;
pub use errors::{VoteError, VoteErrorKind};
pub use registry::StrategyRegistry;
pub use strategy::VotingStrategy;
