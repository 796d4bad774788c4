//! Configuration module for the voting indexer.
//! Reads settings from the environment and wires up the ingest components.
mod dependencies;

pub use dependencies::{engine_config_from_env, parse_collection_voting_systems, Dependencies};
