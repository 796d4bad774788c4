//! Dependency initialization and wiring for the voting indexer.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use tracing::info;
use voting_engine::config::{ReactKarmaThresholds, DEFAULT_VOTING_SYSTEM};
use voting_engine::ledger::VoterInfo;
use voting_engine::strategy::RecomputeContext;
use voting_engine::{EngineConfig, StrategyRegistry};
use voting_repository::InMemoryVoteRepository;

use crate::consumer::JsonLinesConsumer;
use crate::loader::VoteLoader;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::processor::VoteProcessor;
use crate::IndexingError;

/// Default number of vote events per batch.
const DEFAULT_BATCH_SIZE: usize = 500;

/// Default size of the consumer channel.
const DEFAULT_CHANNEL_BUFFER_SIZE: usize = 1000;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// The store holding live votes and recomputed documents.
    pub repository: Arc<InMemoryVoteRepository>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VOTE_EVENTS_PATH`: JSON-lines file of vote events (required)
    /// - `VOTERS_PATH`: JSON array of voters with karma and display names
    /// - `SCORES_OUTPUT_PATH`: File recomputed scores are appended to
    /// - `BATCH_SIZE`: Vote events per batch (default: 500)
    /// - `CHANNEL_BUFFER_SIZE`: Consumer channel size (default: 1000)
    /// - Engine settings, see [`engine_config_from_env`]
    pub async fn new() -> Result<Self, IndexingError> {
        let events_path = env::var("VOTE_EVENTS_PATH")
            .map_err(|_| IndexingError::config("VOTE_EVENTS_PATH must be set"))?;
        let voters_path = env::var("VOTERS_PATH").ok();
        let scores_output = env::var("SCORES_OUTPUT_PATH").ok();
        let batch_size = env_or("BATCH_SIZE", DEFAULT_BATCH_SIZE);
        let channel_buffer_size = env_or("CHANNEL_BUFFER_SIZE", DEFAULT_CHANNEL_BUFFER_SIZE);
        let engine_config = engine_config_from_env()?;

        info!(
            events_path = %events_path,
            voters_path = ?voters_path,
            scores_output = ?scores_output,
            batch_size,
            default_voting_system = %engine_config.default_voting_system,
            "Initializing dependencies"
        );

        let voters = match &voters_path {
            Some(path) => load_voters(path).await?,
            None => Vec::new(),
        };
        info!(voter_count = voters.len(), "Loaded voters");

        let repository = Arc::new(InMemoryVoteRepository::new());
        let registry = Arc::new(StrategyRegistry::with_builtin(&engine_config));

        let consumer = JsonLinesConsumer::new(events_path).with_batch_size(batch_size);
        let mut loader = VoteLoader::new(
            repository.clone(),
            repository.clone(),
            registry,
            RecomputeContext::new(voters),
        );
        if let Some(path) = scores_output {
            loader = loader.with_scores_output(path);
        }

        let orchestrator = Orchestrator::with_config(
            Arc::new(consumer),
            VoteProcessor::new(),
            loader,
            OrchestratorConfig { channel_buffer_size },
        );

        Ok(Dependencies {
            orchestrator,
            repository,
        })
    }
}

/// Reads the engine settings from the environment.
///
/// # Environment Variables
///
/// - `DEFAULT_VOTING_SYSTEM`: Voting system of unconfigured collections (default: "default")
/// - `COLLECTION_VOTING_SYSTEMS`: Comma-separated `Collection=votingSystem` pairs
/// - `ADD_NEW_REACT_KARMA_THRESHOLD` (default: 10)
/// - `DOWNVOTE_EXISTING_REACT_KARMA_THRESHOLD` (default: 20)
/// - `ADD_NAME_TO_EXISTING_REACT_KARMA_THRESHOLD` (default: 5)
pub fn engine_config_from_env() -> Result<EngineConfig, IndexingError> {
    let defaults = ReactKarmaThresholds::default();
    let react_thresholds = ReactKarmaThresholds {
        add_new_react: env_or("ADD_NEW_REACT_KARMA_THRESHOLD", defaults.add_new_react),
        downvote_existing_react: env_or(
            "DOWNVOTE_EXISTING_REACT_KARMA_THRESHOLD",
            defaults.downvote_existing_react,
        ),
        add_name_to_existing_react: env_or(
            "ADD_NAME_TO_EXISTING_REACT_KARMA_THRESHOLD",
            defaults.add_name_to_existing_react,
        ),
    };
    let collection_voting_systems = match env::var("COLLECTION_VOTING_SYSTEMS") {
        Ok(value) => parse_collection_voting_systems(&value)?,
        Err(_) => HashMap::new(),
    };

    Ok(EngineConfig {
        default_voting_system: env::var("DEFAULT_VOTING_SYSTEM")
            .unwrap_or_else(|_| DEFAULT_VOTING_SYSTEM.to_string()),
        collection_voting_systems,
        react_thresholds,
        ..EngineConfig::default()
    })
}

/// Parses `Comments=namesAttachedReactions,Posts=twoAxis` into a map.
pub fn parse_collection_voting_systems(value: &str) -> Result<HashMap<String, String>, IndexingError> {
    let mut systems = HashMap::new();
    for pair in value.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let Some((collection, system)) = pair.split_once('=') else {
            return Err(IndexingError::config(format!(
                "Invalid COLLECTION_VOTING_SYSTEMS entry: {pair}"
            )));
        };
        let (collection, system) = (collection.trim(), system.trim());
        if collection.is_empty() || system.is_empty() {
            return Err(IndexingError::config(format!(
                "Invalid COLLECTION_VOTING_SYSTEMS entry: {pair}"
            )));
        }
        systems.insert(collection.to_string(), system.to_string());
    }
    Ok(systems)
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

async fn load_voters(path: &str) -> Result<Vec<VoterInfo>, IndexingError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| IndexingError::config(format!("Failed to read VOTERS_PATH {path}: {e}")))?;
    serde_json::from_str(&contents)
        .map_err(|e| IndexingError::config(format!("Failed to parse VOTERS_PATH {path}: {e}")))
}
