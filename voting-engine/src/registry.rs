//! Maps voting system names to strategies.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use voting_shared::types::VoteableDocument;

use crate::config::EngineConfig;
use crate::policy::ReactionPolicy;
use crate::strategy::{
    BallotStrategy, DefaultStrategy, EmojiStrategy, NamedReactionsStrategy, TwoAxisStrategy, VotingStrategy,
};

/// `StrategyRegistry` resolves the voting system that applies to a document.
///
/// Resolution never fails: unknown names fall back to the configured default
/// voting system, and to the plain `default` strategy when even that is
/// missing.
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn VotingStrategy>>,
    default_voting_system: String,
    collection_voting_systems: HashMap<String, String>,
    fallback: Arc<dyn VotingStrategy>,
}

impl StrategyRegistry {
    /// Creates a registry holding only the `default` strategy.
    pub fn new() -> Self {
        let fallback: Arc<dyn VotingStrategy> = Arc::new(DefaultStrategy);
        let mut strategies = HashMap::new();
        strategies.insert(fallback.name().to_string(), fallback.clone());
        Self {
            strategies,
            default_voting_system: fallback.name().to_string(),
            collection_voting_systems: HashMap::new(),
            fallback,
        }
    }

    /// Creates a registry with every built-in voting system, configured from `config`.
    pub fn with_builtin(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        let policy = ReactionPolicy::new(config.react_thresholds);
        let curve = &config.vote_power;

        registry.register(Arc::new(TwoAxisStrategy::new(curve.clone())));
        registry.register(Arc::new(NamedReactionsStrategy::names_attached(curve.clone(), policy)));
        registry.register(Arc::new(NamedReactionsStrategy::reactions_and_likes(curve.clone(), policy)));
        registry.register(Arc::new(EmojiStrategy));
        registry.register(Arc::new(BallotStrategy::reacts_ballot(
            config.reacts_ballot_axes.clone(),
            curve.clone(),
        )));
        registry.register(Arc::new(BallotStrategy::emoji_reactions_ballot(
            config.emoji_ballot_axes.clone(),
            curve.clone(),
        )));

        registry.default_voting_system = config.default_voting_system.clone();
        registry.collection_voting_systems = config.collection_voting_systems.clone();
        registry
    }

    /// Registers a strategy under its own name, replacing any previous one.
    ///
    /// # Arguments
    ///
    /// * `strategy` - An `Arc` trait object implementing `VotingStrategy`
    pub fn register(&mut self, strategy: Arc<dyn VotingStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn VotingStrategy>> {
        self.strategies.get(name).cloned()
    }

    /// Resolves a strategy from a document override and a collection default.
    ///
    /// The override wins if it is registered, then the collection default,
    /// then the registry's default voting system.
    pub fn resolve(
        &self,
        document_override: Option<&str>,
        collection_default: Option<&str>,
    ) -> Arc<dyn VotingStrategy> {
        for name in [document_override, collection_default].into_iter().flatten() {
            if let Some(strategy) = self.get(name) {
                return strategy;
            }
            warn!(voting_system = name, "Unregistered voting system, falling back");
        }
        self.get(&self.default_voting_system).unwrap_or_else(|| {
            warn!(
                voting_system = %self.default_voting_system,
                "Unregistered default voting system, using plain voting"
            );
            self.fallback.clone()
        })
    }

    /// Resolves the strategy of a document from its override and its collection.
    pub fn resolve_for_document(&self, document: &VoteableDocument) -> Arc<dyn VotingStrategy> {
        let collection_default = self
            .collection_voting_systems
            .get(&document.collection_name)
            .map(String::as_str);
        self.resolve(document.voting_system.as_deref(), collection_default)
    }

    /// Names of every registered voting system, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
