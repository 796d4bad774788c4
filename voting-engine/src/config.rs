//! Engine configuration: which voting system each collection uses, karma
//! thresholds for reactions and the axes of ballot voting systems.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::power::VotePowerCurve;
use crate::reactions::EMOJI_NAMES;

pub const DEFAULT_VOTING_SYSTEM: &str = "default";

/// Karma needed to use reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactKarmaThresholds {
    /// Needed to place a reaction nobody has used on the document yet.
    pub add_new_react: i64,
    /// Needed to oppose a reaction.
    pub downvote_existing_react: i64,
    /// Needed to add one's name to any reaction.
    pub add_name_to_existing_react: i64,
}

impl Default for ReactKarmaThresholds {
    fn default() -> Self {
        Self {
            add_new_react: 10,
            downvote_existing_react: 20,
            add_name_to_existing_react: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Voting system of documents whose collection has none configured.
    pub default_voting_system: String,
    /// Collection name to voting system name.
    pub collection_voting_systems: HashMap<String, String>,
    pub react_thresholds: ReactKarmaThresholds,
    pub vote_power: VotePowerCurve,
    /// Axes of the `reactsBallot` voting system.
    pub reacts_ballot_axes: Vec<String>,
    /// Axes of the `emojiReactionsBallot` voting system.
    pub emoji_ballot_axes: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_voting_system: DEFAULT_VOTING_SYSTEM.to_string(),
            collection_voting_systems: HashMap::new(),
            react_thresholds: ReactKarmaThresholds::default(),
            vote_power: VotePowerCurve::default(),
            reacts_ballot_axes: ["truth", "aim", "clarity", "seeking"]
                .into_iter()
                .map(String::from)
                .collect(),
            emoji_ballot_axes: EMOJI_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    /// Sets the voting system of a collection.
    pub fn with_collection(mut self, collection_name: impl Into<String>, voting_system: impl Into<String>) -> Self {
        self.collection_voting_systems
            .insert(collection_name.into(), voting_system.into());
        self
    }

    pub fn collection_voting_system(&self, collection_name: &str) -> Option<&str> {
        self.collection_voting_systems
            .get(collection_name)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig = serde_json::from_value(json!({
            "defaultVotingSystem": "twoAxis",
            "collectionVotingSystems": { "Comments": "namesAttachedReactions" },
            "reactThresholds": {
                "addNewReact": 50,
                "downvoteExistingReact": 20,
                "addNameToExistingReact": 5
            }
        }))
        .unwrap();

        assert_eq!(config.default_voting_system, "twoAxis");
        assert_eq!(config.collection_voting_system("Comments"), Some("namesAttachedReactions"));
        assert_eq!(config.collection_voting_system("Posts"), None);
        assert_eq!(config.react_thresholds.add_new_react, 50);
        assert_eq!(config.vote_power, VotePowerCurve::default());
        assert_eq!(config.reacts_ballot_axes, EngineConfig::default().reacts_ballot_axes);
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = EngineConfig::default().with_collection("Posts", "twoAxis");
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["collectionVotingSystems"]["Posts"], "twoAxis");
        assert_eq!(value["reactThresholds"]["addNewReact"], 10);

        let parsed: EngineConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, config);
    }
}
