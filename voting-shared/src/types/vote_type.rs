use serde::{Deserialize, Serialize};

/// Represents the strength and direction of a base vote cast by a user.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum VoteType {
    /// No vote, or the retraction of a previous vote.
    #[default]
    Neutral,
    /// A normal upvote.
    SmallUpvote,
    /// A strong upvote (press-and-hold / double-tap).
    BigUpvote,
    /// A normal downvote.
    SmallDownvote,
    /// A strong downvote.
    BigDownvote,
}

impl VoteType {
    /// All vote types, neutral first.
    pub const ALL: [VoteType; 5] = [
        VoteType::Neutral,
        VoteType::SmallUpvote,
        VoteType::BigUpvote,
        VoteType::SmallDownvote,
        VoteType::BigDownvote,
    ];

    pub fn is_neutral(self) -> bool {
        self == VoteType::Neutral
    }

    pub fn is_upvote(self) -> bool {
        matches!(self, VoteType::SmallUpvote | VoteType::BigUpvote)
    }

    pub fn is_downvote(self) -> bool {
        matches!(self, VoteType::SmallDownvote | VoteType::BigDownvote)
    }

    pub fn is_strong(self) -> bool {
        matches!(self, VoteType::BigUpvote | VoteType::BigDownvote)
    }

    /// Treats a missing vote type the same as an explicit neutral vote.
    pub fn or_neutral(vote_type: Option<VoteType>) -> VoteType {
        vote_type.unwrap_or_default()
    }
}

/// How a user relates to a named reaction on a document.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum VoteOnReaction {
    /// The user placed this reaction first.
    Created,
    /// The user added their name to an existing reaction.
    Seconded,
    /// The user opposes the reaction ("anti-react").
    Disagreed,
}

impl VoteOnReaction {
    /// Contribution of this entry to a reaction's displayed net count.
    pub fn net_weight(self) -> i64 {
        match self {
            VoteOnReaction::Created | VoteOnReaction::Seconded => 1,
            VoteOnReaction::Disagreed => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_type_serializes_camel_case() {
        let json = serde_json::to_string(&VoteType::BigDownvote).unwrap();
        assert_eq!(json, "\"bigDownvote\"");
        let parsed: VoteType = serde_json::from_str("\"smallUpvote\"").unwrap();
        assert_eq!(parsed, VoteType::SmallUpvote);
    }

    #[test]
    fn test_vote_type_classification() {
        assert!(VoteType::Neutral.is_neutral());
        assert!(VoteType::BigUpvote.is_upvote() && VoteType::BigUpvote.is_strong());
        assert!(VoteType::SmallDownvote.is_downvote() && !VoteType::SmallDownvote.is_strong());
        assert_eq!(VoteType::or_neutral(None), VoteType::Neutral);
    }

    #[test]
    fn test_reaction_net_weight() {
        assert_eq!(VoteOnReaction::Created.net_weight(), 1);
        assert_eq!(VoteOnReaction::Seconded.net_weight(), 1);
        assert_eq!(VoteOnReaction::Disagreed.net_weight(), -1);
    }
}
