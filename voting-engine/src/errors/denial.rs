//! Reasons an extended vote can be refused by a voting system's permission check.
use thiserror::Error;

/// Why a proposed extended vote was denied.
///
/// Each variant carries its own message so the actor can be told whether the
/// reaction doesn't exist or whether they lack the karma to use it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteDenial {
    #[error("You can't antireact to your own content")]
    SelfOpposition,

    #[error("You need at least {required} karma to antireact")]
    InsufficientKarmaToOppose { required: i64 },

    #[error("You need at least {required} karma to react")]
    InsufficientKarmaToReact { required: i64 },

    #[error("You need at least {required} karma to use a reaction that hasn't been used here yet")]
    InsufficientKarmaForNewReaction { required: i64 },

    #[error("Unrecognized reaction type: {0}")]
    UnrecognizedReactionType(String),

    #[error("Unrecognized emoji: {0}")]
    UnrecognizedEmoji(String),

    #[error("Unrecognized voting axis: {0}")]
    UnrecognizedAxis(String),
}

impl VoteDenial {
    /// Whether the denial is about the vote's content rather than the actor's karma.
    pub fn is_unrecognized_type(&self) -> bool {
        matches!(
            self,
            VoteDenial::UnrecognizedReactionType(_)
                | VoteDenial::UnrecognizedEmoji(_)
                | VoteDenial::UnrecognizedAxis(_)
        )
    }
}
