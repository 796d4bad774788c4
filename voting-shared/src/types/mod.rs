mod document;
mod extended_vote;
mod score;
mod vote_event;
mod vote_type;

pub use document::{Actor, VoteableDocument};
pub use extended_vote::{CastVote, ExtendedVote, UserVoteOnSingleReaction};
pub use score::{
    AxisTally, BallotScore, DocumentScores, EmojiScore, ExtendedScore, ReactionMap, ReactionsScore,
    TwoAxisScore, UserReactInfo,
};
pub use vote_event::VoteEvent;
pub use vote_type::{VoteOnReaction, VoteType};

pub type UserId = String;
pub type DocumentId = String;
pub type ReactionName = String;
/// A text excerpt a reaction is anchored to.
pub type QuoteLocator = String;
