mod denial;
mod vote;

pub use denial::VoteDenial;
pub use vote::{TransportError, VoteError, VoteErrorKind};
