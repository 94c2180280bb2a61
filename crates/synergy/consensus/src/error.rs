//! Per-vote rejection reasons

use synergy_types::{Hash, Token};

/// Why a vote was not added to a ballot. A rejected vote never touches the
/// tally and never fails the proposal it was aimed at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteError {
    #[error("vote hash {got} does not match proposal {expected}")]
    InvalidHash { expected: Hash, got: Hash },

    #[error("{0} already voted on this proposal")]
    AlreadyCast(Token),

    #[error("{0} is not eligible to vote on this proposal")]
    NotEligible(Token),
}
