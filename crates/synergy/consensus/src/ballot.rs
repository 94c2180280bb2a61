//! Vote collection for one pending proposal.

use serde::{Deserialize, Serialize};
use synergy_types::{Hash, Token, Vote};
use tracing::{debug, warn};

use crate::error::VoteError;
use crate::group::Consensual;

/// Votes cast on a single proposal hash.
///
/// Only votes that pass [`Ballot::is_new_valid_vote`] are ever stored, so the
/// thresholds evaluated over [`Ballot::votes`] never see a mismatched hash or
/// a second vote from the same author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    hash: Hash,
    votes: Vec<Vote>,
}

impl Ballot {
    pub fn new(hash: Hash) -> Self {
        Self {
            hash,
            votes: Vec::new(),
        }
    }

    /// Ballot opened with the proposer's own vote already recorded.
    pub fn seeded(hash: Hash, vote: Vote) -> Self {
        let mut ballot = Self::new(hash);
        if vote.hash == hash {
            ballot.votes.push(vote);
        }
        ballot
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn has_voted(&self, token: &Token) -> bool {
        self.votes.iter().any(|v| v.author == *token)
    }

    /// First vote wins: a mismatched hash or a repeated author is rejected.
    pub fn is_new_valid_vote(&self, vote: &Vote) -> Result<(), VoteError> {
        if vote.hash != self.hash {
            return Err(VoteError::InvalidHash {
                expected: self.hash,
                got: vote.hash,
            });
        }
        if self.has_voted(&vote.author) {
            return Err(VoteError::AlreadyCast(vote.author));
        }
        Ok(())
    }

    /// Record `vote` if it is new, well-addressed and its author belongs to
    /// at least one of the groups that can decide this proposal.
    pub fn cast(&mut self, vote: Vote, eligible: &[&dyn Consensual]) -> Result<(), VoteError> {
        if let Err(err) = self.is_new_valid_vote(&vote) {
            warn!(hash = %self.hash, author = %vote.author, error = %err, "Vote rejected");
            return Err(err);
        }
        if !eligible.iter().any(|group| group.is_member(&vote.author)) {
            warn!(hash = %self.hash, author = %vote.author, "Vote from ineligible author");
            return Err(VoteError::NotEligible(vote.author));
        }
        debug!(hash = %self.hash, author = %vote.author, approve = vote.approve, "Vote recorded");
        self.votes.push(vote);
        Ok(())
    }
}
