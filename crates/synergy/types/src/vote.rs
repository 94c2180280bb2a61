use serde::{Deserialize, Serialize};

use crate::hash::{Epoch, Hash, Token};

/// Reason recorded on the vote a proposer implicitly casts for its own action
pub const SUBMISSION_REASON: &str = "submission";

/// A single approve/reject ballot on a pending proposal.
///
/// `hash` must equal the identity of the proposal being voted on. Signature
/// verification happens upstream; the engine only checks authorization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub epoch: Epoch,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub hash: Hash,
    pub approve: bool,
}

impl Vote {
    pub fn approve(epoch: Epoch, author: Token, hash: Hash) -> Self {
        Self {
            epoch,
            author,
            reasons: String::new(),
            hash,
            approve: true,
        }
    }

    pub fn reject(epoch: Epoch, author: Token, hash: Hash) -> Self {
        Self {
            approve: false,
            ..Self::approve(epoch, author, hash)
        }
    }

    /// The implicit approval a proposer casts on its own submission.
    pub fn submission(epoch: Epoch, author: Token, hash: Hash) -> Self {
        Self::approve(epoch, author, hash).with_reasons(SUBMISSION_REASON)
    }

    pub fn with_reasons(mut self, reasons: impl Into<String>) -> Self {
        self.reasons = reasons.into();
        self
    }
}
