//! Engine configuration

use serde::{Deserialize, Serialize};

/// Thirty days of one-second epochs.
pub const DEFAULT_PROPOSAL_DEADLINE: u64 = 30 * 24 * 60 * 60;

pub const DEFAULT_REACTIONS_COUNT: u8 = 5;

/// Tunables of the state machine. Every node replaying the same feed must
/// run with the same values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Epochs a proposal stays pending before it is purged
    pub proposal_deadline: u64,
    /// Number of distinct reaction kinds
    pub reactions_count: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proposal_deadline: DEFAULT_PROPOSAL_DEADLINE,
            reactions_count: DEFAULT_REACTIONS_COUNT,
        }
    }
}
