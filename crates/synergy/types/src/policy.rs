//! Collective voting policy
//!
//! Both values are percentages. The number of approvals a decision needs is
//! `floor(members * pct / 100) + 1`, capped at the member count, so `0` means
//! "any single member" and `100` means unanimity. Majority governs ordinary
//! updates; SuperMajority governs policy changes.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Upper bound for any percentage in a policy
pub const MAX_PERCENTAGE: u32 = 100;

/// Majority / SuperMajority pair of a named collective
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub majority: u32,
    pub super_majority: u32,
}

impl Policy {
    pub fn new(majority: u32, super_majority: u32) -> Self {
        Self {
            majority,
            super_majority,
        }
    }

    /// Reject out-of-range percentages. Values are never clamped.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.majority > MAX_PERCENTAGE || self.super_majority > MAX_PERCENTAGE {
            return Err(TypesError::InvalidPolicy {
                majority: self.majority,
                super_majority: self.super_majority,
            });
        }
        Ok(())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            majority: 50,
            super_majority: 66,
        }
    }
}
