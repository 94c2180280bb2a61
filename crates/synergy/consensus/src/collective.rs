//! Named collectives: persistent, policy-driven member groups.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synergy_types::{Hash, Policy, Token, Vote};

use crate::group::{count_approvals, required_votes, Consensual};

/// A persistent named group with a Majority / SuperMajority policy.
///
/// The live collective only changes through governed proposals. Proposals
/// gated by a collective hold a [`Collective::photo`] taken when they were
/// opened, so later membership changes never alter who may decide them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collective {
    pub name: String,
    pub members: BTreeSet<Token>,
    pub description: String,
    pub policy: Policy,
}

impl Collective {
    /// A new collective whose sole member is its founder.
    pub fn new(
        name: impl Into<String>,
        founder: Token,
        description: impl Into<String>,
        policy: Policy,
    ) -> Self {
        Self {
            name: name.into(),
            members: BTreeSet::from([founder]),
            description: description.into(),
            policy,
        }
    }

    /// Frozen deep copy of the membership and policy at this instant.
    pub fn photo(&self) -> Collective {
        Collective {
            name: self.name.clone(),
            members: self.members.clone(),
            description: self.description.clone(),
            policy: self.policy,
        }
    }

    /// Approvals reach the SuperMajority threshold (policy changes).
    pub fn super_consensus(&self, hash: &Hash, votes: &[Vote]) -> bool {
        let required = required_votes(self.members.len(), self.policy.super_majority);
        count_approvals(&self.members, required, hash, votes)
    }

    pub fn required_votes(&self) -> usize {
        required_votes(self.members.len(), self.policy.majority)
    }
}

impl Consensual for Collective {
    fn is_member(&self, token: &Token) -> bool {
        self.members.contains(token)
    }

    fn consensus(&self, hash: &Hash, votes: &[Vote]) -> bool {
        count_approvals(&self.members, self.required_votes(), hash, votes)
    }

    fn include_member(&mut self, token: Token) {
        self.members.insert(token);
    }

    fn remove_member(&mut self, token: &Token) {
        self.members.remove(token);
    }

    fn change_majority(&mut self, majority: u32) {
        self.policy.majority = majority;
    }

    fn majority(&self) -> u32 {
        self.policy.majority
    }

    fn list_of_members(&self) -> Option<&BTreeSet<Token>> {
        None
    }

    fn tokens(&self) -> &BTreeSet<Token> {
        &self.members
    }

    fn collective_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}
