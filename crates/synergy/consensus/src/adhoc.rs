use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synergy_types::{Hash, Token, Vote};

use crate::group::{count_approvals, required_votes, Consensual};

/// Ephemeral group with a single threshold: draft co-authors, board editors,
/// event managers. It has no identity beyond the object that owns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdhocGroup {
    pub members: BTreeSet<Token>,
    pub majority: u32,
}

impl AdhocGroup {
    pub fn new(majority: u32, tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            members: tokens.into_iter().collect(),
            majority,
        }
    }

    /// Group of exactly one author.
    pub fn single(author: Token) -> Self {
        Self::new(0, [author])
    }

    /// Every member must approve.
    pub fn unanimous_of(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self::new(100, tokens)
    }

    pub fn required_votes(&self) -> usize {
        required_votes(self.members.len(), self.majority)
    }
}

impl Consensual for AdhocGroup {
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
        self.majority = majority;
    }

    fn majority(&self) -> u32 {
        self.majority
    }

    fn list_of_members(&self) -> Option<&BTreeSet<Token>> {
        Some(&self.members)
    }

    fn tokens(&self) -> &BTreeSet<Token> {
        &self.members
    }

    fn collective_name(&self) -> Option<&str> {
        None
    }
}
