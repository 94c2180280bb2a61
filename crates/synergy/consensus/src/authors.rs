use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synergy_types::{Hash, Token, Vote};

use crate::adhoc::AdhocGroup;
use crate::collective::Collective;
use crate::group::Consensual;

/// Either kind of consensus group, as owned by drafts, edits and releases.
///
/// A named variant always holds a photo of the collective, never the live
/// one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Group {
    Named(Collective),
    Adhoc(AdhocGroup),
}

impl Group {
    pub fn as_collective(&self) -> Option<&Collective> {
        match self {
            Group::Named(collective) => Some(collective),
            Group::Adhoc(_) => None,
        }
    }

    fn inner(&self) -> &dyn Consensual {
        match self {
            Group::Named(collective) => collective,
            Group::Adhoc(group) => group,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Consensual {
        match self {
            Group::Named(collective) => collective,
            Group::Adhoc(group) => group,
        }
    }
}

impl From<Collective> for Group {
    fn from(collective: Collective) -> Self {
        Group::Named(collective)
    }
}

impl From<AdhocGroup> for Group {
    fn from(group: AdhocGroup) -> Self {
        Group::Adhoc(group)
    }
}

impl Consensual for Group {
    fn is_member(&self, token: &Token) -> bool {
        self.inner().is_member(token)
    }

    fn consensus(&self, hash: &Hash, votes: &[Vote]) -> bool {
        self.inner().consensus(hash, votes)
    }

    fn include_member(&mut self, token: Token) {
        self.inner_mut().include_member(token)
    }

    fn remove_member(&mut self, token: &Token) {
        self.inner_mut().remove_member(token)
    }

    fn change_majority(&mut self, majority: u32) {
        self.inner_mut().change_majority(majority)
    }

    fn majority(&self) -> u32 {
        self.inner().majority()
    }

    fn list_of_members(&self) -> Option<&BTreeSet<Token>> {
        self.inner().list_of_members()
    }

    fn tokens(&self) -> &BTreeSet<Token> {
        self.inner().tokens()
    }

    fn collective_name(&self) -> Option<&str> {
        self.inner().collective_name()
    }
}
