//! Proposal Registry
//!
//! One flat store of every pending proposal, keyed by proposal hash, with:
//!
//! - a per-member reverse index answering "which proposals await my vote",
//!   built from the voters of each proposal's frozen group(s);
//! - an epoch-keyed deadline schedule. Every proposal is purged at
//!   `creation epoch + proposal deadline`, whatever its vote count.
//!
//! Resolution is remove-then-commit: a vote that resolves a proposal takes it
//! out of the registry and hands it back to the caller, which applies it to
//! canonical state.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use synergy_consensus::{Ballot, Consensual, VoteError};
use synergy_types::{Epoch, Hash, Token, Vote};
use tracing::debug;

use crate::board::{PendingBoard, PendingBoardEditor, PendingBoardUpdate, PendingPin};
use crate::collective::{PendingMembership, PendingRemoval, PendingUpdateCollective};
use crate::draft::PendingDraft;
use crate::edit::PendingEdit;
use crate::error::{StateError, StateResult};
use crate::event::{PendingEvent, PendingEventCancel, PendingEventUpdate};
use crate::release::{PendingRelease, PendingStamp};

/// Behaviour shared by every pending object.
pub trait Pending {
    /// Epoch of the action that opened the proposal
    fn epoch(&self) -> Epoch;

    fn ballot(&self) -> &Ballot;

    /// Validate and record a vote.
    fn cast(&mut self, vote: Vote) -> Result<(), VoteError>;

    /// Every token that may vote, used for the reverse index.
    fn voters(&self) -> BTreeSet<Token>;

    /// Whether the recorded votes are enough to commit.
    fn is_resolved(&self) -> bool;
}

/// A frozen consensus group with the ballot it decides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate<G> {
    pub group: G,
    pub ballot: Ballot,
}

impl<G: Consensual> Gate<G> {
    pub fn new(group: G, hash: Hash) -> Self {
        Self {
            group,
            ballot: Ballot::new(hash),
        }
    }

    /// Gate whose proposer already approved.
    pub fn seeded(group: G, vote: Vote) -> Self {
        Self {
            group,
            ballot: Ballot::seeded(vote.hash, vote),
        }
    }

    pub fn cast(&mut self, vote: Vote) -> Result<(), VoteError> {
        self.ballot.cast(vote, &[&self.group])
    }

    pub fn passed(&self) -> bool {
        self.group.consensus(&self.ballot.hash(), self.ballot.votes())
    }
}

/// Implements [`Pending`] for a proposal with `epoch` and `gate` fields
/// decided by ordinary consensus of its gate group.
macro_rules! gated {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::registry::Pending for $ty {
                fn epoch(&self) -> synergy_types::Epoch {
                    self.epoch
                }

                fn ballot(&self) -> &synergy_consensus::Ballot {
                    &self.gate.ballot
                }

                fn cast(
                    &mut self,
                    vote: synergy_types::Vote,
                ) -> Result<(), synergy_consensus::VoteError> {
                    self.gate.cast(vote)
                }

                fn voters(&self) -> std::collections::BTreeSet<synergy_types::Token> {
                    synergy_consensus::Consensual::tokens(&self.gate.group).clone()
                }

                fn is_resolved(&self) -> bool {
                    self.gate.passed()
                }
            }
        )*
    };
}

pub(crate) use gated;

macro_rules! proposals {
    ($($kind:ident($ty:ty)),* $(,)?) => {
        /// Tag of every proposal kind held by the registry
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum ProposalKind {
            $($kind,)*
        }

        /// A pending proposal of any kind
        #[derive(Clone, Debug)]
        pub enum Proposal {
            $($kind($ty),)*
        }

        impl Proposal {
            pub fn kind(&self) -> ProposalKind {
                match self {
                    $(Proposal::$kind(_) => ProposalKind::$kind,)*
                }
            }

            fn inner(&self) -> &dyn Pending {
                match self {
                    $(Proposal::$kind(p) => p,)*
                }
            }

            fn inner_mut(&mut self) -> &mut dyn Pending {
                match self {
                    $(Proposal::$kind(p) => p,)*
                }
            }
        }

        $(
            impl From<$ty> for Proposal {
                fn from(pending: $ty) -> Self {
                    Proposal::$kind(pending)
                }
            }
        )*
    };
}

proposals! {
    UpdateCollective(PendingUpdateCollective),
    RequestMembership(PendingMembership),
    RemoveMember(PendingRemoval),
    Draft(PendingDraft),
    Edit(PendingEdit),
    CreateBoard(PendingBoard),
    UpdateBoard(PendingBoardUpdate),
    Pin(PendingPin),
    BoardEditor(PendingBoardEditor),
    CreateEvent(PendingEvent),
    UpdateEvent(PendingEventUpdate),
    CancelEvent(PendingEventCancel),
    Release(PendingRelease),
    Stamp(PendingStamp),
}

impl Proposal {
    /// Identity under which the proposal is registered.
    pub fn hash(&self) -> Hash {
        self.inner().ballot().hash()
    }

    pub fn epoch(&self) -> Epoch {
        self.inner().epoch()
    }

    pub fn votes(&self) -> &[Vote] {
        self.inner().ballot().votes()
    }

    pub fn voters(&self) -> BTreeSet<Token> {
        self.inner().voters()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner().is_resolved()
    }

    pub fn cast(&mut self, vote: Vote) -> Result<(), VoteError> {
        self.inner_mut().cast(vote)
    }
}

/// Hash-indexed store of pending proposals.
#[derive(Clone, Debug)]
pub struct Registry {
    proposals: HashMap<Hash, Proposal>,
    index: HashMap<Token, BTreeSet<Hash>>,
    deadlines: BTreeMap<Epoch, Vec<Hash>>,
    proposal_deadline: u64,
}

impl Registry {
    pub fn new(proposal_deadline: u64) -> Self {
        Self {
            proposals: HashMap::new(),
            index: HashMap::new(),
            deadlines: BTreeMap::new(),
            proposal_deadline,
        }
    }

    /// Epoch at which a proposal opened at `epoch` is purged.
    pub fn deadline_for(&self, epoch: Epoch) -> Epoch {
        epoch.saturating_add(self.proposal_deadline)
    }

    /// Register a proposal, index it under its voters and schedule its
    /// expiry.
    pub fn add(&mut self, proposal: Proposal) -> StateResult<Hash> {
        let hash = proposal.hash();
        if self.proposals.contains_key(&hash) {
            return Err(StateError::ProposalAlreadyExists(hash));
        }
        for token in proposal.voters() {
            self.index.entry(token).or_default().insert(hash);
        }
        let deadline = self.deadline_for(proposal.epoch());
        self.deadlines.entry(deadline).or_default().push(hash);
        debug!(%hash, kind = ?proposal.kind(), deadline, "Proposal registered");
        self.proposals.insert(hash, proposal);
        Ok(hash)
    }

    pub fn has(&self, hash: &Hash) -> bool {
        self.proposals.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<&Proposal> {
        self.proposals.get(hash)
    }

    pub fn kind(&self, hash: &Hash) -> Option<ProposalKind> {
        self.proposals.get(hash).map(Proposal::kind)
    }

    /// Proposals on which `token` may vote.
    pub fn get_votes(&self, token: &Token) -> BTreeSet<Hash> {
        self.index.get(token).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Hash, &Proposal)> {
        self.proposals.iter()
    }

    /// Purge a proposal from the store, the reverse index and the schedule.
    /// Deleting an unknown hash is a no-op.
    pub fn delete(&mut self, hash: &Hash) -> Option<Proposal> {
        let proposal = self.proposals.remove(hash)?;
        self.index.retain(|_, hashes| {
            hashes.remove(hash);
            !hashes.is_empty()
        });
        let deadline = self.deadline_for(proposal.epoch());
        if let Some(bucket) = self.deadlines.get_mut(&deadline) {
            bucket.retain(|h| h != hash);
            if bucket.is_empty() {
                self.deadlines.remove(&deadline);
            }
        }
        Some(proposal)
    }

    /// Route a vote to its proposal. Returns the proposal, already removed,
    /// when the vote resolves it.
    pub fn incorporate_vote(&mut self, vote: Vote) -> StateResult<Option<Proposal>> {
        let hash = vote.hash;
        let proposal = self
            .proposals
            .get_mut(&hash)
            .ok_or(StateError::ProposalNotFound(hash))?;
        proposal.cast(vote)?;
        if proposal.is_resolved() {
            Ok(self.delete(&hash))
        } else {
            Ok(None)
        }
    }

    /// Remove every proposal whose deadline is at or before `epoch`, in
    /// deadline order.
    pub fn expire(&mut self, epoch: Epoch) -> Vec<Proposal> {
        let due = match epoch.checked_add(1) {
            Some(next) => {
                let later = self.deadlines.split_off(&next);
                std::mem::replace(&mut self.deadlines, later)
            }
            None => std::mem::take(&mut self.deadlines),
        };
        due.into_values()
            .flatten()
            .filter_map(|hash| self.delete(&hash))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PROPOSAL_DEADLINE)
    }
}
