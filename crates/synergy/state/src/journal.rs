//! Journal of committed state mutations
//!
//! Every handler that changes canonical state appends one entry per change.
//! The host drains the journal after each action to feed indexers or
//! notification layers; the engine never reads it back.

use serde::{Deserialize, Serialize};
use synergy_types::{Epoch, Hash, Token};

use crate::registry::ProposalKind;

/// A state mutation produced while processing an action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StateEvent {
    SignedIn { member: Token, handle: String },
    CollectiveCreated { name: String },
    CollectiveUpdated { name: String },
    MemberIncluded { collective: String, member: Token },
    MemberRemoved { collective: String, member: Token },
    ProposalRegistered { hash: Hash, kind: ProposalKind },
    VoteAccepted { hash: Hash, author: Token, approve: bool },
    ProposalResolved { hash: Hash, kind: ProposalKind },
    ProposalExpired { hash: Hash, kind: ProposalKind },
    /// Resolved, but a competing proposal already applied the same change.
    ProposalDropped { hash: Hash, kind: ProposalKind },
    MediaAssembled { hash: Hash, size: usize },
    MediaExpired { hash: Hash },
    DraftApproved { hash: Hash },
    EditApproved { hash: Hash, draft: Hash },
    BoardCreated { name: String },
    BoardUpdated { name: String },
    Pinned { board: String, draft: Hash },
    Unpinned { board: String, draft: Hash },
    EditorIncluded { board: String, editor: Token },
    EditorRemoved { board: String, editor: Token },
    EventCreated { hash: Hash },
    EventUpdated { hash: Hash },
    EventCancelled { hash: Hash },
    CheckedIn { event_hash: Hash, member: Token },
    Greeted { event_hash: Hash, member: Token },
    Released { draft: Hash },
    Stamped { draft: Hash, reputation: String },
    Reacted { hash: Hash, reaction: u8 },
}

/// One journal record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub epoch: Epoch,
    #[serde(flatten)]
    pub event: StateEvent,
}

/// Append-only buffer of entries not yet drained by the host
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, epoch: Epoch, event: StateEvent) {
        self.entries.push(JournalEntry { epoch, event });
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand every pending entry to the caller, oldest first.
    pub fn drain(&mut self) -> Vec<JournalEntry> {
        std::mem::take(&mut self.entries)
    }
}
