//! Draft lifecycle and version chains.
//!
//! A draft is content addressed: its identity, and the hash its authors vote
//! on, is the hash of media assembled beforehand. A draft may name a
//! previous version, forming a singly linked chain resolved through
//! [`State::draft`].
//!
//! Commit rule for a draft with a previous version:
//!
//! 1. the new authors group reaches its own consensus,
//! 2. the previous version's authors reach their consensus over the new
//!    hash, and
//! 3. every member of the new authors group who was not an author of the
//!    previous version has cast an approving vote.
//!
//! A first version only needs (1).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synergy_consensus::{AdhocGroup, Ballot, Consensual, Group, VoteError};
use synergy_types::{actions, Epoch, Hash, Token, Vote, MAX_PERCENTAGE};
use tracing::info;

use crate::board::check_majority;
use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::registry::Pending;
use crate::state::State;

/// A submitted document version
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub epoch: Epoch,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub content_type: String,
    pub content_hash: Hash,
    pub authors: Group,
    pub previous: Option<Hash>,
    pub references: Vec<Hash>,
    pub ballot: Ballot,
    pub approved: bool,
    /// Boards this draft is pinned on
    pub pinned: BTreeSet<String>,
    /// Approved edits, in commit order
    pub edits: Vec<Hash>,
}

impl Draft {
    pub fn hash(&self) -> Hash {
        self.content_hash
    }

    pub fn votes(&self) -> &[Vote] {
        self.ballot.votes()
    }
}

/// A draft awaiting its authors, with the previous version's authors when
/// it continues a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDraft {
    pub draft: Draft,
    pub previous_authors: Option<Group>,
}

impl PendingDraft {
    /// Members of the new authors group absent from the previous version
    /// who have not approved yet.
    pub fn missing_newcomers(&self) -> BTreeSet<Token> {
        let Some(previous) = &self.previous_authors else {
            return BTreeSet::new();
        };
        let hash = self.draft.content_hash;
        let approved: BTreeSet<Token> = self
            .draft
            .votes()
            .iter()
            .filter(|v| v.approve && v.hash == hash)
            .map(|v| v.author)
            .collect();
        self.draft
            .authors
            .tokens()
            .iter()
            .filter(|t| !previous.is_member(t) && !approved.contains(t))
            .copied()
            .collect()
    }
}

impl Pending for PendingDraft {
    fn epoch(&self) -> Epoch {
        self.draft.epoch
    }

    fn ballot(&self) -> &Ballot {
        &self.draft.ballot
    }

    fn cast(&mut self, vote: Vote) -> Result<(), VoteError> {
        let mut eligible: Vec<&dyn Consensual> = vec![&self.draft.authors];
        if let Some(previous) = &self.previous_authors {
            eligible.push(previous);
        }
        self.draft.ballot.cast(vote, &eligible)
    }

    fn voters(&self) -> BTreeSet<Token> {
        let mut voters = self.draft.authors.tokens().clone();
        if let Some(previous) = &self.previous_authors {
            voters.extend(previous.tokens().iter().copied());
        }
        voters
    }

    fn is_resolved(&self) -> bool {
        let hash = self.draft.content_hash;
        let votes = self.draft.votes();
        if !self.draft.authors.consensus(&hash, votes) {
            return false;
        }
        match &self.previous_authors {
            None => true,
            Some(previous) => {
                previous.consensus(&hash, votes) && self.missing_newcomers().is_empty()
            }
        }
    }
}

impl State {
    pub fn incorporate_draft(&mut self, action: actions::Draft) -> StateResult<()> {
        self.require_member(&action.author)?;
        let hash = action.content_hash;
        if self.drafts.contains_key(&hash) || self.registry.has(&hash) {
            return Err(StateError::AlreadyDrafted(hash));
        }
        if !self.media.contains(&hash) {
            return Err(StateError::MediaNotFound(hash));
        }

        let previous_authors = match action.previous_draft.filter(|h| !h.is_zero()) {
            Some(previous) => {
                let draft = self
                    .drafts
                    .get(&previous)
                    .ok_or(StateError::DraftNotFound(previous))?;
                if !draft.authors.is_member(&action.author) {
                    return Err(StateError::NotAuthor {
                        draft: previous,
                        author: action.author,
                    });
                }
                Some(draft.authors.clone())
            }
            None => None,
        };

        let authors = self.authors_group(
            &action.author,
            action.on_behalf_of.as_deref(),
            &action.co_authors,
            action.policy.map(|p| p.majority),
        )?;

        let draft = Draft {
            epoch: action.epoch,
            title: action.title,
            description: action.description,
            keywords: action.keywords,
            content_type: action.content_type,
            content_hash: hash,
            authors,
            previous: action.previous_draft.filter(|h| !h.is_zero()),
            references: action.references,
            ballot: Ballot::seeded(hash, Vote::submission(action.epoch, action.author, hash)),
            approved: false,
            pinned: BTreeSet::new(),
            edits: Vec::new(),
        };
        let pending = PendingDraft {
            draft,
            previous_authors,
        };
        self.propose(action.epoch, pending.into())
    }

    /// Authors of a draft or edit: a photo of the named collective, an
    /// ad-hoc group of co-authors, or the submitter alone.
    pub(crate) fn authors_group(
        &self,
        author: &Token,
        on_behalf_of: Option<&str>,
        co_authors: &[Token],
        majority: Option<u32>,
    ) -> StateResult<Group> {
        if let Some(name) = on_behalf_of {
            return Ok(Group::Named(self.collective_member(name, author)?.photo()));
        }
        if co_authors.is_empty() {
            return Ok(Group::Adhoc(AdhocGroup::single(*author)));
        }
        for co_author in co_authors {
            self.require_member(co_author)?;
        }
        let majority = majority.unwrap_or(MAX_PERCENTAGE);
        check_majority(majority)?;
        let members = co_authors.iter().copied().chain(std::iter::once(*author));
        Ok(Group::Adhoc(AdhocGroup::new(majority, members)))
    }

    pub(crate) fn check_draft(&self, pending: &PendingDraft) -> StateResult<()> {
        let hash = pending.draft.content_hash;
        if self.drafts.contains_key(&hash) {
            return Err(StateError::AlreadyDrafted(hash));
        }
        Ok(())
    }

    pub(crate) fn commit_draft(&mut self, epoch: Epoch, pending: PendingDraft) -> StateResult<()> {
        self.check_draft(&pending)?;
        let mut draft = pending.draft;
        let hash = draft.content_hash;
        draft.approved = true;
        info!(%hash, title = %draft.title, "Draft approved");
        self.drafts.insert(hash, draft);
        self.record(epoch, StateEvent::DraftApproved { hash });
        Ok(())
    }
}
