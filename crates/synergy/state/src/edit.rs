//! Edits: content-addressed amendments to an approved draft.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synergy_consensus::{Ballot, Consensual, Group, VoteError};
use synergy_types::{actions, Epoch, Hash, Token, Vote, MAX_PERCENTAGE};
use tracing::info;

use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::registry::Pending;
use crate::state::State;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub epoch: Epoch,
    pub authors: Group,
    /// Draft this edit amends
    pub draft: Hash,
    pub content_type: String,
    pub content_hash: Hash,
    pub ballot: Ballot,
}

impl Edit {
    pub fn votes(&self) -> &[Vote] {
        self.ballot.votes()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    pub edit: Edit,
}

impl Pending for PendingEdit {
    fn epoch(&self) -> Epoch {
        self.edit.epoch
    }

    fn ballot(&self) -> &Ballot {
        &self.edit.ballot
    }

    fn cast(&mut self, vote: Vote) -> Result<(), VoteError> {
        self.edit.ballot.cast(vote, &[&self.edit.authors])
    }

    fn voters(&self) -> BTreeSet<Token> {
        self.edit.authors.tokens().clone()
    }

    fn is_resolved(&self) -> bool {
        let ballot = &self.edit.ballot;
        self.edit.authors.consensus(&ballot.hash(), ballot.votes())
    }
}

impl State {
    /// Co-authored edits need every co-author.
    pub fn incorporate_edit(&mut self, action: actions::Edit) -> StateResult<()> {
        self.require_member(&action.author)?;
        let hash = action.content_hash;
        if self.edits.contains_key(&hash) || self.registry.has(&hash) {
            return Err(StateError::AlreadyEdited(hash));
        }
        if !self.drafts.contains_key(&action.edited_draft) {
            return Err(StateError::DraftNotFound(action.edited_draft));
        }
        if !self.media.contains(&hash) {
            return Err(StateError::MediaNotFound(hash));
        }
        let authors = self.authors_group(
            &action.author,
            action.on_behalf_of.as_deref(),
            &action.co_authors,
            Some(MAX_PERCENTAGE),
        )?;
        let edit = Edit {
            epoch: action.epoch,
            authors,
            draft: action.edited_draft,
            content_type: action.content_type,
            content_hash: hash,
            ballot: Ballot::seeded(hash, Vote::submission(action.epoch, action.author, hash)),
        };
        self.propose(action.epoch, PendingEdit { edit }.into())
    }

    pub(crate) fn check_edit(&self, pending: &PendingEdit) -> StateResult<()> {
        let draft = pending.edit.draft;
        if !self.drafts.contains_key(&draft) {
            return Err(StateError::DraftNotFound(draft));
        }
        Ok(())
    }

    pub(crate) fn commit_edit(&mut self, epoch: Epoch, pending: PendingEdit) -> StateResult<()> {
        let edit = pending.edit;
        let hash = edit.content_hash;
        let draft_hash = edit.draft;
        let draft = self
            .drafts
            .get_mut(&draft_hash)
            .ok_or(StateError::DraftNotFound(draft_hash))?;
        draft.edits.push(hash);
        info!(%hash, draft = %draft_hash, "Edit approved");
        self.edits.insert(hash, edit);
        self.record(
            epoch,
            StateEvent::EditApproved {
                hash,
                draft: draft_hash,
            },
        );
        Ok(())
    }
}
