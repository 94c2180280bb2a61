//! Publication: releases decided by a draft's authors, stamps decided by a
//! reputation collective.

use serde::{Deserialize, Serialize};
use synergy_consensus::{Collective, Consensual, Group};
use synergy_types::actions::{ImprintStamp, Instruction, ReleaseDraft};
use synergy_types::{Epoch, Hash, Vote};
use tracing::info;

use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::registry::{gated, Gate};
use crate::state::State;

/// Endorsement of a release by a reputation collective
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub reputation: String,
    pub epoch: Epoch,
}

/// A published draft
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub draft: Hash,
    pub epoch: Epoch,
    pub stamps: Vec<Stamp>,
}

impl Release {
    pub fn is_stamped_by(&self, collective: &str) -> bool {
        self.stamps.iter().any(|s| s.reputation == collective)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRelease {
    pub epoch: Epoch,
    pub draft: Hash,
    pub gate: Gate<Group>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingStamp {
    pub epoch: Epoch,
    pub release: Hash,
    pub gate: Gate<Collective>,
}

gated!(PendingRelease, PendingStamp);

impl State {
    pub fn release_draft(&mut self, release: ReleaseDraft) -> StateResult<()> {
        let draft_hash = release.content_hash;
        if self.releases.contains_key(&draft_hash) {
            return Err(StateError::AlreadyReleased(draft_hash));
        }
        let draft = self
            .drafts
            .get(&draft_hash)
            .ok_or(StateError::DraftNotFound(draft_hash))?;
        if !draft.authors.is_member(&release.author) {
            return Err(StateError::NotAuthor {
                draft: draft_hash,
                author: release.author,
            });
        }
        let hash = release.hashed()?;
        let authors = draft.authors.clone();
        let pending = PendingRelease {
            epoch: release.epoch,
            draft: draft_hash,
            gate: Gate::seeded(authors, Vote::submission(release.epoch, release.author, hash)),
        };
        self.propose(release.epoch, pending.into())
    }

    pub fn imprint_stamp(&mut self, stamp: ImprintStamp) -> StateResult<()> {
        let release = self
            .releases
            .get(&stamp.hash)
            .ok_or(StateError::ReleaseNotFound(stamp.hash))?;
        if release.is_stamped_by(&stamp.on_behalf_of) {
            return Err(StateError::AlreadyStamped {
                release: stamp.hash,
                collective: stamp.on_behalf_of,
            });
        }
        let hash = stamp.hashed()?;
        let photo = self.collective_member(&stamp.on_behalf_of, &stamp.author)?.photo();
        let pending = PendingStamp {
            epoch: stamp.epoch,
            release: stamp.hash,
            gate: Gate::seeded(photo, Vote::submission(stamp.epoch, stamp.author, hash)),
        };
        self.propose(stamp.epoch, pending.into())
    }

    pub(crate) fn check_release(&self, pending: &PendingRelease) -> StateResult<()> {
        if self.releases.contains_key(&pending.draft) {
            return Err(StateError::AlreadyReleased(pending.draft));
        }
        Ok(())
    }

    pub(crate) fn check_stamp(&self, pending: &PendingStamp) -> StateResult<()> {
        let draft = pending.release;
        let reputation = &pending.gate.group.name;
        let release = self
            .releases
            .get(&draft)
            .ok_or(StateError::ReleaseNotFound(draft))?;
        if release.is_stamped_by(reputation) {
            return Err(StateError::AlreadyStamped {
                release: draft,
                collective: reputation.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn commit_release(&mut self, epoch: Epoch, pending: PendingRelease) -> StateResult<()> {
        self.check_release(&pending)?;
        let draft = pending.draft;
        info!(%draft, "Draft released");
        self.releases.insert(
            draft,
            Release {
                draft,
                epoch,
                stamps: Vec::new(),
            },
        );
        self.record(epoch, StateEvent::Released { draft });
        Ok(())
    }

    pub(crate) fn commit_stamp(&mut self, epoch: Epoch, pending: PendingStamp) -> StateResult<()> {
        self.check_stamp(&pending)?;
        let draft = pending.release;
        let reputation = pending.gate.group.name;
        let release = self
            .releases
            .get_mut(&draft)
            .ok_or(StateError::ReleaseNotFound(draft))?;
        release.stamps.push(Stamp {
            reputation: reputation.clone(),
            epoch,
        });
        info!(%draft, %reputation, "Release stamped");
        self.record(epoch, StateEvent::Stamped { draft, reputation });
        Ok(())
    }
}
