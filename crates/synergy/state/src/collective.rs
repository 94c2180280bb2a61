//! Collective lifecycle: creation, governed updates, admission and removal.
//!
//! Creation is immediate. Every later change to a live collective goes
//! through a proposal gated by a photo of the collective taken when the
//! proposal was opened.

use synergy_consensus::{Ballot, Collective, Consensual, VoteError};
use synergy_types::actions::{CreateCollective, Instruction, RemoveMember, RequestMembership, UpdateCollective};
use synergy_types::{Epoch, Policy, Token, Vote};
use tracing::info;

use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::registry::{gated, Gate, Pending};
use crate::state::State;

/// Description and/or policy change awaiting the collective's vote. A policy
/// change is decided by SuperMajority, a description-only change by
/// Majority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingUpdateCollective {
    pub epoch: Epoch,
    pub collective: String,
    pub description: Option<String>,
    pub policy: Option<Policy>,
    pub gate: Gate<Collective>,
}

impl Pending for PendingUpdateCollective {
    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn ballot(&self) -> &Ballot {
        &self.gate.ballot
    }

    fn cast(&mut self, vote: Vote) -> Result<(), VoteError> {
        self.gate.cast(vote)
    }

    fn voters(&self) -> std::collections::BTreeSet<Token> {
        self.gate.group.members.clone()
    }

    fn is_resolved(&self) -> bool {
        let ballot = &self.gate.ballot;
        if self.policy.is_some() {
            self.gate.group.super_consensus(&ballot.hash(), ballot.votes())
        } else {
            self.gate.passed()
        }
    }
}

/// Admission request. The candidate is not a member, so the ballot opens
/// empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMembership {
    pub epoch: Epoch,
    pub collective: String,
    pub candidate: Token,
    pub gate: Gate<Collective>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    pub epoch: Epoch,
    pub collective: String,
    pub member: Token,
    pub gate: Gate<Collective>,
}

gated!(PendingMembership, PendingRemoval);

impl State {
    pub fn create_collective(&mut self, create: CreateCollective) -> StateResult<()> {
        self.require_member(&create.author)?;
        if self.collectives.contains_key(&create.name) {
            return Err(StateError::CollectiveAlreadyExists(create.name));
        }
        create.policy.validate()?;

        let collective = Collective::new(
            create.name.clone(),
            create.author,
            create.description,
            create.policy,
        );
        info!(name = %create.name, founder = %create.author, "Collective created");
        self.collectives.insert(create.name.clone(), collective);
        self.record(create.epoch, StateEvent::CollectiveCreated { name: create.name });
        Ok(())
    }

    pub fn update_collective(&mut self, update: UpdateCollective) -> StateResult<()> {
        if let Some(policy) = &update.policy {
            policy.validate()?;
        }
        let hash = update.hashed()?;
        let photo = self.collective_member(&update.on_behalf_of, &update.author)?.photo();
        let pending = PendingUpdateCollective {
            epoch: update.epoch,
            collective: update.on_behalf_of,
            description: update.description,
            policy: update.policy,
            gate: Gate::seeded(photo, Vote::submission(update.epoch, update.author, hash)),
        };
        self.propose(update.epoch, pending.into())
    }

    /// `include = true` opens an admission proposal; `include = false` is an
    /// immediate self-exclusion.
    pub fn request_membership(&mut self, request: RequestMembership) -> StateResult<()> {
        self.require_member(&request.author)?;
        if !request.include {
            self.collective_member(&request.collective, &request.author)?;
            return self.exclude(request.epoch, &request.collective, request.author);
        }

        let collective = self
            .collectives
            .get(&request.collective)
            .ok_or_else(|| StateError::CollectiveNotFound(request.collective.clone()))?;
        if collective.is_member(&request.author) {
            return Err(StateError::AlreadyCollectiveMember {
                collective: request.collective,
                member: request.author,
            });
        }
        let hash = request.hashed()?;
        let pending = PendingMembership {
            epoch: request.epoch,
            candidate: request.author,
            gate: Gate::new(collective.photo(), hash),
            collective: request.collective,
        };
        self.propose(request.epoch, pending.into())
    }

    /// Removing oneself is immediate; removing anyone else is governed.
    pub fn remove_member(&mut self, remove: RemoveMember) -> StateResult<()> {
        let collective = self.collective_member(&remove.on_behalf_of, &remove.author)?;
        if !collective.is_member(&remove.member) {
            return Err(StateError::NotCollectiveMember {
                collective: remove.on_behalf_of,
                member: remove.member,
            });
        }
        if remove.member == remove.author {
            return self.exclude(remove.epoch, &remove.on_behalf_of, remove.member);
        }

        let hash = remove.hashed()?;
        let photo = collective.photo();
        let pending = PendingRemoval {
            epoch: remove.epoch,
            collective: remove.on_behalf_of,
            member: remove.member,
            gate: Gate::seeded(photo, Vote::submission(remove.epoch, remove.author, hash)),
        };
        self.propose(remove.epoch, pending.into())
    }

    /// Membership changes are idempotent, so only the collective itself must exist.
    pub(crate) fn check_collective(&self, name: &str) -> StateResult<()> {
        if !self.collectives.contains_key(name) {
            return Err(StateError::CollectiveNotFound(name.to_string()));
        }
        Ok(())
    }

    pub(crate) fn commit_update_collective(
        &mut self,
        epoch: Epoch,
        pending: PendingUpdateCollective,
    ) -> StateResult<()> {
        let collective = self
            .collectives
            .get_mut(&pending.collective)
            .ok_or_else(|| StateError::CollectiveNotFound(pending.collective.clone()))?;
        if let Some(description) = pending.description {
            collective.description = description;
        }
        if let Some(policy) = pending.policy {
            collective.policy = policy;
        }
        info!(name = %pending.collective, "Collective updated");
        self.record(epoch, StateEvent::CollectiveUpdated { name: pending.collective });
        Ok(())
    }

    pub(crate) fn commit_membership(&mut self, epoch: Epoch, pending: PendingMembership) -> StateResult<()> {
        let collective = self
            .collectives
            .get_mut(&pending.collective)
            .ok_or_else(|| StateError::CollectiveNotFound(pending.collective.clone()))?;
        collective.include_member(pending.candidate);
        info!(collective = %pending.collective, member = %pending.candidate, "Member included");
        self.record(
            epoch,
            StateEvent::MemberIncluded {
                collective: pending.collective,
                member: pending.candidate,
            },
        );
        Ok(())
    }

    pub(crate) fn commit_removal(&mut self, epoch: Epoch, pending: PendingRemoval) -> StateResult<()> {
        self.exclude(epoch, &pending.collective, pending.member)
    }

    fn exclude(&mut self, epoch: Epoch, name: &str, member: Token) -> StateResult<()> {
        let collective = self
            .collectives
            .get_mut(name)
            .ok_or_else(|| StateError::CollectiveNotFound(name.to_string()))?;
        collective.remove_member(&member);
        info!(collective = %name, %member, "Member removed");
        self.record(
            epoch,
            StateEvent::MemberRemoved {
                collective: name.to_string(),
                member,
            },
        );
        Ok(())
    }
}
