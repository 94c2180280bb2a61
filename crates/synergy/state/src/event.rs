//! Events: proposed by a collective, then run by their managers.
//!
//! An event becomes live once the owning collective approves it. While live,
//! managers decide updates (only the fields present in the update apply) and
//! cancellation, which is terminal. Check-ins and greetings need no
//! consensus.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synergy_consensus::{AdhocGroup, Collective, Consensual};
use synergy_types::actions::{
    AcceptCheckinEvent, CancelEvent, CheckinEvent, CreateEvent, Instruction, UpdateEvent,
};
use synergy_types::{Epoch, Hash, Token, Vote};
use tracing::{debug, info};

use crate::error::{StateError, StateResult};
use crate::journal::StateEvent;
use crate::registry::{gated, Gate};
use crate::state::State;

/// A manager's reply to a check-in, possibly carrying private content for
/// the checked-in member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub epoch: Epoch,
    pub manager: Token,
    pub secret_key: Vec<u8>,
    pub content_type: String,
    pub private_content: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub hash: Hash,
    pub collective: String,
    pub start_at: DateTime<Utc>,
    pub estimated_end: DateTime<Utc>,
    pub description: String,
    pub venue: String,
    pub open: bool,
    pub public: bool,
    pub managers: AdhocGroup,
    /// Checked-in members and the greeting each received, if any
    pub checkin: BTreeMap<Token, Option<Greeting>>,
    pub live: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEvent {
    pub epoch: Epoch,
    pub event: Event,
    pub gate: Gate<Collective>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEventUpdate {
    pub epoch: Epoch,
    pub event: Hash,
    pub start_at: Option<DateTime<Utc>>,
    pub estimated_end: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub open: Option<bool>,
    pub public: Option<bool>,
    pub managers: Option<Vec<Token>>,
    pub gate: Gate<AdhocGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEventCancel {
    pub epoch: Epoch,
    pub event: Hash,
    pub gate: Gate<AdhocGroup>,
}

gated!(PendingEvent, PendingEventUpdate, PendingEventCancel);

impl State {
    /// Without listed managers, any one member of the owning collective (as
    /// of proposal time) manages the event.
    pub fn create_event(&mut self, create: CreateEvent) -> StateResult<()> {
        if create.estimated_end < create.start_at {
            return Err(StateError::InvalidEventSchedule);
        }
        for manager in &create.managers {
            self.require_member(manager)?;
        }
        let hash = create.hashed()?;
        let photo = self.collective_member(&create.on_behalf_of, &create.author)?.photo();
        let managers = if create.managers.is_empty() {
            AdhocGroup::new(0, photo.members.iter().copied())
        } else {
            AdhocGroup::new(photo.policy.majority, create.managers)
        };

        let event = Event {
            hash,
            collective: create.on_behalf_of,
            start_at: create.start_at,
            estimated_end: create.estimated_end,
            description: create.description,
            venue: create.venue,
            open: create.open,
            public: create.public,
            managers,
            checkin: BTreeMap::new(),
            live: false,
        };
        let pending = PendingEvent {
            epoch: create.epoch,
            event,
            gate: Gate::seeded(photo, Vote::submission(create.epoch, create.author, hash)),
        };
        self.propose(create.epoch, pending.into())
    }

    pub fn update_event(&mut self, update: UpdateEvent) -> StateResult<()> {
        let hash = update.hashed()?;
        let event = self.managed_event(&update.event_hash, &update.author)?;
        let start_at = update.start_at.unwrap_or(event.start_at);
        let estimated_end = update.estimated_end.unwrap_or(event.estimated_end);
        if estimated_end < start_at {
            return Err(StateError::InvalidEventSchedule);
        }
        if let Some(managers) = &update.managers {
            for manager in managers {
                self.require_member(manager)?;
            }
        }
        let managers = event.managers.clone();
        let pending = PendingEventUpdate {
            epoch: update.epoch,
            event: update.event_hash,
            start_at: update.start_at,
            estimated_end: update.estimated_end,
            description: update.description,
            venue: update.venue,
            open: update.open,
            public: update.public,
            managers: update.managers,
            gate: Gate::seeded(managers, Vote::submission(update.epoch, update.author, hash)),
        };
        self.propose(update.epoch, pending.into())
    }

    pub fn cancel_event(&mut self, cancel: CancelEvent) -> StateResult<()> {
        let hash = cancel.hashed()?;
        let managers = self.managed_event(&cancel.hash, &cancel.author)?.managers.clone();
        let pending = PendingEventCancel {
            epoch: cancel.epoch,
            event: cancel.hash,
            gate: Gate::seeded(managers, Vote::submission(cancel.epoch, cancel.author, hash)),
        };
        self.propose(cancel.epoch, pending.into())
    }

    /// Any member may check in once to a live event.
    pub fn checkin_event(&mut self, checkin: CheckinEvent) -> StateResult<()> {
        self.require_member(&checkin.author)?;
        let event = self.live_event_mut(&checkin.event_hash)?;
        if event.checkin.contains_key(&checkin.author) {
            return Err(StateError::AlreadyCheckedIn {
                event: checkin.event_hash,
                member: checkin.author,
            });
        }
        event.checkin.insert(checkin.author, None);
        debug!(event = %checkin.event_hash, member = %checkin.author, "Checked in");
        self.record(
            checkin.epoch,
            StateEvent::CheckedIn {
                event_hash: checkin.event_hash,
                member: checkin.author,
            },
        );
        Ok(())
    }

    /// A manager greets a checked-in member, once.
    pub fn accept_checkin_event(&mut self, accept: AcceptCheckinEvent) -> StateResult<()> {
        let event_hash = accept.event_hash;
        let event = self.live_event_mut(&event_hash)?;
        if !event.managers.is_member(&accept.author) {
            return Err(StateError::NotManager {
                event: event_hash,
                manager: accept.author,
            });
        }
        let slot = event
            .checkin
            .get_mut(&accept.checked_in)
            .ok_or(StateError::NotCheckedIn {
                event: event_hash,
                member: accept.checked_in,
            })?;
        if slot.is_some() {
            return Err(StateError::AlreadyGreeted {
                event: event_hash,
                member: accept.checked_in,
            });
        }
        *slot = Some(Greeting {
            epoch: accept.epoch,
            manager: accept.author,
            secret_key: accept.secret_key,
            content_type: accept.content_type,
            private_content: accept.private_content,
        });
        debug!(event = %event_hash, member = %accept.checked_in, "Greeted");
        self.record(
            accept.epoch,
            StateEvent::Greeted {
                event_hash,
                member: accept.checked_in,
            },
        );
        Ok(())
    }

    /// A live event `author` manages.
    fn managed_event(&self, hash: &Hash, author: &Token) -> StateResult<&Event> {
        let event = self.events.get(hash).ok_or(StateError::EventNotFound(*hash))?;
        if !event.live {
            return Err(StateError::EventNotLive(*hash));
        }
        if !event.managers.is_member(author) {
            return Err(StateError::NotManager {
                event: *hash,
                manager: *author,
            });
        }
        Ok(event)
    }

    /// Updates and cancellations only apply to an event that is still live.
    pub(crate) fn check_live_event(&self, hash: &Hash) -> StateResult<()> {
        let event = self.events.get(hash).ok_or(StateError::EventNotFound(*hash))?;
        if !event.live {
            return Err(StateError::EventNotLive(*hash));
        }
        Ok(())
    }

    fn live_event_mut(&mut self, hash: &Hash) -> StateResult<&mut Event> {
        let event = self
            .events
            .get_mut(hash)
            .ok_or(StateError::EventNotFound(*hash))?;
        if !event.live {
            return Err(StateError::EventNotLive(*hash));
        }
        Ok(event)
    }

    pub(crate) fn commit_event(&mut self, epoch: Epoch, pending: PendingEvent) -> StateResult<()> {
        let mut event = pending.event;
        let hash = event.hash;
        event.live = true;
        info!(%hash, collective = %event.collective, "Event created");
        self.events.insert(hash, event);
        self.record(epoch, StateEvent::EventCreated { hash });
        Ok(())
    }

    pub(crate) fn commit_event_update(
        &mut self,
        epoch: Epoch,
        pending: PendingEventUpdate,
    ) -> StateResult<()> {
        let hash = pending.event;
        let event = self.live_event_mut(&hash)?;
        if let Some(start_at) = pending.start_at {
            event.start_at = start_at;
        }
        if let Some(estimated_end) = pending.estimated_end {
            event.estimated_end = estimated_end;
        }
        if let Some(description) = pending.description {
            event.description = description;
        }
        if let Some(venue) = pending.venue {
            event.venue = venue;
        }
        if let Some(open) = pending.open {
            event.open = open;
        }
        if let Some(public) = pending.public {
            event.public = public;
        }
        if let Some(managers) = pending.managers {
            event.managers = AdhocGroup::new(event.managers.majority, managers);
        }
        info!(%hash, "Event updated");
        self.record(epoch, StateEvent::EventUpdated { hash });
        Ok(())
    }

    pub(crate) fn commit_event_cancel(
        &mut self,
        epoch: Epoch,
        pending: PendingEventCancel,
    ) -> StateResult<()> {
        let hash = pending.event;
        self.live_event_mut(&hash)?.live = false;
        info!(%hash, "Event cancelled");
        self.record(epoch, StateEvent::EventCancelled { hash });
        Ok(())
    }
}
