//! The root aggregate and its action dispatch.

use std::collections::{BTreeSet, HashMap};

use synergy_consensus::{Collective, Consensual};
use synergy_types::actions::{React, Signin};
use synergy_types::{Action, Epoch, Hash, Token, Vote};
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::draft::Draft;
use crate::edit::Edit;
use crate::error::{StateError, StateResult};
use crate::event::Event;
use crate::journal::{Journal, JournalEntry, StateEvent};
use crate::media::MediaAssembler;
use crate::registry::{Proposal, ProposalKind, Registry};
use crate::release::Release;

/// Canonical state of a synergy ledger plus its pending proposals.
///
/// `State` is the single mutation surface. It must be driven by one writer,
/// in non-decreasing epoch order (see [`crate::Replayer`]). Canonical maps
/// only change between handler calls; a handler that returns an error has
/// changed nothing.
#[derive(Debug)]
pub struct State {
    pub(crate) config: EngineConfig,
    pub(crate) epoch: Epoch,
    pub(crate) members: HashMap<Token, String>,
    pub(crate) handles: HashMap<String, Token>,
    pub(crate) collectives: HashMap<String, Collective>,
    pub(crate) boards: HashMap<String, Board>,
    pub(crate) drafts: HashMap<Hash, Draft>,
    pub(crate) edits: HashMap<Hash, Edit>,
    pub(crate) events: HashMap<Hash, Event>,
    pub(crate) releases: HashMap<Hash, Release>,
    pub(crate) reactions: HashMap<Hash, Vec<u64>>,
    pub(crate) media: MediaAssembler,
    pub(crate) registry: Registry,
    pub(crate) journal: Journal,
}

impl Default for State {
    fn default() -> Self {
        Self::genesis(EngineConfig::default())
    }
}

impl State {
    /// Empty state at epoch zero.
    pub fn genesis(config: EngineConfig) -> Self {
        let registry = Registry::new(config.proposal_deadline);
        let media = MediaAssembler::new(config.proposal_deadline);
        Self {
            config,
            epoch: 0,
            members: HashMap::new(),
            handles: HashMap::new(),
            collectives: HashMap::new(),
            boards: HashMap::new(),
            drafts: HashMap::new(),
            edits: HashMap::new(),
            events: HashMap::new(),
            releases: HashMap::new(),
            reactions: HashMap::new(),
            media,
            registry,
            journal: Journal::new(),
        }
    }

    /// Route a decoded action to its handler.
    pub fn apply(&mut self, action: Action) -> StateResult<()> {
        match action {
            Action::Vote(vote) => self.incorporate_vote(vote),
            Action::Signin(signin) => self.signin(signin),
            Action::CreateCollective(create) => self.create_collective(create),
            Action::UpdateCollective(update) => self.update_collective(update),
            Action::RequestMembership(request) => self.request_membership(request),
            Action::RemoveMember(remove) => self.remove_member(remove),
            Action::Draft(draft) => self.incorporate_draft(draft),
            Action::Edit(edit) => self.incorporate_edit(edit),
            Action::MultipartMedia(part) => self.media_part(part),
            Action::CreateBoard(create) => self.create_board(create),
            Action::UpdateBoard(update) => self.update_board(update),
            Action::Pin(pin) => self.pin(pin),
            Action::BoardEditor(editor) => self.board_editor(editor),
            Action::ReleaseDraft(release) => self.release_draft(release),
            Action::ImprintStamp(stamp) => self.imprint_stamp(stamp),
            Action::React(react) => self.react(react),
            Action::CreateEvent(create) => self.create_event(create),
            Action::CancelEvent(cancel) => self.cancel_event(cancel),
            Action::UpdateEvent(update) => self.update_event(update),
            Action::CheckinEvent(checkin) => self.checkin_event(checkin),
            Action::AcceptCheckinEvent(greet) => self.accept_checkin_event(greet),
        }
    }

    /// Advance to `epoch` and purge every proposal whose deadline has come.
    pub fn next_block(&mut self, epoch: Epoch) {
        self.epoch = epoch;
        for proposal in self.registry.expire(epoch) {
            let hash = proposal.hash();
            let kind = proposal.kind();
            info!(%hash, ?kind, epoch, "Proposal expired");
            self.record(epoch, StateEvent::ProposalExpired { hash, kind });
        }
        for hash in self.media.expire(epoch) {
            info!(%hash, epoch, "Incomplete media upload expired");
            self.record(epoch, StateEvent::MediaExpired { hash });
        }
    }

    /// Fold a vote into the proposal it names, committing the proposal when
    /// the vote completes its consensus.
    ///
    /// Votes naming an already approved draft are still recorded on the
    /// draft; they carry no further effect.
    pub fn incorporate_vote(&mut self, vote: Vote) -> StateResult<()> {
        let hash = vote.hash;
        let author = vote.author;
        let approve = vote.approve;
        let epoch = vote.epoch;

        if !self.registry.has(&hash) {
            if let Some(draft) = self.drafts.get_mut(&hash) {
                draft.ballot.cast(vote, &[&draft.authors])?;
                self.record(epoch, StateEvent::VoteAccepted { hash, author, approve });
                return Ok(());
            }
        }

        let resolved = self.registry.incorporate_vote(vote)?;
        self.record(epoch, StateEvent::VoteAccepted { hash, author, approve });
        if let Some(proposal) = resolved {
            let kind = proposal.kind();
            if let Err(err) = self.check_commit(&proposal) {
                // Another proposal already brought the ledger to this state.
                info!(%hash, ?kind, %err, "Resolved proposal no longer applies");
                self.record(epoch, StateEvent::ProposalDropped { hash, kind });
                return Ok(());
            }
            info!(%hash, ?kind, "Proposal resolved");
            self.record(epoch, StateEvent::ProposalResolved { hash, kind });
            self.commit(epoch, proposal)?;
        }
        Ok(())
    }

    /// Register a new member under a unique handle.
    pub fn signin(&mut self, signin: Signin) -> StateResult<()> {
        if self.members.contains_key(&signin.author) {
            return Err(StateError::MemberAlreadyExists(signin.author));
        }
        if self.handles.contains_key(&signin.handle) {
            return Err(StateError::HandleTaken(signin.handle));
        }
        info!(member = %signin.author, handle = %signin.handle, "Member signed in");
        self.members.insert(signin.author, signin.handle.clone());
        self.handles.insert(signin.handle.clone(), signin.author);
        self.record(
            signin.epoch,
            StateEvent::SignedIn {
                member: signin.author,
                handle: signin.handle,
            },
        );
        Ok(())
    }

    /// Count a reaction on any object hash.
    pub fn react(&mut self, react: React) -> StateResult<()> {
        self.require_member(&react.author)?;
        let count = self.config.reactions_count;
        if react.reaction >= count {
            return Err(StateError::InvalidReaction {
                reaction: react.reaction,
                count,
            });
        }
        if let Some(name) = &react.on_behalf_of {
            self.collective_member(name, &react.author)?;
        }
        let counters = self
            .reactions
            .entry(react.hash)
            .or_insert_with(|| vec![0; count as usize]);
        counters[react.reaction as usize] += 1;
        debug!(hash = %react.hash, reaction = react.reaction, "Reaction counted");
        self.record(
            react.epoch,
            StateEvent::Reacted {
                hash: react.hash,
                reaction: react.reaction,
            },
        );
        Ok(())
    }

    /// Commit `proposal` right away when it is already resolved, otherwise
    /// register it and schedule its expiry.
    pub(crate) fn propose(&mut self, epoch: Epoch, proposal: Proposal) -> StateResult<()> {
        if proposal.is_resolved() {
            self.check_commit(&proposal)?;
            return self.commit(epoch, proposal);
        }
        let kind = proposal.kind();
        let hash = self.registry.add(proposal)?;
        self.record(epoch, StateEvent::ProposalRegistered { hash, kind });
        Ok(())
    }

    /// Whether `proposal` can still be applied to the current ledger.
    fn check_commit(&self, proposal: &Proposal) -> StateResult<()> {
        match proposal {
            Proposal::UpdateCollective(p) => self.check_collective(&p.collective),
            Proposal::RequestMembership(p) => self.check_collective(&p.collective),
            Proposal::RemoveMember(p) => self.check_collective(&p.collective),
            Proposal::Draft(p) => self.check_draft(p),
            Proposal::Edit(p) => self.check_edit(p),
            Proposal::CreateBoard(p) => self.check_board(p),
            Proposal::UpdateBoard(p) => self.check_board_update(p),
            Proposal::Pin(p) => self.check_pin(p),
            Proposal::BoardEditor(p) => self.check_board_editor(p),
            Proposal::CreateEvent(_) => Ok(()),
            Proposal::UpdateEvent(p) => self.check_live_event(&p.event),
            Proposal::CancelEvent(p) => self.check_live_event(&p.event),
            Proposal::Release(p) => self.check_release(p),
            Proposal::Stamp(p) => self.check_stamp(p),
        }
    }

    fn commit(&mut self, epoch: Epoch, proposal: Proposal) -> StateResult<()> {
        match proposal {
            Proposal::UpdateCollective(p) => self.commit_update_collective(epoch, p),
            Proposal::RequestMembership(p) => self.commit_membership(epoch, p),
            Proposal::RemoveMember(p) => self.commit_removal(epoch, p),
            Proposal::Draft(p) => self.commit_draft(epoch, p),
            Proposal::Edit(p) => self.commit_edit(epoch, p),
            Proposal::CreateBoard(p) => self.commit_board(epoch, p),
            Proposal::UpdateBoard(p) => self.commit_board_update(epoch, p),
            Proposal::Pin(p) => self.commit_pin(epoch, p),
            Proposal::BoardEditor(p) => self.commit_board_editor(epoch, p),
            Proposal::CreateEvent(p) => self.commit_event(epoch, p),
            Proposal::UpdateEvent(p) => self.commit_event_update(epoch, p),
            Proposal::CancelEvent(p) => self.commit_event_cancel(epoch, p),
            Proposal::Release(p) => self.commit_release(epoch, p),
            Proposal::Stamp(p) => self.commit_stamp(epoch, p),
        }
    }

    pub(crate) fn record(&mut self, epoch: Epoch, event: StateEvent) {
        self.journal.record(epoch, event);
    }

    pub(crate) fn require_member(&self, token: &Token) -> StateResult<()> {
        if self.members.contains_key(token) {
            Ok(())
        } else {
            warn!(member = %token, "Action from unknown member");
            Err(StateError::NotMember(*token))
        }
    }

    /// The live collective `name`, provided `token` belongs to it.
    pub(crate) fn collective_member(&self, name: &str, token: &Token) -> StateResult<&Collective> {
        let collective = self
            .collectives
            .get(name)
            .ok_or_else(|| StateError::CollectiveNotFound(name.to_string()))?;
        if !collective.is_member(token) {
            return Err(StateError::NotCollectiveMember {
                collective: name.to_string(),
                member: *token,
            });
        }
        Ok(collective)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_member(&self, token: &Token) -> bool {
        self.members.contains_key(token)
    }

    pub fn member_handle(&self, token: &Token) -> Option<&str> {
        self.members.get(token).map(String::as_str)
    }

    pub fn member_token(&self, handle: &str) -> Option<Token> {
        self.handles.get(handle).copied()
    }

    pub fn members(&self) -> impl Iterator<Item = (&Token, &String)> {
        self.members.iter()
    }

    pub fn collective(&self, name: &str) -> Option<&Collective> {
        self.collectives.get(name)
    }

    pub fn collectives(&self) -> impl Iterator<Item = &Collective> {
        self.collectives.values()
    }

    pub fn board(&self, name: &str) -> Option<&Board> {
        self.boards.get(name)
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    pub fn draft(&self, hash: &Hash) -> Option<&Draft> {
        self.drafts.get(hash)
    }

    pub fn drafts(&self) -> impl Iterator<Item = &Draft> {
        self.drafts.values()
    }

    pub fn edit(&self, hash: &Hash) -> Option<&Edit> {
        self.edits.get(hash)
    }

    pub fn event(&self, hash: &Hash) -> Option<&Event> {
        self.events.get(hash)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn release(&self, draft: &Hash) -> Option<&Release> {
        self.releases.get(draft)
    }

    pub fn media(&self, hash: &Hash) -> Option<&[u8]> {
        self.media.get(hash)
    }

    /// Per-kind reaction counters of an object, if it has any.
    pub fn reactions(&self, hash: &Hash) -> Option<&[u64]> {
        self.reactions.get(hash).map(Vec::as_slice)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn has_proposal(&self, hash: &Hash) -> bool {
        self.registry.has(hash)
    }

    pub fn proposal_kind(&self, hash: &Hash) -> Option<ProposalKind> {
        self.registry.kind(hash)
    }

    /// Pending proposals `token` may vote on.
    pub fn get_votes(&self, token: &Token) -> BTreeSet<Hash> {
        self.registry.get_votes(token)
    }

    pub fn journal(&self) -> &[JournalEntry] {
        self.journal.entries()
    }

    /// Take every journal entry recorded since the last drain.
    pub fn drain_journal(&mut self) -> Vec<JournalEntry> {
        self.journal.drain()
    }
}
