//! Synergy State Machine
//!
//! The deterministic state-transition function of a synergy ledger. Given
//! decoded actions in epoch order, [`State`] decides for each one whether to
//! apply it at once, hold it as a pending proposal, or reject it.
//!
//! # Architecture
//!
//! - [`State`]: canonical members, collectives, boards, drafts, edits,
//!   events, releases and media, plus the proposal registry. Every action
//!   kind has one handler method; [`State::apply`] routes to them.
//! - [`Registry`]: flat hash-indexed store of pending proposals of every
//!   kind, with a per-member reverse index and the deadline schedule.
//! - Lifecycles: each pending kind holds a frozen copy of the group that
//!   decides it and commits into canonical state once that group reaches
//!   consensus.
//! - [`MediaAssembler`]: content-addressed media, reassembled from parts.
//! - [`Replayer`]: single writer enforcing non-decreasing epochs.
//!
//! Handlers are synchronous and perform no I/O. Committed mutations are
//! appended to a journal the host drains with [`State::drain_journal`].

#![deny(unsafe_code)]

mod board;
mod collective;
mod config;
mod draft;
mod edit;
mod error;
mod event;
mod journal;
mod media;
mod registry;
mod release;
mod replay;
mod state;

pub use board::{editor_hash, pin_hash, Board, PendingBoard, PendingBoardEditor, PendingBoardUpdate, PendingPin};
pub use collective::{PendingMembership, PendingRemoval, PendingUpdateCollective};
pub use config::{EngineConfig, DEFAULT_PROPOSAL_DEADLINE, DEFAULT_REACTIONS_COUNT};
pub use draft::{Draft, PendingDraft};
pub use edit::{Edit, PendingEdit};
pub use error::{StateError, StateResult};
pub use event::{Event, Greeting, PendingEvent, PendingEventCancel, PendingEventUpdate};
pub use journal::{Journal, JournalEntry, StateEvent};
pub use media::MediaAssembler;
pub use registry::{Gate, Pending, Proposal, ProposalKind, Registry};
pub use release::{PendingRelease, PendingStamp, Release, Stamp};
pub use replay::{ReplayReport, Replayer};
pub use state::State;
