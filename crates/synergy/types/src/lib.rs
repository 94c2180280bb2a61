//! Synergy Core Types
//!
//! Identities, votes and decoded actions shared by the consensus and state
//! crates.
//!
//! # Key Concepts
//!
//! - **Token**: opaque, externally issued member identity.
//! - **Hash**: BLAKE3 fingerprint used as content identity (drafts, media)
//!   and as proposal identity (hash of the originating action).
//! - **Epoch**: monotonic ledger step; proposal deadlines are measured in
//!   epochs, never wall-clock time.
//! - **Action**: one decoded, already-authenticated instruction from the feed.
//!
//! This is a pure types crate. All types implement `Clone`, `Debug`,
//! `Serialize`, `Deserialize`.

#![deny(unsafe_code)]

pub mod actions;
mod error;
mod hash;
mod policy;
mod vote;

pub use actions::{Action, ActionKind, Instruction};
pub use error::TypesError;
pub use hash::{Epoch, Hash, Token};
pub use policy::{Policy, MAX_PERCENTAGE};
pub use vote::{Vote, SUBMISSION_REASON};
