//! Synergy Consensus Groups
//!
//! Membership and threshold evaluation for the two kinds of deciding group:
//!
//! - **Named collective**: persistent, keyed by name, with a Majority and a
//!   SuperMajority percentage. Proposals capture a [`Collective::photo`] when
//!   they are opened.
//! - **Ad-hoc group**: ephemeral member set with a single threshold, used
//!   for draft co-authors, board editors and event managers.
//!
//! A group of `n` members at `p` percent needs `min(floor(n * p / 100) + 1, n)`
//! approvals. Votes reach a group only through a [`Ballot`], which rejects a
//! mismatched hash, a repeated author, or an author outside every eligible
//! group.

#![deny(unsafe_code)]

mod adhoc;
mod authors;
mod ballot;
mod collective;
mod error;
mod group;

pub use adhoc::AdhocGroup;
pub use authors::Group;
pub use ballot::Ballot;
pub use collective::Collective;
pub use error::VoteError;
pub use group::{count_approvals, required_votes, Consensual};
