//! The consensus capability and its threshold arithmetic.

use std::collections::BTreeSet;

use synergy_types::{Hash, Token, Vote};

/// Number of approvals a group of `members` needs at `percentage`.
///
/// `floor(members * percentage / 100) + 1`, capped at `members`: a policy can
/// never demand more than unanimity, and a single-member group always needs
/// exactly that member. An empty group needs zero approvals and therefore can
/// never decide (see [`count_approvals`]).
pub fn required_votes(members: usize, percentage: u32) -> usize {
    let required = members * percentage as usize / 100 + 1;
    required.min(members)
}

/// Walks `votes` counting approvals of `hash` cast by `members`, stopping as
/// soon as `required` is reached.
///
/// Callers are expected to have filtered duplicate authors already (see
/// [`crate::Ballot`]); the count itself is order independent.
pub fn count_approvals(
    members: &BTreeSet<Token>,
    required: usize,
    hash: &Hash,
    votes: &[Vote],
) -> bool {
    if required == 0 {
        return false;
    }
    let mut count = 0;
    for vote in votes {
        if vote.approve && vote.hash == *hash && members.contains(&vote.author) {
            count += 1;
            if count >= required {
                return true;
            }
        }
    }
    false
}

/// Polymorphic membership + threshold capability shared by named collectives
/// and ad-hoc groups.
pub trait Consensual {
    fn is_member(&self, token: &Token) -> bool;

    /// Whether approvals in `votes` for `hash` reach the group's ordinary
    /// threshold.
    fn consensus(&self, hash: &Hash, votes: &[Vote]) -> bool;

    fn include_member(&mut self, token: Token);

    fn remove_member(&mut self, token: &Token);

    fn change_majority(&mut self, majority: u32);

    fn majority(&self) -> u32;

    /// Enumerable members, or `None` for a named collective whose membership
    /// must be looked up in live state rather than trusted from a listing.
    fn list_of_members(&self) -> Option<&BTreeSet<Token>>;

    /// Raw member set of this (possibly snapshotted) group.
    fn tokens(&self) -> &BTreeSet<Token>;

    /// Name of the collective, `None` for ad-hoc groups.
    fn collective_name(&self) -> Option<&str>;

    /// Every member approved `hash`.
    fn unanimous(&self, hash: &Hash, votes: &[Vote]) -> bool {
        let members = self.tokens();
        count_approvals(members, members.len(), hash, votes)
    }

    fn len(&self) -> usize {
        self.tokens().len()
    }

    fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }
}
