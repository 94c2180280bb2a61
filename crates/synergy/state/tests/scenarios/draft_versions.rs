//! Version chains: a new version needs the previous authors and every
//! newly introduced author.

use proptest::prelude::*;
use synergy_consensus::VoteError;
use synergy_state::{ProposalKind, State, StateError};
use synergy_types::{Hash, Policy, Token, Vote};

use crate::support::{draft, token, upload, with_members};

/// v1 by 1 with co-authors `co`, committed with every listed approval.
fn v1(state: &mut State, co: &[u8], majority: Option<u32>) -> Hash {
    let hash = upload(state, 1, b"version one");
    let mut action = draft(2, 1, hash);
    action.co_authors = co.iter().map(|s| token(*s)).collect();
    action.policy = majority.map(|m| Policy::new(m, m));
    state.incorporate_draft(action).unwrap();
    for seed in co {
        if state.has_proposal(&hash) {
            state.incorporate_vote(Vote::approve(2, token(*seed), hash)).unwrap();
        }
    }
    assert!(state.draft(&hash).unwrap().approved);
    hash
}

fn v2(author: u8, co: &[u8], majority: Option<u32>, previous: Hash) -> synergy_types::actions::Draft {
    let hash = Hash::of(b"version two");
    let mut action = draft(3, author, hash);
    action.co_authors = co.iter().map(|s| token(*s)).collect();
    action.policy = majority.map(|m| Policy::new(m, m));
    action.previous_draft = Some(previous);
    action
}

#[test]
fn newcomer_must_vote_even_when_both_groups_agree() {
    // A = 1, B = 2, C = 3
    let mut state = with_members(&[1, 2, 3]);
    let previous = v1(&mut state, &[2], Some(0));
    let next = upload(&mut state, 1, b"version two");

    state.incorporate_draft(v2(1, &[3], Some(0), previous)).unwrap();
    assert_eq!(state.proposal_kind(&next), Some(ProposalKind::Draft));

    // A approving twice is still one vote.
    assert_eq!(
        state.incorporate_vote(Vote::approve(3, token(1), next)),
        Err(StateError::Vote(VoteError::AlreadyCast(token(1))))
    );
    assert!(state.draft(&next).is_none());

    state.incorporate_vote(Vote::approve(4, token(3), next)).unwrap();
    let committed = state.draft(&next).unwrap();
    assert!(committed.approved);
    assert_eq!(committed.previous, Some(previous));
    assert!(!state.has_proposal(&next));
}

#[test]
fn previous_authors_must_reach_their_own_consensus() {
    let mut state = with_members(&[1, 2, 3]);
    // v1 authors {1, 2}, unanimous.
    let previous = v1(&mut state, &[2], None);
    let next = upload(&mut state, 2, b"version two");

    // v2 by 2 with newcomer 3, unanimous among {2, 3}.
    state.incorporate_draft(v2(2, &[3], None, previous)).unwrap();
    state.incorporate_vote(Vote::approve(3, token(3), next)).unwrap();
    assert!(state.draft(&next).is_none(), "previous group still lacks 1");

    state.incorporate_vote(Vote::approve(3, token(1), next)).unwrap();
    assert!(state.draft(&next).unwrap().approved);
}

#[test]
fn rejecting_newcomer_blocks_commit() {
    let mut state = with_members(&[1, 2, 3]);
    let previous = v1(&mut state, &[2], Some(0));
    let next = upload(&mut state, 1, b"version two");
    state.incorporate_draft(v2(1, &[3], Some(0), previous)).unwrap();

    state.incorporate_vote(Vote::reject(3, token(3), next)).unwrap();
    state.incorporate_vote(Vote::approve(3, token(2), next)).unwrap();
    assert!(state.draft(&next).is_none());
    assert!(state.has_proposal(&next));
}

#[test]
fn outsiders_cannot_vote_on_a_version() {
    let mut state = with_members(&[1, 2, 3, 4]);
    let previous = v1(&mut state, &[2], Some(0));
    let next = upload(&mut state, 1, b"version two");
    state.incorporate_draft(v2(1, &[3], Some(0), previous)).unwrap();
    assert_eq!(
        state.incorporate_vote(Vote::approve(3, token(4), next)),
        Err(StateError::Vote(VoteError::NotEligible(token(4))))
    );
}

#[test]
fn unknown_previous_version_is_rejected() {
    let mut state = with_members(&[1]);
    let missing = Hash::of(b"never drafted");
    upload(&mut state, 1, b"version two");
    assert_eq!(
        state.incorporate_draft(v2(1, &[], None, missing)),
        Err(StateError::DraftNotFound(missing))
    );
}

proptest! {
    /// Whatever subset of members votes, in whatever order, version two is
    /// never committed before every newcomer approved it.
    #[test]
    fn no_commit_without_every_newcomer(
        newcomers in prop::collection::btree_set(3u8..8, 1..5),
        ballots in prop::collection::vec((1u8..8, any::<bool>()), 0..20),
    ) {
        let mut state = with_members(&[1, 2, 3, 4, 5, 6, 7]);
        let previous = v1(&mut state, &[2], Some(0));
        let next = upload(&mut state, 1, b"version two");
        let co: Vec<u8> = newcomers.iter().copied().collect();
        state.incorporate_draft(v2(1, &co, Some(0), previous)).unwrap();

        let mut approved: Vec<Token> = Vec::new();
        for (seed, approve) in ballots {
            let vote = Vote { approve, ..Vote::approve(4, token(seed), next) };
            if state.incorporate_vote(vote).is_ok() && approve {
                approved.push(token(seed));
            }
            if state.draft(&next).is_some() {
                for newcomer in &newcomers {
                    prop_assert!(approved.contains(&token(*newcomer)));
                }
            }
        }
    }
}
