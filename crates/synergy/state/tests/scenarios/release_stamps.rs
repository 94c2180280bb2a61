//! Releases decided by the draft's authors, stamps by a reputation
//! collective.

use synergy_consensus::VoteError;
use synergy_state::{ProposalKind, State, StateError, StateEvent};
use synergy_types::actions::{ImprintStamp, Instruction, ReleaseDraft};
use synergy_types::{Epoch, Hash, Policy, Vote};

use crate::support::{draft, found, token, upload, with_members};

/// Draft co-authored by 1 and 2, plus a "reviewers" collective {3, 4}.
fn setup() -> (State, Hash) {
    let mut state = with_members(&[1, 2, 3, 4]);
    found(&mut state, "reviewers", &[3, 4], Policy::new(50, 66));
    let hash = upload(&mut state, 1, b"paper");
    let mut action = draft(2, 1, hash);
    action.co_authors = vec![token(2)];
    state.incorporate_draft(action).unwrap();
    state.incorporate_vote(Vote::approve(2, token(2), hash)).unwrap();
    assert!(state.draft(&hash).unwrap().approved);
    (state, hash)
}

fn release(epoch: Epoch, seed: u8, draft: Hash) -> ReleaseDraft {
    ReleaseDraft {
        epoch,
        author: token(seed),
        reasons: String::new(),
        content_hash: draft,
    }
}

fn stamp(epoch: Epoch, seed: u8, draft: Hash) -> ImprintStamp {
    ImprintStamp {
        epoch,
        author: token(seed),
        reasons: String::new(),
        on_behalf_of: "reviewers".into(),
        hash: draft,
    }
}

fn released() -> (State, Hash) {
    let (mut state, hash) = setup();
    let action = release(3, 1, hash);
    let proposal = action.hashed().unwrap();
    state.release_draft(action).unwrap();
    assert!(state.release(&hash).is_none());
    state.incorporate_vote(Vote::approve(3, token(2), proposal)).unwrap();
    assert!(state.release(&hash).is_some());
    (state, hash)
}

#[test]
fn release_needs_the_draft_authors() {
    let (mut state, hash) = released();
    assert_eq!(
        state.release_draft(release(4, 2, hash)),
        Err(StateError::AlreadyReleased(hash))
    );
}

#[test]
fn competing_release_is_dropped_once_the_draft_is_out() {
    let (mut state, hash) = setup();
    let first = release(3, 1, hash);
    let second = release(4, 2, hash);
    let (first_hash, second_hash) = (first.hashed().unwrap(), second.hashed().unwrap());
    state.release_draft(first).unwrap();
    state.release_draft(second).unwrap();

    state.incorporate_vote(Vote::approve(5, token(2), first_hash)).unwrap();
    assert_eq!(state.release(&hash).unwrap().epoch, 5);
    state.drain_journal();

    state.incorporate_vote(Vote::approve(6, token(1), second_hash)).unwrap();
    assert!(!state.has_proposal(&second_hash));
    assert_eq!(state.release(&hash).unwrap().epoch, 5);

    let events: Vec<StateEvent> = state.drain_journal().into_iter().map(|entry| entry.event).collect();
    assert_eq!(
        events,
        vec![
            StateEvent::VoteAccepted {
                hash: second_hash,
                author: token(1),
                approve: true
            },
            StateEvent::ProposalDropped {
                hash: second_hash,
                kind: ProposalKind::Release
            },
        ]
    );
}

#[test]
fn outsiders_cannot_release() {
    let (mut state, hash) = setup();
    assert_eq!(
        state.release_draft(release(3, 3, hash)),
        Err(StateError::NotAuthor {
            draft: hash,
            author: token(3)
        })
    );
}

#[test]
fn stamp_is_decided_by_reputation_collective() {
    let (mut state, hash) = released();
    let action = stamp(4, 3, hash);
    let proposal = action.hashed().unwrap();
    state.imprint_stamp(action).unwrap();

    assert_eq!(
        state.incorporate_vote(Vote::approve(4, token(1), proposal)),
        Err(StateError::Vote(VoteError::NotEligible(token(1))))
    );
    state.incorporate_vote(Vote::approve(4, token(4), proposal)).unwrap();

    let release = state.release(&hash).unwrap();
    assert!(release.is_stamped_by("reviewers"));
    assert_eq!(release.stamps[0].epoch, 4);

    assert_eq!(
        state.imprint_stamp(stamp(5, 4, hash)),
        Err(StateError::AlreadyStamped {
            release: hash,
            collective: "reviewers".into()
        })
    );
}

#[test]
fn unreleased_drafts_cannot_be_stamped() {
    let (mut state, hash) = setup();
    assert_eq!(
        state.imprint_stamp(stamp(3, 3, hash)),
        Err(StateError::ReleaseNotFound(hash))
    );
}
