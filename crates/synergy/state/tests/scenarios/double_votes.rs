//! First vote wins: a second vote by the same author never counts.

use std::collections::BTreeMap;

use proptest::prelude::*;
use synergy_consensus::{required_votes, VoteError};
use synergy_state::StateError;
use synergy_types::actions::{CreateBoard, Instruction, RemoveMember};
use synergy_types::{Policy, Vote};

use crate::support::{found, token, with_members};

#[test]
fn reject_then_approve_keeps_the_reject() {
    let mut state = with_members(&[1, 2, 3]);
    found(&mut state, "guild", &[1, 2, 3], Policy::new(100, 100));
    let remove = RemoveMember {
        epoch: 2,
        author: token(1),
        reasons: String::new(),
        on_behalf_of: "guild".into(),
        member: token(3),
    };
    let hash = remove.hashed().unwrap();
    state.remove_member(remove).unwrap();

    state.incorporate_vote(Vote::reject(2, token(2), hash)).unwrap();
    assert_eq!(
        state.incorporate_vote(Vote::approve(2, token(2), hash)),
        Err(StateError::Vote(VoteError::AlreadyCast(token(2))))
    );
    state.incorporate_vote(Vote::approve(2, token(3), hash)).unwrap();

    assert!(state.has_proposal(&hash));
    assert!(state.collective("guild").unwrap().members.contains(&token(3)));
}

#[test]
fn proposer_cannot_vote_twice() {
    let mut state = with_members(&[1, 2, 3]);
    found(&mut state, "guild", &[1, 2, 3], Policy::new(50, 50));
    let create = CreateBoard {
        epoch: 2,
        author: token(1),
        reasons: String::new(),
        on_behalf_of: "guild".into(),
        name: "news".into(),
        description: String::new(),
        keywords: Vec::new(),
        pin_majority: 0,
    };
    let hash = create.hashed().unwrap();
    state.create_board(create).unwrap();
    assert_eq!(
        state.incorporate_vote(Vote::approve(2, token(1), hash)),
        Err(StateError::Vote(VoteError::AlreadyCast(token(1))))
    );
    assert!(state.board("news").is_none());
}

proptest! {
    /// The board commits exactly when the first votes of distinct members
    /// (the proposer's included) reach the threshold.
    #[test]
    fn only_first_votes_count(
        majority in 0u32..=100,
        ballots in prop::collection::vec((1u8..=5, any::<bool>()), 0..25),
    ) {
        let mut state = with_members(&[1, 2, 3, 4, 5]);
        found(&mut state, "guild", &[1, 2, 3, 4, 5], Policy::new(majority, 100));
        let create = CreateBoard {
            epoch: 2,
            author: token(1),
            reasons: String::new(),
            on_behalf_of: "guild".into(),
            name: "news".into(),
            description: String::new(),
            keywords: Vec::new(),
            pin_majority: 0,
        };
        let hash = create.hashed().unwrap();
        state.create_board(create).unwrap();

        let required = required_votes(5, majority);
        let mut first: BTreeMap<u8, bool> = BTreeMap::from([(1, true)]);
        for (seed, approve) in ballots {
            if state.board("news").is_some() {
                break;
            }
            let vote = Vote { approve, ..Vote::approve(2, token(seed), hash) };
            let accepted = state.incorporate_vote(vote).is_ok();
            prop_assert_eq!(accepted, !first.contains_key(&seed));
            first.entry(seed).or_insert(approve);

            let approvals = first.values().filter(|a| **a).count();
            prop_assert_eq!(state.board("news").is_some(), approvals >= required);
        }
    }
}
