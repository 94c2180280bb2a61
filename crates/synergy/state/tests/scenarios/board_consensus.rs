//! A three-member collective with Majority 50 governs a board.

use synergy_consensus::{Consensual, VoteError};
use synergy_state::{editor_hash, pin_hash, ProposalKind, State, StateError, StateEvent};
use synergy_types::actions::{BoardEditor, CreateBoard, Instruction, Pin};
use synergy_types::{Epoch, Hash, Policy, Vote};

use crate::support::{admit, draft, found, token, upload, with_members};

fn guild() -> State {
    let mut state = with_members(&[1, 2, 3, 4]);
    found(&mut state, "guild", &[1, 2, 3], Policy::new(50, 66));
    state
}

fn create_board(epoch: Epoch) -> CreateBoard {
    CreateBoard {
        epoch,
        author: token(1),
        reasons: String::new(),
        on_behalf_of: "guild".into(),
        name: "news".into(),
        description: "curated reading".into(),
        keywords: vec!["reading".into()],
        pin_majority: 50,
    }
}

fn pin(epoch: Epoch, author: u8, draft: Hash, pin: bool) -> Pin {
    Pin {
        epoch,
        author: token(author),
        reasons: String::new(),
        board: "news".into(),
        draft,
        pin,
    }
}

/// Board "news" committed by members 1 and 2.
fn guild_with_board() -> State {
    let mut state = guild();
    let create = create_board(2);
    let hash = create.hashed().unwrap();
    state.create_board(create).unwrap();
    state.incorporate_vote(Vote::approve(2, token(2), hash)).unwrap();
    state
}

#[test]
fn single_self_vote_is_insufficient_second_vote_commits() {
    let mut state = guild();
    let create = create_board(2);
    let hash = create.hashed().unwrap();

    state.create_board(create).unwrap();
    assert!(state.board("news").is_none());
    assert_eq!(state.proposal_kind(&hash), Some(ProposalKind::CreateBoard));
    for seed in 1..=3 {
        assert!(state.get_votes(&token(seed)).contains(&hash));
    }

    state.incorporate_vote(Vote::approve(2, token(2), hash)).unwrap();
    let board = state.board("news").unwrap();
    assert_eq!(board.collective, "guild");
    assert!(board.editors.is_member(&token(1)));
    assert!(!state.has_proposal(&hash));
    assert!(state.get_votes(&token(3)).is_empty());
}

#[test]
fn pin_majority_above_hundred_is_rejected() {
    let mut state = guild();
    let mut create = create_board(2);
    create.pin_majority = 101;
    assert_eq!(state.create_board(create), Err(StateError::InvalidMajority(101)));
    assert_eq!(state.registry().len(), 0);
}

#[test]
fn second_board_with_the_same_name_is_dropped() {
    let mut state = guild();
    let first = create_board(2);
    let mut second = create_board(3);
    second.description = "rival".into();
    let (first_hash, second_hash) = (first.hashed().unwrap(), second.hashed().unwrap());
    state.create_board(first).unwrap();
    state.create_board(second).unwrap();

    state.incorporate_vote(Vote::approve(4, token(2), first_hash)).unwrap();
    state.drain_journal();
    state.incorporate_vote(Vote::approve(4, token(3), second_hash)).unwrap();

    assert_eq!(state.board("news").unwrap().description, "curated reading");
    assert!(!state.has_proposal(&second_hash));
    let journal = state.drain_journal();
    assert_eq!(
        journal.last().map(|entry| &entry.event),
        Some(&StateEvent::ProposalDropped {
            hash: second_hash,
            kind: ProposalKind::CreateBoard
        })
    );
}

#[test]
fn rejections_do_not_count() {
    let mut state = guild();
    let create = create_board(2);
    let hash = create.hashed().unwrap();
    state.create_board(create).unwrap();
    state.incorporate_vote(Vote::reject(2, token(2), hash)).unwrap();
    state.incorporate_vote(Vote::reject(2, token(3), hash)).unwrap();
    assert!(state.board("news").is_none());
    assert!(state.has_proposal(&hash));
}

#[test]
fn late_members_cannot_vote_on_earlier_proposals() {
    let mut state = guild();
    let create = create_board(2);
    let hash = create.hashed().unwrap();
    state.create_board(create).unwrap();

    admit(&mut state, "guild", 4, 3);
    assert_eq!(
        state.incorporate_vote(Vote::approve(3, token(4), hash)),
        Err(StateError::Vote(VoteError::NotEligible(token(4))))
    );
    assert!(state.board("news").is_none());
}

#[test]
fn pins_are_ordered_and_explicit() {
    let mut state = guild_with_board();
    let first = upload(&mut state, 1, b"first");
    let second = upload(&mut state, 1, b"second");
    state.incorporate_draft(draft(3, 1, first)).unwrap();
    state.incorporate_draft(draft(3, 1, second)).unwrap();

    state.pin(pin(4, 1, first, true)).unwrap();
    state.pin(pin(4, 1, second, true)).unwrap();
    let board = state.board("news").unwrap();
    assert_eq!(board.pinned, vec![first, second]);
    assert_eq!(board.last(1), &[second]);
    assert!(state.draft(&first).unwrap().pinned.contains("news"));

    assert_eq!(
        state.pin(pin(5, 1, first, true)),
        Err(StateError::AlreadyPinned {
            board: "news".into(),
            draft: first
        })
    );

    state.pin(pin(5, 1, first, false)).unwrap();
    assert_eq!(state.board("news").unwrap().pinned, vec![second]);
    assert!(state.draft(&first).unwrap().pinned.is_empty());
    assert_eq!(
        state.pin(pin(6, 1, first, false)),
        Err(StateError::NotPinned {
            board: "news".into(),
            draft: first
        })
    );
}

#[test]
fn non_editors_cannot_pin() {
    let mut state = guild_with_board();
    let content = upload(&mut state, 2, b"outsider");
    state.incorporate_draft(draft(3, 2, content)).unwrap();
    assert_eq!(
        state.pin(pin(4, 2, content, true)),
        Err(StateError::NotEditor {
            board: "news".into(),
            editor: token(2)
        })
    );
}

#[test]
fn editor_changes_go_through_collective_and_gate_pins() {
    let mut state = guild_with_board();

    state
        .board_editor(BoardEditor {
            epoch: 3,
            author: token(1),
            reasons: String::new(),
            board: "news".into(),
            editor: token(2),
            insert: true,
        })
        .unwrap();
    let hash = editor_hash(3, &token(2), "news", true);
    assert_eq!(state.proposal_kind(&hash), Some(ProposalKind::BoardEditor));
    state.incorporate_vote(Vote::approve(3, token(3), hash)).unwrap();
    assert!(state.board("news").unwrap().editors.is_member(&token(2)));

    // Two editors at 50% now need both.
    let content = upload(&mut state, 2, b"paper");
    state.incorporate_draft(draft(4, 2, content)).unwrap();
    state.pin(pin(5, 2, content, true)).unwrap();
    let pin_proposal = pin_hash(5, &content, "news", true);
    assert!(state.has_proposal(&pin_proposal));
    assert!(state.board("news").unwrap().pinned.is_empty());

    state
        .incorporate_vote(Vote::approve(5, token(1), pin_proposal))
        .unwrap();
    assert_eq!(state.board("news").unwrap().pinned, vec![content]);
}
