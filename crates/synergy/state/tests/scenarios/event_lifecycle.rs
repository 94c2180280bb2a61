//! Events: collective approval, manager-governed updates and cancellation,
//! check-ins and greetings.

use chrono::{DateTime, TimeZone, Utc};
use synergy_consensus::{Consensual, VoteError};
use synergy_state::{State, StateError};
use synergy_types::actions::{AcceptCheckinEvent, CancelEvent, CheckinEvent, CreateEvent, Instruction, UpdateEvent};
use synergy_types::{Epoch, Hash, Policy, Token, Vote};

use crate::support::{found, token, with_members};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

fn create(managers: Vec<Token>) -> CreateEvent {
    CreateEvent {
        epoch: 2,
        author: token(1),
        reasons: String::new(),
        on_behalf_of: "guild".into(),
        start_at: at(18),
        estimated_end: at(21),
        description: "reading night".into(),
        venue: "library".into(),
        open: true,
        public: false,
        managers,
    }
}

/// Live event approved by members 1 and 2 of a three-member guild.
fn live_event(managers: Vec<Token>) -> (State, Hash) {
    let mut state = with_members(&[1, 2, 3, 4]);
    found(&mut state, "guild", &[1, 2, 3], Policy::new(50, 66));
    let action = create(managers);
    let hash = action.hashed().unwrap();
    state.create_event(action).unwrap();
    assert!(state.event(&hash).is_none());
    state.incorporate_vote(Vote::approve(2, token(2), hash)).unwrap();
    assert!(state.event(&hash).unwrap().live);
    (state, hash)
}

fn checkin(epoch: Epoch, seed: u8, event: Hash) -> CheckinEvent {
    CheckinEvent {
        epoch,
        author: token(seed),
        reasons: String::new(),
        event_hash: event,
    }
}

fn greet(manager: u8, member: u8, event: Hash) -> AcceptCheckinEvent {
    AcceptCheckinEvent {
        epoch: 4,
        author: token(manager),
        reasons: String::new(),
        event_hash: event,
        checked_in: token(member),
        secret_key: vec![7; 4],
        content_type: "text/plain".into(),
        private_content: b"welcome".to_vec(),
    }
}

fn cancel(epoch: Epoch, seed: u8, event: Hash) -> CancelEvent {
    CancelEvent {
        epoch,
        author: token(seed),
        reasons: String::new(),
        hash: event,
    }
}

#[test]
fn default_managers_are_the_collective() {
    let (state, hash) = live_event(Vec::new());
    let managers = &state.event(&hash).unwrap().managers;
    assert_eq!(managers.len(), 3);
    assert_eq!(managers.majority, 0);
}

#[test]
fn checkin_and_greeting_happen_once() {
    let (mut state, hash) = live_event(Vec::new());

    state.checkin_event(checkin(3, 4, hash)).unwrap();
    assert_eq!(
        state.checkin_event(checkin(3, 4, hash)),
        Err(StateError::AlreadyCheckedIn {
            event: hash,
            member: token(4)
        })
    );

    assert_eq!(
        state.accept_checkin_event(greet(4, 4, hash)),
        Err(StateError::NotManager {
            event: hash,
            manager: token(4)
        })
    );
    assert_eq!(
        state.accept_checkin_event(greet(2, 3, hash)),
        Err(StateError::NotCheckedIn {
            event: hash,
            member: token(3)
        })
    );

    state.accept_checkin_event(greet(2, 4, hash)).unwrap();
    let greeting = state.event(&hash).unwrap().checkin[&token(4)].clone().unwrap();
    assert_eq!(greeting.manager, token(2));
    assert_eq!(greeting.private_content, b"welcome".to_vec());

    assert_eq!(
        state.accept_checkin_event(greet(1, 4, hash)),
        Err(StateError::AlreadyGreeted {
            event: hash,
            member: token(4)
        })
    );
}

#[test]
fn update_applies_only_present_fields() {
    let (mut state, hash) = live_event(Vec::new());
    state
        .update_event(UpdateEvent {
            epoch: 3,
            author: token(3),
            reasons: String::new(),
            event_hash: hash,
            start_at: None,
            estimated_end: Some(at(23)),
            description: None,
            venue: Some("garden".into()),
            open: None,
            public: None,
            managers: None,
        })
        .unwrap();
    let event = state.event(&hash).unwrap();
    assert_eq!(event.venue, "garden");
    assert_eq!(event.estimated_end, at(23));
    assert_eq!(event.start_at, at(18));
    assert_eq!(event.description, "reading night");
}

#[test]
fn update_cannot_end_before_start() {
    let (mut state, hash) = live_event(Vec::new());
    let result = state.update_event(UpdateEvent {
        epoch: 3,
        author: token(1),
        reasons: String::new(),
        event_hash: hash,
        start_at: None,
        estimated_end: Some(at(10)),
        description: None,
        venue: None,
        open: None,
        public: None,
        managers: None,
    });
    assert_eq!(result, Err(StateError::InvalidEventSchedule));
}

#[test]
fn cancellation_is_terminal() {
    let (mut state, hash) = live_event(Vec::new());
    state.cancel_event(cancel(3, 1, hash)).unwrap();
    assert!(!state.event(&hash).unwrap().live);
    assert_eq!(
        state.checkin_event(checkin(4, 4, hash)),
        Err(StateError::EventNotLive(hash))
    );
    assert_eq!(
        state.cancel_event(cancel(4, 2, hash)),
        Err(StateError::EventNotLive(hash))
    );
}

#[test]
fn listed_managers_decide_by_collective_majority() {
    let (mut state, hash) = live_event(vec![token(1), token(2)]);
    let action = cancel(3, 1, hash);
    let proposal = action.hashed().unwrap();
    state.cancel_event(action).unwrap();
    assert!(state.event(&hash).unwrap().live);

    assert_eq!(
        state.incorporate_vote(Vote::approve(3, token(3), proposal)),
        Err(StateError::Vote(VoteError::NotEligible(token(3))))
    );
    state.incorporate_vote(Vote::approve(3, token(2), proposal)).unwrap();
    assert!(!state.event(&hash).unwrap().live);
}
