//! Replaying a serialized action feed end to end.

use synergy_state::{Replayer, StateEvent};
use synergy_types::actions::{CreateCollective, Instruction, RequestMembership, Signin};
use synergy_types::{Action, Policy, Vote};

use crate::support::token;

fn feed() -> Vec<Action> {
    let request = RequestMembership {
        epoch: 3,
        author: token(2),
        reasons: "I write too".into(),
        collective: "guild".into(),
        include: true,
    };
    let admission = request.hashed().unwrap();
    vec![
        Signin {
            epoch: 1,
            author: token(1),
            reasons: String::new(),
            handle: "ana".into(),
        }
        .into(),
        Signin {
            epoch: 1,
            author: token(2),
            reasons: String::new(),
            handle: "bia".into(),
        }
        .into(),
        CreateCollective {
            epoch: 2,
            author: token(1),
            reasons: String::new(),
            name: "guild".into(),
            description: "writers".into(),
            policy: Policy::new(50, 66),
        }
        .into(),
        request.into(),
        Vote::approve(4, token(1), admission).into(),
    ]
}

#[test]
fn json_lines_feed_replays_to_same_state() {
    let lines: Vec<String> = feed()
        .iter()
        .map(|action| serde_json::to_string(action).unwrap())
        .collect();
    let parsed: Vec<Action> = lines
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed, feed());

    let mut replayer = Replayer::default();
    let report = replayer.replay(parsed).unwrap();
    assert_eq!(report.applied, 5);
    assert!(report.rejected.is_empty());

    let state = replayer.state();
    assert_eq!(state.epoch(), 4);
    assert!(state.collective("guild").unwrap().members.contains(&token(2)));
    assert!(state.registry().is_empty());
}

#[test]
fn journal_follows_feed_order() {
    let mut replayer = Replayer::default();
    replayer.replay(feed()).unwrap();
    let events: Vec<StateEvent> = replayer
        .state_mut()
        .drain_journal()
        .into_iter()
        .map(|entry| entry.event)
        .collect();

    assert!(matches!(events[0], StateEvent::SignedIn { .. }));
    assert!(matches!(events[1], StateEvent::SignedIn { .. }));
    assert_eq!(events[2], StateEvent::CollectiveCreated { name: "guild".into() });
    assert!(matches!(events[3], StateEvent::ProposalRegistered { .. }));
    assert!(matches!(events[4], StateEvent::VoteAccepted { approve: true, .. }));
    assert!(matches!(events[5], StateEvent::ProposalResolved { .. }));
    assert_eq!(
        events[6],
        StateEvent::MemberIncluded {
            collective: "guild".into(),
            member: token(2)
        }
    );
    assert_eq!(events.len(), 7);
}
