//! Multi-part uploads reassemble to the declared hash or not at all.

use proptest::prelude::*;
use synergy_state::{EngineConfig, State, StateError, StateEvent};
use synergy_types::actions::MultipartMedia;
use synergy_types::Hash;

use crate::support::{draft, token, with_config, with_members};

fn parts_of(content: &[u8], pieces: usize) -> Vec<Vec<u8>> {
    let size = content.len().div_ceil(pieces).max(1);
    content.chunks(size).map(<[u8]>::to_vec).collect()
}

fn send(state: &mut State, hash: Hash, index: usize, of: usize, data: Vec<u8>) -> Result<(), StateError> {
    state.media_part(MultipartMedia {
        epoch: 1,
        author: token(1),
        hash,
        part: (index + 1) as u8,
        of: of as u8,
        data,
    })
}

#[test]
fn partial_upload_cannot_back_a_draft() {
    let mut state = with_members(&[1]);
    let content = b"two halves of a draft".to_vec();
    let hash = Hash::of(&content);
    let parts = parts_of(&content, 2);
    send(&mut state, hash, 0, 2, parts[0].clone()).unwrap();

    assert_eq!(
        state.incorporate_draft(draft(2, 1, hash)),
        Err(StateError::MediaNotFound(hash))
    );

    send(&mut state, hash, 1, 2, parts[1].clone()).unwrap();
    state.incorporate_draft(draft(2, 1, hash)).unwrap();
    assert!(state.draft(&hash).is_some());
}

#[test]
fn assembly_is_journaled_once() {
    let mut state = with_members(&[1]);
    state.drain_journal();
    let content = b"abcdefgh".to_vec();
    let hash = Hash::of(&content);
    for (index, part) in parts_of(&content, 4).into_iter().enumerate() {
        send(&mut state, hash, index, 4, part).unwrap();
    }
    let journal = state.drain_journal();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].event, StateEvent::MediaAssembled { hash, size: 8 });
}

#[test]
fn stalled_upload_is_purged_at_the_deadline() {
    let config = EngineConfig {
        proposal_deadline: 10,
        ..Default::default()
    };
    let mut state = with_config(&[1], config);
    let content = b"never finished".to_vec();
    let hash = Hash::of(&content);
    let parts = parts_of(&content, 2);
    send(&mut state, hash, 0, 2, parts[0].clone()).unwrap();
    state.drain_journal();

    state.next_block(10);
    assert!(state.drain_journal().is_empty());

    state.next_block(11);
    let journal = state.drain_journal();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].event, StateEvent::MediaExpired { hash });

    // The second half alone no longer completes the upload.
    send(&mut state, hash, 1, 2, parts[1].clone()).unwrap();
    assert!(state.media(&hash).is_none());
}

proptest! {
    /// Parts sent in any order reassemble to the original content.
    #[test]
    fn reassembly_round_trip(
        content in prop::collection::vec(any::<u8>(), 1..2_000),
        pieces in 1usize..=8,
        order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let mut state = with_members(&[1]);
        let hash = Hash::of(&content);
        let parts = parts_of(&content, pieces);
        let of = parts.len();
        for index in order.into_iter().filter(|i| *i < of) {
            send(&mut state, hash, index, of, parts[index].clone()).unwrap();
        }
        prop_assert_eq!(state.media(&hash), Some(content.as_slice()));
    }

    /// A corrupted part rejects the whole upload.
    #[test]
    fn corrupted_part_is_rejected(
        content in prop::collection::vec(any::<u8>(), 2..2_000),
        pieces in 2usize..=8,
        victim in any::<prop::sample::Index>(),
    ) {
        let mut state = with_members(&[1]);
        let hash = Hash::of(&content);
        let mut parts = parts_of(&content, pieces);
        let of = parts.len();
        let broken = victim.index(of);
        parts[broken][0] ^= 0xff;

        let mut outcome = Ok(());
        for (index, part) in parts.into_iter().enumerate() {
            outcome = send(&mut state, hash, index, of, part);
        }
        let is_mismatch = matches!(outcome, Err(StateError::MediaHashMismatch { .. }));
        prop_assert!(is_mismatch);
        prop_assert!(state.media(&hash).is_none());
    }
}
