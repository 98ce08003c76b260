//! Property-based tests for the player
//!
//! Uses proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use riff_core::{Storage, Track, TrackId};
use riff_playback::{NullOutput, PlaybackConfig, Player};
use riff_storage::MemoryStore;
use std::collections::HashSet;
use std::sync::Arc;

// ===== Helpers =====

fn arbitrary_tracks() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(("[A-Za-z ]{1,30}", "[A-Za-z ]{1,20}", 1u32..600), 1..40).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (title, artist, secs))| {
                    Track::new(format!("t{i}"), title, artist, format!("https://cdn/{i}.mp3"))
                        .with_duration(f64::from(secs))
                })
                .collect()
        },
    )
}

/// Tracks plus a valid starting position
fn tracks_and_start() -> impl Strategy<Value = (Vec<Track>, usize)> {
    arbitrary_tracks().prop_flat_map(|tracks| {
        let len = tracks.len();
        (Just(tracks), 0..len)
    })
}

fn create_player(storage: Storage) -> Player {
    Player::new(
        PlaybackConfig::default(),
        Box::new(NullOutput::new()),
        storage,
    )
}

fn memory_storage() -> Storage {
    Storage::new(Arc::new(MemoryStore::new()))
}

fn ids(tracks: &[Track]) -> Vec<TrackId> {
    tracks.iter().map(|t| t.id.clone()).collect()
}

/// Apply one encoded operation. Mute is left out so volume survives a
/// persist/restore cycle unchanged.
fn apply(player: &mut Player, op: u8, arg: u16, tracks: &[Track]) {
    match op {
        0 => player.next(),
        1 => player.previous(),
        2 => {
            player.toggle_shuffle();
        }
        3 => {
            player.toggle_repeat();
        }
        4 => player.set_volume(f64::from(arg % 101) / 100.0),
        5 => {
            player.on_metadata_loaded(600.0);
            player.on_time_update(f64::from(arg % 600), 600.0);
        }
        6 => {
            let victim = &tracks[usize::from(arg) % tracks.len()];
            player.remove_from_context(&victim.id);
        }
        _ => player.toggle_play_pause(),
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: the current index always points into the queue
    #[test]
    fn current_index_stays_in_bounds(
        (tracks, start) in tracks_and_start(),
        ops in prop::collection::vec((0u8..8, any::<u16>()), 1..40)
    ) {
        let mut player = create_player(memory_storage());
        player.start_playback(&tracks[start], tracks.clone(), Some("Mix"));

        for (op, arg) in ops {
            apply(&mut player, op, arg, &tracks);

            let index = player.current_index();
            prop_assert!(index.is_some(), "Lost the current track");
            prop_assert!(index.unwrap() < player.queue().len());
            prop_assert_eq!(
                player.current_track().map(|t| &t.id),
                index.map(|i| &player.queue()[i].id)
            );
        }
    }

    /// Property: shuffling keeps history and current track, and only
    /// reorders what comes next
    #[test]
    fn shuffle_preserves_prefix_and_contents((tracks, start) in tracks_and_start()) {
        let mut player = create_player(memory_storage());
        player.start_playback(&tracks[start], tracks.clone(), None);

        player.toggle_shuffle();

        let queue = player.queue();
        prop_assert_eq!(player.current_index(), Some(start));
        prop_assert_eq!(ids(&queue[..=start]), ids(&tracks[..=start]));

        let shuffled: HashSet<TrackId> = ids(queue).into_iter().collect();
        let expected: HashSet<TrackId> = ids(&tracks).into_iter().collect();
        prop_assert_eq!(queue.len(), tracks.len());
        prop_assert_eq!(shuffled, expected);
        prop_assert_eq!(ids(player.original_queue()), ids(&tracks));
    }

    /// Property: shuffle on then off gives back the context order and keeps
    /// the current track
    #[test]
    fn shuffle_off_restores_context_order(
        (tracks, start) in tracks_and_start(),
        skips in 0usize..5
    ) {
        let mut player = create_player(memory_storage());
        player.start_playback(&tracks[start], tracks.clone(), None);
        player.toggle_shuffle();
        for _ in 0..skips {
            player.next();
        }
        let playing = player.current_track().cloned();

        player.toggle_shuffle();

        prop_assert_eq!(ids(player.queue()), ids(&tracks));
        prop_assert_eq!(player.current_track().cloned(), playing);
    }

    /// Property: pausing twice is the same as pausing once
    #[test]
    fn pause_is_idempotent(
        (tracks, start) in tracks_and_start(),
        ops in prop::collection::vec((0u8..8, any::<u16>()), 0..10)
    ) {
        let mut player = create_player(memory_storage());
        player.start_playback(&tracks[start], tracks.clone(), None);
        for (op, arg) in ops {
            apply(&mut player, op, arg, &tracks);
        }

        player.pause();
        let once = player.state();
        player.pause();

        prop_assert_eq!(player.state(), once);
    }

    /// Property: a paused session survives persist and restore
    #[test]
    fn restore_reproduces_persisted_session(
        (tracks, start) in tracks_and_start(),
        ops in prop::collection::vec((0u8..8, any::<u16>()), 0..20)
    ) {
        let storage = memory_storage();
        let mut player = create_player(storage.clone());
        player.start_playback(&tracks[start], tracks.clone(), Some("Road Trip"));
        for (op, arg) in ops {
            apply(&mut player, op, arg, &tracks);
        }
        player.pause();
        let before = player.state();

        let mut restored = create_player(storage);
        prop_assert!(restored.restore());

        prop_assert_eq!(restored.state(), before);
    }
}
