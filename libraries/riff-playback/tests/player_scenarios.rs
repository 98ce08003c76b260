//! Listening scenarios for the player
//!
//! Each test drives the player the way the UI and the audio output would,
//! and checks both player state and what the output was told to do.

use riff_core::{keys, Storage, Track, TrackId};
use riff_playback::{
    NullOutput, PlaybackConfig, PlaybackSnapshot, Player, PlayerEvent, RepeatMode,
};
use riff_storage::MemoryStore;
use std::sync::Arc;

// ===== Test Helpers =====

fn create_test_track(id: &str) -> Track {
    Track::new(id, format!("Track {id}"), "Test Artist", format!("https://cdn/{id}.mp3"))
        .with_duration(180.0)
}

fn abc() -> Vec<Track> {
    ["A", "B", "C"].iter().map(|id| create_test_track(id)).collect()
}

struct Rig {
    player: Player,
    output: NullOutput,
    storage: Storage,
}

fn rig() -> Rig {
    rig_with_storage(Storage::new(Arc::new(MemoryStore::new())))
}

fn rig_with_storage(storage: Storage) -> Rig {
    let output = NullOutput::new();
    let player = Player::new(
        PlaybackConfig::default(),
        Box::new(output.clone()),
        storage.clone(),
    );
    Rig {
        player,
        output,
        storage,
    }
}

// ===== Scenarios =====

#[test]
fn start_in_the_middle_of_liked_songs() {
    let mut rig = rig();
    let tracks = abc();

    rig.player
        .start_playback(&tracks[1], tracks.clone(), Some("Liked Songs"));

    assert_eq!(rig.player.current_index(), Some(1));
    assert!(rig.player.is_playing());
    assert_eq!(rig.player.play_context_name(), Some("Liked Songs"));
    assert_eq!(rig.player.upcoming().len(), 1);
}

#[test]
fn next_on_last_track_without_repeat_stops_at_zero() {
    let mut rig = rig();
    let tracks = abc();
    rig.player.start_playback(&tracks[2], tracks.clone(), None);
    rig.player.on_metadata_loaded(180.0);
    rig.player.on_time_update(95.0, 180.0);
    assert_eq!(rig.player.repeat_mode(), RepeatMode::Off);

    rig.player.next();

    assert!(!rig.player.is_playing());
    assert_eq!(rig.player.current_time(), 0.0);
    assert_eq!(rig.player.current_index(), Some(2));
    assert!(!rig.output.state().playing);
    assert_eq!(rig.output.state().position, 0.0);
}

#[test]
fn next_on_last_track_with_repeat_all_wraps_and_keeps_playing() {
    let mut rig = rig();
    let tracks = abc();
    rig.player.start_playback(&tracks[2], tracks.clone(), None);
    rig.player.toggle_repeat();
    assert_eq!(rig.player.repeat_mode(), RepeatMode::All);

    rig.player.next();

    assert_eq!(rig.player.current_index(), Some(0));
    assert!(rig.player.is_playing());
    assert_eq!(rig.output.state().url.as_deref(), Some("https://cdn/A.mp3"));
    assert!(rig.output.state().playing);
}

#[test]
fn shuffle_round_trip_restores_queue() {
    let mut rig = rig();
    let tracks: Vec<Track> = (0..15).map(|i| create_test_track(&format!("s{i}"))).collect();
    rig.player.start_playback(&tracks[4], tracks.clone(), None);
    let before = rig.player.queue().to_vec();

    rig.player.toggle_shuffle();
    rig.player.toggle_shuffle();

    assert_eq!(rig.player.queue(), before.as_slice());
    assert_eq!(rig.player.current_index(), Some(4));
}

#[test]
fn tracks_play_through_to_the_end() {
    let mut rig = rig();
    let tracks = abc();
    rig.player.start_playback(&tracks[0], tracks.clone(), Some("Album"));

    rig.player.on_ended();
    rig.player.on_ended();
    assert_eq!(rig.player.current_track().map(|t| t.id.as_str()), Some("C"));
    assert!(rig.player.is_playing());

    rig.player.on_ended();
    assert!(!rig.player.is_playing());
    assert_eq!(rig.player.current_track().map(|t| t.id.as_str()), Some("C"));
    assert_eq!(rig.output.state().loads, 3);
}

#[test]
fn repeat_one_loops_on_end() {
    let mut rig = rig();
    let tracks = abc();
    rig.player.start_playback(&tracks[1], tracks.clone(), None);
    rig.player.toggle_repeat();
    rig.player.toggle_repeat();

    rig.player.on_metadata_loaded(180.0);
    rig.player.on_time_update(179.0, 180.0);
    rig.player.on_ended();

    assert_eq!(rig.player.current_index(), Some(1));
    assert_eq!(rig.player.current_time(), 0.0);
    assert!(rig.player.is_playing());
    assert_eq!(rig.output.state().loads, 1);
}

#[test]
fn reload_resumes_where_the_listener_left_off() {
    let mut first = rig();
    let tracks = abc();
    first
        .player
        .start_playback(&tracks[1], tracks.clone(), Some("Focus"));
    first.player.toggle_shuffle();
    first.player.on_metadata_loaded(180.0);
    first.player.on_time_update(61.5, 180.0);
    first.player.set_volume(0.35);

    let mut second = rig_with_storage(first.storage.clone());
    let mut rx = second.player.events().subscribe();
    assert!(second.player.restore());

    assert_eq!(second.player.current_track().map(|t| t.id.as_str()), Some("B"));
    assert_eq!(second.player.play_context_name(), Some("Focus"));
    assert!(second.player.is_shuffle());
    assert!(!second.player.is_playing());
    assert_eq!(second.player.volume(), 0.35);
    assert_eq!(second.output.state().volume, 0.35);

    // The output cannot seek until metadata is in
    assert_eq!(second.output.state().position, 0.0);
    second.player.on_metadata_loaded(180.0);
    assert_eq!(second.output.state().position, 61.5);

    let events: Vec<PlayerEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(events.contains(&PlayerEvent::QueueUpdated));
}

#[test]
fn restore_accepts_snapshot_without_original_queue() {
    let storage = Storage::new(Arc::new(MemoryStore::new()));
    let raw = serde_json::json!({
        "currentTrack": create_test_track("B"),
        "queue": abc(),
        "playContextName": "Old",
        "isShuffle": false,
        "repeatMode": "one",
        "currentTime": 12.0
    });
    storage.set(keys::PLAYER_STATE, &raw);

    let mut rig = rig_with_storage(storage);
    assert!(rig.player.restore());

    assert_eq!(rig.player.original_queue(), rig.player.queue());
    assert_eq!(rig.player.repeat_mode(), RepeatMode::One);
    assert_eq!(rig.player.volume(), 1.0);
    assert_eq!(rig.player.current_time(), 12.0);
}

#[test]
fn restore_ignores_snapshot_without_track() {
    let storage = Storage::new(Arc::new(MemoryStore::new()));
    storage.set(
        keys::PLAYER_STATE,
        &serde_json::json!({ "currentTrack": null, "queue": [] }),
    );

    let mut rig = rig_with_storage(storage);
    assert!(!rig.player.restore());
    assert!(rig.player.current_track().is_none());
    assert_eq!(rig.output.state().loads, 0);
}

#[test]
fn removing_the_playing_track_keeps_it_until_shuffle_off() {
    let mut rig = rig();
    let tracks = abc();
    rig.player.start_playback(&tracks[0], tracks.clone(), Some("Mine"));
    rig.player.toggle_shuffle();

    rig.player.remove_from_context(&TrackId::new("A"));
    assert_eq!(rig.player.current_track().map(|t| t.id.as_str()), Some("A"));
    assert!(rig.player.is_playing());

    rig.player.toggle_shuffle();
    assert_eq!(rig.player.current_track().map(|t| t.id.as_str()), Some("B"));
    assert!(!rig.player.is_playing());
    assert_eq!(rig.player.queue().len(), 2);
}

#[test]
fn every_mutation_is_persisted() {
    let mut rig = rig();
    let tracks = abc();
    rig.player.start_playback(&tracks[0], tracks.clone(), None);

    rig.player.toggle_repeat();
    let saved: PlaybackSnapshot = rig.storage.get(keys::PLAYER_STATE).unwrap();
    assert_eq!(saved.repeat_mode, RepeatMode::All);

    rig.player.set_volume(0.5);
    let saved: PlaybackSnapshot = rig.storage.get(keys::PLAYER_STATE).unwrap();
    assert_eq!(saved.volume, Some(0.5));

    rig.player.next();
    let saved: PlaybackSnapshot = rig.storage.get(keys::PLAYER_STATE).unwrap();
    assert_eq!(saved.current_track.map(|t| t.id), Some(TrackId::new("B")));
}
