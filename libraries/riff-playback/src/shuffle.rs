//! Tail shuffling for the play queue
//!
//! Only tracks after the current position are permuted, so the playing
//! track and everything already heard keep their order.

use rand::seq::SliceRandom;
use rand::Rng;
use riff_core::Track;

/// Fisher-Yates shuffle of `tracks[from..]`
///
/// `from` past the end is a no-op.
pub fn shuffle_tail<R: Rng + ?Sized>(tracks: &mut [Track], from: usize, rng: &mut R) {
    if let Some(tail) = tracks.get_mut(from..) {
        tail.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn create_tracks(count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| {
                Track::new(
                    format!("t{i}"),
                    format!("Track {i}"),
                    "Test Artist",
                    format!("https://cdn/t{i}.mp3"),
                )
            })
            .collect()
    }

    fn ids(tracks: &[Track]) -> Vec<String> {
        tracks.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn head_is_untouched() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tracks = create_tracks(20);
        let before = ids(&tracks);

        shuffle_tail(&mut tracks, 5, &mut rng);

        assert_eq!(ids(&tracks)[..5], before[..5]);
    }

    #[test]
    fn tail_keeps_every_track() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut tracks = create_tracks(12);

        shuffle_tail(&mut tracks, 3, &mut rng);

        let seen: HashSet<String> = ids(&tracks).into_iter().collect();
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn tail_order_changes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tracks = create_tracks(30);
        let before = ids(&tracks);

        shuffle_tail(&mut tracks, 1, &mut rng);

        // 29! orderings; a fixed seed never lands on the identity
        assert_ne!(ids(&tracks), before);
    }

    #[test]
    fn out_of_range_start_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tracks = create_tracks(3);
        let before = ids(&tracks);

        shuffle_tail(&mut tracks, 3, &mut rng);
        shuffle_tail(&mut tracks, 10, &mut rng);

        assert_eq!(ids(&tracks), before);
    }

    #[test]
    fn empty_slice() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tracks: Vec<Track> = vec![];
        shuffle_tail(&mut tracks, 0, &mut rng);
        assert!(tracks.is_empty());
    }
}
