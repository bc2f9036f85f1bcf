//! Background music rotation with crossfades.

use rand::Rng;

use crate::constants::MUSIC_CROSSFADE_S;
use crate::schedule::OneShotTimer;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MusicTrack {
    /// Asset path, resolved by the client.
    pub path: String,
    /// Length in seconds.
    pub duration: f32,
}

/// What the audio layer should do now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaylistCommand {
    /// Start track `index` at full volume.
    Play { index: usize },
    /// Fade track `index` in over `fade` seconds while fading the current one out.
    Crossfade { index: usize, fade: f32 },
}

/// Random, non-repeating track rotation.
#[derive(Clone, Debug)]
pub struct Playlist {
    tracks: Vec<MusicTrack>,
    crossfade: f32,
    last_index: Option<usize>,
    timer: OneShotTimer,
}

impl Playlist {
    pub fn new(tracks: Vec<MusicTrack>) -> Self {
        Self::with_crossfade(tracks, MUSIC_CROSSFADE_S)
    }

    pub fn with_crossfade(tracks: Vec<MusicTrack>, crossfade: f32) -> Self {
        Self {
            tracks,
            crossfade: crossfade.max(0.0),
            last_index: None,
            timer: OneShotTimer::default(),
        }
    }

    pub fn tracks(&self) -> &[MusicTrack] {
        &self.tracks
    }

    pub fn current(&self) -> Option<usize> {
        self.last_index
    }

    /// Pick a random track index, never the previous one when there is a choice.
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let count = self.tracks.len();
        match (count, self.last_index) {
            (0, _) => None,
            (1, _) => Some(0),
            (_, None) => Some(rng.gen_range(0..count)),
            (_, Some(last)) => {
                // Draw from the other `count - 1` slots.
                let draw = rng.gen_range(0..count - 1);
                Some(if draw >= last { draw + 1 } else { draw })
            }
        }
    }

    /// Switch to the next track and schedule the one after it.
    pub fn play_next<R: Rng + ?Sized>(&mut self, now: f32, rng: &mut R) -> Option<PlaylistCommand> {
        let index = self.pick(rng)?;
        let first = self.last_index.is_none();
        self.last_index = Some(index);

        let duration = self.tracks[index].duration;
        if duration > self.crossfade {
            self.timer.schedule(now, duration - self.crossfade);
        } else {
            self.timer.cancel();
        }

        log::info!("Music: playing {}", self.tracks[index].path);

        Some(if first {
            PlaylistCommand::Play { index }
        } else {
            PlaylistCommand::Crossfade {
                index,
                fade: self.crossfade,
            }
        })
    }

    /// Call every frame; returns a command when the next crossfade is due.
    pub fn update<R: Rng + ?Sized>(&mut self, now: f32, rng: &mut R) -> Option<PlaylistCommand> {
        self.timer.poll(now)?;
        self.play_next(now, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    fn tracks(durations: &[f32]) -> Vec<MusicTrack> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &duration)| MusicTrack {
                path: format!("music/track_{i}.ogg"),
                duration,
            })
            .collect()
    }

    #[test]
    fn never_repeats_previous_track() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut playlist = Playlist::new(tracks(&[60.0, 90.0, 120.0]));

        let mut previous = None;
        for i in 0..200 {
            let cmd = playlist.play_next(i as f32, &mut rng).unwrap();
            let index = match cmd {
                PlaylistCommand::Play { index } | PlaylistCommand::Crossfade { index, .. } => index,
            };
            assert_ne!(Some(index), previous);
            previous = Some(index);
        }
    }

    #[test]
    fn first_track_plays_then_crossfades_before_the_end() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut playlist = Playlist::new(tracks(&[60.0, 60.0]));

        assert!(matches!(playlist.play_next(0.0, &mut rng), Some(PlaylistCommand::Play { .. })));
        assert_eq!(playlist.update(49.9, &mut rng), None);
        assert!(matches!(
            playlist.update(50.0, &mut rng),
            Some(PlaylistCommand::Crossfade { fade, .. }) if fade == MUSIC_CROSSFADE_S
        ));
    }

    #[test]
    fn short_tracks_do_not_schedule_a_follow_up() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut playlist = Playlist::new(tracks(&[5.0]));
        assert!(playlist.play_next(0.0, &mut rng).is_some());
        assert_eq!(playlist.update(1000.0, &mut rng), None);
    }

    #[test]
    fn empty_playlist_is_silent() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut playlist = Playlist::new(Vec::new());
        assert_eq!(playlist.play_next(0.0, &mut rng), None);
    }
}
