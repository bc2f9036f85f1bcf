//! Rolling loop, landing one-shots and background music.
//!
//! Sound assets are optional: anything the config does not name is skipped.
//! Music follows [`Playlist`] commands; a crossfade fades every playing channel
//! out while the new track fades in.

use bevy::{
    audio::{AudioSinkPlayback, Volume},
    prelude::*,
};
use rand::{SeedableRng, rngs::StdRng};
use shared::{Playlist, PlaylistCommand, utils::lerp};

use crate::{
    ball::{BallLanded, LatestFrame},
    config::GameConfig,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (load_sounds, start_music).chain());
    app.add_systems(
        Update,
        (
            update_roll_loop,
            play_landings,
            (advance_playlist, apply_music_fades).chain(),
        ),
    );
}

#[derive(Resource, Debug, Default)]
pub struct SoundHandles {
    pub landing: Option<Handle<AudioSource>>,
}

#[derive(Component)]
pub struct RollLoop;

#[derive(Resource)]
pub struct MusicDirector {
    playlist: Playlist,
    rng: StdRng,
    volume: f32,
}

/// One playing music track.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MusicChannel {
    fade: Option<Fade>,
}

/// Linear volume ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` and return the volume to apply.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
        self.volume()
    }

    pub fn volume(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        lerp(self.from, self.to, self.elapsed / self.duration)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

fn load_sounds(mut commands: Commands, config: Res<GameConfig>, assets: Res<AssetServer>) {
    let audio = &config.audio;

    if let Some(path) = &audio.roll_loop {
        commands.spawn((
            RollLoop,
            AudioPlayer::new(assets.load(path.clone())),
            PlaybackSettings::LOOP.with_volume(Volume::Linear(0.0)),
        ));
    }

    commands.insert_resource(SoundHandles {
        landing: audio.landing.as_ref().map(|path| assets.load(path.clone())),
    });

    commands.insert_resource(MusicDirector {
        playlist: Playlist::with_crossfade(audio.music.clone(), audio.music_crossfade),
        rng: StdRng::from_entropy(),
        volume: audio.music_volume,
    });
}

fn start_music(
    mut commands: Commands,
    mut director: ResMut<MusicDirector>,
    assets: Res<AssetServer>,
    time: Res<Time>,
) {
    let director = &mut *director;
    if director.playlist.tracks().is_empty() {
        info!("No music configured");
        return;
    }
    if let Some(command) = director.playlist.play_next(time.elapsed_secs(), &mut director.rng) {
        run_playlist_command(&mut commands, director, &assets, command, &mut std::iter::empty::<Mut<MusicChannel>>());
    }
}

fn update_roll_loop(latest: Res<LatestFrame>, mut sinks: Query<&mut AudioSink, With<RollLoop>>) {
    let Some(roll) = latest.0.and_then(|frame| frame.roll_audio) else {
        return;
    };
    for mut sink in &mut sinks {
        sink.set_speed(roll.pitch);
        sink.set_volume(Volume::Linear(roll.volume));
    }
}

fn play_landings(
    mut commands: Commands,
    mut landed: MessageReader<BallLanded>,
    sounds: Res<SoundHandles>,
) {
    for BallLanded(feedback) in landed.read() {
        let Some(handle) = &sounds.landing else {
            continue;
        };
        commands.spawn((
            AudioPlayer::new(handle.clone()),
            PlaybackSettings::DESPAWN
                .with_volume(Volume::Linear(feedback.volume))
                .with_speed(feedback.pitch),
        ));
    }
}

fn advance_playlist(
    mut commands: Commands,
    mut director: ResMut<MusicDirector>,
    mut channels: Query<&mut MusicChannel>,
    assets: Res<AssetServer>,
    time: Res<Time>,
) {
    let director = &mut *director;
    let Some(command) = director
        .playlist
        .update(time.elapsed_secs(), &mut director.rng)
    else {
        return;
    };
    run_playlist_command(&mut commands, director, &assets, command, &mut channels.iter_mut());
}

fn run_playlist_command<'a>(
    commands: &mut Commands,
    director: &MusicDirector,
    assets: &AssetServer,
    command: PlaylistCommand,
    playing: &mut dyn Iterator<Item = Mut<'a, MusicChannel>>,
) {
    let (index, fade) = match command {
        PlaylistCommand::Play { index } => (index, None),
        PlaylistCommand::Crossfade { index, fade } => (index, Some(fade)),
    };
    let Some(track) = director.playlist.tracks().get(index) else {
        return;
    };

    let start_volume = if fade.is_some() { 0.0 } else { director.volume };
    if let Some(fade) = fade {
        for mut channel in playing {
            channel.fade = Some(Fade::new(director.volume, 0.0, fade));
        }
    }

    info!("Playing music track {index}: {}", track.path);
    commands.spawn((
        MusicChannel {
            fade: fade.map(|f| Fade::new(0.0, director.volume, f)),
        },
        AudioPlayer::new(assets.load(track.path.clone())),
        PlaybackSettings::DESPAWN.with_volume(Volume::Linear(start_volume)),
    ));
}

fn apply_music_fades(
    mut commands: Commands,
    mut channels: Query<(Entity, &mut MusicChannel, Option<&mut AudioSink>)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    for (entity, mut channel, sink) in &mut channels {
        let Some(fade) = channel.fade.as_mut() else {
            continue;
        };
        let volume = fade.advance(dt);
        let finished = fade.is_finished();

        if let Some(mut sink) = sink {
            sink.set_volume(Volume::Linear(volume));
        }

        if finished {
            if volume <= 0.0 {
                commands.entity(entity).try_despawn();
            } else {
                channel.fade = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_ramps_linearly_and_stops_at_the_target() {
        let mut fade = Fade::new(0.0, 0.6, 10.0);
        assert!((fade.advance(5.0) - 0.3).abs() < 1.0e-6);
        assert!(!fade.is_finished());

        assert!((fade.advance(7.0) - 0.6).abs() < 1.0e-6);
        assert!(fade.is_finished());
    }

    #[test]
    fn fade_out_reaches_silence() {
        let mut fade = Fade::new(0.6, 0.0, 2.0);
        fade.advance(1.0);
        assert!((fade.volume() - 0.3).abs() < 1.0e-6);
        assert_eq!(fade.advance(1.0), 0.0);
    }

    #[test]
    fn zero_length_fade_jumps_to_target() {
        let mut fade = Fade::new(1.0, 0.0, 0.0);
        assert_eq!(fade.advance(0.016), 0.0);
        assert!(fade.is_finished());
    }
}
