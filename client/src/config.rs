//! Game configuration loaded from `assets/config/game.ron`.
//!
//! Every section falls back to its defaults, so the file only needs to name the
//! values it changes. A missing file is not an error; a broken one is reported and
//! replaced by the defaults. `validate` produces non-fatal warnings.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{BallSettings, MusicTrack, RaceSettings, TrackLayout};

pub const CONFIG_PATH: &str = "assets/config/game.ron";

/// Resolve [`CONFIG_PATH`] against the same root Bevy uses for assets.
fn config_path() -> PathBuf {
    std::env::var_os("BEVY_ASSET_ROOT")
        .or_else(|| std::env::var_os("CARGO_MANIFEST_DIR"))
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(CONFIG_PATH)
}

pub(super) fn plugin(app: &mut App) {
    let path = config_path();
    let (config, error) = GameConfig::load_or_default(&path);

    match error {
        Some(e) => warn!("{}: {e}; using defaults", path.display()),
        None if !path.exists() => info!("No config at {}; using defaults", path.display()),
        None => info!("Loaded config from {}", path.display()),
    }
    for warning in config.validate() {
        warn!("Config: {warning}");
    }

    app.insert_resource(config);
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub ball: BallSettings,
    pub race: RaceSettings,
    pub audio: AudioConfig,
    /// Replaces the built-in track when present.
    pub track: Option<TrackLayout>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ball: BallSettings::default(),
            race: RaceSettings::default(),
            audio: AudioConfig::default(),
            track: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Looping rolling sound, relative to `assets/`.
    pub roll_loop: Option<String>,
    /// One-shot played on hard landings.
    pub landing: Option<String>,
    pub music: Vec<MusicTrack>,
    pub music_crossfade: f32,
    pub music_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            roll_loop: None,
            landing: None,
            music: Vec::new(),
            music_crossfade: shared::constants::MUSIC_CROSSFADE_S,
            music_volume: 0.6,
        }
    }
}

impl GameConfig {
    pub fn from_ron(data: &str) -> Result<Self, String> {
        ron::from_str(data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        Self::from_ron(&data)
    }

    /// Defaults when the file is absent; defaults plus the error when it is unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        if !path.as_ref().exists() {
            return (Self::default(), None);
        }
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .ball
            .validate()
            .into_iter()
            .map(|w| format!("ball.{w}"))
            .collect();

        let race = &self.race;
        if race.gate_cooldown < 0.0 {
            warnings.push("race.gate_cooldown must not be negative".into());
        }
        if race.lap_time_broadcast_interval <= 0.0 {
            warnings.push("race.lap_time_broadcast_interval must be positive".into());
        }

        let audio = &self.audio;
        if audio.music_crossfade < 0.0 {
            warnings.push("audio.music_crossfade must not be negative".into());
        }
        if !(0.0..=1.0).contains(&audio.music_volume) {
            warnings.push("audio.music_volume should be within [0, 1]".into());
        }
        for (i, track) in audio.music.iter().enumerate() {
            if track.path.is_empty() {
                warnings.push(format!("audio.music[{i}] has an empty path"));
            }
            if track.duration <= 0.0 {
                warnings.push(format!("audio.music[{i}] has a non-positive duration"));
            }
        }

        if let Some(track) = &self.track {
            warnings.extend(
                shared::rapier::validate_statics(&track.statics)
                    .into_iter()
                    .map(|w| format!("track.{w}")),
            );
            let indices: Vec<u32> = track.checkpoints.iter().map(|c| c.index).collect();
            warnings.extend(
                shared::race::validate_checkpoint_indices(&indices)
                    .into_iter()
                    .map(|w| format!("track.{w}")),
            );
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_no_warnings() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
        assert!(cfg.track.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_everything_else() {
        let sample = r#"(
            ball: (
                movement: (max_speed: 30.0),
                countdown: (enabled: false),
            ),
            race: (gate_cooldown: 1.5, total_checkpoints_override: Some(4)),
            audio: (
                roll_loop: Some("audio/roll.ogg"),
                music: [(path: "music/one.ogg", duration: 120.0)],
            ),
        )"#;
        let cfg = GameConfig::load_from_file(write_temp(sample).path()).expect("parse config");

        assert_eq!(cfg.ball.movement.max_speed, 30.0);
        assert!(!cfg.ball.countdown.enabled);
        assert_eq!(cfg.ball.hop, BallSettings::default().hop);
        assert_eq!(cfg.race.gate_cooldown, 1.5);
        assert_eq!(cfg.race.total_checkpoints_override, Some(4));
        assert!(cfg.race.require_checkpoints_to_finish);
        assert_eq!(cfg.audio.roll_loop.as_deref(), Some("audio/roll.ogg"));
        assert_eq!(cfg.audio.music.len(), 1);
        assert_eq!(cfg.audio.music_crossfade, AudioConfig::default().music_crossfade);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn missing_file_is_silently_defaulted() {
        let (cfg, error) = GameConfig::load_or_default("definitely/not/here/game.ron");
        assert!(error.is_none());
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn broken_file_reports_and_defaults() {
        let file = write_temp("(ball: (movement: (max_speed: \"fast\")))");
        let (cfg, error) = GameConfig::load_or_default(file.path());
        assert!(error.is_some_and(|e| e.contains("parse RON")));
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn validate_detects_warnings() {
        let mut bad = GameConfig::default();
        bad.ball.body.radius = 0.0;
        bad.race.lap_time_broadcast_interval = 0.0;
        bad.audio.music_volume = 2.0;
        bad.audio.music.push(MusicTrack {
            path: String::new(),
            duration: -1.0,
        });

        let warnings = bad.validate();
        let joined = warnings.join(" | ");
        assert!(joined.contains("ball.body.radius"), "{joined}");
        assert!(joined.contains("lap_time_broadcast_interval"), "{joined}");
        assert!(joined.contains("music_volume"), "{joined}");
        assert!(joined.contains("empty path"), "{joined}");
        assert!(joined.contains("non-positive duration"), "{joined}");
    }

    #[test]
    fn builtin_track_validates_clean() {
        let cfg = GameConfig {
            track: Some(crate::track::builtin_layout()),
            ..default()
        };
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tmp");
        f.write_all(contents.as_bytes()).unwrap();
        f
    }
}
