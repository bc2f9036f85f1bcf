pub mod ball;
pub mod constants;
pub mod music;
pub mod race;
pub mod rapier;
pub mod rapier_world;
pub mod schedule;
pub mod types;
pub mod utils;

pub use ball::{BallBody, BallController, BallFrame, BallInput, BallSettings, CameraView};
pub use music::{MusicTrack, Playlist, PlaylistCommand};
pub use race::{CheckpointOutcome, GateOutcome, RaceEvent, RaceSettings, RaceState};
pub use rapier::{ColliderShapeDef, TriggerDef, WorldStaticDef, collider_from_def};
pub use rapier_world::{CheckpointDef, TrackEvent, TrackLayout, TrackWorld};
pub use schedule::{OneShotTimer, TimerHandle};
pub use types::{Iso, Quat, Vec3};
