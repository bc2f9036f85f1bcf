//! Rolling ball control: grounding, steering forces, hops, landings and the chase camera.
//!
//! Everything here is engine-agnostic. The physics backend implements [`BallBody`]
//! and the client feeds [`BallInput`] into [`BallController::tick`] every fixed step.

pub mod audio;
pub mod body;
pub mod camera;
pub mod controller;
pub mod countdown;
pub mod grounding;
pub mod landing;
pub mod movement;
pub mod settings;

pub use audio::RollAudio;
pub use body::{BallBody, GroundHit};
pub use camera::{CameraView, ChaseCamera};
pub use controller::{BallController, BallFrame, BallInput};
pub use countdown::{CountdownDisplay, CountdownEvent};
pub use landing::{Impact, LandingFeedback};
pub use settings::BallSettings;
