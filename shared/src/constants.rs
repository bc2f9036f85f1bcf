/*!
Default tuning for the ball, chase camera and race.

These constants are the documented defaults behind the settings structs in
[`crate::ball::settings`] and [`crate::race::RaceSettings`]. Per-run overrides
come from game config.

Notes
- Distances are in meters, time in seconds, the world is Y-up.
- Speeds are meters per second; "interp" values are exponential smoothing
  rates (1/seconds) consumed by [`crate::utils::interp_to`].
*/

// ---------------------------------------------------------------------------
// Race
// ---------------------------------------------------------------------------

/// Minimum time between two accepted start/finish gate crossings.
/// A single physical pass can produce several overlap events.
pub const GATE_COOLDOWN_S: f32 = 2.0;

/// Interval between lap time broadcasts while a lap is running (20 Hz).
pub const LAP_TIME_BROADCAST_INTERVAL_S: f32 = 0.05;

// ---------------------------------------------------------------------------
// Ball body
// ---------------------------------------------------------------------------

/// Collision sphere radius.
pub const BALL_RADIUS: f32 = 0.5;

/// Ball mass in kilograms.
pub const BALL_MASS_KG: f32 = 1.0;

pub const BALL_LINEAR_DAMPING: f32 = 0.15;
pub const BALL_ANGULAR_DAMPING: f32 = 0.05;

/// Gravity acceleration in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

// ---------------------------------------------------------------------------
// Grounding
// ---------------------------------------------------------------------------

/// How far below the ball center the ground sweep travels.
pub const GROUND_SWEEP_DISTANCE: f32 = 0.70;

/// Sweep sphere radius as a fraction of the ball radius.
/// Slightly smaller than the ball so edges do not snag the sweep.
pub const GROUND_SWEEP_RADIUS_SCALE: f32 = 0.95;

/// Minimum `normal.y` of a surface accepted as ground (about 56 degrees).
pub const WALKABLE_NORMAL_Y: f32 = 0.55;

/// Raw contact must last this long before the stable state flips to grounded.
pub const GROUND_CONFIRM_S: f32 = 0.03;

/// Grace window after losing raw contact before the stable state flips to airborne.
pub const COYOTE_TIME_S: f32 = 0.08;

/// Downward probe used to place the ball on the track at spawn.
pub const SPAWN_SNAP_DISTANCE: f32 = 5.0;

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Base steering force in newtons.
pub const MOVE_FORCE_N: f32 = 30.0;

/// Horizontal speed cap.
pub const MAX_SPEED_MPS: f32 = 18.0;

/// Force multiplier applied while airborne.
pub const AIR_CONTROL_MULTIPLIER: f32 = 0.25;

pub const INPUT_DIR_INTERP: f32 = 12.0;

/// Smoothed input below this squared length is treated as zero.
pub const INPUT_DRIFT_EPS_SQ: f32 = 0.001;

/// Force scale at rest; ramps to 1.0 at max speed.
pub const FORCE_SCALE_AT_REST: f32 = 0.35;

/// Fraction of the input magnitude removed at max speed.
pub const MAX_STEERING_REDUCTION: f32 = 0.4;

/// Ground `normal.y` at which slope attenuation starts (full force above).
pub const SLOPE_FULL_FORCE_DOT: f32 = 0.95;

/// Ground `normal.y` at which slope attenuation bottoms out.
pub const SLOPE_MIN_FORCE_DOT: f32 = 0.65;

/// Force multiplier at the steep end of the slope band.
pub const SLOPE_MIN_MULTIPLIER: f32 = 0.1;

/// Force boost on a vertical-ish surface, blended to 1.0 on flat ground.
pub const SLOPE_DOWNHILL_BOOST: f32 = 1.1;

/// Below this squared speed the rolling spin is left to the solver.
pub const ROLL_SYNC_MIN_SPEED_SQ: f32 = 0.001;

pub const ROLL_SYNC_INTERP: f32 = 15.0;

// ---------------------------------------------------------------------------
// Hop
// ---------------------------------------------------------------------------

/// Upward velocity change applied by a hop.
pub const HOP_VELOCITY_CHANGE_MPS: f32 = 4.0;

pub const HOP_COOLDOWN_S: f32 = 0.2;

// ---------------------------------------------------------------------------
// Landing
// ---------------------------------------------------------------------------

/// Impacts slower than this (vertical) are ignored entirely.
pub const IMPACT_MIN_VERTICAL_SPEED: f32 = 6.0;

/// Contact normals with `|n.y|` above this count as ground impacts.
pub const IMPACT_GROUND_NORMAL_Y: f32 = 0.7;

/// Vertical speed (downward) for an impact to count as a hard landing.
pub const HARD_LANDING_DOWN_SPEED: f32 = 18.0;

/// Contact impulse (N·s) required to trigger the landing damp.
pub const HARD_LANDING_IMPULSE: f32 = 10.0;

/// Upward assist on hard landings, as a fraction of the impact speed.
pub const LANDING_ASSIST_STRENGTH: f32 = 0.04;

pub const LANDING_CAMERA_LOCK_S: f32 = 0.12;
pub const LANDING_DAMP_S: f32 = 0.06;

/// Force multiplier while the landing damp is active.
pub const LANDING_DAMP_MULTIPLIER: f32 = 0.25;

/// Landings slower than this (vertical) produce no sound or shake.
pub const LANDING_FEEDBACK_MIN_SPEED: f32 = 3.0;

/// Vertical speed mapped to full landing feedback.
pub const LANDING_FEEDBACK_REFERENCE_SPEED: f32 = 20.0;

// ---------------------------------------------------------------------------
// Chase camera
// ---------------------------------------------------------------------------

pub const CAMERA_HEIGHT_OFFSET: f32 = 0.5;
pub const CAMERA_Z_INTERP: f32 = 6.5;
pub const CAMERA_MIN_DISTANCE: f32 = 4.2;
pub const CAMERA_MAX_DISTANCE: f32 = 5.6;
pub const CAMERA_DISTANCE_INTERP: f32 = 6.0;
pub const CAMERA_FOV_MIN_DEG: f32 = 90.0;
pub const CAMERA_FOV_MAX_DEG: f32 = 100.0;
pub const CAMERA_FOV_INTERP: f32 = 8.0;
pub const CAMERA_SPEED_INTERP: f32 = 4.0;
pub const CAMERA_MOVE_DIR_INTERP: f32 = 10.0;
pub const CAMERA_LOOK_AT_HEIGHT: f32 = 0.35;
pub const CAMERA_LOOK_AHEAD_MIN: f32 = 1.2;
pub const CAMERA_LOOK_AHEAD_MAX: f32 = 3.2;
pub const CAMERA_POSITION_INTERP: f32 = 12.0;
pub const CAMERA_ROTATION_INTERP: f32 = 14.0;

/// Seconds airborne before the camera anchor starts following the ball upward.
pub const CAMERA_AIRBORNE_FOLLOW_DELAY_S: f32 = 0.12;
pub const CAMERA_AIRBORNE_Z_INTERP: f32 = 4.5;

/// The vertical anchor never lags further than this below the ball.
pub const CAMERA_MAX_VERTICAL_LAG: f32 = 1.8;
pub const CAMERA_MAX_BELOW_BALL: f32 = 1.8;
pub const CAMERA_MAX_ABOVE_BALL: f32 = 3.6;

pub const CAMERA_MAX_BANK_DEG: f32 = 5.0;
pub const CAMERA_BANK_INTERP: f32 = 5.0;

/// Banking only follows turns above this squared horizontal speed.
pub const CAMERA_BANK_MIN_SPEED_SQ: f32 = 0.0025;

// ---------------------------------------------------------------------------
// Roll audio
// ---------------------------------------------------------------------------

pub const ROLL_PITCH_MIN: f32 = 0.85;
pub const ROLL_PITCH_MAX: f32 = 2.0;
pub const ROLL_VOLUME_MIN: f32 = 0.4;
pub const ROLL_VOLUME_MAX: f32 = 1.0;
pub const ROLL_SPEED_EXPONENT: f32 = 1.3;
pub const ROLL_AIR_INTERP: f32 = 6.0;
pub const ROLL_AIR_PITCH: f32 = 1.1;
pub const ROLL_AIR_VOLUME: f32 = 0.75;
pub const ROLL_SMOOTH_INTERP: f32 = 8.0;

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

pub const COUNTDOWN_S: f32 = 3.0;

/// Forward velocity change given to the ball when the countdown ends.
pub const START_LAUNCH_MPS: f32 = 8.0;

/// How long "GO" stays on screen.
pub const GO_DISPLAY_S: f32 = 0.75;

// ---------------------------------------------------------------------------
// Music
// ---------------------------------------------------------------------------

pub const MUSIC_CROSSFADE_S: f32 = 10.0;
