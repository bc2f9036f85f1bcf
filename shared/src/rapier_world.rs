//! Rapier simulation of a time-trial track and the player ball.
//!
//! The world owns a full `PhysicsPipeline`: fixed bodies for the track, sensor
//! colliders for the start/finish gate and checkpoints, and one dynamic sphere.
//! Each `step` returns the gameplay events the race and ball controller care about.
//!
//! Design goals
//! - Deterministic: statics are inserted sorted by `id`.
//! - Engine-agnostic: nothing here knows about Bevy; the client mirrors poses.

// Re-export Rapier so downstream crates can use Rapier macros/types
// without needing to depend on `rapier3d` directly.
pub use rapier3d;

use std::sync::{Arc, Mutex};

use rapier3d::parry::query::{PointQuery, ShapeCastOptions};
use rapier3d::prelude::*;

use crate::ball::body::{BallBody, GroundHit};
use crate::ball::landing::Impact;
use crate::ball::settings::BodySettings;
use crate::constants::GRAVITY_MPS2;
use crate::race::{Checkpoint, TrackCheckpoint};
use crate::rapier::{TriggerDef, WorldStaticDef, collider_from_def, sensor_from_def};
use crate::types::{Iso, Vec3, up};
use crate::utils::safe_normal;

/// Contact forces below this (newtons) are not reported as impacts.
pub const IMPACT_FORCE_THRESHOLD_N: f32 = 50.0;

/// Static description of a track.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TrackLayout {
    pub statics: Vec<WorldStaticDef>,
    pub gate: TriggerDef,
    #[cfg_attr(feature = "serde", serde(default))]
    pub checkpoints: Vec<CheckpointDef>,
    pub spawn: Iso,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CheckpointDef {
    /// Position in the lap sequence (0-based).
    pub index: u32,
    pub trigger: TriggerDef,
}

/// What the sensor colliders stand for, packed into collider user data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorTag {
    Gate,
    Checkpoint(u32),
}

impl SensorTag {
    const GATE: u128 = 1 << 64;
    const CHECKPOINT: u128 = 2 << 64;

    pub fn encode(self) -> u128 {
        match self {
            SensorTag::Gate => Self::GATE,
            SensorTag::Checkpoint(index) => Self::CHECKPOINT | index as u128,
        }
    }

    pub fn decode(data: u128) -> Option<Self> {
        match data & !(u64::MAX as u128) {
            Self::GATE => Some(SensorTag::Gate),
            Self::CHECKPOINT => Some(SensorTag::Checkpoint((data & u32::MAX as u128) as u32)),
            _ => None,
        }
    }
}

/// Gameplay-relevant outcome of a physics step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackEvent {
    GateCrossed,
    CheckpointReached { index: u32, pose: Iso },
    BallImpact(Impact),
}

/// Collects Rapier callbacks during a step.
#[derive(Default)]
struct StepEvents {
    collisions: Mutex<Vec<CollisionEvent>>,
    contact_forces: Mutex<Vec<ContactForceEvent>>,
}

impl EventHandler for StepEvents {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut events) = self.collisions.lock() {
            events.push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        contact_pair: &ContactPair,
        total_force_magnitude: Real,
    ) {
        let event = ContactForceEvent::from_contact_pair(dt, contact_pair, total_force_magnitude);
        if let Ok(mut events) = self.contact_forces.lock() {
            events.push(event);
        }
    }
}

impl StepEvents {
    fn drain(&self) -> (Vec<CollisionEvent>, Vec<ContactForceEvent>) {
        let collisions = self
            .collisions
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default();
        let forces = self
            .contact_forces
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default();
        (collisions, forces)
    }
}

struct CheckpointSensor {
    checkpoint: Arc<TrackCheckpoint>,
    pose: Iso,
}

/// Rapier structures for one track plus the ball.
pub struct TrackWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    islands: IslandManager,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    gravity: Vector<Real>,
    events: StepEvents,

    ball: RigidBodyHandle,
    ball_collider: ColliderHandle,
    ball_radius: f32,
    simulating: bool,

    checkpoints: Vec<CheckpointSensor>,
    spawn: Iso,
}

impl TrackWorld {
    pub fn build(layout: &TrackLayout, ball: &BodySettings) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Track geometry, in deterministic order.
        let mut statics = layout.statics.clone();
        statics.sort_by_key(|d| d.id);

        for def in &statics {
            let rb = RigidBodyBuilder::fixed().pose(def.pose()).build();
            let rb_handle = bodies.insert(rb);
            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Gate and checkpoint sensors.
        let gate_body = bodies.insert(RigidBodyBuilder::fixed().pose(layout.gate.pose()).build());
        colliders.insert_with_parent(
            sensor_from_def(&layout.gate, SensorTag::Gate.encode()),
            gate_body,
            &mut bodies,
        );

        let mut checkpoints = Vec::with_capacity(layout.checkpoints.len());
        for def in &layout.checkpoints {
            let pose = def.trigger.pose();
            let handle = bodies.insert(RigidBodyBuilder::fixed().pose(pose).build());
            colliders.insert_with_parent(
                sensor_from_def(&def.trigger, SensorTag::Checkpoint(def.index).encode()),
                handle,
                &mut bodies,
            );
            checkpoints.push(CheckpointSensor {
                checkpoint: Arc::new(TrackCheckpoint::new(def.index)),
                pose,
            });
        }

        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();

        // Populate the broad phase with the track so sweeps work before the first step.
        CollisionPipeline::new().step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        // The ball.
        let ball_body = RigidBodyBuilder::dynamic()
            .pose(layout.spawn)
            .linear_damping(ball.linear_damping)
            .angular_damping(ball.angular_damping)
            .ccd_enabled(true)
            .build();
        let ball_handle = bodies.insert(ball_body);
        let ball_collider = colliders.insert_with_parent(
            ColliderBuilder::ball(ball.radius)
                .mass(ball.mass)
                .friction(1.0)
                .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
                .contact_force_event_threshold(IMPACT_FORCE_THRESHOLD_N)
                .build(),
            ball_handle,
            &mut bodies,
        );

        log::info!(
            "Built track world: {} statics, {} checkpoints",
            statics.len(),
            checkpoints.len()
        );

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            gravity: vector![0.0, -GRAVITY_MPS2, 0.0],
            events: StepEvents::default(),
            ball: ball_handle,
            ball_collider,
            ball_radius: ball.radius,
            simulating: true,
            checkpoints,
            spawn: layout.spawn,
        }
    }

    /// Advance the simulation and translate contacts into track events.
    pub fn step(&mut self, dt: f32) -> Vec<TrackEvent> {
        let velocity_before = self
            .bodies
            .get(self.ball)
            .map(|rb| *rb.linvel())
            .unwrap_or_else(Vec3::zeros);

        self.params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            &(),
            &self.events,
        );

        // User forces apply to one step only.
        if let Some(rb) = self.bodies.get_mut(self.ball) {
            rb.reset_forces(false);
        }

        let (collisions, forces) = self.events.drain();
        let mut out = Vec::new();

        for event in collisions {
            if !event.started() {
                continue;
            }
            let other = if event.collider1() == self.ball_collider {
                event.collider2()
            } else if event.collider2() == self.ball_collider {
                event.collider1()
            } else {
                continue;
            };

            let Some(tag) = self.colliders.get(other).and_then(|c| SensorTag::decode(c.user_data))
            else {
                continue;
            };

            match tag {
                SensorTag::Gate => out.push(TrackEvent::GateCrossed),
                SensorTag::Checkpoint(index) => {
                    let Some(sensor) = self
                        .checkpoints
                        .iter()
                        .find(|s| s.checkpoint.index() == index)
                    else {
                        continue;
                    };
                    // Fires once per lap until the race re-arms it.
                    if sensor.checkpoint.try_trigger() {
                        out.push(TrackEvent::CheckpointReached {
                            index,
                            pose: sensor.pose,
                        });
                    }
                }
            }
        }

        for force in forces {
            if force.collider1 != self.ball_collider && force.collider2 != self.ball_collider {
                continue;
            }
            out.push(TrackEvent::BallImpact(Impact {
                velocity: velocity_before,
                normal: force.max_force_direction,
                impulse: force.total_force_magnitude * dt,
            }));
        }

        out
    }

    /// Mutable view of the ball for the controller.
    pub fn ball_body(&mut self) -> RapierBall<'_> {
        RapierBall { world: self }
    }

    pub fn ball_pose(&self) -> Iso {
        self.bodies
            .get(self.ball)
            .map(|rb| Iso::from_parts((*rb.translation()).into(), *rb.rotation()))
            .unwrap_or(self.spawn)
    }

    /// Checkpoints in layout order, shared with the race state.
    pub fn checkpoints(&self) -> Vec<Arc<TrackCheckpoint>> {
        self.checkpoints.iter().map(|s| s.checkpoint.clone()).collect()
    }

    pub fn spawn(&self) -> &Iso {
        &self.spawn
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_radius
    }

    fn sweep(&self, origin: Vec3, direction: Vec3, distance: f32, radius: f32) -> Option<GroundHit> {
        let filter = QueryFilter::default()
            .exclude_sensors()
            .exclude_rigid_body(self.ball);
        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        );

        let shape = Ball::new(radius.max(1.0e-3));
        let pos = Iso::translation(origin.x, origin.y, origin.z);
        let options = ShapeCastOptions::with_max_time_of_impact(distance);

        let (handle, hit) = query.cast_shape(&pos, &direction, &shape, options)?;
        let travelled = hit.time_of_impact;
        let center = origin + direction * travelled;

        // Normal from the closest point on the hit collider to the sphere center.
        let collider = self.colliders.get(handle)?;
        let collider_pose = Iso::from_parts((*collider.translation()).into(), *collider.rotation());
        let projection = collider
            .shape()
            .project_point(&collider_pose, &Point::from(center), false);
        let normal = safe_normal(center - projection.point.coords).unwrap_or_else(up);

        Some(GroundHit {
            point: projection.point.coords,
            normal,
            distance: travelled,
        })
    }
}

/// [`BallBody`] backed by the Rapier ball of a [`TrackWorld`].
pub struct RapierBall<'a> {
    world: &'a mut TrackWorld,
}

impl RapierBall<'_> {
    fn body(&self) -> Option<&RigidBody> {
        self.world.bodies.get(self.world.ball)
    }

    fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.bodies.get_mut(self.world.ball)
    }
}

impl BallBody for RapierBall<'_> {
    fn position(&self) -> Vec3 {
        self.body().map(|rb| *rb.translation()).unwrap_or_else(Vec3::zeros)
    }

    fn pose(&self) -> Iso {
        self.world.ball_pose()
    }

    fn linear_velocity(&self) -> Vec3 {
        self.body().map(|rb| *rb.linvel()).unwrap_or_else(Vec3::zeros)
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        if let Some(rb) = self.body_mut() {
            rb.set_linvel(velocity, true);
        }
    }

    fn angular_velocity(&self) -> Vec3 {
        self.body().map(|rb| *rb.angvel()).unwrap_or_else(Vec3::zeros)
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        if let Some(rb) = self.body_mut() {
            rb.set_angvel(velocity, true);
        }
    }

    fn add_force(&mut self, force: Vec3) {
        if let Some(rb) = self.body_mut() {
            rb.add_force(force, true);
        }
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        if let Some(rb) = self.body_mut() {
            rb.apply_impulse(impulse, true);
        }
    }

    fn mass(&self) -> f32 {
        self.body().map(|rb| rb.mass()).unwrap_or(0.0)
    }

    fn radius(&self) -> f32 {
        self.world.ball_radius
    }

    fn sweep_down(&self, origin: Vec3, distance: f32, radius: f32) -> Option<GroundHit> {
        self.world.sweep(origin, -up(), distance, radius)
    }

    fn set_simulating(&mut self, simulating: bool) {
        if self.world.simulating == simulating {
            return;
        }
        self.world.simulating = simulating;

        let body_type = if simulating {
            RigidBodyType::Dynamic
        } else {
            RigidBodyType::Fixed
        };
        if let Some(rb) = self.body_mut() {
            rb.set_body_type(body_type, true);
        }
    }

    fn teleport(&mut self, pose: Iso) {
        if let Some(rb) = self.body_mut() {
            rb.set_translation(pose.translation.vector, true);
            rb.set_rotation(pose.rotation, true);
        }
    }
}
