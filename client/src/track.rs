use bevy::prelude::*;
use shared::{
    BallController, CheckpointDef, ColliderShapeDef, Iso, TrackLayout, TrackWorld, TriggerDef,
    Vec3 as NaVec3, WorldStaticDef,
};

use crate::{config::GameConfig, convert};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (build_simulation, spawn_track).chain());
}

/// The physics world and the controller driving its ball.
///
/// Kept together so a system can borrow the ball body and the controller at once.
#[derive(Resource)]
pub struct Simulation {
    pub world: TrackWorld,
    pub ball: BallController,
}

/// Layout the running simulation was built from.
#[derive(Resource, Debug, Clone)]
pub struct ActiveTrack(pub TrackLayout);

#[derive(Component)]
pub struct TrackPiece;

#[derive(Component)]
pub struct GateVolume;

#[derive(Component)]
pub struct CheckpointVolume(pub u32);

const LANE_HALF_WIDTH: f32 = 6.0;
const TRIGGER_HALF_HEIGHT: f32 = 2.0;
const TRIGGER_HALF_DEPTH: f32 = 0.25;
const WALL_HALF_HEIGHT: f32 = 0.75;
/// Direct sunlight, matched to the camera exposure.
const SUN_LUX: f32 = 100_000.0;

/// Rectangular loop around a central block, driven clockwise from the west lane.
///
/// Lanes are 12 m wide. The ball spawns 4 m behind the gate facing it, so the
/// launch after the countdown carries it across and starts the first lap.
pub fn builtin_layout() -> TrackLayout {
    let wall = |id, x: f32, z: f32, hx: f32, hz: f32| WorldStaticDef {
        id,
        translation: NaVec3::new(x, WALL_HALF_HEIGHT, z),
        rotation: shared::Quat::identity(),
        shape: ColliderShapeDef::Cuboid {
            half_extents: NaVec3::new(hx, WALL_HALF_HEIGHT, hz),
        },
        friction: Some(0.2),
        restitution: Some(0.3),
    };
    let across_x = |x: f32, z: f32| TriggerDef {
        translation: NaVec3::new(x, TRIGGER_HALF_HEIGHT, z),
        rotation: shared::Quat::identity(),
        half_extents: NaVec3::new(LANE_HALF_WIDTH, TRIGGER_HALF_HEIGHT, TRIGGER_HALF_DEPTH),
    };
    let across_z = |x: f32, z: f32| TriggerDef {
        translation: NaVec3::new(x, TRIGGER_HALF_HEIGHT, z),
        rotation: shared::Quat::identity(),
        half_extents: NaVec3::new(TRIGGER_HALF_DEPTH, TRIGGER_HALF_HEIGHT, LANE_HALF_WIDTH),
    };

    let statics = vec![
        WorldStaticDef {
            id: 0,
            translation: NaVec3::zeros(),
            rotation: shared::Quat::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
            friction: None,
            restitution: None,
        },
        // Central block.
        WorldStaticDef {
            id: 1,
            translation: NaVec3::new(0.0, 1.0, -30.0),
            rotation: shared::Quat::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: NaVec3::new(12.0, 1.0, 18.0),
            },
            friction: Some(0.2),
            restitution: Some(0.3),
        },
        // Outer walls.
        wall(2, 0.0, -60.5, 25.0, 0.5),
        wall(3, 0.0, 0.5, 25.0, 0.5),
        wall(4, -24.5, -30.0, 0.5, 30.0),
        wall(5, 24.5, -30.0, 0.5, 30.0),
        // Rounded hump across the east lane.
        WorldStaticDef {
            id: 6,
            translation: NaVec3::new(18.0, -0.5, -40.0),
            rotation: shared::Quat::identity(),
            shape: ColliderShapeDef::RoundCuboid {
                half_extents: NaVec3::new(5.5, 0.5, 2.5),
                border_radius: 0.3,
            },
            friction: None,
            restitution: None,
        },
        // Boulder in the south lane.
        WorldStaticDef {
            id: 7,
            translation: NaVec3::new(8.0, 0.0, -3.0),
            rotation: shared::Quat::identity(),
            shape: ColliderShapeDef::Sphere { radius: 1.2 },
            friction: None,
            restitution: Some(0.5),
        },
    ];

    TrackLayout {
        statics,
        gate: across_x(-18.0, -10.0),
        checkpoints: vec![
            CheckpointDef {
                index: 0,
                trigger: across_z(0.0, -54.0),
            },
            CheckpointDef {
                index: 1,
                trigger: across_x(18.0, -30.0),
            },
            CheckpointDef {
                index: 2,
                trigger: across_z(0.0, -6.0),
            },
        ],
        spawn: Iso::translation(-18.0, 1.0, -6.0),
    }
}

pub(crate) fn build_simulation(mut commands: Commands, config: Res<GameConfig>) {
    let layout = config.track.clone().unwrap_or_else(builtin_layout);

    let mut world = TrackWorld::build(&layout, &config.ball.body);
    let spawn = *world.spawn();
    let ball = BallController::new(&mut world.ball_body(), spawn, config.ball.clone());

    info!(
        "Track ready: {} statics, {} checkpoints",
        layout.statics.len(),
        layout.checkpoints.len()
    );

    commands.insert_resource(Simulation { world, ball });
    commands.insert_resource(ActiveTrack(layout));
}

fn spawn_track(
    mut commands: Commands,
    track: Res<ActiveTrack>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground = materials.add(StandardMaterial {
        base_color: Color::linear_rgb(0.2, 0.3, 0.25),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..default()
    });
    let solid = materials.add(Color::srgb_u8(124, 144, 255));

    for def in &track.0.statics {
        let material = match def.shape {
            ColliderShapeDef::Plane { .. } => ground.clone(),
            _ => solid.clone(),
        };
        commands.spawn((
            TrackPiece,
            Mesh3d(meshes.add(static_mesh(&def.shape))),
            MeshMaterial3d(material),
            static_transform(def),
        ));
    }

    let gate = materials.add(trigger_material(Color::srgba(1.0, 0.85, 0.2, 0.35)));
    commands.spawn((
        GateVolume,
        Mesh3d(meshes.add(trigger_mesh(&track.0.gate))),
        MeshMaterial3d(gate),
        convert::transform(&track.0.gate.pose()),
    ));

    let checkpoint = materials.add(trigger_material(Color::srgba(0.3, 0.8, 1.0, 0.2)));
    for def in &track.0.checkpoints {
        commands.spawn((
            CheckpointVolume(def.index),
            Mesh3d(meshes.add(trigger_mesh(&def.trigger))),
            MeshMaterial3d(checkpoint.clone()),
            convert::transform(&def.trigger.pose()),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: SUN_LUX,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn static_mesh(shape: &ColliderShapeDef) -> Mesh {
    match *shape {
        ColliderShapeDef::Plane { .. } => Plane3d::default().mesh().size(200.0, 200.0).build(),
        ColliderShapeDef::Cuboid { half_extents: h } => {
            Cuboid::new(h.x * 2.0, h.y * 2.0, h.z * 2.0).into()
        }
        ColliderShapeDef::RoundCuboid {
            half_extents: h,
            border_radius: b,
        } => Cuboid::new((h.x + b) * 2.0, (h.y + b) * 2.0, (h.z + b) * 2.0).into(),
        ColliderShapeDef::Sphere { radius } => Sphere::new(radius).mesh().build(),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => Capsule3d::new(radius, half_height * 2.0).into(),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => Cylinder::new(radius, half_height * 2.0).into(),
    }
}

/// Planes are offset along their own normal.
fn static_transform(def: &WorldStaticDef) -> Transform {
    let mut transform = convert::transform(&def.pose());
    if let ColliderShapeDef::Plane {
        offset_along_normal,
    } = def.shape
    {
        transform.translation += transform.rotation * Vec3::Y * offset_along_normal;
    }
    transform
}

fn trigger_mesh(def: &TriggerDef) -> Mesh {
    let h = def.half_extents;
    Cuboid::new(h.x * 2.0, h.y * 2.0, h.z * 2.0).into()
}

fn trigger_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::flat_forward;

    #[test]
    fn builtin_checkpoints_are_in_sequence() {
        let layout = builtin_layout();
        let indices: Vec<u32> = layout.checkpoints.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn spawn_faces_the_gate() {
        let layout = builtin_layout();
        let to_gate = layout.gate.translation - layout.spawn.translation.vector;
        let forward = flat_forward(&layout.spawn);
        assert!(forward.dot(&to_gate) > 0.0);

        // Spawn sits inside the gate's lane.
        let dx = (layout.gate.translation.x - layout.spawn.translation.vector.x).abs();
        assert!(dx < layout.gate.half_extents.x);
    }

    #[test]
    fn plane_offset_moves_along_its_normal() {
        let def = WorldStaticDef {
            id: 0,
            translation: NaVec3::zeros(),
            rotation: shared::Quat::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: -2.0,
            },
            friction: None,
            restitution: None,
        };
        assert_eq!(static_transform(&def).translation, Vec3::new(0.0, -2.0, 0.0));
    }
}
