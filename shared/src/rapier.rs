use rapier3d::{
    na::{Isometry3, Translation3, UnitQuaternion},
    prelude::*,
};

/// Friction used for track surfaces unless a def overrides it.
pub const DEFAULT_TRACK_FRICTION: f32 = 0.8;

/// Immutable piece of track geometry.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion; the body pose is `translation * rotation`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WorldStaticDef {
    /// Stable identifier, also used to order insertion.
    pub id: u32,
    pub translation: Vector<f32>,
    #[cfg_attr(feature = "serde", serde(default = "UnitQuaternion::identity"))]
    pub rotation: UnitQuaternion<f32>,
    pub shape: ColliderShapeDef,
    #[cfg_attr(feature = "serde", serde(default))]
    pub friction: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub restitution: Option<f32>,
}

impl WorldStaticDef {
    pub fn pose(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }
}

/// Supported track collider shapes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ColliderShapeDef {
    /// Infinite ground plane (half-space) with normal `rotation * +Y`.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    /// Rounded cuboid; `border_radius` rounds all edges and corners.
    RoundCuboid {
        half_extents: Vector<f32>,
        border_radius: f32,
    },

    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },
}

/// Box-shaped trigger volume (start/finish gate, checkpoints).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TriggerDef {
    pub translation: Vector<f32>,
    #[cfg_attr(feature = "serde", serde(default = "UnitQuaternion::identity"))]
    pub rotation: UnitQuaternion<f32>,
    pub half_extents: Vector<f32>,
}

impl TriggerDef {
    pub fn pose(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// The pose lives on the parent rigid body, so the collider has an identity local
/// transform (planes excepted, which shift along their normal).
pub fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => ColliderBuilder::halfspace(Vector::y_axis())
            .translation(vector![0.0, *offset_along_normal, 0.0]),

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => ColliderBuilder::round_cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
            *border_radius,
        ),

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder
        .friction(def.friction.unwrap_or(DEFAULT_TRACK_FRICTION))
        .restitution(def.restitution.unwrap_or(0.0))
        .build()
}

/// Sensor collider for a trigger volume. `tag` is stored as collider user data.
pub fn sensor_from_def(def: &TriggerDef, tag: u128) -> Collider {
    let he = def.half_extents;
    ColliderBuilder::cuboid(he.x, he.y, he.z)
        .sensor(true)
        .user_data(tag)
        .build()
}

/// Sanity check for a list of statics. Returns one message per problem.
pub fn validate_statics(defs: &[WorldStaticDef]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut ids = std::collections::HashSet::new();

    for def in defs {
        if !ids.insert(def.id) {
            problems.push(format!("static id {} is used more than once", def.id));
        }
        if !def.translation.iter().all(|c| c.is_finite()) {
            problems.push(format!("static {} has a non-finite translation", def.id));
        }

        let positive = match &def.shape {
            ColliderShapeDef::Plane { .. } => true,
            ColliderShapeDef::Cuboid { half_extents } => half_extents.iter().all(|&h| h > 0.0),
            ColliderShapeDef::RoundCuboid {
                half_extents,
                border_radius,
            } => half_extents.iter().all(|&h| h > 0.0) && *border_radius >= 0.0,
            ColliderShapeDef::Sphere { radius } => *radius > 0.0,
            ColliderShapeDef::CapsuleY {
                radius,
                half_height,
            }
            | ColliderShapeDef::CylinderY {
                radius,
                half_height,
            } => *radius > 0.0 && *half_height > 0.0,
        };
        if !positive {
            problems.push(format!("static {} has non-positive dimensions", def.id));
        }
    }

    problems
}
