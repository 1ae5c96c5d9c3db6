use rapier3d::prelude::{Collider, ColliderBuilder};
use serde::{Deserialize, Serialize};

use crate::constants::DIST_EPS;
use crate::math::{Iso, Quat, Vec3, iso, rotation_from_y};

/// A rigid pose in stair-local coordinates (millimetres).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for use with rapier colliders and queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        iso(self.translation, self.rotation)
    }
}

/// Immutable collision shapes that make up a collision world.
///
/// - Cuboid: box with local half-extents. A rotated pose gives the "diagonal" boxes used for
///   inclined cover zones.
/// - Cylinder: solid cylinder along the local +Y axis; `length` is the full height.
/// - Capsule: placed bar segment along the local +Y axis; `length` is the distance between
///   the two cap centres, so the total extent is `length + diameter`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    Cuboid {
        half_extents: Vec3,
        pose: Pose,
    },
    Cylinder {
        radius: f32,
        length: f32,
        pose: Pose,
    },
    Capsule {
        diameter: f32,
        length: f32,
        pose: Pose,
    },
}

impl CollisionShape {
    /// Axis-aligned box centred at `center`.
    #[inline]
    pub fn cuboid(half_extents: Vec3, center: Vec3) -> Self {
        CollisionShape::Cuboid {
            half_extents,
            pose: Pose::from_translation(center),
        }
    }

    /// Axis-aligned box spanning the corners `min` and `max`.
    pub fn cuboid_from_bounds(min: Vec3, max: Vec3) -> Self {
        let half_extents = (max - min).abs() * 0.5;
        Self::cuboid(half_extents, (min + max) * 0.5)
    }

    /// Oriented box: half-extents in the local frame, rotated then placed at `center`.
    #[inline]
    pub fn diagonal_cuboid(half_extents: Vec3, center: Vec3, rotation: Quat) -> Self {
        CollisionShape::Cuboid {
            half_extents,
            pose: Pose::new(center, rotation),
        }
    }

    /// Solid cylinder whose axis runs from `a` to `b`.
    pub fn cylinder_between(a: Vec3, b: Vec3, radius: f32) -> Self {
        let (pose, length) = segment_pose(a, b);
        CollisionShape::Cylinder {
            radius,
            length,
            pose,
        }
    }

    /// Capsule whose cap centres sit on `a` and `b`.
    pub fn capsule_between(a: Vec3, b: Vec3, diameter: f32) -> Self {
        let (pose, length) = segment_pose(a, b);
        CollisionShape::Capsule {
            diameter,
            length,
            pose,
        }
    }

    #[inline]
    pub fn pose(&self) -> &Pose {
        match self {
            CollisionShape::Cuboid { pose, .. }
            | CollisionShape::Cylinder { pose, .. }
            | CollisionShape::Capsule { pose, .. } => pose,
        }
    }

    /// Cap centres of a capsule in stair coordinates; `None` for the other shapes.
    pub fn capsule_segment(&self) -> Option<(Vec3, Vec3)> {
        match *self {
            CollisionShape::Capsule { length, pose, .. } => Some(segment_ends(length, &pose)),
            _ => None,
        }
    }

    /// Build a rapier collider placed at this shape's pose.
    ///
    /// Capsules are built from their cap centres with an identity position: a long capsule
    /// rotated off +Y can miss overlaps in parry's intersection test.
    pub(crate) fn to_collider(&self) -> Collider {
        let builder = match *self {
            CollisionShape::Cuboid { half_extents, .. } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            CollisionShape::Cylinder { radius, length, .. } => {
                ColliderBuilder::cylinder(length * 0.5, radius)
            }
            CollisionShape::Capsule { diameter, length, pose } => {
                let (a, b) = segment_ends(length, &pose);
                let radius = diameter * 0.5;
                return ColliderBuilder::capsule_from_endpoints(a.into(), b.into(), radius).build();
            }
        };
        builder.position(self.pose().iso()).build()
    }
}

/// Ends of a `length` segment along the local +Y axis of `pose`, in stair coordinates.
fn segment_ends(length: f32, pose: &Pose) -> (Vec3, Vec3) {
    let half = pose.rotation * Vec3::new(0.0, length * 0.5, 0.0);
    (pose.translation - half, pose.translation + half)
}

/// Pose at the midpoint of `a`-`b` with +Y along the segment, plus the segment length.
fn segment_pose(a: Vec3, b: Vec3) -> (Pose, f32) {
    let axis = b - a;
    let length = axis.norm();
    let center = (a + b) * 0.5;
    if length <= DIST_EPS {
        return (Pose::from_translation(center), 0.0);
    }
    (Pose::new(center, rotation_from_y(&(axis / length))), length)
}
