/*!
Math aliases and small vector/rotation helpers shared by the routing modules.

This module contains no search logic. It fixes the numeric conventions:
- stair-local coordinates in millimetres, `f32` to match rapier's `Real`
- cylinders and capsules are modelled along the local +Y axis and rotated into place
*/

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::constants::DIST_EPS;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A coordinate axis of the stair-local frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn unit(self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// The axis with the largest absolute component of `delta`. Ties resolve in X, Y, Z order.
    pub fn dominant(delta: &Vec3) -> Axis {
        let mut best = Axis::X;
        for axis in [Axis::Y, Axis::Z] {
            if delta[axis.index()].abs() > delta[best.index()].abs() {
                best = axis;
            }
        }
        best
    }

    /// The axis that is neither `self` nor `other`; `None` when the two are the same axis.
    pub fn remaining(self, other: Axis) -> Option<Axis> {
        match (self, other) {
            (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => Some(Axis::X),
            (Axis::X, Axis::Z) | (Axis::Z, Axis::X) => Some(Axis::Y),
            (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Copy of `p` with the `axis` coordinate replaced by `value`.
#[inline]
pub fn with_coord(p: Vec3, axis: Axis, value: f32) -> Vec3 {
    let mut out = p;
    out[axis.index()] = value;
    out
}

/// Rigidly translate every point by `offset` along `axis`.
pub fn shift_points(points: &[Vec3], axis: Axis, offset: f32) -> Vec<Vec3> {
    let delta = axis.unit() * offset;
    points.iter().map(|p| p + delta).collect()
}

/// Unit direction from `from` toward `to`, built from its azimuth (about +Z from +X)
/// and elevation (above the XY plane).
///
/// Returns `None` when the two points coincide.
pub fn direction_toward(from: &Vec3, to: &Vec3) -> Option<Vec3> {
    let delta = to - from;
    let planar = (delta.x * delta.x + delta.y * delta.y).sqrt();
    if planar <= DIST_EPS && delta.z.abs() <= DIST_EPS {
        return None;
    }

    let azimuth = delta.y.atan2(delta.x);
    let elevation = delta.z.atan2(planar);
    let (sin_el, cos_el) = elevation.sin_cos();
    let (sin_az, cos_az) = azimuth.sin_cos();
    Some(Vec3::new(cos_el * cos_az, cos_el * sin_az, sin_el))
}

/// Rotation taking the canonical +Y axis onto `dir`.
///
/// `rotation_between` has no answer for the exactly opposite direction; a half turn about +X
/// covers that case.
pub fn rotation_from_y(dir: &Vec3) -> Quat {
    Quat::rotation_between(&Vec3::y(), dir)
        .unwrap_or_else(|| Quat::from_axis_angle(&Vec3::x_axis(), std::f32::consts::PI))
}

/// Convert a translation + rotation into an `Isometry3` for rapier queries.
#[inline]
pub fn iso(translation: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(na::Translation3::from(translation), rotation)
}
