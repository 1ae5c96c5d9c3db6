//! Stair parameters as delivered by the geometry layer.
//!
//! Frame: X runs up the flight, Y across the width, Z up; millimetres. The bottom riser
//! stands at `x = 0` on `z = 0`. Step `i` has its riser at `x = i * tread` and its tread at
//! `z = (i + 1) * riser`, so every inner corner lies on `z = x * riser / tread`. The soffit is
//! parallel to that line, `waist` below it measured perpendicular to the slope.

use routing::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vertical through-hole (drainage, fixing sleeves).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub x: f32,
    pub y: f32,
    pub diameter: f32,
}

/// Cast-in anchor: a cylinder from `head` along `direction` for `length`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub head: Vec3,
    pub direction: Vec3,
    pub length: f32,
    pub diameter: f32,
}

/// Railing insert box, given by its corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailingInsert {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StairGeometry {
    pub steps: u32,
    pub tread: f32,
    pub riser: f32,
    pub width: f32,
    /// Slab thickness under the inner corners, perpendicular to the slope.
    pub waist: f32,
    /// Concrete cover every bar keeps to a surface or cast-in part.
    pub cover: f32,
    #[serde(default)]
    pub holes: Vec<Hole>,
    #[serde(default)]
    pub lifting_anchors: Vec<Anchor>,
    #[serde(default)]
    pub demolding_anchors: Vec<Anchor>,
    #[serde(default)]
    pub railings: Vec<RailingInsert>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorKind {
    Lifting,
    Demolding,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("stair needs at least one step")]
    NoSteps,

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("cover {cover} leaves no room across a {width} mm wide stair")]
    CoverTooLarge { cover: f32, width: f32 },

    #[error("hole {index} at ({x}, {y}) is outside the stair plan")]
    HoleOutside { index: usize, x: f32, y: f32 },

    #[error("{kind:?} anchor {index} needs a positive length, diameter and a direction")]
    InvalidAnchor { kind: AnchorKind, index: usize },

    #[error(
        "{kind:?} anchor {index} head at ({:.1}, {:.1}, {:.1}) is outside the stair",
        .head.x, .head.y, .head.z
    )]
    AnchorOutside {
        kind: AnchorKind,
        index: usize,
        head: Vec3,
    },

    #[error("railing insert {index} has an empty box")]
    InvalidRailing { index: usize },

    #[error("railing insert {index} lies entirely outside the stair")]
    RailingOutside { index: usize },
}

impl StairGeometry {
    /// Horizontal length of the flight.
    #[inline]
    pub fn run(&self) -> f32 {
        self.steps as f32 * self.tread
    }

    /// Height of the top tread.
    #[inline]
    pub fn rise(&self) -> f32 {
        self.steps as f32 * self.riser
    }

    /// Slope angle of the flight (radians).
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.riser.atan2(self.tread)
    }

    /// Vertical drop from the inner-corner line to the soffit.
    #[inline]
    pub fn soffit_drop(&self) -> f32 {
        self.waist / self.pitch().cos()
    }

    /// Unit normal of the soffit pointing into the concrete.
    pub fn soffit_normal(&self) -> Vec3 {
        let (sin, cos) = self.pitch().sin_cos();
        Vec3::new(-sin, 0.0, cos)
    }

    /// Soffit height at `x`.
    #[inline]
    pub fn soffit_z(&self, x: f32) -> f32 {
        x * self.riser / self.tread - self.soffit_drop()
    }

    /// The soffit point above plan position (`x`, `y`), moved `clearance` into the concrete
    /// along the soffit normal.
    pub fn soffit_point(&self, x: f32, y: f32, clearance: f32) -> Vec3 {
        Vec3::new(x, y, self.soffit_z(x)) + self.soffit_normal() * clearance
    }

    /// Corners of the stair's bounding box: the plan, from the lowest soffit point up to the
    /// top tread.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (
            Vec3::new(0.0, 0.0, self.soffit_z(0.0)),
            Vec3::new(self.run(), self.width, self.rise()),
        )
    }

    /// Reject parameters no stair can have.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.steps == 0 {
            return Err(GeometryError::NoSteps);
        }
        for (field, value) in [
            ("tread", self.tread),
            ("riser", self.riser),
            ("width", self.width),
            ("waist", self.waist),
        ] {
            if !positive(value) {
                return Err(GeometryError::NonPositive { field, value });
            }
        }
        if self.cover.is_nan() || self.cover < 0.0 || 2.0 * self.cover >= self.width {
            return Err(GeometryError::CoverTooLarge {
                cover: self.cover,
                width: self.width,
            });
        }

        for (index, hole) in self.holes.iter().enumerate() {
            if !positive(hole.diameter) {
                return Err(GeometryError::NonPositive {
                    field: "hole diameter",
                    value: hole.diameter,
                });
            }
            let inside =
                (0.0..=self.run()).contains(&hole.x) && (0.0..=self.width).contains(&hole.y);
            if !inside {
                return Err(GeometryError::HoleOutside {
                    index,
                    x: hole.x,
                    y: hole.y,
                });
            }
        }

        let (lo, hi) = self.bounds();
        for (kind, anchors) in [
            (AnchorKind::Lifting, &self.lifting_anchors),
            (AnchorKind::Demolding, &self.demolding_anchors),
        ] {
            for (index, anchor) in anchors.iter().enumerate() {
                let valid = positive(anchor.length)
                    && positive(anchor.diameter)
                    && anchor.direction.norm() > f32::EPSILON;
                if !valid {
                    return Err(GeometryError::InvalidAnchor { kind, index });
                }
                if !within(&anchor.head, &lo, &hi) {
                    return Err(GeometryError::AnchorOutside {
                        kind,
                        index,
                        head: anchor.head,
                    });
                }
            }
        }

        for (index, railing) in self.railings.iter().enumerate() {
            let size = railing.max - railing.min;
            if !size.iter().all(|d| positive(*d)) {
                return Err(GeometryError::InvalidRailing { index });
            }
            let overlaps = (0..3).all(|i| railing.min[i] <= hi[i] && railing.max[i] >= lo[i]);
            if !overlaps {
                return Err(GeometryError::RailingOutside { index });
            }
        }
        Ok(())
    }
}

/// Inclusive box test.
#[inline]
fn within(p: &Vec3, lo: &Vec3, hi: &Vec3) -> bool {
    (0..3).all(|i| (lo[i]..=hi[i]).contains(&p[i]))
}

/// False for zero, negative and NaN.
#[inline]
fn positive(value: f32) -> bool {
    value > 0.0
}
