//! Obstacle builder: stair parameters to immutable collision shapes.
//!
//! Every concrete surface gets a cover zone: a box reaching `cover` into the concrete and
//! [`OUTWARD`] out of it, so a bar centre inside the concrete collides as soon as its surface
//! enters the cover. Cast-in parts are inflated by the cover.
//!
//! Shapes come out in a fixed order (soffit, sides, ends, steps, holes, lifting anchors,
//! demolding anchors, railings) so a stair always builds the same world.

use log::debug;
use routing::{CollisionShape, Quat, Vec3};

use crate::geometry::{Anchor, Hole, RailingInsert, StairGeometry};

/// How far cover zones extend outside the concrete (mm).
pub const OUTWARD: f32 = 200.0;

/// All obstacles of `stair`, in build order.
pub fn build_obstacles(stair: &StairGeometry) -> Vec<CollisionShape> {
    let mut shapes = vec![soffit_zone(stair)];
    shapes.extend(side_zones(stair));
    shapes.extend(end_zones(stair));
    for step in 0..stair.steps {
        shapes.extend(step_zones(stair, step));
    }

    let (z_lo, z_hi) = height_span(stair);
    shapes.extend(stair.holes.iter().map(|hole| hole_zone(hole, stair.cover, z_lo, z_hi)));
    shapes.extend(stair.lifting_anchors.iter().map(|a| anchor_zone(a, stair.cover)));
    shapes.extend(stair.demolding_anchors.iter().map(|a| anchor_zone(a, stair.cover)));
    shapes.extend(stair.railings.iter().map(|r| railing_zone(r, stair.cover)));

    debug!(
        "stair obstacles: {} shapes ({} holes, {} anchors, {} railings)",
        shapes.len(),
        stair.holes.len(),
        stair.lifting_anchors.len() + stair.demolding_anchors.len(),
        stair.railings.len()
    );
    shapes
}

/// Lowest and highest z any obstacle needs to reach.
fn height_span(stair: &StairGeometry) -> (f32, f32) {
    (stair.soffit_z(0.0) - OUTWARD, stair.rise() + OUTWARD)
}

/// Diagonal box under the soffit, its upper face `cover` inside the concrete.
fn soffit_zone(stair: &StairGeometry) -> CollisionShape {
    let pitch = stair.pitch();
    let slope_length = stair.run() / pitch.cos();
    let half_extents = Vec3::new(
        slope_length * 0.5 + OUTWARD,
        stair.width * 0.5 + OUTWARD,
        (OUTWARD + stair.cover) * 0.5,
    );
    let mid = Vec3::new(stair.run() * 0.5, stair.width * 0.5, stair.soffit_z(stair.run() * 0.5));
    let center = mid + stair.soffit_normal() * ((stair.cover - OUTWARD) * 0.5);
    // Local +X onto the slope direction, local +Z onto the soffit normal.
    let rotation = Quat::from_axis_angle(&Vec3::y_axis(), -pitch);
    CollisionShape::diagonal_cuboid(half_extents, center, rotation)
}

fn side_zones(stair: &StairGeometry) -> [CollisionShape; 2] {
    let (z_lo, z_hi) = height_span(stair);
    let (x_lo, x_hi) = (-OUTWARD, stair.run() + OUTWARD);
    [
        CollisionShape::cuboid_from_bounds(
            Vec3::new(x_lo, -OUTWARD, z_lo),
            Vec3::new(x_hi, stair.cover, z_hi),
        ),
        CollisionShape::cuboid_from_bounds(
            Vec3::new(x_lo, stair.width - stair.cover, z_lo),
            Vec3::new(x_hi, stair.width + OUTWARD, z_hi),
        ),
    ]
}

fn end_zones(stair: &StairGeometry) -> [CollisionShape; 2] {
    let (z_lo, z_hi) = height_span(stair);
    let (y_lo, y_hi) = (-OUTWARD, stair.width + OUTWARD);
    [
        CollisionShape::cuboid_from_bounds(
            Vec3::new(-OUTWARD, y_lo, z_lo),
            Vec3::new(stair.cover, y_hi, z_hi),
        ),
        CollisionShape::cuboid_from_bounds(
            Vec3::new(stair.run() - stair.cover, y_lo, z_lo),
            Vec3::new(stair.run() + OUTWARD, y_hi, z_hi),
        ),
    ]
}

/// Tread and riser cover of step `i`.
fn step_zones(stair: &StairGeometry, i: u32) -> [CollisionShape; 2] {
    let x = i as f32 * stair.tread;
    let top = (i + 1) as f32 * stair.riser;
    let below = if i == 0 {
        -OUTWARD
    } else {
        i as f32 * stair.riser
    };
    let (y_lo, y_hi) = (-OUTWARD, stair.width + OUTWARD);

    let tread = CollisionShape::cuboid_from_bounds(
        Vec3::new(x - OUTWARD, y_lo, top - stair.cover),
        Vec3::new(x + stair.tread, y_hi, top + OUTWARD),
    );
    let riser = CollisionShape::cuboid_from_bounds(
        Vec3::new(x - OUTWARD, y_lo, below),
        Vec3::new(x + stair.cover, y_hi, top + OUTWARD),
    );
    [tread, riser]
}

fn hole_zone(hole: &Hole, cover: f32, z_lo: f32, z_hi: f32) -> CollisionShape {
    CollisionShape::cylinder_between(
        Vec3::new(hole.x, hole.y, z_lo),
        Vec3::new(hole.x, hole.y, z_hi),
        hole.diameter * 0.5 + cover,
    )
}

fn anchor_zone(anchor: &Anchor, cover: f32) -> CollisionShape {
    let tip = anchor.head + anchor.direction.normalize() * anchor.length;
    CollisionShape::cylinder_between(anchor.head, tip, anchor.diameter * 0.5 + cover)
}

fn railing_zone(railing: &RailingInsert, cover: f32) -> CollisionShape {
    let inflate = Vec3::repeat(cover);
    CollisionShape::cuboid_from_bounds(railing.min - inflate, railing.max + inflate)
}
