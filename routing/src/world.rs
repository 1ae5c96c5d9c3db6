//! Rapier-backed collision world for one stair's layout run.
//!
//! The world is append-only: obstacles go in first, then every bar the orchestrator places is
//! committed as a capsule chain. Nothing is ever removed or moved, so a bar is only checked
//! against what was placed before it.
//!
//! Design goals
//! - Deterministic: shapes are inserted in the order they are given.
//! - Query-focused: no simulation is stepped. The BVH broad phase is refreshed for the new
//!   colliders on every `add`, and queries go through a borrowed `QueryPipeline`.
//! - Only two query shapes are issued: a ball at a point, and a chain of capsules.

use log::trace;
use rapier3d::parry::shape::{Ball, Capsule, Shape};
use rapier3d::prelude::{
    BroadPhaseBvh, ColliderSet, IntegrationParameters, NarrowPhase, QueryFilter, QueryPipeline,
    RigidBodySet,
};

use crate::constants::DIST_EPS;
use crate::math::{Iso, Quat, Vec3, iso, rotation_from_y};
use crate::shape::{CollisionShape, Pose};

/// In-memory rapier structures for point and path queries against committed shapes.
pub struct CollisionWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    shapes: Vec<CollisionShape>,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            shapes: Vec::new(),
        }
    }

    /// Build a world already holding `obstacles`.
    pub fn with_obstacles(obstacles: impl IntoIterator<Item = CollisionShape>) -> Self {
        let mut world = Self::new();
        world.add(obstacles);
        world
    }

    /// Append shapes. Unconditional: no validation, no error.
    pub fn add(&mut self, shapes: impl IntoIterator<Item = CollisionShape>) {
        let mut modified_colliders = Vec::new();
        for shape in shapes {
            let handle = self.colliders.insert(shape.to_collider());
            modified_colliders.push(handle);
            self.shapes.push(shape);
        }
        if modified_colliders.is_empty() {
            return;
        }

        let mut events = Vec::new();
        self.broad_phase.update(
            &IntegrationParameters::default(),
            &self.colliders,
            &self.bodies,
            &modified_colliders,
            &[],
            &mut events,
        );
        trace!(
            "collision world: +{} shapes ({} total)",
            modified_colliders.len(),
            self.shapes.len()
        );
    }

    /// Commit a placed bar: the same capsule chain [`CollisionWorld::probe_path`] tests.
    pub fn commit_path(&mut self, points: &[Vec3], diameter: f32) {
        self.add(path_capsules(points, diameter));
    }

    /// Does a ball of `diameter` centred at `point` overlap any committed shape?
    pub fn probe(&self, point: &Vec3, diameter: f32) -> bool {
        let ball = Ball::new(diameter * 0.5);
        self.intersects(iso(*point, Quat::identity()), &ball)
    }

    /// Does the capsule chain along `points` overlap any committed shape?
    ///
    /// Each capsule is queried from its cap centres in stair coordinates, like the committed
    /// bar colliders.
    pub fn probe_path(&self, points: &[Vec3], diameter: f32) -> bool {
        path_capsules(points, diameter).iter().any(|segment| {
            let Some((a, b)) = segment.capsule_segment() else {
                return false;
            };
            let capsule = Capsule::new(a.into(), b.into(), diameter * 0.5);
            self.intersects(Iso::identity(), &capsule)
        })
    }

    /// Number of committed shapes (obstacles and bar segments).
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Committed shapes in insertion order.
    #[inline]
    pub fn shapes(&self) -> &[CollisionShape] {
        &self.shapes
    }

    /// Create a borrowed `QueryPipeline` view over the committed colliders.
    fn query_pipeline(&self) -> QueryPipeline<'_> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::default(),
        )
    }

    fn intersects(&self, pose: Iso, shape: &dyn Shape) -> bool {
        self.query_pipeline()
            .intersect_shape(pose, shape)
            .next()
            .is_some()
    }
}

/// Convert a bar centre-line into capsules, one per segment.
///
/// Each segment is shortened by `diameter` at both ends and oriented by the rotation taking
/// +Y onto the segment direction. Zero-length segments are skipped; segments shorter than two
/// diameters collapse to a ball at their midpoint.
pub fn path_capsules(points: &[Vec3], diameter: f32) -> Vec<CollisionShape> {
    points
        .windows(2)
        .filter_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let axis = b - a;
            let length = axis.norm();
            if length <= DIST_EPS {
                return None;
            }
            let dir = axis / length;
            let shape = if length > 2.0 * diameter {
                CollisionShape::capsule_between(a + dir * diameter, b - dir * diameter, diameter)
            } else {
                let mid = (a + b) * 0.5;
                CollisionShape::Capsule {
                    diameter,
                    length: 0.0,
                    pose: Pose::new(mid, rotation_from_y(&dir)),
                }
            };
            Some(shape)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Axis, shift_points};

    fn block_world() -> CollisionWorld {
        // 100 mm cube centred at (500, 500, 100).
        CollisionWorld::with_obstacles([CollisionShape::cuboid(
            Vec3::new(50.0, 50.0, 50.0),
            Vec3::new(500.0, 500.0, 100.0),
        )])
    }

    #[test]
    fn empty_world_never_collides() {
        let world = CollisionWorld::new();
        assert!(world.is_empty());
        assert!(!world.probe(&Vec3::new(1.0, 2.0, 3.0), 10.0));
        assert!(!world.probe_path(&[Vec3::zeros(), Vec3::new(100.0, 0.0, 0.0)], 10.0));
    }

    #[test]
    fn probe_uses_ball_of_the_bar_diameter() {
        let world = block_world();
        // Face at x = 450. A 12 mm bar centred at 443 reaches 449.
        assert!(!world.probe(&Vec3::new(443.0, 500.0, 100.0), 12.0));
        assert!(world.probe(&Vec3::new(447.0, 500.0, 100.0), 12.0));
        assert!(world.probe(&Vec3::new(500.0, 500.0, 100.0), 12.0));
    }

    #[test]
    fn probe_path_detects_crossing_segment() {
        let world = block_world();
        let through = [Vec3::new(100.0, 500.0, 100.0), Vec3::new(900.0, 500.0, 100.0)];
        let beside = [Vec3::new(100.0, 600.0, 100.0), Vec3::new(900.0, 600.0, 100.0)];
        assert!(world.probe_path(&through, 12.0));
        assert!(!world.probe_path(&beside, 12.0));

        let down = [Vec3::new(500.0, 500.0, 600.0), Vec3::new(500.0, 500.0, -400.0)];
        let sloped = [Vec3::new(100.0, 500.0, -200.0), Vec3::new(900.0, 500.0, 400.0)];
        assert!(world.probe_path(&down, 12.0));
        assert!(world.probe_path(&sloped, 12.0));
    }

    #[test]
    fn committed_long_bar_blocks_a_parallel_neighbour() {
        let mut world = CollisionWorld::new();
        let bar = [Vec3::new(100.0, 500.0, 100.0), Vec3::new(900.0, 500.0, 100.0)];
        world.commit_path(&bar, 12.0);

        assert!(world.probe_path(&bar, 12.0));
        assert!(world.probe_path(&shift_points(&bar, Axis::Y, 11.0), 12.0));
        assert!(world.probe_path(&shift_points(&bar, Axis::Z, -11.0), 12.0));
        assert!(!world.probe_path(&shift_points(&bar, Axis::Y, 13.0), 12.0));
        assert!(world.probe(&Vec3::new(500.0, 500.0, 100.0), 1.0));
    }

    #[test]
    fn probe_path_ignores_the_shortened_ends() {
        let world = block_world();
        // Ends 5 mm inside the block face; shortening by the diameter keeps the capsule out.
        let path = [Vec3::new(455.0, 500.0, 100.0), Vec3::new(100.0, 500.0, 100.0)];
        assert!(world.probe(&path[0], 12.0));
        assert!(!world.probe_path(&path, 12.0));
    }

    #[test]
    fn committed_path_becomes_an_obstacle() {
        let mut world = CollisionWorld::new();
        let bar = [
            Vec3::new(0.0, 100.0, 50.0),
            Vec3::new(1000.0, 100.0, 50.0),
            Vec3::new(1000.0, 100.0, 400.0),
        ];
        world.commit_path(&bar, 12.0);
        assert_eq!(world.len(), 2);

        assert!(world.probe(&Vec3::new(500.0, 105.0, 50.0), 10.0));
        assert!(!world.probe(&Vec3::new(500.0, 130.0, 50.0), 10.0));
        assert!(world.probe(&Vec3::new(1000.0, 100.0, 200.0), 10.0));

        // Later adds keep the earlier shapes queryable.
        world.add([CollisionShape::cuboid(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(-500.0, 0.0, 0.0),
        )]);
        assert!(world.probe(&Vec3::new(500.0, 105.0, 50.0), 10.0));
        assert!(world.probe(&Vec3::new(-500.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn path_capsules_skip_and_collapse_short_segments() {
        let p = Vec3::new(10.0, 10.0, 10.0);
        let capsules = path_capsules(&[p, p, p + Vec3::new(0.0, 0.0, 15.0)], 12.0);
        assert_eq!(capsules.len(), 1);
        let CollisionShape::Capsule { length, pose, .. } = capsules[0] else {
            panic!("expected a capsule");
        };
        assert_eq!(length, 0.0);
        assert!((pose.translation - Vec3::new(10.0, 10.0, 17.5)).norm() < 1.0e-5);
    }
}
