pub mod design;
pub mod geometry;
pub mod obstacles;

pub use design::{DesignError, design_reinforcement};
pub use geometry::{Anchor, AnchorKind, GeometryError, Hole, RailingInsert, StairGeometry};
pub use obstacles::build_obstacles;
