//! One-call reinforcement design for a stair: validate, build obstacles, lay out every group.

use log::info;
use routing::{CollisionWorld, LayoutError, LayoutReport, RebarGroup, RebarLayout, RouteSettings};
use thiserror::Error;

use crate::geometry::{GeometryError, StairGeometry};
use crate::obstacles::build_obstacles;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    #[error("invalid stair geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("reinforcement layout failed: {0}")]
    Layout(#[from] LayoutError),
}

/// Route every group of bars through `stair`.
///
/// The collision world lives for this call only.
pub fn design_reinforcement(
    stair: &StairGeometry,
    groups: &[RebarGroup],
    settings: &RouteSettings,
) -> Result<LayoutReport, DesignError> {
    stair.validate()?;

    let obstacles = build_obstacles(stair);
    info!(
        "designing reinforcement: {} steps, {} obstacles, {} groups",
        stair.steps,
        obstacles.len(),
        groups.len()
    );
    let world = CollisionWorld::with_obstacles(obstacles);
    let report = RebarLayout::new(world, *settings).run(groups)?;
    Ok(report)
}
