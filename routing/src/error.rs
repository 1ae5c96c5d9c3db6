//! # Error Types
//!
//! Every routing failure is fatal for the stair being laid out: a later bar may depend on an
//! earlier bar's exact placement, so no partial layout is returned and nothing is retried.
//!
//! - [`RouteError`] is raised by the searches themselves.
//! - [`LayoutError`] is what the orchestrator returns; it names the group and bar.

use thiserror::Error;

use crate::math::{Axis, Vec3};

/// Result type alias for the search primitives.
pub type RouteResult<T> = Result<T, RouteError>;

/// Result type alias for orchestrated layout runs.
pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    /// Every permitted side ran out of increments without finding a clear position.
    #[error(
        "no clear position within {increments} increments per side along {lateral:?} \
         from ({:.1}, {:.1}, {:.1})",
        .at.x, .at.y, .at.z
    )]
    BypassExhausted {
        at: Vec3,
        lateral: Axis,
        increments: u32,
    },

    /// A walked segment's largest travel component lies on the axis detours are searched
    /// along, so the walker has no direction to step in.
    #[error(
        "segment from ({:.1}, {:.1}, {:.1}) travels along its lateral axis {lateral:?}",
        .at.x, .at.y, .at.z
    )]
    TravelAlongLateral { at: Vec3, lateral: Axis },

    /// A distribution pair could not agree on one shared offset.
    #[error("bottom and top bars did not settle on a shared offset after {passes} passes")]
    CouplingUnresolved { passes: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("group '{group}', bar {bar}: {source}")]
    Bar {
        group: String,
        bar: usize,
        source: RouteError,
    },

    #[error(
        "group '{group}', bar {bar}: nominal path has {points} control point(s), needs at least 2"
    )]
    DegeneratePath {
        group: String,
        bar: usize,
        points: usize,
    },
}

impl LayoutError {
    /// The group the failing bar belongs to.
    pub fn group(&self) -> &str {
        match self {
            LayoutError::Bar { group, .. } | LayoutError::DegeneratePath { group, .. } => group,
        }
    }
}
