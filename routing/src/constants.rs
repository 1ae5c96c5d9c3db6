//! Default tuning values for the routing engine.
//!
//! Lengths are stair-local millimetres. These are the values [`crate::RouteSettings`]
//! starts from; callers override them per run rather than editing the constants.

/// Distance the walker advances per step, and the size of one lateral bypass increment.
pub const STEP_LENGTH: f32 = 3.0;

/// Maximum number of lateral increments searched on one side before that side is given up.
///
/// With the default step this covers 900 mm either side of a blocked point.
pub const MAX_BYPASS_INCREMENTS: u32 = 300;

/// Relative singular-value threshold used by the numeric rank test in feature extraction.
///
/// A singular value counts towards the rank when it exceeds `largest * RANK_TOLERANCE`.
pub const RANK_TOLERANCE: f64 = 1.0e-5;

/// Maximum number of bottom/top re-solves when coupling a distribution pair.
pub const MAX_COUPLING_PASSES: u32 = 3;

/// Practical small distance for comparisons (millimetres).
pub const DIST_EPS: f32 = 1.0e-6;
