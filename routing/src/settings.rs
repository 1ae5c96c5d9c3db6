/*!
Routing settings.

These parameters centralize the values used by the stepper, the bypass searches, the path
simplifier, and the pair coupling. Keeping them together makes tuning easier and keeps a
layout run reproducible: two runs with equal settings and equal inputs place every bar
identically.

Notes
- Distances are in millimetres.
- The defaults come from [`crate::constants`]. Load overrides from JSON when a stair needs
  a finer step or a wider search.
*/

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_BYPASS_INCREMENTS, MAX_COUPLING_PASSES, RANK_TOLERANCE, STEP_LENGTH};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Walker step and bypass increment (mm).
    pub step_length: f32,
    /// Increments searched per side before the side is exhausted.
    pub max_bypass_increments: u32,
    /// Relative threshold for the numeric rank test.
    pub rank_tolerance: f64,
    /// Bottom/top re-solves allowed when coupling a distribution pair.
    pub max_coupling_passes: u32,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            step_length: STEP_LENGTH,
            max_bypass_increments: MAX_BYPASS_INCREMENTS,
            rank_tolerance: RANK_TOLERANCE,
            max_coupling_passes: MAX_COUPLING_PASSES,
        }
    }
}

impl RouteSettings {
    /// Largest lateral distance one side of a bypass search can reach (mm).
    #[inline]
    pub fn search_reach(&self) -> f32 {
        self.step_length * self.max_bypass_increments as f32
    }
}
