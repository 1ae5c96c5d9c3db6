/*!
Lateral bypass searches.

Two searches share one side-selection rule set:
- [`local_bypass`]: a single blocked step of the walker is moved sideways.
- [`whole_path_bypass`]: a rigid multi-point bar (stirrup, distribution bar) is translated
  as one unit.

Both step outward along the lateral axis in increments of the step length, at most
`max_bypass_increments` per side, and report `Err(BypassExhausted)` when every permitted side
runs out. Neither search ever loops without a bound.

Side selection
- Locked bias: only the locked side is searched.
- Unlocked, fewest increments: the side that clears first wins; a side that never clears
  loses to one that does; ties go to the positive side.
- Smallest displacement: both sides are always searched and the one whose final offset is
  closest to the original position wins (see [`SidePolicy::SmallestDisplacement`]).
*/

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};
use crate::math::{Axis, Vec3, shift_points};
use crate::settings::RouteSettings;
use crate::world::CollisionWorld;

/// One direction along the lateral axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Positive,
    Negative,
}

impl Side {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Positive => 1.0,
            Side::Negative => -1.0,
        }
    }
}

/// Which bypass sides a bar may still use.
///
/// The first deflection of a bar locks its side for the rest of that bar so it does not weave
/// back and forth across later segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    #[default]
    Unlocked,
    Locked(Side),
}

impl Bias {
    /// Sides to search, positive first.
    pub fn permitted_sides(self) -> &'static [Side] {
        match self {
            Bias::Unlocked => &[Side::Positive, Side::Negative],
            Bias::Locked(Side::Positive) => &[Side::Positive],
            Bias::Locked(Side::Negative) => &[Side::Negative],
        }
    }

    /// Lock onto `side` unless a side is already locked.
    #[inline]
    pub fn lock(self, side: Side) -> Bias {
        match self {
            Bias::Unlocked => Bias::Locked(side),
            locked => locked,
        }
    }
}

/// How to pick between two sides that both clear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SidePolicy {
    /// Fewest increments wins.
    FewestIncrements,
    /// Smallest |prior_offset + signed shift| wins. Both sides are searched regardless of the
    /// bias. `prior_offset` is how far the path was already moved from its original position
    /// before this search.
    SmallestDisplacement { prior_offset: f32 },
}

/// The side and distance a search settled on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bypass {
    pub side: Side,
    pub increments: u32,
}

impl Bypass {
    /// Signed lateral shift for this bypass.
    #[inline]
    pub fn offset(&self, step: f32) -> f32 {
        self.side.sign() * self.increments as f32 * step
    }
}

/// Result of [`local_bypass`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalBypass {
    /// The blocked position moved sideways until clear.
    pub lateral_point: Vec3,
    /// `lateral_point` plus the walker's step, so the bypass also advances toward the goal.
    pub advanced_point: Vec3,
    pub bypass: Bypass,
}

/// Result of [`whole_path_bypass`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathShift {
    pub points: Vec<Vec3>,
    /// Signed shift applied along the lateral axis (0 when the path was already clear).
    pub offset: f32,
    /// The side searched out, or `None` when the path was already clear.
    pub bypass: Option<Bypass>,
}

/// Step outward on one side until `is_clear` accepts the signed offset, at most
/// `max_increments` times. Returns the increment count of the first clear offset.
fn search_side(
    side: Side,
    step: f32,
    max_increments: u32,
    mut is_clear: impl FnMut(f32) -> bool,
) -> Option<u32> {
    (1..=max_increments).find(|&k| is_clear(side.sign() * k as f32 * step))
}

/// Pick a winner from per-side search outcomes. Candidates are listed positive first, so a
/// strict comparison leaves ties on the positive side.
fn choose_side(outcomes: &[(Side, Option<u32>)], policy: SidePolicy, step: f32) -> Option<Bypass> {
    let mut best: Option<(Bypass, f32)> = None;
    for &(side, found) in outcomes {
        let Some(increments) = found else {
            continue;
        };
        let bypass = Bypass { side, increments };
        let score = match policy {
            SidePolicy::FewestIncrements => increments as f32,
            SidePolicy::SmallestDisplacement { prior_offset } => {
                (prior_offset + bypass.offset(step)).abs()
            }
        };
        if best.map_or(true, |(_, best_score)| score < best_score) {
            best = Some((bypass, score));
        }
    }
    best.map(|(bypass, _)| bypass)
}

fn sides_for(bias: Bias, policy: SidePolicy) -> &'static [Side] {
    match policy {
        SidePolicy::FewestIncrements => bias.permitted_sides(),
        SidePolicy::SmallestDisplacement { .. } => Bias::Unlocked.permitted_sides(),
    }
}

/// Move a blocked walker step sideways.
///
/// `from` is the last committed (clear) walker position and `advance` the step that collided.
/// A lateral offset is accepted when both the sideways point and the sideways point plus
/// `advance` are clear.
pub fn local_bypass(
    world: &CollisionWorld,
    from: &Vec3,
    advance: &Vec3,
    diameter: f32,
    lateral: Axis,
    bias: Bias,
    settings: &RouteSettings,
) -> RouteResult<LocalBypass> {
    let step = settings.step_length;
    let unit = lateral.unit();
    let is_clear = |offset: f32| {
        let sideways = from + unit * offset;
        !world.probe(&sideways, diameter) && !world.probe(&(sideways + advance), diameter)
    };

    let outcomes: Vec<(Side, Option<u32>)> = bias
        .permitted_sides()
        .iter()
        .map(|&side| {
            (
                side,
                search_side(side, step, settings.max_bypass_increments, &is_clear),
            )
        })
        .collect();

    let Some(bypass) = choose_side(&outcomes, SidePolicy::FewestIncrements, step) else {
        return Err(RouteError::BypassExhausted {
            at: *from,
            lateral,
            increments: settings.max_bypass_increments,
        });
    };

    let lateral_point = from + unit * bypass.offset(step);
    debug!(
        "local bypass at ({:.1}, {:.1}, {:.1}): {:?} x{} along {:?}",
        from.x, from.y, from.z, bypass.side, bypass.increments, lateral
    );
    Ok(LocalBypass {
        lateral_point,
        advanced_point: lateral_point + advance,
        bypass,
    })
}

/// Translate a whole path along the lateral axis until its capsule chain is clear.
pub fn whole_path_bypass(
    world: &CollisionWorld,
    path: &[Vec3],
    diameter: f32,
    lateral: Axis,
    bias: Bias,
    policy: SidePolicy,
    settings: &RouteSettings,
) -> RouteResult<PathShift> {
    if !world.probe_path(path, diameter) {
        return Ok(PathShift {
            points: path.to_vec(),
            offset: 0.0,
            bypass: None,
        });
    }

    let step = settings.step_length;
    let outcomes: Vec<(Side, Option<u32>)> = sides_for(bias, policy)
        .iter()
        .map(|&side| {
            let found = search_side(side, step, settings.max_bypass_increments, |offset| {
                !world.probe_path(&shift_points(path, lateral, offset), diameter)
            });
            (side, found)
        })
        .collect();

    let Some(bypass) = choose_side(&outcomes, policy, step) else {
        return Err(RouteError::BypassExhausted {
            at: path.first().copied().unwrap_or_else(Vec3::zeros),
            lateral,
            increments: settings.max_bypass_increments,
        });
    };

    let offset = bypass.offset(step);
    debug!(
        "whole-path bypass: {:?} x{} ({offset:+.1} mm along {:?})",
        bypass.side, bypass.increments, lateral
    );
    Ok(PathShift {
        points: shift_points(path, lateral, offset),
        offset,
        bypass: Some(bypass),
    })
}
