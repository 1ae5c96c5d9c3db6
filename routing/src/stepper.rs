/*!
Potential-field stepper: point-wise routing of one bar through its control points.

The walker starts at a control point and is pulled toward the next one by a unit
attraction, one fixed-length step at a time. Every candidate position is probed as a ball of
the bar diameter; a blocked step is handed to [`local_bypass`], which moves it sideways.

Rules
- Start and goal are pulled inward by half the diameter along the travel direction, so the
  bar ends get clearance.
- The dominant axis (largest travel component) decides termination: the walk stops once that
  coordinate is within one step of the goal's, and the exact goal is appended.
- The goal's lateral coordinate follows the walker. A detour is never chased back, so the
  walker keeps whatever lateral offset its bypasses gave it.
- The first bypass side locks the bias for the rest of the bar.
- A segment whose dominant axis is the lateral axis has nothing to step along and is
  rejected with `TravelAlongLateral`.
*/

use log::debug;

use crate::bypass::{Bias, local_bypass};
use crate::constants::DIST_EPS;
use crate::error::{RouteError, RouteResult};
use crate::math::{Axis, Vec3, direction_toward};
use crate::settings::RouteSettings;
use crate::world::CollisionWorld;

/// A single segment walk from `start` to `goal`.
#[derive(Clone, Copy, Debug)]
pub struct WalkRequest {
    pub start: Vec3,
    pub goal: Vec3,
    pub diameter: f32,
    /// Axis detours are searched along. Must differ from the travel's dominant axis.
    pub lateral: Axis,
    pub bias: Bias,
}

/// Raw stepped path of a walk.
#[derive(Clone, Debug, PartialEq)]
pub struct Walk {
    /// Starts at the exact start, ends at the exact goal.
    pub points: Vec<Vec3>,
    /// Bias after the walk (locked once any bypass happened).
    pub bias: Bias,
    /// Number of bypasses taken.
    pub bypasses: u32,
}

/// Walk one segment.
pub fn walk_segment(
    world: &CollisionWorld,
    req: &WalkRequest,
    settings: &RouteSettings,
) -> RouteResult<Walk> {
    let step = settings.step_length;
    let travel = req.goal - req.start;
    let length = travel.norm();
    if length <= DIST_EPS {
        return Ok(Walk {
            points: vec![req.start, req.goal],
            bias: req.bias,
            bypasses: 0,
        });
    }

    let dominant = Axis::dominant(&travel);
    if dominant == req.lateral {
        return Err(RouteError::TravelAlongLateral {
            at: req.start,
            lateral: req.lateral,
        });
    }

    let along = travel / length;
    let inset = along * (req.diameter * 0.5);
    let to = req.goal - inset;
    let dominant = dominant.index();
    let lateral = req.lateral.index();

    let mut pos = req.start + inset;
    let mut bias = req.bias;
    let mut bypasses = 0;
    let mut points = vec![req.start];

    // Every iteration moves one step straight toward the sub-target, so this bound is
    // never the reason the walk ends on valid input.
    let max_steps = (length / step).ceil() as usize + 1;
    for _ in 0..max_steps {
        if (to[dominant] - pos[dominant]).abs() <= step {
            break;
        }

        let mut target = to;
        target[lateral] = pos[lateral];
        let Some(dir) = direction_toward(&pos, &target) else {
            break;
        };
        let advance = dir * step;
        let candidate = pos + advance;

        if !world.probe(&candidate, req.diameter) {
            pos = candidate;
            points.push(pos);
            continue;
        }

        let found =
            local_bypass(world, &pos, &advance, req.diameter, req.lateral, bias, settings)?;
        if bias == Bias::Unlocked {
            debug!("bias locked {:?} after first deflection", found.bypass.side);
        }
        bias = bias.lock(found.bypass.side);
        bypasses += 1;
        points.push(found.lateral_point);
        points.push(found.advanced_point);
        pos = found.advanced_point;
    }

    points.push(req.goal);
    Ok(Walk {
        points,
        bias,
        bypasses,
    })
}

/// Walk every segment of a control-point sequence, carrying the bias from one segment to
/// the next. Joint control points appear once.
pub fn walk_path(
    world: &CollisionWorld,
    control_points: &[Vec3],
    diameter: f32,
    lateral: Axis,
    bias: Bias,
    settings: &RouteSettings,
) -> RouteResult<Walk> {
    let mut walk = Walk {
        points: control_points.first().copied().into_iter().collect(),
        bias,
        bypasses: 0,
    };

    for segment in control_points.windows(2) {
        let req = WalkRequest {
            start: segment[0],
            goal: segment[1],
            diameter,
            lateral,
            bias: walk.bias,
        };
        let part = walk_segment(world, &req, settings)?;
        walk.points.extend(part.points.into_iter().skip(1));
        walk.bias = part.bias;
        walk.bypasses += part.bypasses;
    }

    Ok(walk)
}
