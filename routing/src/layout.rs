/*!
Group layout orchestration.

[`RebarLayout`] owns the collision world for one stair and places every bar greedily:
- groups run in [`GroupRole`] order, equal roles in input order, bars in index order
- each solved bar (or distribution pair) is committed to the world before the next is solved,
  so later bars route around earlier ones
- nothing placed is ever revisited

Strategies
- Long bars: walked point-wise segment by segment with the bias carried, reduced to feature
  points, snapped flat on the lateral axis, then checked as a whole under the locked bias.
- Stirrups: the nominal shape is already the bend schedule; it is only translated.
- Distribution pairs: bottom first, top at the bottom's offset, then the bottom follows the
  top. If the bottom is blocked where the top ended up, the bottom moves on and the top is
  solved again, a bounded number of times.
*/

use log::{debug, error, info};

use crate::bypass::{Bias, PathShift, SidePolicy, whole_path_bypass};
use crate::error::{LayoutError, LayoutResult, RouteError, RouteResult};
use crate::math::{Axis, Vec3, shift_points, with_coord};
use crate::rebar::{
    BarPair, DistributionVariant, GroupBars, GroupLayout, LayoutReport, NominalRebarPath,
    RebarGroup, ResolvedRebarPath,
};
use crate::settings::RouteSettings;
use crate::simplify::{feature_points, snap_single_axis, snap_to_reference, snap_two_axis};
use crate::stepper::walk_path;
use crate::stopwatch::LayoutStopwatch;
use crate::world::CollisionWorld;

/// Single-owner layout run over one stair's collision world.
pub struct RebarLayout {
    world: CollisionWorld,
    settings: RouteSettings,
}

impl RebarLayout {
    /// `world` should already hold the stair's obstacles.
    pub fn new(world: CollisionWorld, settings: RouteSettings) -> Self {
        Self { world, settings }
    }

    #[inline]
    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    #[inline]
    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// Lay out every group. The report lists groups in input order.
    ///
    /// The first failing bar aborts the run; no partial report is returned.
    pub fn run(mut self, groups: &[RebarGroup]) -> LayoutResult<LayoutReport> {
        for group in groups {
            check_nominal_paths(group).inspect_err(|err| error!("rebar layout rejected: {err}"))?;
        }

        // Stable: equal roles keep input order.
        let mut order: Vec<usize> = (0..groups.len()).collect();
        order.sort_by_key(|&i| groups[i].role);

        let mut sw = LayoutStopwatch::new("rebar layout");
        let mut solved: Vec<Option<GroupLayout>> = vec![None; groups.len()];
        for index in order {
            let group = &groups[index];
            sw.span(&group.name);
            let layout = self
                .layout_group(group)
                .inspect_err(|err| error!("rebar layout aborted: {err}"))?;
            solved[index] = Some(layout);
        }
        sw.end_span();

        Ok(LayoutReport {
            groups: solved.into_iter().flatten().collect(),
        })
    }

    fn layout_group(&mut self, group: &RebarGroup) -> LayoutResult<GroupLayout> {
        info!(
            "group '{}' ({:?}): {} bars, lateral {:?}",
            group.name,
            group.role,
            group.bars.path_count(),
            group.lateral
        );

        let paths = match &group.bars {
            GroupBars::Long { bars, share_offset } => {
                self.long_layout(group, bars, *share_offset)?
            }
            GroupBars::Stirrups { bars } => self.stirrup_layout(group, bars)?,
            GroupBars::Distribution { variant, pairs } => {
                self.dis_layout(group, *variant, pairs)?
            }
        };

        let deflected = paths.iter().filter(|p| p.offset != 0.0).count();
        info!(
            "group '{}' placed: {deflected} of {} bars deflected, {} shapes in world",
            group.name,
            paths.len(),
            self.world.len()
        );
        Ok(GroupLayout {
            name: group.name.clone(),
            role: group.role,
            paths,
        })
    }

    fn long_layout(
        &mut self,
        group: &RebarGroup,
        bars: &[NominalRebarPath],
        share_offset: bool,
    ) -> LayoutResult<Vec<ResolvedRebarPath>> {
        let mut paths = Vec::with_capacity(bars.len());
        let mut carried = 0.0;
        for (index, bar) in bars.iter().enumerate() {
            let pre_offset = if share_offset { carried } else { 0.0 };
            let resolved =
                route_long_bar(&self.world, bar, group.lateral, pre_offset, &self.settings)
                    .map_err(|source| bar_error(group, index, source))?;
            debug!("'{}' bar {index}: offset {:+.1}", group.name, resolved.offset);
            carried = resolved.offset;
            self.world.commit_path(&resolved.points, resolved.diameter);
            paths.push(resolved);
        }
        Ok(paths)
    }

    fn stirrup_layout(
        &mut self,
        group: &RebarGroup,
        bars: &[NominalRebarPath],
    ) -> LayoutResult<Vec<ResolvedRebarPath>> {
        let mut paths = Vec::with_capacity(bars.len());
        for (index, bar) in bars.iter().enumerate() {
            let resolved = route_stirrup(&self.world, bar, group.lateral, &self.settings)
                .map_err(|source| bar_error(group, index, source))?;
            debug!("'{}' stirrup {index}: offset {:+.1}", group.name, resolved.offset);
            self.world.commit_path(&resolved.points, resolved.diameter);
            paths.push(resolved);
        }
        Ok(paths)
    }

    fn dis_layout(
        &mut self,
        group: &RebarGroup,
        variant: DistributionVariant,
        pairs: &[BarPair],
    ) -> LayoutResult<Vec<ResolvedRebarPath>> {
        let mut paths = Vec::with_capacity(pairs.len() * 2);
        for (index, pair) in pairs.iter().enumerate() {
            let [bottom, top] =
                route_pair(&self.world, pair, group.lateral, variant, &self.settings)
                    .map_err(|source| bar_error(group, index, source))?;
            debug!("'{}' pair {index}: offset {:+.1}", group.name, bottom.offset);
            self.world.commit_path(&bottom.points, bottom.diameter);
            self.world.commit_path(&top.points, top.diameter);
            paths.push(bottom);
            paths.push(top);
        }
        Ok(paths)
    }
}

fn bar_error(group: &RebarGroup, bar: usize, source: RouteError) -> LayoutError {
    LayoutError::Bar {
        group: group.name.clone(),
        bar,
        source,
    }
}

/// Every nominal path needs at least two control points. `bar` is the index of the bar, or
/// of the pair for distribution groups.
fn check_nominal_paths(group: &RebarGroup) -> LayoutResult<()> {
    let check = |bar: usize, path: &NominalRebarPath| {
        if path.points.len() < 2 {
            return Err(LayoutError::DegeneratePath {
                group: group.name.clone(),
                bar,
                points: path.points.len(),
            });
        }
        Ok(())
    };

    match &group.bars {
        GroupBars::Long { bars, .. } | GroupBars::Stirrups { bars } => {
            for (index, bar) in bars.iter().enumerate() {
                check(index, bar)?;
            }
        }
        GroupBars::Distribution { pairs, .. } => {
            for (index, pair) in pairs.iter().enumerate() {
                check(index, &pair.bottom)?;
                check(index, &pair.top)?;
            }
        }
    }
    Ok(())
}

#[inline]
fn lateral_of(points: &[Vec3], lateral: Axis) -> f32 {
    points.first().map_or(0.0, |p| p[lateral.index()])
}

fn bias_after(bias: Bias, shift: &PathShift) -> Bias {
    shift.bypass.map_or(bias, |b| bias.lock(b.side))
}

/// Walk, simplify, snap and verify one long bar. `pre_offset` shifts the nominal path
/// before the walk starts.
pub fn route_long_bar(
    world: &CollisionWorld,
    bar: &NominalRebarPath,
    lateral: Axis,
    pre_offset: f32,
    settings: &RouteSettings,
) -> RouteResult<ResolvedRebarPath> {
    let base = shift_points(&bar.points, lateral, pre_offset);
    let walk = walk_path(world, &base, bar.diameter, lateral, Bias::Unlocked, settings)?;
    let features = feature_points(&walk.points, settings.rank_tolerance);

    let snapped = if base.len() == 2 {
        snap_single_axis(&features, lateral).map_or_else(|| base.clone(), Vec::from)
    } else {
        snap_to_reference(&base, &features, lateral, lateral_of(&base, lateral))
    };

    let verified = whole_path_bypass(
        world,
        &snapped,
        bar.diameter,
        lateral,
        walk.bias,
        SidePolicy::FewestIncrements,
        settings,
    )?;

    Ok(ResolvedRebarPath {
        offset: lateral_of(&verified.points, lateral) - lateral_of(&bar.points, lateral),
        bias: bias_after(walk.bias, &verified),
        points: verified.points,
        diameter: bar.diameter,
    })
}

/// Translate one stirrup until clear.
pub fn route_stirrup(
    world: &CollisionWorld,
    bar: &NominalRebarPath,
    lateral: Axis,
    settings: &RouteSettings,
) -> RouteResult<ResolvedRebarPath> {
    let shift = whole_path_bypass(
        world,
        &bar.points,
        bar.diameter,
        lateral,
        Bias::Unlocked,
        SidePolicy::FewestIncrements,
        settings,
    )?;
    Ok(ResolvedRebarPath {
        offset: shift.offset,
        bias: bias_after(Bias::Unlocked, &shift),
        points: shift.points,
        diameter: bar.diameter,
    })
}

/// Solve a distribution pair. Returns `[bottom, top]`, both at one shared lateral offset.
pub fn route_pair(
    world: &CollisionWorld,
    pair: &BarPair,
    lateral: Axis,
    variant: DistributionVariant,
    settings: &RouteSettings,
) -> RouteResult<[ResolvedRebarPath; 2]> {
    let (bottom_shape, mut offset, mut bottom_bias) =
        solve_bottom(world, &pair.bottom, lateral, variant, settings)?;
    let top_shape = &pair.top.points;
    let mut top_bias = Bias::Unlocked;

    for pass in 0..settings.max_coupling_passes {
        let policy = match variant {
            DistributionVariant::Top => SidePolicy::SmallestDisplacement {
                prior_offset: offset,
            },
            DistributionVariant::Stepped | DistributionVariant::Bottom => {
                SidePolicy::FewestIncrements
            }
        };
        let top = whole_path_bypass(
            world,
            &shift_points(top_shape, lateral, offset),
            pair.top.diameter,
            lateral,
            Bias::Unlocked,
            policy,
            settings,
        )?;
        offset += top.offset;
        top_bias = bias_after(top_bias, &top);

        let bottom_points = shift_points(&bottom_shape, lateral, offset);
        if !world.probe_path(&bottom_points, pair.bottom.diameter) {
            return Ok([
                ResolvedRebarPath {
                    points: bottom_points,
                    diameter: pair.bottom.diameter,
                    offset,
                    bias: bottom_bias,
                },
                ResolvedRebarPath {
                    points: top.points,
                    diameter: pair.top.diameter,
                    offset,
                    bias: top_bias,
                },
            ]);
        }

        debug!("pair coupling pass {pass}: bottom blocked at offset {offset:+.1}");
        let bottom = whole_path_bypass(
            world,
            &bottom_points,
            pair.bottom.diameter,
            lateral,
            Bias::Unlocked,
            SidePolicy::FewestIncrements,
            settings,
        )?;
        offset += bottom.offset;
        bottom_bias = bias_after(bottom_bias, &bottom);
    }

    Err(RouteError::CouplingUnresolved {
        passes: settings.max_coupling_passes,
    })
}

/// First placement of a pair's bottom bar.
///
/// Returns the bottom's shape at its nominal lateral position, the clear offset found for
/// it, and its bias.
fn solve_bottom(
    world: &CollisionWorld,
    bottom: &NominalRebarPath,
    lateral: Axis,
    variant: DistributionVariant,
    settings: &RouteSettings,
) -> RouteResult<(Vec<Vec3>, f32, Bias)> {
    let nominal = lateral_of(&bottom.points, lateral);
    let (shape, offset, bias) = match variant {
        DistributionVariant::Stepped => {
            let (Some(first), Some(last)) = (bottom.points.first(), bottom.points.last()) else {
                return Ok((bottom.points.clone(), 0.0, Bias::Unlocked));
            };
            let cross = Axis::dominant(&(last - first))
                .remaining(lateral)
                .ok_or(RouteError::TravelAlongLateral {
                    at: *first,
                    lateral,
                })?;
            let walk = walk_path(
                world,
                &bottom.points,
                bottom.diameter,
                lateral,
                Bias::Unlocked,
                settings,
            )?;
            let features = feature_points(&walk.points, settings.rank_tolerance);
            match snap_two_axis(&features, lateral, cross) {
                Some(snapped) => {
                    let offset = snapped[0][lateral.index()] - nominal;
                    let shape: Vec<Vec3> =
                        snapped.iter().map(|p| with_coord(*p, lateral, nominal)).collect();
                    (shape, offset, walk.bias)
                }
                None => (bottom.points.clone(), 0.0, walk.bias),
            }
        }
        DistributionVariant::Bottom | DistributionVariant::Top => {
            (bottom.points.clone(), 0.0, Bias::Unlocked)
        }
    };

    let shift = whole_path_bypass(
        world,
        &shift_points(&shape, lateral, offset),
        bottom.diameter,
        lateral,
        bias,
        SidePolicy::FewestIncrements,
        settings,
    )?;
    Ok((shape, offset + shift.offset, bias_after(bias, &shift)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bypass::Side;
    use crate::rebar::GroupRole;
    use crate::shape::CollisionShape;

    const TOL: f32 = 1.0e-3;

    fn settings() -> RouteSettings {
        RouteSettings::default()
    }

    /// x in [581, 621], y in [480, 2480], z in [0, 200]: blocks a bar along X at y = 500.
    fn wall() -> CollisionShape {
        CollisionShape::cuboid_from_bounds(
            Vec3::new(581.0, 480.0, 0.0),
            Vec3::new(621.0, 2480.0, 200.0),
        )
    }

    fn bar_along_x(y: f32, z: f32, diameter: f32) -> NominalRebarPath {
        NominalRebarPath::new(
            vec![Vec3::new(100.0, y, z), Vec3::new(1100.0, y, z)],
            diameter,
        )
    }

    fn bar_along_y(x: f32, z: f32) -> NominalRebarPath {
        NominalRebarPath::new(vec![Vec3::new(x, 100.0, z), Vec3::new(x, 900.0, z)], 10.0)
    }

    fn long_group(name: &str, role: GroupRole, bars: Vec<NominalRebarPath>) -> RebarGroup {
        RebarGroup {
            name: name.to_owned(),
            role,
            lateral: Axis::Y,
            bars: GroupBars::Long {
                bars,
                share_offset: false,
            },
        }
    }

    fn pair_group(variant: DistributionVariant) -> RebarGroup {
        RebarGroup {
            name: "distribution".to_owned(),
            role: GroupRole::Distribution,
            lateral: Axis::X,
            bars: GroupBars::Distribution {
                variant,
                pairs: vec![BarPair {
                    bottom: bar_along_y(500.0, 50.0),
                    top: bar_along_y(500.0, 150.0),
                }],
            },
        }
    }

    /// Box over y in [400, 600] with the given x and z ranges.
    fn block(x: (f32, f32), z: (f32, f32)) -> CollisionShape {
        CollisionShape::cuboid_from_bounds(Vec3::new(x.0, 400.0, z.0), Vec3::new(x.1, 600.0, z.1))
    }

    fn run(obstacles: Vec<CollisionShape>, groups: &[RebarGroup]) -> LayoutResult<LayoutReport> {
        RebarLayout::new(CollisionWorld::with_obstacles(obstacles), settings()).run(groups)
    }

    fn assert_flat(path: &ResolvedRebarPath, axis: Axis, level: f32) {
        for p in &path.points {
            assert!(
                (p[axis.index()] - level).abs() < TOL,
                "{p:?} is not at {axis:?} = {level}"
            );
        }
    }

    #[test]
    fn blocked_long_bar_resolves_on_the_open_side() {
        let bars = vec![bar_along_x(500.0, 100.0, 12.0)];
        let groups = [long_group("main", GroupRole::MainLongitudinal, bars)];
        let report = run(vec![wall()], &groups).unwrap();

        let path = &report.groups[0].paths[0];
        assert_eq!(path.bias, Bias::Locked(Side::Negative));
        assert!((path.offset + 27.0).abs() < TOL);
        assert_eq!(path.points.len(), 2);
        assert_flat(path, Axis::Y, 473.0);
        assert_eq!(path.points[0].x, 100.0);
        assert_eq!(path.points[1].x, 1100.0);
        assert_eq!(path.diameter, 12.0);
    }

    #[test]
    fn second_bar_avoids_the_first() {
        let groups = [long_group(
            "main",
            GroupRole::MainLongitudinal,
            vec![bar_along_x(500.0, 100.0, 12.0), bar_along_x(470.0, 100.0, 10.0)],
        )];
        let report = run(vec![wall()], &groups).unwrap();

        let [first, second] = &report.groups[0].paths[..] else {
            panic!("expected two paths");
        };
        assert_flat(first, Axis::Y, 473.0);
        assert_flat(second, Axis::Y, 461.0);
        assert_eq!(second.bias, Bias::Locked(Side::Negative));
        // Centre lines further apart than the two radii.
        assert!((first.points[0].y - second.points[0].y).abs() > 11.0);
    }

    #[test]
    fn shared_offset_starts_from_the_previous_bar() {
        let bars = vec![bar_along_x(500.0, 100.0, 12.0), bar_along_x(500.0, 300.0, 12.0)];
        let mut group = long_group("edge", GroupRole::EdgeReinforcement, bars.clone());
        let unshared = run(vec![wall()], &[group.clone()]).unwrap();
        assert_eq!(unshared.groups[0].paths[1].offset, 0.0);

        group.bars = GroupBars::Long {
            bars,
            share_offset: true,
        };
        let shared = run(vec![wall()], &[group]).unwrap();
        let second = &shared.groups[0].paths[1];
        assert!((second.offset + 27.0).abs() < TOL);
        assert_flat(second, Axis::Y, 473.0);
        assert_eq!(second.bias, Bias::Unlocked);
    }

    #[test]
    fn multi_point_long_bar_keeps_its_shape() {
        let bar = NominalRebarPath::new(
            vec![
                Vec3::new(100.0, 500.0, 100.0),
                Vec3::new(1100.0, 500.0, 100.0),
                Vec3::new(1100.0, 500.0, 400.0),
            ],
            12.0,
        );
        let groups = [long_group("main", GroupRole::MainLongitudinal, vec![bar])];
        let report = run(vec![wall()], &groups).unwrap();

        let path = &report.groups[0].paths[0];
        assert_eq!(path.points.len(), 3);
        assert_flat(path, Axis::Y, 473.0);
        assert_eq!(path.points[1].x, 1100.0);
        assert_eq!(path.points[2].z, 400.0);
    }

    #[test]
    fn stirrup_moves_as_one_unit() {
        let stirrup = NominalRebarPath::new(
            vec![
                Vec3::new(100.0, 500.0, 100.0),
                Vec3::new(400.0, 500.0, 100.0),
                Vec3::new(400.0, 500.0, 300.0),
                Vec3::new(100.0, 500.0, 300.0),
                Vec3::new(100.0, 500.0, 120.0),
            ],
            8.0,
        );
        let obstacle = CollisionShape::cuboid_from_bounds(
            Vec3::new(200.0, 488.0, 90.0),
            Vec3::new(300.0, 510.0, 110.0),
        );
        let report = run(vec![obstacle], &[stirrup_group(vec![stirrup.clone()])]).unwrap();

        let path = &report.groups[0].paths[0];
        assert!((path.offset - 15.0).abs() < TOL);
        assert_eq!(path.bias, Bias::Locked(Side::Positive));
        assert_eq!(path.points.len(), stirrup.points.len());
        for (moved, nominal) in path.points.iter().zip(&stirrup.points) {
            assert!((moved - nominal - Vec3::new(0.0, 15.0, 0.0)).norm() < TOL);
        }
    }

    /// Closed stirrup in the XZ plane at y = 500 with a long bottom leg along X.
    fn wide_stirrup(diameter: f32) -> NominalRebarPath {
        NominalRebarPath::new(
            vec![
                Vec3::new(100.0, 500.0, 100.0),
                Vec3::new(900.0, 500.0, 100.0),
                Vec3::new(900.0, 500.0, 300.0),
                Vec3::new(100.0, 500.0, 300.0),
                Vec3::new(100.0, 500.0, 120.0),
            ],
            diameter,
        )
    }

    fn stirrup_group(bars: Vec<NominalRebarPath>) -> RebarGroup {
        RebarGroup {
            name: "stirrups".to_owned(),
            role: GroupRole::Stirrups,
            lateral: Axis::Y,
            bars: GroupBars::Stirrups { bars },
        }
    }

    #[test]
    fn long_stirrup_leg_through_a_box_is_moved_clear() {
        // 100 mm cube on the middle of the bottom leg: y in [450, 550]. Either side needs
        // 19 increments (557 or 443); the tie goes positive.
        let cube = CollisionShape::cuboid(Vec3::repeat(50.0), Vec3::new(500.0, 500.0, 100.0));
        let report = run(vec![cube], &[stirrup_group(vec![wide_stirrup(12.0)])]).unwrap();

        let path = &report.groups[0].paths[0];
        assert!((path.offset - 57.0).abs() < TOL);
        assert_eq!(path.bias, Bias::Locked(Side::Positive));
        assert_flat(path, Axis::Y, 557.0);
    }

    #[test]
    fn identical_stirrups_do_not_overlap() {
        // Centre lines must end up more than one diameter (13) apart: 15 is the first clear
        // multiple of the step.
        let report = run(
            Vec::new(),
            &[stirrup_group(vec![wide_stirrup(13.0), wide_stirrup(13.0)])],
        )
        .unwrap();

        let [first, second] = &report.groups[0].paths[..] else {
            panic!("expected two paths");
        };
        assert_eq!(first.offset, 0.0);
        assert!((second.offset - 15.0).abs() < TOL);
        assert_flat(second, Axis::Y, 515.0);
    }

    #[test]
    fn distribution_bar_along_its_lateral_axis_is_rejected() {
        let mut group = pair_group(DistributionVariant::Stepped);
        group.lateral = Axis::Y;
        let err = run(Vec::new(), &[group]).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Bar {
                bar: 0,
                source: RouteError::TravelAlongLateral { lateral: Axis::Y, .. },
                ..
            }
        ));
    }

    #[test]
    fn bottom_follows_a_deflected_top() {
        let report = run(
            vec![block((480.0, 520.0), (130.0, 170.0))],
            &[pair_group(DistributionVariant::Bottom)],
        )
        .unwrap();

        let [bottom, top] = &report.groups[0].paths[..] else {
            panic!("expected a bottom and a top path");
        };
        // Both sides need 9 increments; the tie goes positive.
        assert_flat(top, Axis::X, 527.0);
        assert_flat(bottom, Axis::X, 527.0);
        assert_eq!(bottom.offset, top.offset);
        assert_flat(bottom, Axis::Z, 50.0);
        assert_flat(top, Axis::Z, 150.0);
        assert_eq!(bottom.bias, Bias::Unlocked);
        assert_eq!(top.bias, Bias::Locked(Side::Positive));
    }

    fn two_block_obstacles() -> Vec<CollisionShape> {
        vec![
            block((489.5, 510.5), (40.0, 60.0)),
            block((488.5, 532.5), (140.0, 160.0)),
        ]
    }

    #[test]
    fn bottom_variant_takes_fewest_increments_for_the_top() {
        // Bottom clears at +18. From there the top clears at +21 or -36.
        let groups = [pair_group(DistributionVariant::Bottom)];
        let report = run(two_block_obstacles(), &groups).unwrap();
        let paths = &report.groups[0].paths;
        assert_flat(&paths[0], Axis::X, 539.0);
        assert_flat(&paths[1], Axis::X, 539.0);
    }

    #[test]
    fn top_variant_takes_smallest_displacement_for_the_top() {
        // Same geometry: +21 leaves the top 39 mm from nominal, -36 only 18 mm.
        let report = run(two_block_obstacles(), &[pair_group(DistributionVariant::Top)]).unwrap();
        let paths = &report.groups[0].paths;
        assert_flat(&paths[0], Axis::X, 482.0);
        assert_flat(&paths[1], Axis::X, 482.0);
        assert!((paths[1].offset + 18.0).abs() < TOL);
        assert_eq!(paths[1].bias, Bias::Locked(Side::Negative));
    }

    #[test]
    fn stepped_variant_walks_the_bottom_bar() {
        let groups = [pair_group(DistributionVariant::Stepped)];
        let report = run(two_block_obstacles(), &groups).unwrap();
        let [bottom, top] = &report.groups[0].paths[..] else {
            panic!("expected a bottom and a top path");
        };
        assert_eq!(bottom.points.len(), 2);
        assert_eq!(bottom.bias, Bias::Locked(Side::Positive));
        assert_flat(bottom, Axis::X, 539.0);
        assert_flat(top, Axis::X, 539.0);
        assert_flat(bottom, Axis::Z, 50.0);
    }

    #[test]
    fn blocked_bottom_is_moved_on_and_the_top_re_solved() {
        // Top goes +27; a block at the bottom's level sits exactly there.
        let obstacles = vec![
            block((480.0, 520.0), (130.0, 170.0)),
            block((522.0, 532.0), (40.0, 60.0)),
        ];
        let report = run(obstacles.clone(), &[pair_group(DistributionVariant::Bottom)]).unwrap();
        let paths = &report.groups[0].paths;
        assert_flat(&paths[0], Axis::X, 539.0);
        assert_flat(&paths[1], Axis::X, 539.0);

        let single_pass = RouteSettings {
            max_coupling_passes: 1,
            ..RouteSettings::default()
        };
        let err = RebarLayout::new(CollisionWorld::with_obstacles(obstacles), single_pass)
            .run(&[pair_group(DistributionVariant::Bottom)])
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Bar {
                group: "distribution".to_owned(),
                bar: 0,
                source: RouteError::CouplingUnresolved { passes: 1 },
            }
        );
    }

    #[test]
    fn groups_run_by_role_and_report_in_input_order() {
        // Identical bars: whichever group runs first keeps the nominal position.
        let groups = [
            long_group("additional", GroupRole::Additional, vec![bar_along_x(500.0, 100.0, 10.0)]),
            long_group("edge", GroupRole::EdgeReinforcement, vec![bar_along_x(500.0, 100.0, 12.0)]),
        ];
        let report = run(Vec::new(), &groups).unwrap();

        let names: Vec<&str> = report.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["additional", "edge"]);
        assert_eq!(report.group("edge").unwrap().paths[0].offset, 0.0);

        let deflected = &report.group("additional").unwrap().paths[0];
        assert!((deflected.offset - 12.0).abs() < TOL);
        assert_eq!(deflected.bias, Bias::Locked(Side::Positive));
    }

    #[test]
    fn exhausted_bar_aborts_the_run() {
        let blocker = CollisionShape::cuboid_from_bounds(
            Vec3::new(581.0, -5000.0, 0.0),
            Vec3::new(621.0, 5000.0, 200.0),
        );
        let groups = [
            long_group("edge", GroupRole::EdgeReinforcement, vec![bar_along_x(500.0, 300.0, 12.0)]),
            long_group(
                "main",
                GroupRole::MainLongitudinal,
                vec![bar_along_x(500.0, 500.0, 12.0), bar_along_x(500.0, 100.0, 12.0)],
            ),
        ];
        let err = run(vec![blocker], &groups).unwrap_err();
        assert_eq!(err.group(), "main");
        assert!(matches!(
            err,
            LayoutError::Bar {
                bar: 1,
                source: RouteError::BypassExhausted { lateral: Axis::Y, .. },
                ..
            }
        ));
    }

    #[test]
    fn single_point_path_is_rejected_before_layout() {
        let groups = [long_group(
            "main",
            GroupRole::MainLongitudinal,
            vec![NominalRebarPath::new(vec![Vec3::new(1.0, 2.0, 3.0)], 12.0)],
        )];
        let err = run(Vec::new(), &groups).unwrap_err();
        assert_eq!(
            err,
            LayoutError::DegeneratePath {
                group: "main".to_owned(),
                bar: 0,
                points: 1,
            }
        );
    }

    #[test]
    fn layout_is_deterministic() {
        let groups = [
            long_group(
                "main",
                GroupRole::MainLongitudinal,
                vec![bar_along_x(500.0, 100.0, 12.0), bar_along_x(470.0, 100.0, 10.0)],
            ),
            pair_group(DistributionVariant::Top),
        ];
        let mut obstacles = two_block_obstacles();
        obstacles.push(wall());
        let first = run(obstacles.clone(), &groups).unwrap();
        let second = run(obstacles, &groups).unwrap();
        assert_eq!(first, second);
    }
}
