//! Path simplification: stepped walker output down to bend points, then snapped to flat,
//! axis-aligned offsets.
//!
//! Feature extraction looks at every interior point together with its two neighbours and
//! keeps it only if the 3x3 matrix of their coordinates has full numeric rank. Sampling
//! noise along a straight run never reaches full rank, so a straight stepped path reduces to
//! its two ends.
//!
//! The rank test works on absolute coordinates, so a triple that contains the exact origin
//! always has a zero row. [`is_origin_triple`] names that case: there, only a collinear
//! triple (rank 1) counts as "not a bend".

use nalgebra::{Matrix3, RowVector3};

use crate::math::{Axis, Vec3, with_coord};

/// True when any point of the triple is exactly the coordinate origin.
#[inline]
pub fn is_origin_triple(triple: &[Vec3; 3]) -> bool {
    triple.iter().any(|p| *p == Vec3::zeros())
}

/// Numeric rank of the matrix whose rows are the three points.
///
/// A singular value counts when it exceeds `largest * tolerance`.
pub fn numeric_rank(triple: &[Vec3; 3], tolerance: f64) -> usize {
    let rows: [RowVector3<f64>; 3] = triple.map(|p| p.cast::<f64>().transpose());
    let singular = Matrix3::from_rows(&rows).singular_values();
    let largest = singular.max();
    if largest <= 0.0 {
        return 0;
    }
    singular.iter().filter(|&&s| s > largest * tolerance).count()
}

/// Is the middle point of the triple a genuine direction change?
pub fn is_bend(triple: &[Vec3; 3], tolerance: f64) -> bool {
    let rank = numeric_rank(triple, tolerance);
    if is_origin_triple(triple) {
        rank >= 2
    } else {
        rank == 3
    }
}

/// The first point, every interior bend, and the last point of `path`.
pub fn feature_points(path: &[Vec3], tolerance: f64) -> Vec<Vec3> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut features = Vec::with_capacity(path.len());
    features.push(path[0]);
    for window in path.windows(3) {
        let triple = [window[0], window[1], window[2]];
        if is_bend(&triple, tolerance) {
            features.push(window[1]);
        }
    }
    features.push(path[path.len() - 1]);
    features
}

/// Coordinate on `axis` that deviates most from `reference` among `points`.
///
/// The first point reaching the maximum wins. With no points the reference itself is returned.
pub fn extreme_on_axis(points: &[Vec3], axis: Axis, reference: f32) -> f32 {
    let i = axis.index();
    let mut level = reference;
    let mut deviation = 0.0_f32;
    for p in points {
        let d = (p[i] - reference).abs();
        if d > deviation {
            deviation = d;
            level = p[i];
        }
    }
    level
}

/// Two-point path from the first to the last feature point, both moved to the extreme
/// coordinate on `axis` (measured from the first point).
///
/// `None` when `features` is empty.
pub fn snap_single_axis(features: &[Vec3], axis: Axis) -> Option<[Vec3; 2]> {
    let (first, last) = (features.first()?, features.last()?);
    let level = extreme_on_axis(features, axis, first[axis.index()]);
    Some([with_coord(*first, axis, level), with_coord(*last, axis, level)])
}

/// As [`snap_single_axis`], with the extreme found independently on each of two axes.
pub fn snap_two_axis(features: &[Vec3], first_axis: Axis, second_axis: Axis) -> Option<[Vec3; 2]> {
    let (first, last) = (features.first()?, features.last()?);
    let a = extreme_on_axis(features, first_axis, first[first_axis.index()]);
    let b = extreme_on_axis(features, second_axis, first[second_axis.index()]);
    let place = |p: &Vec3| with_coord(with_coord(*p, first_axis, a), second_axis, b);
    Some([place(first), place(last)])
}

/// Force every point of `control` onto one `axis` coordinate: the sample that deviates most
/// from `reference`.
pub fn snap_to_reference(
    control: &[Vec3],
    samples: &[Vec3],
    axis: Axis,
    reference: f32,
) -> Vec<Vec3> {
    let level = extreme_on_axis(samples, axis, reference);
    control.iter().map(|p| with_coord(*p, axis, level)).collect()
}
