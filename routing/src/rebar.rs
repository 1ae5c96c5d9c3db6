//! Rebar data exchanged with the geometry layer (nominal paths and groups) and with
//! fabrication export (resolved paths and the layout report).

use serde::{Deserialize, Serialize};

use crate::bypass::Bias;
use crate::math::{Axis, Vec3};

/// Straight-line control points of one bar as designed, before collision avoidance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NominalRebarPath {
    pub points: Vec<Vec3>,
    pub diameter: f32,
}

impl NominalRebarPath {
    pub fn new(points: impl Into<Vec<Vec3>>, diameter: f32) -> Self {
        Self {
            points: points.into(),
            diameter,
        }
    }
}

/// Collision-free bend points of one placed bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRebarPath {
    pub points: Vec<Vec3>,
    pub diameter: f32,
    /// Lateral shift relative to the nominal path (mm).
    pub offset: f32,
    /// Side the bar ended up locked to, if it was ever deflected.
    pub bias: Bias,
}

/// Bottom and top bar of one distribution pair. Both share a lateral offset after layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarPair {
    pub bottom: NominalRebarPath,
    pub top: NominalRebarPath,
}

/// Processing rank of a group. Groups run in this order; the declaration order is the rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupRole {
    EdgeReinforcement,
    MainLongitudinal,
    Stirrups,
    Distribution,
    Additional,
}

/// How the two bars of a distribution pair are solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionVariant {
    /// Bottom bar walked point-wise and snapped on both cross axes.
    Stepped,
    /// Bottom and top bars each translated rigidly, fewest increments.
    Bottom,
    /// As `Bottom`, but the top bar takes the side closest to its original position.
    Top,
}

/// Bars of a group, shaped by the strategy that lays them out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GroupBars {
    /// Walked point-wise, snapped, committed. With `share_offset`, each bar starts from the
    /// previous bar's resolved offset.
    Long {
        bars: Vec<NominalRebarPath>,
        #[serde(default)]
        share_offset: bool,
    },
    /// Rigid closed shapes, translated as one unit.
    Stirrups { bars: Vec<NominalRebarPath> },
    /// Coupled bottom/top pairs.
    Distribution {
        variant: DistributionVariant,
        pairs: Vec<BarPair>,
    },
}

impl GroupBars {
    /// Number of resolved paths this group produces.
    pub fn path_count(&self) -> usize {
        match self {
            GroupBars::Long { bars, .. } | GroupBars::Stirrups { bars } => bars.len(),
            GroupBars::Distribution { pairs, .. } => pairs.len() * 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RebarGroup {
    pub name: String,
    pub role: GroupRole,
    /// Axis detours are searched along.
    pub lateral: Axis,
    pub bars: GroupBars,
}

/// Resolved paths of one group, one per nominal path in input order. A distribution pair
/// contributes its bottom bar, then its top bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub name: String,
    pub role: GroupRole,
    pub paths: Vec<ResolvedRebarPath>,
}

/// Output of a layout run, groups in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub groups: Vec<GroupLayout>,
}

impl LayoutReport {
    pub fn group(&self, name: &str) -> Option<&GroupLayout> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Every resolved path in report order.
    pub fn paths(&self) -> impl Iterator<Item = &ResolvedRebarPath> {
        self.groups.iter().flat_map(|g| g.paths.iter())
    }
}
