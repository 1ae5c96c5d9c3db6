pub mod bypass;
pub mod constants;
pub mod error;
pub mod layout;
pub mod math;
pub mod rebar;
pub mod settings;
pub mod shape;
pub mod simplify;
pub mod stepper;
pub mod stopwatch;
pub mod world;

pub use bypass::{Bias, Side, SidePolicy};
pub use error::{LayoutError, LayoutResult, RouteError, RouteResult};
pub use layout::RebarLayout;
pub use math::{Axis, Quat, Vec3};
pub use rebar::{
    BarPair, DistributionVariant, GroupBars, GroupLayout, GroupRole, LayoutReport,
    NominalRebarPath, RebarGroup, ResolvedRebarPath,
};
pub use settings::RouteSettings;
pub use shape::{CollisionShape, Pose};
pub use world::CollisionWorld;
