//! Derived views over the stores.
//!
//! Each view is a pure function of its inputs: it reads the stores, never
//! mutates them, and returns a freshly allocated result.

mod compare;
mod join;
mod projection;

pub use compare::{
    deviation, ComparisonView, RankedStrategy, StrategyComparator, StrategyRanking,
    TerritorialComparator, TerritoryComparison,
};
pub use join::{JoinedTimeline, JoinedYear, TemporalJoinEngine};
pub use projection::{Anchor, PointKind, ProjectionEngine, TrajectoryPoint, MAX_PROJECTION_YEARS};
