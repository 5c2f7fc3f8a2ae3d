//! Immutable in-memory stores.
//!
//! Stores are built once through their validating constructors and never
//! mutated afterwards; every derived view reads them and allocates its own
//! result.

mod policy;
mod series;
mod strategy;
mod target;
mod territory;

pub use policy::{PolicyCategory, PolicyEvent, PolicyEventLog};
pub use series::{IndicatorSeries, IndicatorSeriesStore, SeriesPoint};
pub use strategy::{
    ActionPhase, ActionPlan, PreventionStrategy, StrategyCatalog, StrategyCriterion, SCORE_MAX,
};
pub use target::{StrategicTarget, TargetRegistry};
pub use territory::{GeoPoint, TerritorialRecord, TerritorialSnapshotStore};
