//! # drom-indicators - Derived views over DROM-COM tobacco indicators
//!
//! The crate holds read-only indicator data for the French overseas
//! departments and collectivities and derives the views a dashboard renders
//! from it. Every view is a pure function of the stored datasets and the
//! caller's [`ViewParams`]; the engine keeps no per-request state.
//!
//! ## Core Concepts
//!
//! - **IndicatorSeriesStore**: named yearly series sharing a contiguous year domain
//! - **TerritorialSnapshotStore**: one record per territory for a reference year
//! - **PolicyEventLog**: dated, categorised policy measures
//! - **TemporalJoinEngine**: attaches policy events to the series year they fall in
//! - **TerritorialComparator**: ranks territories and measures deviation from a baseline
//! - **ProjectionEngine**: piecewise-linear trajectory from the last observation to targets
//! - **StrategyComparator**: ranks prevention strategies on efficacy, cost or acceptability
//!
//! ## Usage
//!
//! ```
//! use drom_indicators::{BuiltinSource, IndicatorEngine, ViewParams};
//!
//! let engine = IndicatorEngine::from_source(&BuiltinSource).unwrap();
//! let views = engine.derive(&ViewParams::default()).unwrap();
//!
//! let territories = views.territories.unwrap();
//! assert_eq!(territories.rankings[0].rows[0].territory, "Mayotte");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod source;
pub mod store;
pub mod time;
pub mod views;

pub use config::{
    FocusArea, ViewParams, FIRST_CIGARETTE_AGE_VIGILANCE, METROPOLE_DAILY_SMOKERS,
    METROPOLE_FIRST_CIGARETTE_AGE, METROPOLE_PREVALENCE,
};
pub use engine::{
    DashboardViews, IndicatorEngine, ProjectionView, SeriesView, StrategyView, TerritorialView,
};
pub use error::{IndicatorError, IndicatorResult, QueryError, SourceError, ValidationError};
pub use metrics::{KeyMetric, TargetGap, TargetProgress};
pub use source::{load_from, BuiltinSource, DataSource, Datasets, JsonSource, SeriesDataset};
pub use store::{
    ActionPhase, ActionPlan, GeoPoint, IndicatorSeries, IndicatorSeriesStore, PolicyCategory,
    PolicyEvent, PolicyEventLog, PreventionStrategy, SeriesPoint, StrategicTarget,
    StrategyCatalog, StrategyCriterion, TargetRegistry, TerritorialRecord,
    TerritorialSnapshotStore,
};
pub use time::YearRange;
pub use views::{
    deviation, Anchor, ComparisonView, JoinedTimeline, JoinedYear, PointKind, ProjectionEngine,
    RankedStrategy, StrategyComparator, StrategyRanking, TemporalJoinEngine,
    TerritorialComparator, TerritoryComparison, TrajectoryPoint, MAX_PROJECTION_YEARS,
};
