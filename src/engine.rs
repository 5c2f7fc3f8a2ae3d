//! Derived-view engine.
//!
//! `IndicatorEngine` holds the immutable datasets and answers every view
//! request from scratch. It keeps no per-request state, so one engine can be
//! shared (cloned or behind an `Arc`) by any number of concurrent callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{FocusArea, ViewParams};
use crate::error::{IndicatorResult, QueryError};
use crate::metrics::{KeyMetric, TargetProgress};
use crate::source::{load_from, DataSource, Datasets, SeriesDataset};
use crate::store::{ActionPhase, GeoPoint, IndicatorSeriesStore, SeriesPoint};
use crate::time::YearRange;
use crate::views::{
    Anchor, ComparisonView, JoinedTimeline, ProjectionEngine, StrategyComparator,
    StrategyRanking, TemporalJoinEngine, TerritorialComparator, TrajectoryPoint,
};

/// Series summarised in the headline metrics, in display order.
const HEADLINE: [(SeriesDataset, &str); 4] = [
    (SeriesDataset::Consumption, "smoking_prevalence"),
    (SeriesDataset::Consumption, "daily_smokers"),
    (SeriesDataset::Health, "tobacco_deaths"),
    (SeriesDataset::Consumption, "first_cigarette_age"),
];

/// Every series of one dataset over the requested years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesView {
    /// Dataset the series come from.
    pub dataset: SeriesDataset,
    /// Years actually covered; `None` if the request missed the dataset.
    pub domain: Option<YearRange>,
    /// Series name to points.
    pub series: BTreeMap<String, Vec<SeriesPoint>>,
}

/// Territorial rankings for the selected territories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritorialView {
    /// Snapshot year.
    pub reference_year: i32,
    /// Territories included, in lexical order.
    pub territories: Vec<String>,
    /// Map positions of the included territories.
    pub locations: BTreeMap<String, GeoPoint>,
    /// Recommended actions of the included territories that have any.
    pub recommendations: BTreeMap<String, Vec<String>>,
    /// One ranking per requested indicator.
    pub rankings: Vec<ComparisonView>,
}

/// Trajectory of one indicator toward its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionView {
    /// Projected indicator.
    pub indicator: String,
    /// Last observation followed by the targets.
    pub anchors: Vec<Anchor>,
    /// Observed history then one point per projected year.
    pub trajectory: Vec<TrajectoryPoint>,
}

/// Prevention strategies ranked per criterion, with the action plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyView {
    /// One ranking per requested criterion.
    pub rankings: Vec<StrategyRanking>,
    /// Planned phases in period order.
    pub action_plan: Vec<ActionPhase>,
}

/// Everything derived for one request.
///
/// Views outside the requested focus areas are `None`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardViews {
    /// Headline cards; always derived.
    pub key_metrics: Vec<KeyMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<SeriesView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<SeriesView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<SeriesView>,
    /// Policy events joined onto the timeline indicator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<JoinedTimeline>,
    /// Strategy rankings and action plan; present with the policy focus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategies: Option<StrategyView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub territories: Option<TerritorialView>,
    /// Present when projections are shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projections: Option<Vec<ProjectionView>>,
    /// Present when projections are shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetProgress>>,
}

/// Read-only engine over a dataset bundle.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    datasets: Datasets,
}

impl IndicatorEngine {
    /// Create an engine over already-loaded datasets.
    #[must_use]
    pub const fn new(datasets: Datasets) -> Self {
        Self { datasets }
    }

    /// Load `source` and create an engine over it.
    ///
    /// # Errors
    ///
    /// Propagates the source's load error.
    pub fn from_source(source: &dyn DataSource) -> IndicatorResult<Self> {
        load_from(source).map(Self::new)
    }

    /// Datasets the engine reads.
    #[must_use]
    pub const fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// One dataset restricted to `range` (`None` keeps it whole).
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidRange` for an inverted range.
    pub fn series_view(
        &self,
        dataset: SeriesDataset,
        range: Option<YearRange>,
    ) -> Result<SeriesView, QueryError> {
        let store = self.datasets.series(dataset).slice_range(range)?;
        let series = store
            .names()
            .into_iter()
            .map(|name| Ok((name.to_string(), store.get_series(name)?)))
            .collect::<Result<BTreeMap<_, _>, QueryError>>()?;
        Ok(SeriesView {
            dataset,
            domain: store.domain(),
            series,
        })
    }

    /// Policy timeline joined onto `indicator` over `range`.
    ///
    /// # Errors
    ///
    /// - `UnknownSeries` if no dataset defines `indicator`
    /// - `InvalidRange` for an inverted range
    pub fn timeline(
        &self,
        indicator: &str,
        range: Option<YearRange>,
    ) -> Result<JoinedTimeline, QueryError> {
        let (_, store) = self.locate(indicator)?;
        let store = store.slice_range(range)?;
        TemporalJoinEngine::join(&store, indicator, self.datasets.policies())
    }

    /// Rankings of the selected territories with deviations from the
    /// baselines in `params`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownIndicator` if a ranking indicator is not declared.
    pub fn territorial_view(&self, params: &ViewParams) -> Result<TerritorialView, QueryError> {
        let snapshot = self.datasets.territories();
        let store = match &params.territory_filter {
            Some(filter) => snapshot.filter(filter),
            None => snapshot.clone(),
        };

        let rankings = params
            .ranking_indicators
            .iter()
            .map(|indicator| {
                TerritorialComparator::compare(
                    &store,
                    indicator,
                    params.ranking_ascending,
                    params.baseline_for(indicator),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let territories: Vec<String> = store
            .list_territories()
            .into_iter()
            .map(String::from)
            .collect();
        let locations = territories
            .iter()
            .filter_map(|t| Some((t.clone(), store.get(t)?.location?)))
            .collect();
        let recommendations = territories
            .iter()
            .filter_map(|t| {
                let record = store.get(t)?;
                (!record.recommendations.is_empty())
                    .then(|| (t.clone(), record.recommendations.clone()))
            })
            .collect();

        Ok(TerritorialView {
            reference_year: store.reference_year(),
            territories,
            locations,
            recommendations,
            rankings,
        })
    }

    /// Prevention strategies ranked on each of `params.strategy_criteria`,
    /// alongside the action plan.
    #[must_use]
    pub fn strategy_view(&self, params: &ViewParams) -> StrategyView {
        let catalog = self.datasets.strategies();
        StrategyView {
            rankings: params
                .strategy_criteria
                .iter()
                .map(|criterion| StrategyComparator::rank(catalog, *criterion))
                .collect(),
            action_plan: self.datasets.action_plan().phases().to_vec(),
        }
    }

    /// Projection of `indicator` from its last observation through its
    /// targets, with history from `from_year`.
    ///
    /// # Errors
    ///
    /// - `UnknownSeries` if no dataset defines `indicator`
    /// - `UnknownTarget` if it has no targets
    /// - `InvalidAnchorOrder` if a target does not follow the last observation
    pub fn projection(&self, indicator: &str, from_year: i32) -> IndicatorResult<ProjectionView> {
        let (_, store) = self.locate(indicator)?;
        let engine = ProjectionEngine::from_targets(store, self.datasets.targets(), indicator)?;
        let trajectory = engine.trajectory(store.series(indicator)?, from_year);
        Ok(ProjectionView {
            indicator: indicator.to_string(),
            anchors: engine.anchors().to_vec(),
            trajectory,
        })
    }

    /// Headline metrics over the requested period, set against the
    /// baselines and vigilance thresholds in `params`.
    ///
    /// Headline series missing from the datasets, or with no years in
    /// range, are left out.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidRange` for an inverted range.
    pub fn key_metrics(&self, params: &ViewParams) -> Result<Vec<KeyMetric>, QueryError> {
        let range = params.year_range;
        let mut metrics = Vec::with_capacity(HEADLINE.len());
        for (dataset, indicator) in HEADLINE {
            let store = self.datasets.series(dataset);
            if !store.contains(indicator) {
                continue;
            }
            let sliced = store.slice_range(range)?;
            let series = sliced.series(indicator)?;
            let baseline = params.reference_baseline.get(indicator).copied();
            if let Some(metric) = KeyMetric::from_series(series, baseline) {
                metrics.push(metric.with_threshold(params.threshold_for(indicator)));
            }
        }
        Ok(metrics)
    }

    /// Progress toward every declared target.
    #[must_use]
    pub fn target_progress(&self) -> Vec<TargetProgress> {
        let targets = self.datasets.targets();
        targets
            .indicators()
            .into_iter()
            .filter_map(|indicator| {
                let declared = targets.targets_for(indicator).ok()?;
                let latest = self
                    .datasets
                    .locate_series(indicator)
                    .and_then(|(_, store)| store.series(indicator).ok()?.last());
                Some(TargetProgress::new(indicator, latest, declared))
            })
            .collect()
    }

    /// Derive every view `params` asks for.
    ///
    /// # Errors
    ///
    /// Returns the first parameter or query error encountered; no partial
    /// result is produced.
    pub fn derive(&self, params: &ViewParams) -> IndicatorResult<DashboardViews> {
        params.validate()?;
        let range = params.year_range;

        let series_if = |area: FocusArea, dataset: SeriesDataset| {
            if params.wants(area) {
                self.series_view(dataset, range).map(Some)
            } else {
                Ok(None)
            }
        };

        let views = DashboardViews {
            key_metrics: self.key_metrics(params)?,
            consumption: series_if(FocusArea::Consumption, SeriesDataset::Consumption)?,
            health: series_if(FocusArea::Health, SeriesDataset::Health)?,
            social: series_if(FocusArea::Social, SeriesDataset::Social)?,
            timeline: if params.wants(FocusArea::Policy) {
                Some(self.timeline(&params.timeline_indicator, range)?)
            } else {
                None
            },
            strategies: params
                .wants(FocusArea::Policy)
                .then(|| self.strategy_view(params)),
            territories: if params.wants(FocusArea::Territories) {
                Some(self.territorial_view(params)?)
            } else {
                None
            },
            projections: if params.show_projections {
                Some(
                    params
                        .projection_indicators
                        .iter()
                        .map(|i| self.projection(i, params.trajectory_from))
                        .collect::<IndicatorResult<Vec<_>>>()?,
                )
            } else {
                None
            },
            targets: params.show_projections.then(|| self.target_progress()),
        };

        tracing::debug!(
            target: "drom_indicators::engine",
            focus = ?params.focus_areas,
            year_range = ?range,
            projections = params.show_projections,
            "views.derived"
        );

        Ok(views)
    }

    fn locate(
        &self,
        indicator: &str,
    ) -> Result<(SeriesDataset, &IndicatorSeriesStore), QueryError> {
        self.datasets
            .locate_series(indicator)
            .ok_or_else(|| QueryError::UnknownSeries {
                name: indicator.to_string(),
            })
    }
}
