//! Piecewise-linear projection toward strategic targets.
//!
//! Anchors are `(year, value)` control points: the last observed value
//! followed by each declared target. Between two anchors the value is
//! linearly interpolated; anchor years return the anchor value exactly.
//! Nothing is extrapolated past the last target or before the first anchor.

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorResult, QueryError, ValidationError};
use crate::store::{IndicatorSeries, IndicatorSeriesStore, TargetRegistry};

/// Longest span, in years, from the first anchor to the last target.
///
/// A trajectory holds one point per year, so this bounds its size.
pub const MAX_PROJECTION_YEARS: i32 = 100;

/// Where an anchor or trajectory point comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// Measured value.
    Observed,
    /// Declared target value.
    Target,
    /// Computed between two anchors.
    Interpolated,
}

/// A projection control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Anchor year.
    pub year: i32,
    /// Anchor value.
    pub value: f64,
    /// Observed or target.
    pub kind: PointKind,
}

impl Anchor {
    #[must_use]
    pub const fn observed(year: i32, value: f64) -> Self {
        Self {
            year,
            value,
            kind: PointKind::Observed,
        }
    }

    #[must_use]
    pub const fn target(year: i32, value: f64) -> Self {
        Self {
            year,
            value,
            kind: PointKind::Target,
        }
    }
}

/// One year of a trajectory.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub year: i32,
    pub value: f64,
    pub kind: PointKind,
}

/// Interpolating projection over strictly increasing anchors.
///
/// # Examples
///
/// ```
/// use drom_indicators::{Anchor, ProjectionEngine};
///
/// let engine = ProjectionEngine::new(
///     "smoking_prevalence",
///     vec![
///         Anchor::observed(2023, 26.0),
///         Anchor::target(2025, 22.0),
///         Anchor::target(2030, 18.0),
///     ],
/// )
/// .unwrap();
/// assert_eq!(engine.value_at(2024).unwrap(), 24.0);
/// assert!(engine.value_at(2031).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionEngine {
    indicator: String,
    anchors: Vec<Anchor>,
}

impl ProjectionEngine {
    /// Creates an engine from anchors in year order.
    ///
    /// # Errors
    ///
    /// - `NoTargets` with fewer than two anchors
    /// - `InvalidAnchorOrder` if anchor years are not strictly increasing
    /// - `NonFiniteValue` for NaN or infinite anchor values
    /// - `ProjectionTooLong` if the anchors span more than
    ///   [`MAX_PROJECTION_YEARS`]
    pub fn new(indicator: impl Into<String>, anchors: Vec<Anchor>) -> Result<Self, ValidationError> {
        let indicator = indicator.into();
        if anchors.len() < 2 {
            return Err(ValidationError::NoTargets { indicator });
        }
        for anchor in &anchors {
            if !anchor.value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: format!("{indicator}@{}", anchor.year),
                });
            }
        }
        if let Some(pair) = anchors.windows(2).find(|w| w[1].year <= w[0].year) {
            return Err(ValidationError::InvalidAnchorOrder {
                indicator,
                previous: pair[0].year,
                found: pair[1].year,
            });
        }
        let (first, last) = (anchors[0].year, anchors[anchors.len() - 1].year);
        if i64::from(last) - i64::from(first) > i64::from(MAX_PROJECTION_YEARS) {
            return Err(ValidationError::ProjectionTooLong {
                indicator,
                first,
                last,
                max_years: MAX_PROJECTION_YEARS,
            });
        }
        Ok(Self { indicator, anchors })
    }

    /// Anchors a projection on the last observed value of `indicator` in
    /// `store`, followed by its declared targets.
    ///
    /// # Errors
    ///
    /// - `UnknownSeries` if the store has no such series
    /// - `UnknownTarget` if no targets are declared
    /// - `NoObservations` if the series is empty
    /// - `InvalidAnchorOrder` if a target is not after the last observation
    /// - `ProjectionTooLong` if the last target is too far ahead
    pub fn from_targets(
        store: &IndicatorSeriesStore,
        targets: &TargetRegistry,
        indicator: &str,
    ) -> IndicatorResult<Self> {
        let series = store.series(indicator)?;
        let declared = targets.targets_for(indicator)?;
        let last = series.last().ok_or_else(|| QueryError::NoObservations {
            indicator: indicator.to_string(),
        })?;

        let anchors = std::iter::once(Anchor::observed(last.year, last.value))
            .chain(declared.iter().map(|t| Anchor::target(t.year, t.value)))
            .collect();
        Ok(Self::new(indicator, anchors)?)
    }

    /// Projected indicator.
    #[must_use]
    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    /// Control points in year order.
    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Year of the final target.
    #[must_use]
    pub fn horizon(&self) -> i32 {
        self.anchors.last().map_or(i32::MIN, |a| a.year)
    }

    /// Value of the projection in `year`.
    ///
    /// # Errors
    ///
    /// - `NoTargetBeyondRange` if `year` is past the last anchor
    /// - `BeforeFirstAnchor` if `year` precedes the first anchor
    pub fn value_at(&self, year: i32) -> Result<f64, QueryError> {
        self.point_at(year).map(|p| p.value)
    }

    fn point_at(&self, year: i32) -> Result<TrajectoryPoint, QueryError> {
        let (first, last) = match (self.anchors.first(), self.anchors.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => {
                return Err(QueryError::UnknownTarget {
                    indicator: self.indicator.clone(),
                })
            }
        };
        if year > last.year {
            return Err(QueryError::NoTargetBeyondRange {
                year,
                last_target: last.year,
            });
        }
        if year < first.year {
            return Err(QueryError::BeforeFirstAnchor {
                year,
                first_anchor: first.year,
            });
        }

        match self.anchors.binary_search_by_key(&year, |a| a.year) {
            Ok(i) => {
                let a = self.anchors[i];
                Ok(TrajectoryPoint {
                    year,
                    value: a.value,
                    kind: a.kind,
                })
            }
            // `i` is the first anchor after `year`; the bounds checks above
            // guarantee 0 < i < len.
            Err(i) => {
                let (a0, a1) = (self.anchors[i - 1], self.anchors[i]);
                Ok(TrajectoryPoint {
                    year,
                    value: interpolate(a0, a1, year),
                    kind: PointKind::Interpolated,
                })
            }
        }
    }

    /// Every year from the first anchor to the horizon.
    #[must_use]
    pub fn projected_points(&self) -> Vec<TrajectoryPoint> {
        let Some(first) = self.anchors.first() else {
            return Vec::new();
        };
        (first.year..=self.horizon())
            .filter_map(|y| self.point_at(y).ok())
            .collect()
    }

    /// Observed history from `from_year` joined to the projected points.
    ///
    /// Observations at or after the first anchor are left to the
    /// projection, so every year appears once.
    #[must_use]
    pub fn trajectory(&self, observed: &IndicatorSeries, from_year: i32) -> Vec<TrajectoryPoint> {
        let first_anchor = self.anchors.first().map_or(i32::MAX, |a| a.year);
        observed
            .points()
            .into_iter()
            .filter(|p| p.year >= from_year && p.year < first_anchor)
            .map(|p| TrajectoryPoint {
                year: p.year,
                value: p.value,
                kind: PointKind::Observed,
            })
            .chain(
                self.projected_points()
                    .into_iter()
                    .filter(|p| p.year >= from_year),
            )
            .collect()
    }
}

fn interpolate(a0: Anchor, a1: Anchor, year: i32) -> f64 {
    let span = f64::from(a1.year) - f64::from(a0.year);
    let offset = f64::from(year) - f64::from(a0.year);
    a0.value + (a1.value - a0.value) * offset / span
}
