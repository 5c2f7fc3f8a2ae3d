//! Headline metrics and target progress.

use serde::{Deserialize, Serialize};

use crate::store::{IndicatorSeries, SeriesPoint, StrategicTarget};
use crate::views::deviation;

/// Latest value of a series, set against a baseline and its first year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    /// Series name.
    pub indicator: String,
    /// Latest year in view.
    pub year: i32,
    /// Value in `year`.
    pub value: f64,
    /// Reference the value is compared to, if one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    /// `value - baseline`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    /// First year in view.
    pub since_year: i32,
    /// `value - value(since_year)`.
    pub change: f64,
    /// Alert level for this indicator, if one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl KeyMetric {
    /// Metric over the visible part of `series`; `None` when it is empty.
    #[must_use]
    pub fn from_series(series: &IndicatorSeries, baseline: Option<f64>) -> Option<Self> {
        let points = series.points();
        let (first, last) = (points.first()?, points.last()?);
        Some(Self {
            indicator: series.name().to_string(),
            year: last.year,
            value: last.value,
            baseline,
            deviation: baseline.map(|b| deviation(last.value, b)),
            since_year: first.year,
            change: last.value - first.value,
            threshold: None,
        })
    }

    /// Attach an alert level.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Whether the value sits under its alert level; `None` without one.
    #[must_use]
    pub fn below_threshold(&self) -> Option<bool> {
        self.threshold.map(|t| self.value < t)
    }
}

/// Distance from the latest observation to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGap {
    /// Year the target is due.
    pub year: i32,
    /// Target value.
    pub target: f64,
    /// `target - latest`, when an observation exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
}

/// Declared targets of one indicator and how far away they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProgress {
    /// Indicator name.
    pub indicator: String,
    /// Latest observation, when the indicator has a series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<SeriesPoint>,
    /// One entry per declared target, in year order.
    pub gaps: Vec<TargetGap>,
}

impl TargetProgress {
    /// Progress of `targets` relative to `latest`.
    #[must_use]
    pub fn new(
        indicator: impl Into<String>,
        latest: Option<SeriesPoint>,
        targets: &[StrategicTarget],
    ) -> Self {
        Self {
            indicator: indicator.into(),
            latest,
            gaps: targets
                .iter()
                .map(|t| TargetGap {
                    year: t.year,
                    target: t.value,
                    remaining: latest.map(|p| t.value - p.value),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IndicatorSeriesStore;
    use crate::time::YearRange;

    #[test]
    fn test_key_metric_against_baseline() {
        let store = IndicatorSeriesStore::from_columns(
            YearRange::new(2010, 2023).unwrap(),
            [(
                "tobacco_deaths",
                vec![
                    2850.0, 2820.0, 2790.0, 2760.0, 2730.0, 2700.0, 2670.0, 2640.0, 2610.0,
                    2580.0, 2550.0, 2520.0, 2490.0, 2460.0,
                ],
            )],
        )
        .unwrap();
        let metric =
            KeyMetric::from_series(store.series("tobacco_deaths").unwrap(), None).unwrap();
        assert_eq!(metric.year, 2023);
        assert_eq!(metric.since_year, 2010);
        assert_eq!(metric.change, -390.0);
        assert_eq!(metric.deviation, None);
        assert_eq!(metric.below_threshold(), None);
    }

    #[test]
    fn test_key_metric_against_vigilance_threshold() {
        let store = IndicatorSeriesStore::from_columns(
            YearRange::new(2022, 2023).unwrap(),
            [("first_cigarette_age", vec![12.6, 12.5])],
        )
        .unwrap();
        let metric = KeyMetric::from_series(store.series("first_cigarette_age").unwrap(), Some(13.3))
            .unwrap()
            .with_threshold(Some(14.0));
        assert!((metric.deviation.unwrap() + 0.8).abs() < 1e-9);
        assert_eq!(metric.threshold, Some(14.0));
        assert_eq!(metric.below_threshold(), Some(true));

        let above = metric.clone().with_threshold(Some(12.0));
        assert_eq!(above.below_threshold(), Some(false));
    }

    #[test]
    fn test_key_metric_empty_series() {
        let store = IndicatorSeriesStore::from_columns(
            YearRange::new(2020, 2021).unwrap(),
            [("x", vec![1.0, 2.0])],
        )
        .unwrap()
        .slice(1990, 1991)
        .unwrap();
        assert!(KeyMetric::from_series(store.series("x").unwrap(), Some(1.0)).is_none());
    }

    #[test]
    fn test_target_progress() {
        let targets = vec![
            StrategicTarget::new("smoking_prevalence", 2025, 22.0),
            StrategicTarget::new("smoking_prevalence", 2030, 18.0),
        ];
        let progress = TargetProgress::new(
            "smoking_prevalence",
            Some(SeriesPoint::new(2023, 26.0)),
            &targets,
        );
        assert_eq!(progress.gaps[0].remaining, Some(-4.0));
        assert_eq!(progress.gaps[1].remaining, Some(-8.0));

        let without = TargetProgress::new("care_coverage", None, &targets);
        assert!(without.gaps.iter().all(|g| g.remaining.is_none()));
    }
}
