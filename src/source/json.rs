//! Datasets decoded from an in-memory JSON document.
//!
//! The document shape mirrors the narrow construction interface of the
//! stores: ordered `[year, value]` pairs per series, a list of territorial
//! records, a list of textual events and a list of targets. Prevention
//! strategies and the action plan are optional.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{IndicatorResult, SourceError};
use crate::source::{DataSource, Datasets};
use crate::store::{
    ActionPhase, ActionPlan, IndicatorSeries, IndicatorSeriesStore, PolicyEvent, PolicyEventLog,
    PreventionStrategy, StrategicTarget, StrategyCatalog, TargetRegistry, TerritorialRecord,
    TerritorialSnapshotStore,
};

#[derive(Debug, Deserialize)]
struct BundleDoc {
    consumption: Option<SeriesDoc>,
    health: Option<SeriesDoc>,
    social: Option<SeriesDoc>,
    territories: Option<SnapshotDoc>,
    #[serde(default)]
    policies: Vec<EventDoc>,
    #[serde(default)]
    targets: Vec<StrategicTarget>,
    #[serde(default)]
    strategies: Vec<PreventionStrategy>,
    #[serde(default)]
    action_plan: Vec<ActionPhase>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct SeriesDoc(BTreeMap<String, Vec<(i32, f64)>>);

#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    reference_year: i32,
    indicators: Vec<String>,
    records: Vec<TerritorialRecord>,
}

#[derive(Debug, Deserialize)]
struct EventDoc {
    date: String,
    category: String,
    title: String,
    #[serde(default)]
    description: String,
}

fn required<T>(value: Option<T>, dataset: &str) -> Result<T, SourceError> {
    value.ok_or_else(|| SourceError::MissingDataset {
        dataset: dataset.to_string(),
    })
}

fn series_store(doc: SeriesDoc) -> IndicatorResult<IndicatorSeriesStore> {
    let series = doc
        .0
        .into_iter()
        .map(|(name, points)| IndicatorSeries::from_points(name, points))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IndicatorSeriesStore::new(series)?)
}

/// A dataset bundle held as a JSON string.
#[derive(Debug, Clone)]
pub struct JsonSource {
    label: String,
    document: String,
}

impl JsonSource {
    /// Wraps a JSON document.
    #[must_use]
    pub fn new(label: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            document: document.into(),
        }
    }
}

impl DataSource for JsonSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn load(&self) -> IndicatorResult<Datasets> {
        let doc: BundleDoc =
            serde_json::from_str(&self.document).map_err(|e| SourceError::Decode {
                message: e.to_string(),
            })?;

        let consumption = series_store(required(doc.consumption, "consumption")?)?;
        let health = series_store(required(doc.health, "health")?)?;
        let social = series_store(required(doc.social, "social")?)?;

        let snapshot = required(doc.territories, "territories")?;
        let territories =
            TerritorialSnapshotStore::new(snapshot.reference_year, snapshot.indicators, snapshot.records)?;

        let events = doc
            .policies
            .into_iter()
            .map(|e| PolicyEvent::parse(&e.date, &e.category, e.title, e.description))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Datasets::new(
            consumption,
            health,
            social,
            territories,
            PolicyEventLog::new(events),
            TargetRegistry::new(doc.targets)?,
        )
        .with_strategies(StrategyCatalog::new(doc.strategies)?)
        .with_action_plan(ActionPlan::new(doc.action_plan)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IndicatorError, ValidationError};
    use crate::source::SeriesDataset;

    const DOC: &str = r#"{
        "consumption": {"smoking_prevalence": [[2022, 26.4], [2023, 26.0]]},
        "health": {"tobacco_deaths": [[2022, 2490], [2023, 2460]]},
        "social": {},
        "territories": {
            "reference_year": 2023,
            "indicators": ["smoking_prevalence"],
            "records": [
                {"territory": "Guyane", "values": {"smoking_prevalence": 32.4},
                 "recommendations": ["Cultural adaptation"]},
                {"territory": "Mayotte", "values": {"smoking_prevalence": 22.6},
                 "location": {"lat": -12.827, "lon": 45.166}}
            ]
        },
        "policies": [
            {"date": "2022-03-01", "category": "treatment", "title": "Teleconsultation"}
        ],
        "targets": [
            {"indicator": "smoking_prevalence", "year": 2025, "value": 22.0}
        ],
        "strategies": [
            {"name": "Price increase", "efficacy": 8.9, "cost": 2, "acceptability": 4}
        ],
        "action_plan": [
            {"period": {"start": 2024, "end": 2025}, "actions": ["Needs mapping"]}
        ]
    }"#;

    #[test]
    fn test_loads_document() {
        let datasets = JsonSource::new("test", DOC).load().unwrap();
        let consumption = datasets.series(SeriesDataset::Consumption);
        assert_eq!(consumption.get_value("smoking_prevalence", 2023).unwrap(), 26.0);
        assert!(datasets.series(SeriesDataset::Social).is_empty());
        assert_eq!(datasets.territories().len(), 2);
        assert_eq!(datasets.policies().len(), 1);
        assert_eq!(datasets.targets().indicators(), vec!["smoking_prevalence"]);
        assert_eq!(
            datasets.territories().get("Guyane").unwrap().recommendations,
            vec!["Cultural adaptation"]
        );
        assert!(datasets.territories().get("Mayotte").unwrap().recommendations.is_empty());
        assert_eq!(datasets.strategies().len(), 1);
        assert_eq!(datasets.action_plan().phases().len(), 1);
    }

    #[test]
    fn test_strategies_and_plan_are_optional() {
        let doc = r#"{
            "consumption": {}, "health": {}, "social": {},
            "territories": {"reference_year": 2023, "indicators": [], "records": []}
        }"#;
        let datasets = JsonSource::new("test", doc).load().unwrap();
        assert!(datasets.strategies().is_empty());
        assert!(datasets.action_plan().is_empty());
    }

    #[test]
    fn test_out_of_scale_strategy_is_rejected() {
        let doc = DOC.replace("\"efficacy\": 8.9", "\"efficacy\": 12.0");
        let err = JsonSource::new("test", doc).load().unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Validation(ValidationError::InvalidScore { .. })
        ));
    }

    #[test]
    fn test_missing_dataset() {
        let err = JsonSource::new("test", r#"{"consumption": {}, "health": {}}"#)
            .load()
            .unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Source(SourceError::MissingDataset { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = JsonSource::new("test", "{not json").load().unwrap_err();
        assert!(err.is_source());
    }

    #[test]
    fn test_gap_in_series_is_rejected() {
        let doc = DOC.replace("[[2022, 26.4], [2023, 26.0]]", "[[2020, 26.4], [2023, 26.0]]");
        let err = JsonSource::new("test", doc).load().unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Validation(ValidationError::NonContiguousYears { .. })
        ));
    }

    #[test]
    fn test_bad_category_is_rejected() {
        let doc = DOC.replace("\"treatment\"", "\"taxation\"");
        let err = JsonSource::new("test", doc).load().unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::Validation(ValidationError::UnknownCategory { .. })
        ));
    }
}
