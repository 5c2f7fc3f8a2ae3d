//! Pluggable data sources.
//!
//! A source produces one [`Datasets`] bundle through the validating store
//! constructors. Derived views never know where the data came from.

mod builtin;
mod json;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorResult, SourceError};
use crate::store::{
    ActionPlan, IndicatorSeriesStore, PolicyEventLog, StrategyCatalog, TargetRegistry,
    TerritorialSnapshotStore,
};

pub use builtin::BuiltinSource;
pub use json::JsonSource;

/// Which yearly dataset a series lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesDataset {
    /// Consumption history, 2000-2023.
    Consumption,
    /// Health outcomes, 2010-2023.
    Health,
    /// Social indicators, 2010-2023.
    Social,
}

impl SeriesDataset {
    /// Every yearly dataset.
    pub const ALL: [Self; 3] = [Self::Consumption, Self::Health, Self::Social];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::Health => "health",
            Self::Social => "social",
        }
    }
}

impl fmt::Display for SeriesDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every store the engine reads, shared read-only.
///
/// Cloning is cheap: each store sits behind an `Arc` and is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    consumption: Arc<IndicatorSeriesStore>,
    health: Arc<IndicatorSeriesStore>,
    social: Arc<IndicatorSeriesStore>,
    territories: Arc<TerritorialSnapshotStore>,
    policies: Arc<PolicyEventLog>,
    targets: Arc<TargetRegistry>,
    strategies: Arc<StrategyCatalog>,
    action_plan: Arc<ActionPlan>,
}

impl Datasets {
    /// Bundles already-validated stores, with no strategies and an empty
    /// action plan.
    #[must_use]
    pub fn new(
        consumption: IndicatorSeriesStore,
        health: IndicatorSeriesStore,
        social: IndicatorSeriesStore,
        territories: TerritorialSnapshotStore,
        policies: PolicyEventLog,
        targets: TargetRegistry,
    ) -> Self {
        Self {
            consumption: Arc::new(consumption),
            health: Arc::new(health),
            social: Arc::new(social),
            territories: Arc::new(territories),
            policies: Arc::new(policies),
            targets: Arc::new(targets),
            strategies: Arc::new(StrategyCatalog::default()),
            action_plan: Arc::new(ActionPlan::default()),
        }
    }

    /// Sets the prevention strategy catalog.
    #[must_use]
    pub fn with_strategies(mut self, strategies: StrategyCatalog) -> Self {
        self.strategies = Arc::new(strategies);
        self
    }

    /// Sets the action plan.
    #[must_use]
    pub fn with_action_plan(mut self, action_plan: ActionPlan) -> Self {
        self.action_plan = Arc::new(action_plan);
        self
    }

    /// One yearly dataset.
    #[must_use]
    pub fn series(&self, dataset: SeriesDataset) -> &IndicatorSeriesStore {
        match dataset {
            SeriesDataset::Consumption => &self.consumption,
            SeriesDataset::Health => &self.health,
            SeriesDataset::Social => &self.social,
        }
    }

    /// Dataset that defines a series called `name`, searched in
    /// consumption, health, social order.
    #[must_use]
    pub fn locate_series(&self, name: &str) -> Option<(SeriesDataset, &IndicatorSeriesStore)> {
        SeriesDataset::ALL
            .into_iter()
            .map(|d| (d, self.series(d)))
            .find(|(_, store)| store.contains(name))
    }

    #[must_use]
    pub fn territories(&self) -> &TerritorialSnapshotStore {
        &self.territories
    }

    #[must_use]
    pub fn policies(&self) -> &PolicyEventLog {
        &self.policies
    }

    #[must_use]
    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    #[must_use]
    pub fn strategies(&self) -> &StrategyCatalog {
        &self.strategies
    }

    #[must_use]
    pub fn action_plan(&self) -> &ActionPlan {
        &self.action_plan
    }

    /// Content digest of every store.
    ///
    /// Two bundles with equal contents always share a fingerprint, which
    /// lets a refreshing caller skip re-rendering unchanged data.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Encode` if a store cannot be serialized.
    pub fn fingerprint(&self) -> IndicatorResult<String> {
        fn feed<T: Serialize>(
            hasher: &mut blake3::Hasher,
            dataset: &str,
            value: &T,
        ) -> Result<(), SourceError> {
            let bytes = serde_json::to_vec(value).map_err(|e| SourceError::Encode {
                dataset: dataset.to_string(),
                message: e.to_string(),
            })?;
            hasher.update(dataset.as_bytes());
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
            Ok(())
        }

        let mut hasher = blake3::Hasher::new();
        feed(&mut hasher, "consumption", &*self.consumption)?;
        feed(&mut hasher, "health", &*self.health)?;
        feed(&mut hasher, "social", &*self.social)?;
        feed(&mut hasher, "territories", &*self.territories)?;
        feed(&mut hasher, "policies", &*self.policies)?;
        feed(&mut hasher, "targets", &*self.targets)?;
        feed(&mut hasher, "strategies", &*self.strategies)?;
        feed(&mut hasher, "action_plan", &*self.action_plan)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}

/// Something that can produce the engine's datasets.
pub trait DataSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Build every store.
    ///
    /// # Errors
    ///
    /// Any validation error raised by the store constructors, or a
    /// `SourceError` if the payload cannot be read.
    fn load(&self) -> IndicatorResult<Datasets>;
}

/// Load `source` and log what it produced.
///
/// # Errors
///
/// Propagates the source's error after logging it.
pub fn load_from(source: &dyn DataSource) -> IndicatorResult<Datasets> {
    match source.load() {
        Ok(datasets) => {
            tracing::info!(
                target: "drom_indicators::source",
                source = source.name(),
                territories = datasets.territories().len(),
                events = datasets.policies().len(),
                strategies = datasets.strategies().len(),
                "datasets.loaded"
            );
            Ok(datasets)
        }
        Err(err) => {
            tracing::warn!(
                target: "drom_indicators::source",
                source = source.name(),
                error = %err,
                "datasets.load_failed"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_series_across_datasets() {
        let datasets = BuiltinSource.load().unwrap();
        let (dataset, _) = datasets.locate_series("tobacco_deaths").unwrap();
        assert_eq!(dataset, SeriesDataset::Health);
        let (dataset, _) = datasets.locate_series("smoking_prevalence").unwrap();
        assert_eq!(dataset, SeriesDataset::Consumption);
        assert!(datasets.locate_series("nope").is_none());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = BuiltinSource.load().unwrap();
        let b = BuiltinSource.load().unwrap();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = BuiltinSource.load().unwrap();
        let b = Datasets::new(
            a.series(SeriesDataset::Consumption).clone(),
            a.series(SeriesDataset::Health).clone(),
            a.series(SeriesDataset::Social).clone(),
            a.territories().filter(["Guyane"]),
            a.policies().clone(),
            a.targets().clone(),
        )
        .with_strategies(a.strategies().clone())
        .with_action_plan(a.action_plan().clone());
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_covers_strategies() {
        let a = BuiltinSource.load().unwrap();
        let b = a.clone().with_strategies(StrategyCatalog::default());
        let c = a.clone().with_action_plan(ActionPlan::default());
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }
}
