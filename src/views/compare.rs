//! Territorial comparison against a reference baseline.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::store::{StrategyCatalog, StrategyCriterion, TerritorialSnapshotStore};

/// Signed distance of a value from a reference: `value - reference`.
#[must_use]
pub fn deviation(value: f64, reference: f64) -> f64 {
    value - reference
}

/// One ranked territory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryComparison {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Territory name.
    pub territory: String,
    /// Indicator value.
    pub value: f64,
    /// `value - reference_value`.
    pub deviation: f64,
}

/// Ranking of territories on one indicator, with deviations from a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonView {
    /// Indicator ranked on.
    pub indicator: String,
    /// Baseline every deviation is measured from.
    pub reference_value: f64,
    /// Ranking direction.
    pub ascending: bool,
    /// Ranked rows.
    pub rows: Vec<TerritoryComparison>,
}

impl ComparisonView {
    /// Rows above the baseline.
    pub fn above_reference(&self) -> impl Iterator<Item = &TerritoryComparison> {
        self.rows.iter().filter(|r| r.deviation > 0.0)
    }
}

/// Ranks territories and measures each one against a reference value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerritorialComparator;

impl TerritorialComparator {
    /// Rank `store` by `indicator` and compute deviations from `reference_value`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownIndicator` if `indicator` is not declared.
    pub fn compare(
        store: &TerritorialSnapshotStore,
        indicator: &str,
        ascending: bool,
        reference_value: f64,
    ) -> Result<ComparisonView, QueryError> {
        let ranked = store.rank_by(indicator, ascending)?;
        let rows = ranked
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| {
                let value = record.value(indicator)?;
                Some(TerritoryComparison {
                    rank: i + 1,
                    territory: record.territory,
                    value,
                    deviation: deviation(value, reference_value),
                })
            })
            .collect();

        Ok(ComparisonView {
            indicator: indicator.to_string(),
            reference_value,
            ascending,
            rows,
        })
    }
}

/// One ranked prevention strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStrategy {
    /// 1-based position, best first.
    pub rank: usize,
    /// Strategy name.
    pub strategy: String,
    /// Score under the ranking criterion.
    pub score: f64,
}

/// Strategies ranked best first on one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRanking {
    /// Criterion ranked on.
    pub criterion: StrategyCriterion,
    /// Ranked rows.
    pub rows: Vec<RankedStrategy>,
}

impl StrategyRanking {
    /// Name of the best strategy, if any.
    #[must_use]
    pub fn best(&self) -> Option<&str> {
        self.rows.first().map(|r| r.strategy.as_str())
    }
}

/// Ranks prevention strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyComparator;

impl StrategyComparator {
    /// Rank `catalog` best first on `criterion`. Cost ranks cheapest first.
    #[must_use]
    pub fn rank(catalog: &StrategyCatalog, criterion: StrategyCriterion) -> StrategyRanking {
        let rows = catalog
            .rank_by(criterion)
            .into_iter()
            .enumerate()
            .map(|(i, strategy)| RankedStrategy {
                rank: i + 1,
                strategy: strategy.name.clone(),
                score: strategy.score(criterion),
            })
            .collect();
        StrategyRanking { criterion, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PreventionStrategy, TerritorialRecord};

    fn store() -> TerritorialSnapshotStore {
        TerritorialSnapshotStore::new(
            2023,
            ["prevalence"],
            vec![
                TerritorialRecord::new("Guyane").with_value("prevalence", 32.4),
                TerritorialRecord::new("Mayotte").with_value("prevalence", 22.6),
                TerritorialRecord::new("Martinique").with_value("prevalence", 25.8),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_deviation_against_baseline() {
        assert!((deviation(32.4, 24.2) - 8.2).abs() < 1e-9);
        assert_eq!(deviation(32.4, 0.0), 32.4);
        assert!((deviation(22.6, 24.2) + 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_compare_ranks_and_deviates() {
        let view = TerritorialComparator::compare(&store(), "prevalence", false, 24.2).unwrap();
        let names: Vec<&str> = view.rows.iter().map(|r| r.territory.as_str()).collect();
        assert_eq!(names, vec!["Guyane", "Martinique", "Mayotte"]);
        assert_eq!(view.rows[0].rank, 1);
        assert!((view.rows[0].deviation - 8.2).abs() < 1e-9);
        assert_eq!(view.above_reference().count(), 2);
    }

    #[test]
    fn test_zero_reference_keeps_raw_values() {
        let view = TerritorialComparator::compare(&store(), "prevalence", true, 0.0).unwrap();
        for row in &view.rows {
            assert_eq!(row.deviation, row.value);
        }
    }

    #[test]
    fn test_unknown_indicator() {
        let err = TerritorialComparator::compare(&store(), "nope", true, 0.0).unwrap_err();
        assert!(matches!(err, QueryError::UnknownIndicator { .. }));
    }

    #[test]
    fn test_strategy_ranking_best_first() {
        let catalog = StrategyCatalog::new(vec![
            PreventionStrategy::new("Price increase", 8.9, 2.0, 4.0),
            PreventionStrategy::new("Media campaigns", 6.1, 5.0, 7.0),
            PreventionStrategy::new("Advertising ban", 6.8, 4.0, 7.0),
        ])
        .unwrap();

        let by_efficacy = StrategyComparator::rank(&catalog, StrategyCriterion::Efficacy);
        assert_eq!(by_efficacy.best(), Some("Price increase"));
        assert_eq!(by_efficacy.rows[2].strategy, "Media campaigns");
        assert_eq!(by_efficacy.rows[2].rank, 3);

        let by_acceptability = StrategyComparator::rank(&catalog, StrategyCriterion::Acceptability);
        let names: Vec<&str> = by_acceptability.rows.iter().map(|r| r.strategy.as_str()).collect();
        assert_eq!(names, vec!["Advertising ban", "Media campaigns", "Price increase"]);
    }

    #[test]
    fn test_strategy_ranking_of_empty_catalog() {
        let ranking = StrategyComparator::rank(&StrategyCatalog::default(), StrategyCriterion::Cost);
        assert!(ranking.rows.is_empty());
        assert_eq!(ranking.best(), None);
    }
}
