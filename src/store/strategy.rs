//! Prevention strategies and the national action plan.
//!
//! Strategies are scored on a 0-10 scale for efficacy, cost and
//! acceptability. The action plan is a run of consecutive, non-overlapping
//! periods, each with the actions scheduled in it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::YearRange;

/// Upper end of every strategy score.
pub const SCORE_MAX: f64 = 10.0;

/// One prevention strategy and its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventionStrategy {
    /// Strategy name, unique within a catalog.
    pub name: String,
    /// Expected effect on consumption.
    pub efficacy: f64,
    /// Relative cost; higher is more expensive.
    pub cost: f64,
    /// Public acceptability.
    pub acceptability: f64,
}

impl PreventionStrategy {
    /// Creates an unvalidated strategy; [`StrategyCatalog::new`] checks it.
    #[must_use]
    pub fn new(name: impl Into<String>, efficacy: f64, cost: f64, acceptability: f64) -> Self {
        Self {
            name: name.into(),
            efficacy,
            cost,
            acceptability,
        }
    }

    /// Score of this strategy under `criterion`.
    #[must_use]
    pub fn score(&self, criterion: StrategyCriterion) -> f64 {
        match criterion {
            StrategyCriterion::Efficacy => self.efficacy,
            StrategyCriterion::Cost => self.cost,
            StrategyCriterion::Acceptability => self.acceptability,
            StrategyCriterion::EfficacyPerCost => self.efficacy / self.cost,
        }
    }
}

/// What strategies can be ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyCriterion {
    /// Expected effect, higher is better.
    Efficacy,
    /// Relative cost, lower is better.
    Cost,
    /// Public acceptability, higher is better.
    Acceptability,
    /// Efficacy divided by cost.
    EfficacyPerCost,
}

impl StrategyCriterion {
    /// Every criterion.
    pub const ALL: [Self; 4] = [
        Self::Efficacy,
        Self::Cost,
        Self::Acceptability,
        Self::EfficacyPerCost,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Efficacy => "efficacy",
            Self::Cost => "cost",
            Self::Acceptability => "acceptability",
            Self::EfficacyPerCost => "efficacy_per_cost",
        }
    }

    /// Whether a lower score is the better one.
    #[must_use]
    pub const fn prefers_lower(&self) -> bool {
        matches!(self, Self::Cost)
    }
}

impl fmt::Display for StrategyCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyCriterion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidParams {
                reason: format!("unknown strategy criterion '{s}'"),
            })
    }
}

/// Prevention strategies keyed by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StrategyCatalog {
    strategies: BTreeMap<String, PreventionStrategy>,
}

impl StrategyCatalog {
    /// Creates a catalog.
    ///
    /// # Errors
    ///
    /// - `EmptyStrategyName` for a blank name
    /// - `DuplicateStrategy` if a name appears twice
    /// - `InvalidScore` for a score outside 0-10, a non-finite score or a
    ///   zero cost
    pub fn new(strategies: Vec<PreventionStrategy>) -> Result<Self, ValidationError> {
        let mut by_name = BTreeMap::new();
        for strategy in strategies {
            if strategy.name.trim().is_empty() {
                return Err(ValidationError::EmptyStrategyName);
            }
            for (field, value) in [
                ("efficacy", strategy.efficacy),
                ("cost", strategy.cost),
                ("acceptability", strategy.acceptability),
            ] {
                let in_scale = (0.0..=SCORE_MAX).contains(&value);
                if !in_scale || (field == "cost" && value <= 0.0) {
                    return Err(ValidationError::InvalidScore {
                        strategy: strategy.name,
                        field: field.to_string(),
                        value,
                    });
                }
            }
            if by_name.contains_key(&strategy.name) {
                return Err(ValidationError::DuplicateStrategy {
                    name: strategy.name,
                });
            }
            by_name.insert(strategy.name.clone(), strategy);
        }
        Ok(Self {
            strategies: by_name,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// One strategy by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PreventionStrategy> {
        self.strategies.get(name)
    }

    /// Strategies in name order.
    pub fn strategies(&self) -> impl Iterator<Item = &PreventionStrategy> {
        self.strategies.values()
    }

    /// Strategies best first under `criterion`; ties fall back to name.
    #[must_use]
    pub fn rank_by(&self, criterion: StrategyCriterion) -> Vec<&PreventionStrategy> {
        let mut ranked: Vec<&PreventionStrategy> = self.strategies.values().collect();
        ranked.sort_by(|a, b| {
            let by_score = a.score(criterion).total_cmp(&b.score(criterion));
            let by_score = if criterion.prefers_lower() {
                by_score
            } else {
                by_score.reverse()
            };
            by_score.then_with(|| a.name.cmp(&b.name))
        });
        ranked
    }
}

/// Actions scheduled for one period of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPhase {
    /// Years the phase covers.
    pub period: YearRange,
    /// Actions in priority order.
    pub actions: Vec<String>,
}

impl ActionPhase {
    /// Creates a phase; [`ActionPlan::new`] checks it.
    #[must_use]
    pub fn new<I>(period: YearRange, actions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            period,
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Consecutive action phases in period order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ActionPlan {
    phases: Vec<ActionPhase>,
}

impl ActionPlan {
    /// Creates a plan from phases given in period order.
    ///
    /// # Errors
    ///
    /// - `InvalidPhasePeriod` if a period starts after it ends
    /// - `EmptyActionPhase` if a phase has no non-blank action
    /// - `OverlappingPhases` if a phase does not start after the previous one ends
    pub fn new(phases: Vec<ActionPhase>) -> Result<Self, ValidationError> {
        let mut previous_end: Option<i32> = None;
        for phase in &phases {
            let YearRange { start, end } = phase.period;
            if start > end {
                return Err(ValidationError::InvalidPhasePeriod { start, end });
            }
            if phase.actions.is_empty() || phase.actions.iter().any(|a| a.trim().is_empty()) {
                return Err(ValidationError::EmptyActionPhase { start, end });
            }
            if let Some(prev) = previous_end {
                if start <= prev {
                    return Err(ValidationError::OverlappingPhases {
                        previous_end: prev,
                        found: start,
                    });
                }
            }
            previous_end = Some(end);
        }
        Ok(Self { phases })
    }

    /// Phases in period order.
    #[must_use]
    pub fn phases(&self) -> &[ActionPhase] {
        &self.phases
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase covering `year`, if any.
    #[must_use]
    pub fn phase_for(&self, year: i32) -> Option<&ActionPhase> {
        self.phases.iter().find(|p| p.period.contains(year))
    }

    /// First through last planned year.
    #[must_use]
    pub fn span(&self) -> Option<YearRange> {
        let (first, last) = (self.phases.first()?, self.phases.last()?);
        Some(YearRange {
            start: first.period.start,
            end: last.period.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StrategyCatalog {
        StrategyCatalog::new(vec![
            PreventionStrategy::new("Price increase", 8.9, 2.0, 4.0),
            PreventionStrategy::new("Plain packaging", 7.2, 3.0, 6.0),
            PreventionStrategy::new("Cessation support", 7.5, 6.0, 8.0),
            PreventionStrategy::new("Cessation consultations", 8.2, 7.0, 8.0),
        ])
        .unwrap()
    }

    fn names<'a>(ranked: &[&'a PreventionStrategy]) -> Vec<&'a str> {
        ranked.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_rank_by_efficacy() {
        let catalog = catalog();
        assert_eq!(
            names(&catalog.rank_by(StrategyCriterion::Efficacy)),
            vec![
                "Price increase",
                "Cessation consultations",
                "Cessation support",
                "Plain packaging"
            ]
        );
    }

    #[test]
    fn test_rank_by_cost_prefers_cheapest() {
        let catalog = catalog();
        assert_eq!(
            names(&catalog.rank_by(StrategyCriterion::Cost))[0],
            "Price increase"
        );
    }

    #[test]
    fn test_rank_by_efficacy_per_cost() {
        let catalog = catalog();
        let ranked = catalog.rank_by(StrategyCriterion::EfficacyPerCost);
        assert_eq!(
            names(&ranked),
            vec![
                "Price increase",
                "Plain packaging",
                "Cessation support",
                "Cessation consultations"
            ]
        );
        assert!((ranked[0].score(StrategyCriterion::EfficacyPerCost) - 4.45).abs() < 1e-9);
    }

    #[test]
    fn test_acceptability_ties_break_by_name() {
        let catalog = catalog();
        assert_eq!(
            names(&catalog.rank_by(StrategyCriterion::Acceptability))[..2].to_vec(),
            vec!["Cessation consultations", "Cessation support"]
        );
    }

    #[test]
    fn test_rejects_out_of_scale_and_zero_cost() {
        let err = StrategyCatalog::new(vec![PreventionStrategy::new("x", 11.0, 2.0, 4.0)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidScore { ref field, .. } if field == "efficacy"));

        let err =
            StrategyCatalog::new(vec![PreventionStrategy::new("x", 5.0, 0.0, 4.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidScore { ref field, .. } if field == "cost"));

        let err = StrategyCatalog::new(vec![PreventionStrategy::new("x", f64::NAN, 1.0, 4.0)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidScore { .. }));
    }

    #[test]
    fn test_rejects_duplicate_and_blank_names() {
        let s = PreventionStrategy::new("x", 5.0, 1.0, 4.0);
        assert!(matches!(
            StrategyCatalog::new(vec![s.clone(), s]).unwrap_err(),
            ValidationError::DuplicateStrategy { .. }
        ));
        assert_eq!(
            StrategyCatalog::new(vec![PreventionStrategy::new(" ", 5.0, 1.0, 4.0)]).unwrap_err(),
            ValidationError::EmptyStrategyName
        );
    }

    #[test]
    fn test_criterion_from_str() {
        assert_eq!(
            "efficacy_per_cost".parse::<StrategyCriterion>().unwrap(),
            StrategyCriterion::EfficacyPerCost
        );
        assert!("speed".parse::<StrategyCriterion>().is_err());
    }

    fn phase(start: i32, end: i32, actions: &[&str]) -> ActionPhase {
        ActionPhase::new(YearRange { start, end }, actions.iter().copied())
    }

    #[test]
    fn test_action_plan_lookup() {
        let plan = ActionPlan::new(vec![
            phase(2024, 2025, &["Needs mapping"]),
            phase(2026, 2027, &["Consultation roll-out"]),
            phase(2028, 2030, &["Strategic evaluation"]),
        ])
        .unwrap();
        assert_eq!(plan.phase_for(2027).unwrap().actions, vec!["Consultation roll-out"]);
        assert!(plan.phase_for(2031).is_none());
        assert_eq!(plan.span(), Some(YearRange { start: 2024, end: 2030 }));
    }

    #[test]
    fn test_action_plan_rejects_overlap_and_empty_phase() {
        let err = ActionPlan::new(vec![phase(2024, 2026, &["a"]), phase(2026, 2027, &["b"])])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OverlappingPhases {
                previous_end: 2026,
                found: 2026
            }
        );
        assert!(matches!(
            ActionPlan::new(vec![phase(2024, 2025, &[])]).unwrap_err(),
            ValidationError::EmptyActionPhase { .. }
        ));
        assert!(matches!(
            ActionPlan::new(vec![phase(2025, 2024, &["a"])]).unwrap_err(),
            ValidationError::InvalidPhasePeriod { .. }
        ));
    }
}
