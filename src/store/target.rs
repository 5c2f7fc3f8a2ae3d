//! Declared strategic targets per indicator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, ValidationError};

/// A value an indicator should reach by a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicTarget {
    /// Indicator the target applies to.
    pub indicator: String,
    /// Year the target is due.
    pub year: i32,
    /// Target value.
    pub value: f64,
}

impl StrategicTarget {
    #[must_use]
    pub fn new(indicator: impl Into<String>, year: i32, value: f64) -> Self {
        Self {
            indicator: indicator.into(),
            year,
            value,
        }
    }
}

/// Targets grouped by indicator, each group strictly increasing in year.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TargetRegistry {
    by_indicator: BTreeMap<String, Vec<StrategicTarget>>,
}

impl TargetRegistry {
    /// Groups targets by indicator, keeping declaration order within a group.
    ///
    /// # Errors
    ///
    /// - `InvalidAnchorOrder` if an indicator's target years are not strictly
    ///   increasing in declaration order
    /// - `NonFiniteValue` for NaN or infinite target values
    pub fn new(targets: Vec<StrategicTarget>) -> Result<Self, ValidationError> {
        let mut by_indicator: BTreeMap<String, Vec<StrategicTarget>> = BTreeMap::new();
        for target in targets {
            if !target.value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: format!("{}@{}", target.indicator, target.year),
                });
            }
            let group = by_indicator.entry(target.indicator.clone()).or_default();
            if let Some(last) = group.last() {
                if target.year <= last.year {
                    return Err(ValidationError::InvalidAnchorOrder {
                        indicator: target.indicator,
                        previous: last.year,
                        found: target.year,
                    });
                }
            }
            group.push(target);
        }
        Ok(Self { by_indicator })
    }

    /// Indicators with at least one target.
    #[must_use]
    pub fn indicators(&self) -> Vec<&str> {
        self.by_indicator.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_indicator.is_empty()
    }

    /// Targets for one indicator in year order.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownTarget` if none are declared.
    pub fn targets_for(&self, indicator: &str) -> Result<&[StrategicTarget], QueryError> {
        self.by_indicator
            .get(indicator)
            .map(Vec::as_slice)
            .ok_or_else(|| QueryError::UnknownTarget {
                indicator: indicator.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_indicator() {
        let registry = TargetRegistry::new(vec![
            StrategicTarget::new("smoking_prevalence", 2025, 22.0),
            StrategicTarget::new("daily_smokers", 2025, 17.0),
            StrategicTarget::new("smoking_prevalence", 2030, 18.0),
        ])
        .unwrap();
        assert_eq!(registry.indicators(), vec!["daily_smokers", "smoking_prevalence"]);
        let years: Vec<i32> = registry
            .targets_for("smoking_prevalence")
            .unwrap()
            .iter()
            .map(|t| t.year)
            .collect();
        assert_eq!(years, vec![2025, 2030]);
    }

    #[test]
    fn test_rejects_decreasing_years() {
        let err = TargetRegistry::new(vec![
            StrategicTarget::new("smoking_prevalence", 2030, 18.0),
            StrategicTarget::new("smoking_prevalence", 2025, 22.0),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidAnchorOrder {
                indicator: "smoking_prevalence".to_string(),
                previous: 2030,
                found: 2025,
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_year() {
        let err = TargetRegistry::new(vec![
            StrategicTarget::new("x", 2025, 1.0),
            StrategicTarget::new("x", 2025, 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAnchorOrder { .. }));
    }

    #[test]
    fn test_unknown_target() {
        let registry = TargetRegistry::default();
        assert!(matches!(
            registry.targets_for("x"),
            Err(QueryError::UnknownTarget { .. })
        ));
    }
}
