//! Cross-sectional territorial snapshot for a single reference year.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, ValidationError};

/// Approximate geographic position of a territory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// One territory's indicator values for the snapshot year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritorialRecord {
    /// Territory name, unique within a store.
    pub territory: String,

    /// Indicator name to value.
    pub values: BTreeMap<String, f64>,

    /// Position used by map displays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    /// Locally recommended prevention actions, in priority order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl TerritorialRecord {
    /// Creates a record with no indicator values yet.
    #[must_use]
    pub fn new(territory: impl Into<String>) -> Self {
        Self {
            territory: territory.into(),
            values: BTreeMap::new(),
            location: None,
            recommendations: Vec::new(),
        }
    }

    /// Sets an indicator value.
    #[must_use]
    pub fn with_value(mut self, indicator: impl Into<String>, value: f64) -> Self {
        self.values.insert(indicator.into(), value);
        self
    }

    /// Sets the geographic position.
    #[must_use]
    pub const fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(GeoPoint { lat, lon });
        self
    }

    /// Sets the recommended actions.
    #[must_use]
    pub fn with_recommendations<I>(mut self, recommendations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.recommendations = recommendations.into_iter().map(Into::into).collect();
        self
    }

    /// Value of one indicator.
    #[must_use]
    pub fn value(&self, indicator: &str) -> Option<f64> {
        self.values.get(indicator).copied()
    }
}

/// Per-territory records for one reference year.
///
/// Every record carries a value for every declared indicator. A store may
/// be empty (for example after filtering on names it does not know), which
/// is a valid state distinct from an unknown indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritorialSnapshotStore {
    reference_year: i32,
    indicators: BTreeSet<String>,
    records: BTreeMap<String, TerritorialRecord>,
}

impl TerritorialSnapshotStore {
    /// Creates a snapshot store.
    ///
    /// # Errors
    ///
    /// - `EmptyTerritoryName` for a blank territory
    /// - `DuplicateTerritory` if a name appears twice
    /// - `MissingIndicator` if a record lacks a declared indicator
    /// - `UndeclaredIndicator` if a record carries an extra indicator
    /// - `NonFiniteValue` for NaN or infinite values
    /// - `BlankRecommendation` for an empty recommended action
    pub fn new<I>(
        reference_year: i32,
        indicators: I,
        records: Vec<TerritorialRecord>,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let indicators: BTreeSet<String> = indicators.into_iter().map(Into::into).collect();
        let mut by_name = BTreeMap::new();

        for record in records {
            if record.territory.trim().is_empty() {
                return Err(ValidationError::EmptyTerritoryName);
            }
            for indicator in &indicators {
                match record.values.get(indicator) {
                    None => {
                        return Err(ValidationError::MissingIndicator {
                            territory: record.territory,
                            indicator: indicator.clone(),
                        });
                    }
                    Some(v) if !v.is_finite() => {
                        return Err(ValidationError::NonFiniteValue {
                            field: format!("{}.{indicator}", record.territory),
                        });
                    }
                    Some(_) => {}
                }
            }
            if let Some(extra) = record.values.keys().find(|k| !indicators.contains(*k)) {
                return Err(ValidationError::UndeclaredIndicator {
                    territory: record.territory.clone(),
                    indicator: extra.clone(),
                });
            }
            if record.recommendations.iter().any(|r| r.trim().is_empty()) {
                return Err(ValidationError::BlankRecommendation {
                    territory: record.territory,
                });
            }
            if by_name.contains_key(&record.territory) {
                return Err(ValidationError::DuplicateTerritory {
                    territory: record.territory,
                });
            }
            by_name.insert(record.territory.clone(), record);
        }

        Ok(Self {
            reference_year,
            indicators,
            records: by_name,
        })
    }

    /// Year the snapshot describes.
    #[must_use]
    pub const fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Declared indicator names in lexical order.
    #[must_use]
    pub fn indicators(&self) -> Vec<&str> {
        self.indicators.iter().map(String::as_str).collect()
    }

    /// Territory names in lexical order.
    #[must_use]
    pub fn list_territories(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up one territory.
    #[must_use]
    pub fn get(&self, territory: &str) -> Option<&TerritorialRecord> {
        self.records.get(territory)
    }

    /// Fails with `UnknownIndicator` unless `indicator` is declared.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownIndicator`.
    pub fn ensure_indicator(&self, indicator: &str) -> Result<(), QueryError> {
        if self.indicators.contains(indicator) {
            Ok(())
        } else {
            Err(QueryError::UnknownIndicator {
                name: indicator.to_string(),
            })
        }
    }

    /// Records sorted by `indicator`; ties fall back to territory name.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownIndicator` if `indicator` is not declared.
    pub fn rank_by(
        &self,
        indicator: &str,
        ascending: bool,
    ) -> Result<Vec<TerritorialRecord>, QueryError> {
        self.ensure_indicator(indicator)?;

        let mut ranked: Vec<TerritorialRecord> = self.records.values().cloned().collect();
        ranked.sort_by(|a, b| {
            let (va, vb) = (a.value(indicator), b.value(indicator));
            let by_value = match (va, vb) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            };
            let by_value = if ascending { by_value } else { by_value.reverse() };
            by_value.then_with(|| a.territory.cmp(&b.territory))
        });
        Ok(ranked)
    }

    /// Restrict the store to the named territories.
    ///
    /// Names the store does not know are ignored; the result may be empty.
    #[must_use]
    pub fn filter<S: AsRef<str>>(&self, subset: impl IntoIterator<Item = S>) -> Self {
        let mut records = BTreeMap::new();
        let mut dropped = 0usize;
        for name in subset {
            match self.records.get(name.as_ref()) {
                Some(record) => {
                    records.insert(record.territory.clone(), record.clone());
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!(
                target: "drom_indicators::store",
                dropped,
                kept = records.len(),
                "territory.filter ignored unknown names"
            );
        }

        Self {
            reference_year: self.reference_year,
            indicators: self.indicators.clone(),
            records,
        }
    }
}
