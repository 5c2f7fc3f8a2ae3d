//! View parameters supplied by the rendering layer.
//!
//! The engine stores none of this: every query receives a `ViewParams`
//! and derives its result from it plus the immutable datasets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorResult, ValidationError};
use crate::store::StrategyCriterion;
use crate::time::YearRange;

/// Metropolitan smoking prevalence used as the default baseline (%).
pub const METROPOLE_PREVALENCE: f64 = 24.2;

/// Metropolitan daily-smoker share used as the default baseline (%).
pub const METROPOLE_DAILY_SMOKERS: f64 = 20.1;

/// Metropolitan mean age at first cigarette used as the default baseline (years).
pub const METROPOLE_FIRST_CIGARETTE_AGE: f64 = 13.3;

/// Age at first cigarette under which initiation is flagged (years).
pub const FIRST_CIGARETTE_AGE_VIGILANCE: f64 = 14.0;

/// Families of views a caller may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    /// Consumption history (prevalence, daily smokers, initiation age).
    Consumption,
    /// Health outcomes.
    Health,
    /// Social and economic indicators.
    Social,
    /// Policy timeline joined onto prevalence, strategy rankings and the
    /// action plan.
    Policy,
    /// Territorial comparison.
    Territories,
}

impl FocusArea {
    /// Every focus area.
    pub const ALL: [Self; 5] = [
        Self::Consumption,
        Self::Health,
        Self::Social,
        Self::Policy,
        Self::Territories,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::Health => "health",
            Self::Social => "social",
            Self::Policy => "policy",
            Self::Territories => "territories",
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusArea {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidParams {
                reason: format!("unknown focus area '{s}'"),
            })
    }
}

/// Parameters of one derive request.
///
/// Defaults reproduce the dashboard's initial controls: the full
/// 2000-2023 period, consumption and territories in focus, four
/// territories selected, projections shown, auto-refresh off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParams {
    /// Restrict series to these years. `None` keeps each dataset whole.
    pub year_range: Option<YearRange>,

    /// Territories to include. `None` keeps every territory.
    pub territory_filter: Option<BTreeSet<String>>,

    /// Which view families to derive.
    pub focus_areas: BTreeSet<FocusArea>,

    /// Baseline per indicator for deviation displays; missing means 0.
    pub reference_baseline: BTreeMap<String, f64>,

    /// Alert level per indicator; headline values below it are flagged.
    pub vigilance_thresholds: BTreeMap<String, f64>,

    /// Whether to derive target projections.
    pub show_projections: bool,

    /// Carried for the caller's refresh scheduler; ignored by the engine.
    pub auto_refresh: bool,

    /// Territorial indicators to rank on.
    pub ranking_indicators: Vec<String>,

    /// Rank lowest first.
    pub ranking_ascending: bool,

    /// Series the policy timeline is joined onto.
    pub timeline_indicator: String,

    /// Indicators projected toward their targets.
    pub projection_indicators: Vec<String>,

    /// First year shown on projection trajectories.
    pub trajectory_from: i32,

    /// Criteria prevention strategies are ranked on.
    pub strategy_criteria: Vec<StrategyCriterion>,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            year_range: Some(YearRange { start: 2000, end: 2023 }),
            territory_filter: Some(
                ["Guadeloupe", "Martinique", "La Réunion", "Mayotte"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            focus_areas: [FocusArea::Consumption, FocusArea::Territories]
                .into_iter()
                .collect(),
            reference_baseline: default_baselines(),
            vigilance_thresholds: [(
                "first_cigarette_age".to_string(),
                FIRST_CIGARETTE_AGE_VIGILANCE,
            )]
            .into_iter()
            .collect(),
            show_projections: true,
            auto_refresh: false,
            ranking_indicators: vec![
                "smoking_prevalence".to_string(),
                "daily_smokers".to_string(),
            ],
            ranking_ascending: true,
            timeline_indicator: "smoking_prevalence".to_string(),
            projection_indicators: vec!["smoking_prevalence".to_string()],
            trajectory_from: 2020,
            strategy_criteria: vec![
                StrategyCriterion::Efficacy,
                StrategyCriterion::EfficacyPerCost,
            ],
        }
    }
}

fn default_baselines() -> BTreeMap<String, f64> {
    let mut baselines = BTreeMap::new();
    baselines.insert("smoking_prevalence".to_string(), METROPOLE_PREVALENCE);
    baselines.insert("daily_smokers".to_string(), METROPOLE_DAILY_SMOKERS);
    baselines.insert(
        "first_cigarette_age".to_string(),
        METROPOLE_FIRST_CIGARETTE_AGE,
    );
    baselines
}

impl ViewParams {
    /// Parameters selecting every view over every territory and year.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            year_range: None,
            territory_filter: None,
            focus_areas: FocusArea::ALL.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parse a JSON parameter object and validate it.
    ///
    /// Missing fields take their default value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidParams` for malformed JSON, or any
    /// error of [`Self::validate`].
    pub fn from_json(json: &str) -> IndicatorResult<Self> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| ValidationError::InvalidParams {
                reason: e.to_string(),
            })?;
        params.validate()?;
        Ok(params)
    }

    /// Validate parameters.
    ///
    /// An empty focus set or territory filter is valid and simply derives
    /// nothing for those views.
    ///
    /// # Errors
    ///
    /// - `QueryError::InvalidRange` if `year_range` starts after it ends
    /// - `ValidationError::InvalidParams` for any other defect
    pub fn validate(&self) -> IndicatorResult<()> {
        if let Some(range) = self.year_range {
            YearRange::new(range.start, range.end)?;
        }
        if let Some((indicator, _)) = self.reference_baseline.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::InvalidParams {
                reason: format!("reference_baseline for '{indicator}' is not finite"),
            }
            .into());
        }
        if let Some((indicator, _)) = self.vigilance_thresholds.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::InvalidParams {
                reason: format!("vigilance_thresholds for '{indicator}' is not finite"),
            }
            .into());
        }
        if self.ranking_indicators.iter().any(|i| i.trim().is_empty()) {
            return Err(ValidationError::InvalidParams {
                reason: "ranking_indicators contains an empty name".to_string(),
            }
            .into());
        }
        if self.projection_indicators.iter().any(|i| i.trim().is_empty()) {
            return Err(ValidationError::InvalidParams {
                reason: "projection_indicators contains an empty name".to_string(),
            }
            .into());
        }
        if self.timeline_indicator.trim().is_empty() {
            return Err(ValidationError::InvalidParams {
                reason: "timeline_indicator must be set".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether `area` is in focus.
    #[must_use]
    pub fn wants(&self, area: FocusArea) -> bool {
        self.focus_areas.contains(&area)
    }

    /// Baseline for `indicator`, or 0 when none was supplied.
    #[must_use]
    pub fn baseline_for(&self, indicator: &str) -> f64 {
        self.reference_baseline.get(indicator).copied().unwrap_or(0.0)
    }

    /// Vigilance threshold for `indicator`, if one is set.
    #[must_use]
    pub fn threshold_for(&self, indicator: &str) -> Option<f64> {
        self.vigilance_thresholds.get(indicator).copied()
    }
}
