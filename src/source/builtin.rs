//! Static DROM-COM datasets compiled into the crate.

use crate::error::IndicatorResult;
use crate::source::{DataSource, Datasets};
use crate::store::{
    ActionPhase, ActionPlan, IndicatorSeriesStore, PolicyEvent, PolicyEventLog,
    PreventionStrategy, StrategicTarget, StrategyCatalog, TargetRegistry, TerritorialRecord,
    TerritorialSnapshotStore,
};
use crate::time::YearRange;

const HISTORY: YearRange = YearRange { start: 2000, end: 2023 };
const RECENT: YearRange = YearRange { start: 2010, end: 2023 };
const SNAPSHOT_YEAR: i32 = 2023;

/// Territorial indicator names, in record column order.
const TERRITORIAL_INDICATORS: [&str; 6] = [
    "smoking_prevalence",
    "daily_smokers",
    "cigarettes_per_day",
    "passive_smoking",
    "tobacco_mortality",
    "cessation_care",
];

// territory, lat, lon, then one value per TERRITORIAL_INDICATORS entry
const TERRITORIES: [(&str, f64, f64, [f64; 6]); 9] = [
    ("Guadeloupe", 16.265, -61.551, [28.5, 22.8, 11.2, 18.5, 185.0, 45.8]),
    ("Martinique", 14.641, -61.024, [25.8, 20.4, 10.5, 16.8, 168.0, 52.3]),
    ("Guyane", 3.933, -53.125, [32.4, 27.1, 13.8, 22.4, 224.0, 38.7]),
    ("La Réunion", -21.115, 55.536, [29.1, 23.6, 12.1, 19.7, 197.0, 48.4]),
    ("Mayotte", -12.827, 45.166, [22.6, 18.2, 9.3, 14.2, 142.0, 32.6]),
    ("Saint-Martin", 18.070, -63.050, [35.8, 30.5, 15.6, 25.8, 258.0, 42.7]),
    ("Saint-Barthélemy", 17.900, -62.850, [38.2, 33.1, 16.9, 28.3, 283.0, 58.9]),
    ("Polynésie française", -17.679, -149.407, [26.3, 21.7, 10.8, 17.6, 176.0, 47.8]),
    ("Nouvelle-Calédonie", -21.300, 165.300, [27.9, 23.4, 11.5, 18.9, 189.0, 49.5]),
];

const RECOMMENDATIONS: [(&str, [&str; 3]); 9] = [
    (
        "Guadeloupe",
        ["Youth prevention", "Expand cessation consultations", "Fight contraband"],
    ),
    (
        "Martinique",
        ["Targeted media campaign", "Professional training", "Perinatal prevention"],
    ),
    (
        "Guyane",
        ["Cultural adaptation", "Community prevention", "Strengthen care"],
    ),
    (
        "La Réunion",
        ["School prevention", "Early screening", "Follow-up care"],
    ),
    (
        "Mayotte",
        ["Early awareness", "Local actor training", "Access to substitutes"],
    ),
    (
        "Saint-Martin",
        ["Reinforced controls", "Prevention aimed at tourists", "Emergency care"],
    ),
    (
        "Saint-Barthélemy",
        ["Targeted prevention", "Event controls", "Private-sector care"],
    ),
    (
        "Polynésie française",
        ["Adapted prevention", "Care across the islands", "Telemedicine"],
    ),
    (
        "Nouvelle-Calédonie",
        ["Mining-sector prevention", "Rural care", "Workplace programmes"],
    ),
];

// name, efficacy, cost, acceptability
const STRATEGIES: [(&str, f64, f64, f64); 6] = [
    ("Price increase", 8.9, 2.0, 4.0),
    ("Plain packaging", 7.2, 3.0, 6.0),
    ("Advertising ban", 6.8, 4.0, 7.0),
    ("Cessation aids", 7.5, 6.0, 8.0),
    ("Media campaigns", 6.1, 5.0, 7.0),
    ("Cessation consultations", 8.2, 7.0, 8.0),
];

const ACTION_PLAN: [(i32, i32, [&str; 3]); 3] = [
    (
        2024,
        2025,
        ["Needs mapping", "Cessation specialist training", "Territorial media campaign"],
    ),
    (
        2026,
        2027,
        ["Consultation roll-out", "Unified school programme", "Screening system"],
    ),
    (
        2028,
        2030,
        ["Strategic evaluation", "Programme adjustment", "Scaling up best practices"],
    ),
];

// date, category, title, description
const POLICY_TIMELINE: [(&str, &str, &str, &str); 8] = [
    (
        "2007-01-01",
        "regulation",
        "Public-place smoking ban",
        "Smoking ban in public places applied across DROM-COM",
    ),
    (
        "2011-03-15",
        "prevention",
        "Overseas tobacco plan",
        "First prevention plan dedicated to DROM-COM",
    ),
    (
        "2014-05-01",
        "regulation",
        "Plain packaging extended overseas",
        "Plain packaging rules extended to overseas territories",
    ),
    (
        "2016-09-01",
        "treatment",
        "Nicotine replacement reimbursed",
        "Full reimbursement of nicotine replacement therapy",
    ),
    (
        "2018-11-01",
        "regulation",
        "Tobacco price increase",
        "Gradual price alignment with metropolitan France",
    ),
    (
        "2020-01-01",
        "prevention",
        "Adapted tobacco-free month",
        "National tobacco-free month campaign adapted to local contexts",
    ),
    (
        "2022-03-01",
        "treatment",
        "Cessation teleconsultation",
        "Teleconsultation rolled out for smoking cessation",
    ),
    (
        "2023-09-01",
        "prevention",
        "Tobacco-free generation",
        "Prevention programme targeting overseas youth",
    ),
];

// indicator, 2025 target, 2030 target
const TARGETS: [(&str, f64, f64); 5] = [
    ("smoking_prevalence", 22.0, 18.0),
    ("daily_smokers", 17.0, 14.0),
    ("first_cigarette_age", 13.0, 14.0),
    ("tobacco_deaths", 2300.0, 2000.0),
    ("care_coverage", 65.0, 80.0),
];

/// Step series `start, start + step, ...` over `domain`.
fn linear(domain: YearRange, start: f64, step: f64) -> Vec<f64> {
    (0..domain.len())
        .map(|i| {
            // Rounded to one decimal so values match the published tables.
            #[allow(clippy::cast_precision_loss)]
            let raw = start + step * i as f64;
            (raw * 10.0).round() / 10.0
        })
        .collect()
}

fn consumption() -> IndicatorResult<IndicatorSeriesStore> {
    Ok(IndicatorSeriesStore::from_columns(
        HISTORY,
        [
            ("smoking_prevalence", linear(HISTORY, 35.2, -0.4)),
            ("daily_smokers", linear(HISTORY, 28.5, -0.3)),
            ("cigarettes_per_day", linear(HISTORY, 12.8, -0.1)),
            ("first_cigarette_age", linear(HISTORY, 14.8, -0.1)),
        ],
    )?)
}

fn health() -> IndicatorResult<IndicatorSeriesStore> {
    Ok(IndicatorSeriesStore::from_columns(
        RECENT,
        [
            ("tobacco_deaths", linear(RECENT, 2850.0, -30.0)),
            ("lung_cancers", linear(RECENT, 420.0, 10.0)),
            ("chronic_bronchitis", linear(RECENT, 1850.0, 10.0)),
            ("heart_attacks", linear(RECENT, 1250.0, -10.0)),
            ("strokes", linear(RECENT, 980.0, -10.0)),
        ],
    )?)
}

fn social() -> IndicatorResult<IndicatorSeriesStore> {
    Ok(IndicatorSeriesStore::from_columns(
        RECENT,
        [
            ("household_tobacco_spending", linear(RECENT, 1250.0, 30.0)),
            ("tobacco_absenteeism", linear(RECENT, 3.5, 0.1)),
            ("female_smoking", linear(RECENT, 22.8, -0.2)),
            ("tobacco_poverty", linear(RECENT, 18.5, -0.2)),
        ],
    )?)
}

fn territories() -> IndicatorResult<TerritorialSnapshotStore> {
    let records = TERRITORIES
        .iter()
        .map(|(name, lat, lon, values)| {
            let recommendations = RECOMMENDATIONS
                .iter()
                .find(|(territory, _)| territory == name)
                .map(|(_, actions)| actions.as_slice())
                .unwrap_or_default();
            TERRITORIAL_INDICATORS
                .iter()
                .zip(values)
                .fold(TerritorialRecord::new(*name), |record, (indicator, value)| {
                    record.with_value(*indicator, *value)
                })
                .with_location(*lat, *lon)
                .with_recommendations(recommendations.iter().copied())
        })
        .collect();
    Ok(TerritorialSnapshotStore::new(
        SNAPSHOT_YEAR,
        TERRITORIAL_INDICATORS,
        records,
    )?)
}

fn policies() -> IndicatorResult<PolicyEventLog> {
    let events = POLICY_TIMELINE
        .iter()
        .map(|(date, category, title, description)| {
            PolicyEvent::parse(date, category, *title, *description)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PolicyEventLog::new(events))
}

fn targets() -> IndicatorResult<TargetRegistry> {
    let targets = TARGETS
        .iter()
        .flat_map(|(indicator, t2025, t2030)| {
            [
                StrategicTarget::new(*indicator, 2025, *t2025),
                StrategicTarget::new(*indicator, 2030, *t2030),
            ]
        })
        .collect();
    Ok(TargetRegistry::new(targets)?)
}

fn strategies() -> IndicatorResult<StrategyCatalog> {
    let strategies = STRATEGIES
        .iter()
        .map(|(name, efficacy, cost, acceptability)| {
            PreventionStrategy::new(*name, *efficacy, *cost, *acceptability)
        })
        .collect();
    Ok(StrategyCatalog::new(strategies)?)
}

fn action_plan() -> IndicatorResult<ActionPlan> {
    let phases = ACTION_PLAN
        .iter()
        .map(|(start, end, actions)| {
            ActionPhase::new(YearRange { start: *start, end: *end }, actions.iter().copied())
        })
        .collect();
    Ok(ActionPlan::new(phases)?)
}

/// The dashboard's built-in DROM-COM datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl DataSource for BuiltinSource {
    fn name(&self) -> &str {
        "builtin"
    }

    fn load(&self) -> IndicatorResult<Datasets> {
        Ok(Datasets::new(
            consumption()?,
            health()?,
            social()?,
            territories()?,
            policies()?,
            targets()?,
        )
        .with_strategies(strategies()?)
        .with_action_plan(action_plan()?))
    }
}
