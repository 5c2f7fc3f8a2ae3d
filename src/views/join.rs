//! Temporal join of the policy timeline onto a yearly series.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::store::{IndicatorSeriesStore, PolicyEvent, PolicyEventLog};

/// One series year with the events that happened during it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedYear {
    /// Series year.
    pub year: i32,
    /// Indicator value for the year.
    pub value: f64,
    /// Events dated in this year, by date then insertion order.
    pub events: Vec<PolicyEvent>,
}

/// Result of joining a policy log onto one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedTimeline {
    /// Series the events were joined onto.
    pub indicator: String,
    /// One entry per series year, in year order.
    pub entries: Vec<JoinedYear>,
    /// Number of log events dated outside the series domain.
    pub excluded_events: usize,
}

impl JoinedTimeline {
    /// Entries that carry at least one event.
    pub fn with_events(&self) -> impl Iterator<Item = &JoinedYear> {
        self.entries.iter().filter(|e| !e.events.is_empty())
    }

    /// Total number of attached events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.entries.iter().map(|e| e.events.len()).sum()
    }
}

/// Left join of policy events onto series years.
///
/// Every year of the series domain yields exactly one entry, whether or not
/// events fall in it. Events dated outside the domain are counted in
/// `excluded_events` and otherwise left out; the log itself is untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalJoinEngine;

impl TemporalJoinEngine {
    /// Join `log` onto the series `indicator` of `store`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownSeries` if `indicator` is not in `store`.
    pub fn join(
        store: &IndicatorSeriesStore,
        indicator: &str,
        log: &PolicyEventLog,
    ) -> Result<JoinedTimeline, QueryError> {
        let points = store.get_series(indicator)?;
        let groups = log.by_year();

        let entries: Vec<JoinedYear> = points
            .into_iter()
            .map(|p| JoinedYear {
                year: p.year,
                value: p.value,
                events: groups
                    .get(&p.year)
                    .map(|events| events.iter().map(|&e| e.clone()).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let attached: usize = entries.iter().map(|e| e.events.len()).sum();
        let excluded_events = log.len() - attached;

        tracing::debug!(
            target: "drom_indicators::views",
            indicator,
            years = entries.len(),
            attached,
            excluded_events,
            "temporal_join"
        );

        Ok(JoinedTimeline {
            indicator: indicator.to_string(),
            entries,
            excluded_events,
        })
    }
}
