//! Policy-event timeline.
//!
//! Events are stored in insertion order. Chronological ordering is
//! produced on read, with insertion order breaking same-date ties.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of intervention categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCategory {
    /// Campaigns, education, youth programmes.
    Prevention,
    /// Bans, packaging rules, pricing.
    Regulation,
    /// Cessation support and care.
    Treatment,
}

impl PolicyCategory {
    /// All categories in declaration order.
    pub const ALL: [Self; 3] = [Self::Prevention, Self::Regulation, Self::Treatment];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prevention => "prevention",
            Self::Regulation => "regulation",
            Self::Treatment => "treatment",
        }
    }
}

impl fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prevention" => Ok(Self::Prevention),
            "regulation" => Ok(Self::Regulation),
            "treatment" => Ok(Self::Treatment),
            _ => Err(ValidationError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// A dated intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEvent {
    /// Day the event took effect.
    pub date: NaiveDate,
    /// Intervention category.
    pub category: PolicyCategory,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
}

impl PolicyEvent {
    /// Creates an event from typed parts.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        category: PolicyCategory,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            category,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Creates an event from textual parts (`YYYY-MM-DD` date).
    ///
    /// # Errors
    ///
    /// - `InvalidEventDate` if the date does not name a real calendar day
    /// - `UnknownCategory` if the category is outside the closed set
    pub fn parse(
        date: &str,
        category: &str,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            ValidationError::InvalidEventDate {
                value: date.to_string(),
                reason: e.to_string(),
            }
        })?;
        let category = category.parse()?;
        Ok(Self::new(parsed, category, title, description))
    }

    /// Calendar year of the event date.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Timeline of policy events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PolicyEventLog {
    events: Vec<PolicyEvent>,
}

impl PolicyEventLog {
    /// Creates a log; input order is kept as the tie-breaker for same-day events.
    #[must_use]
    pub fn new(events: Vec<PolicyEvent>) -> Self {
        Self { events }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in insertion order.
    #[must_use]
    pub fn events(&self) -> &[PolicyEvent] {
        &self.events
    }

    /// Events by date ascending, insertion order for ties.
    #[must_use]
    pub fn chronological(&self) -> Vec<&PolicyEvent> {
        let mut ordered: Vec<&PolicyEvent> = self.events.iter().collect();
        // `sort_by_key` is stable, so same-date events keep insertion order.
        ordered.sort_by_key(|e| e.date);
        ordered
    }

    /// Events grouped by calendar year, each group in chronological order.
    #[must_use]
    pub fn by_year(&self) -> BTreeMap<i32, Vec<&PolicyEvent>> {
        let mut groups: BTreeMap<i32, Vec<&PolicyEvent>> = BTreeMap::new();
        for event in self.chronological() {
            groups.entry(event.year()).or_default().push(event);
        }
        groups
    }

    /// Events of one category in chronological order.
    #[must_use]
    pub fn by_category(&self, category: PolicyCategory) -> Vec<&PolicyEvent> {
        self.chronological()
            .into_iter()
            .filter(|e| e.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: &str, category: &str, title: &str) -> PolicyEvent {
        PolicyEvent::parse(date, category, title, "").unwrap()
    }

    #[test]
    fn test_parse_rejects_invalid_date() {
        let err = PolicyEvent::parse("2023-02-30", "prevention", "t", "d").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEventDate { .. }));

        let err = PolicyEvent::parse("not a date", "prevention", "t", "d").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEventDate { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let err = PolicyEvent::parse("2023-01-01", "taxation", "t", "d").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownCategory { value: "taxation".to_string() }
        );
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in PolicyCategory::ALL {
            assert_eq!(category.as_str().parse::<PolicyCategory>().unwrap(), category);
        }
        assert_eq!("Regulation".parse::<PolicyCategory>().unwrap(), PolicyCategory::Regulation);
    }

    #[test]
    fn test_chronological_keeps_insertion_order_on_ties() {
        let log = PolicyEventLog::new(vec![
            event("2020-06-01", "treatment", "late"),
            event("2020-01-01", "prevention", "first"),
            event("2020-01-01", "regulation", "second"),
        ]);
        let titles: Vec<&str> = log.chronological().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "late"]);
        // Underlying order untouched.
        assert_eq!(log.events()[0].title, "late");
    }

    #[test]
    fn test_by_year_groups() {
        let log = PolicyEventLog::new(vec![
            event("2011-03-15", "prevention", "a"),
            event("2007-01-01", "regulation", "b"),
            event("2011-01-10", "treatment", "c"),
        ]);
        let groups = log.by_year();
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![2007, 2011]);
        let titles: Vec<&str> = groups[&2011].iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[test]
    fn test_by_category() {
        let log = PolicyEventLog::new(vec![
            event("2014-05-01", "regulation", "a"),
            event("2011-03-15", "prevention", "b"),
            event("2007-01-01", "regulation", "c"),
        ]);
        let titles: Vec<&str> = log
            .by_category(PolicyCategory::Regulation)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["c", "a"]);
    }
}
