//! Error types for the indicator engine.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the exact condition. Construction defects (`ValidationError`) are kept
//! apart from query-time conditions (`QueryError`) and data source
//! failures (`SourceError`).

use thiserror::Error;

/// Errors raised while building stores, targets or view parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Series name cannot be empty")]
    EmptySeriesName,

    #[error("Series '{name}' has no values")]
    EmptySeries {
        name: String,
    },

    #[error("Series '{name}' has {actual} values, expected {expected} for the store domain")]
    SeriesLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Series '{name}' is not contiguous: year {found} follows {previous}")]
    NonContiguousYears {
        name: String,
        previous: i32,
        found: i32,
    },

    #[error("Series '{name}' does not cover the store domain {start}-{end}")]
    DomainMismatch {
        name: String,
        start: i32,
        end: i32,
    },

    #[error("Series '{name}' is defined more than once")]
    DuplicateSeries {
        name: String,
    },

    #[error("Value for '{field}' is not a finite number")]
    NonFiniteValue {
        field: String,
    },

    #[error("Territory '{territory}' is defined more than once")]
    DuplicateTerritory {
        territory: String,
    },

    #[error("Territory name cannot be empty")]
    EmptyTerritoryName,

    #[error("Territory '{territory}' has no value for indicator '{indicator}'")]
    MissingIndicator {
        territory: String,
        indicator: String,
    },

    #[error("Territory '{territory}' carries undeclared indicator '{indicator}'")]
    UndeclaredIndicator {
        territory: String,
        indicator: String,
    },

    #[error("Invalid event date '{value}': {reason}")]
    InvalidEventDate {
        value: String,
        reason: String,
    },

    #[error("Unknown policy category '{value}' (expected prevention, regulation or treatment)")]
    UnknownCategory {
        value: String,
    },

    #[error("Projection anchors for '{indicator}' are not strictly increasing: {found} follows {previous}")]
    InvalidAnchorOrder {
        indicator: String,
        previous: i32,
        found: i32,
    },

    #[error("Projection for '{indicator}' spans {first}-{last}, more than {max_years} years")]
    ProjectionTooLong {
        indicator: String,
        first: i32,
        last: i32,
        max_years: i32,
    },

    #[error("Indicator '{indicator}' declares no targets")]
    NoTargets {
        indicator: String,
    },

    #[error("Strategy name cannot be empty")]
    EmptyStrategyName,

    #[error("Strategy '{name}' is defined more than once")]
    DuplicateStrategy {
        name: String,
    },

    #[error("Strategy '{strategy}' has {field} {value}, expected a score within 0-10 (cost above 0)")]
    InvalidScore {
        strategy: String,
        field: String,
        value: f64,
    },

    #[error("Territory '{territory}' has a blank recommendation")]
    BlankRecommendation {
        territory: String,
    },

    #[error("Action phase {start}-{end} is not a valid period")]
    InvalidPhasePeriod {
        start: i32,
        end: i32,
    },

    #[error("Action phase {start}-{end} lists no actions")]
    EmptyActionPhase {
        start: i32,
        end: i32,
    },

    #[error("Action phase starting {found} does not follow the phase ending {previous_end}")]
    OverlappingPhases {
        previous_end: i32,
        found: i32,
    },

    #[error("Invalid view parameters: {reason}")]
    InvalidParams {
        reason: String,
    },
}

/// Errors raised by queries against well-formed stores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Unknown series: '{name}'")]
    UnknownSeries {
        name: String,
    },

    #[error("Unknown indicator: '{name}'")]
    UnknownIndicator {
        name: String,
    },

    #[error("Year {year} is outside the series domain ({domain})")]
    YearOutOfRange {
        year: i32,
        domain: String,
    },

    #[error("Invalid year range: start ({start}) is after end ({end})")]
    InvalidRange {
        start: i32,
        end: i32,
    },

    #[error("Year {year} is past the last declared target year {last_target}")]
    NoTargetBeyondRange {
        year: i32,
        last_target: i32,
    },

    #[error("Year {year} precedes the first projection anchor {first_anchor}")]
    BeforeFirstAnchor {
        year: i32,
        first_anchor: i32,
    },

    #[error("Series '{indicator}' has no observation to anchor a projection on")]
    NoObservations {
        indicator: String,
    },

    #[error("No strategic targets declared for indicator '{indicator}'")]
    UnknownTarget {
        indicator: String,
    },
}

/// Errors raised while a data source produces its payload.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to decode dataset bundle: {message}")]
    Decode {
        message: String,
    },

    #[error("Failed to encode dataset '{dataset}': {message}")]
    Encode {
        dataset: String,
        message: String,
    },

    #[error("Dataset '{dataset}' is missing from the bundle")]
    MissingDataset {
        dataset: String,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl IndicatorError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a query error.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Returns true if this is a data source error.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// Every operation is deterministic, so an identical retry always
    /// produces the identical error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Result type alias for engine operations.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_out_of_range_message() {
        let err = QueryError::YearOutOfRange {
            year: 1999,
            domain: "2000-2023".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("1999"));
        assert!(msg.contains("2000-2023"));
    }

    #[test]
    fn test_invalid_range_message() {
        let err = QueryError::InvalidRange { start: 2020, end: 2010 };
        let msg = format!("{err}");
        assert!(msg.contains("Invalid year range"));
    }

    #[test]
    fn test_anchor_order_message() {
        let err = ValidationError::InvalidAnchorOrder {
            indicator: "smoking_prevalence".to_string(),
            previous: 2030,
            found: 2025,
        };
        let msg = format!("{err}");
        assert!(msg.contains("smoking_prevalence"));
        assert!(msg.contains("2025"));
    }

    #[test]
    fn test_indicator_error_from_validation() {
        let err: IndicatorError = ValidationError::EmptySeriesName.into();
        assert!(err.is_validation());
        assert!(!err.is_query());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_indicator_error_from_query() {
        let err: IndicatorError = QueryError::UnknownSeries {
            name: "nope".to_string(),
        }
        .into();
        assert!(err.is_query());
        assert!(!err.is_retryable());
        assert!(format!("{err}").contains("nope"));
    }

    #[test]
    fn test_indicator_error_from_source() {
        let err: IndicatorError = SourceError::Decode {
            message: "eof".to_string(),
        }
        .into();
        assert!(err.is_source());
        assert!(!err.is_retryable());
    }
}
