//! Year ranges for yearly indicator domains.
//!
//! Every series store covers one contiguous, inclusive range of calendar
//! years. Caller-supplied ranges (slices, view parameters) use the same
//! type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// An inclusive range of calendar years: `[start, end]`.
///
/// # Examples
///
/// ```
/// use drom_indicators::YearRange;
///
/// let range = YearRange::new(2010, 2023).unwrap();
/// assert!(range.contains(2015));
/// assert_eq!(range.len(), 14);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    /// First year (inclusive).
    pub start: i32,

    /// Last year (inclusive).
    pub end: i32,
}

impl YearRange {
    /// Creates a year range.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidRange` if `start > end`.
    pub fn new(start: i32, end: i32) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering a single year.
    #[must_use]
    pub const fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    /// Check if a year falls within this range.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Check if two ranges share at least one year.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns the intersection of two ranges, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Number of years covered.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(i64::from(self.end) - i64::from(self.start) + 1).unwrap_or(0)
    }

    /// A well-formed range always covers at least one year.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Zero-based offset of `year` within the range.
    #[must_use]
    pub fn offset_of(&self, year: i32) -> Option<usize> {
        if !self.contains(year) {
            return None;
        }
        usize::try_from(i64::from(year) - i64::from(self.start)).ok()
    }

    /// Iterate over every year in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
