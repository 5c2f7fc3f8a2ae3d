//! Yearly indicator series and the store that groups them over one domain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, ValidationError};
use crate::time::YearRange;

/// One observation of a yearly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Calendar year.
    pub year: i32,
    /// Observed value.
    pub value: f64,
}

impl SeriesPoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// A named metric mapped over a contiguous, strictly increasing run of years.
///
/// A series built through [`IndicatorSeries::from_points`] always has at
/// least one value. Slicing a store outside its domain yields series with
/// no values, which stay valid and queryable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    name: String,
    start: i32,
    values: Vec<f64>,
}

impl IndicatorSeries {
    /// Builds a series from ordered `(year, value)` pairs.
    ///
    /// # Errors
    ///
    /// - `EmptySeriesName` if `name` is blank
    /// - `EmptySeries` if `points` is empty
    /// - `NonContiguousYears` on a gap, duplicate or decreasing year
    /// - `NonFiniteValue` for NaN or infinite values
    pub fn from_points(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (i32, f64)>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptySeriesName);
        }

        let mut start = None;
        let mut previous: Option<i32> = None;
        let mut values = Vec::new();
        for (year, value) in points {
            if let Some(prev) = previous {
                if i64::from(year) != i64::from(prev) + 1 {
                    return Err(ValidationError::NonContiguousYears {
                        name,
                        previous: prev,
                        found: year,
                    });
                }
            } else {
                start = Some(year);
            }
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: format!("{name}[{year}]"),
                });
            }
            previous = Some(year);
            values.push(value);
        }

        let Some(start) = start else {
            return Err(ValidationError::EmptySeries { name });
        };
        Ok(Self { name, start, values })
    }

    /// Builds a series from a value column aligned on `domain`.
    ///
    /// # Errors
    ///
    /// Returns `SeriesLengthMismatch` when the column does not have exactly
    /// one value per domain year, plus the errors of [`Self::from_points`].
    pub fn from_column(
        name: impl Into<String>,
        domain: YearRange,
        values: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if values.len() != domain.len() {
            return Err(ValidationError::SeriesLengthMismatch {
                name,
                expected: domain.len(),
                actual: values.len(),
            });
        }
        Self::from_points(name, domain.years().zip(values))
    }

    /// Series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Years covered, or `None` for an empty slice.
    #[must_use]
    pub fn domain(&self) -> Option<YearRange> {
        let len = i32::try_from(self.values.len()).ok()?;
        if len == 0 {
            return None;
        }
        Some(YearRange {
            start: self.start,
            end: self.start.checked_add(len - 1)?,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for `year`, if covered.
    #[must_use]
    pub fn value_at(&self, year: i32) -> Option<f64> {
        let offset = self.domain()?.offset_of(year)?;
        self.values.get(offset).copied()
    }

    /// Ordered `(year, value)` points.
    #[must_use]
    pub fn points(&self) -> Vec<SeriesPoint> {
        self.domain()
            .into_iter()
            .flat_map(|d| d.start..=d.end)
            .zip(self.values.iter())
            .map(|(year, &value)| SeriesPoint::new(year, value))
            .collect()
    }

    /// Last observation, if any.
    #[must_use]
    pub fn last(&self) -> Option<SeriesPoint> {
        let domain = self.domain()?;
        self.values
            .last()
            .map(|&value| SeriesPoint::new(domain.end, value))
    }

    fn restricted(&self, range: Option<YearRange>) -> Self {
        let bounds = range.and_then(|r| {
            let domain = self.domain()?;
            let r = domain.intersection(&r)?;
            Some((r.start, domain.offset_of(r.start)?, domain.offset_of(r.end)?))
        });
        match bounds {
            Some((start, from, to)) => Self {
                name: self.name.clone(),
                start,
                values: self.values[from..=to].to_vec(),
            },
            None => Self {
                name: self.name.clone(),
                start: self.start,
                values: Vec::new(),
            },
        }
    }
}

/// Named yearly series sharing one year domain.
///
/// Datasets with different domains (the 2000-2023 consumption history and
/// the 2010-2023 health series) are separate stores; a store refuses series
/// whose domain differs from the first one it was given.
///
/// # Examples
///
/// ```
/// use drom_indicators::{IndicatorSeries, IndicatorSeriesStore, YearRange};
///
/// let domain = YearRange::new(2021, 2023).unwrap();
/// let store = IndicatorSeriesStore::new(vec![
///     IndicatorSeries::from_column("smoking_prevalence", domain, vec![26.8, 26.4, 26.0]).unwrap(),
/// ])
/// .unwrap();
/// assert_eq!(store.get_value("smoking_prevalence", 2022).unwrap(), 26.4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeriesStore {
    domain: Option<YearRange>,
    series: BTreeMap<String, IndicatorSeries>,
}

impl IndicatorSeriesStore {
    /// Creates a store from fully-populated series.
    ///
    /// # Errors
    ///
    /// - `DuplicateSeries` if two series share a name
    /// - `DomainMismatch` if the series do not all cover the same years
    pub fn new(series: Vec<IndicatorSeries>) -> Result<Self, ValidationError> {
        let mut domain: Option<YearRange> = None;
        let mut by_name = BTreeMap::new();

        for s in series {
            let Some(own) = s.domain() else {
                return Err(ValidationError::EmptySeries { name: s.name });
            };
            match domain {
                None => domain = Some(own),
                Some(d) if d == own => {}
                Some(d) => {
                    return Err(ValidationError::DomainMismatch {
                        name: s.name,
                        start: d.start,
                        end: d.end,
                    });
                }
            }
            if by_name.contains_key(&s.name) {
                return Err(ValidationError::DuplicateSeries { name: s.name });
            }
            by_name.insert(s.name.clone(), s);
        }

        Ok(Self {
            domain,
            series: by_name,
        })
    }

    /// Creates a store from value columns aligned on `domain`.
    ///
    /// # Errors
    ///
    /// See [`IndicatorSeries::from_column`] and [`Self::new`].
    pub fn from_columns<N>(
        domain: YearRange,
        columns: impl IntoIterator<Item = (N, Vec<f64>)>,
    ) -> Result<Self, ValidationError>
    where
        N: Into<String>,
    {
        let series = columns
            .into_iter()
            .map(|(name, values)| IndicatorSeries::from_column(name, domain, values))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(series)
    }

    /// Year domain, or `None` when the store is empty.
    #[must_use]
    pub const fn domain(&self) -> Option<YearRange> {
        self.domain
    }

    /// Series names in lexical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// True when the store covers no years.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
    }

    /// Borrow a series by name.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownSeries` if `name` is not defined.
    pub fn series(&self, name: &str) -> Result<&IndicatorSeries, QueryError> {
        self.series.get(name).ok_or_else(|| QueryError::UnknownSeries {
            name: name.to_string(),
        })
    }

    /// Ordered `(year, value)` points of a series.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownSeries` if `name` is not defined.
    pub fn get_series(&self, name: &str) -> Result<Vec<SeriesPoint>, QueryError> {
        self.series(name).map(IndicatorSeries::points)
    }

    /// Value of a series for one year.
    ///
    /// # Errors
    ///
    /// - `UnknownSeries` if `name` is not defined
    /// - `YearOutOfRange` if `year` is outside the store domain
    pub fn get_value(&self, name: &str, year: i32) -> Result<f64, QueryError> {
        let series = self.series(name)?;
        series
            .value_at(year)
            .ok_or_else(|| QueryError::YearOutOfRange {
                year,
                domain: self
                    .domain
                    .map_or_else(|| "empty".to_string(), |d| d.to_string()),
            })
    }

    /// Difference `value(to) - value(from)` for one series.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_value`] for either year.
    pub fn change_between(&self, name: &str, from: i32, to: i32) -> Result<f64, QueryError> {
        Ok(self.get_value(name, to)? - self.get_value(name, from)?)
    }

    /// Restrict every series to `[start, end]`.
    ///
    /// A well-formed range that misses the domain entirely yields an empty
    /// store that still knows every series name.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidRange` if `start > end`.
    pub fn slice(&self, start: i32, end: i32) -> Result<Self, QueryError> {
        let requested = YearRange::new(start, end)?;
        let domain = self.domain.and_then(|d| d.intersection(&requested));

        tracing::debug!(
            target: "drom_indicators::store",
            requested = %requested,
            resolved = ?domain,
            "series.slice"
        );

        Ok(Self {
            domain,
            series: self
                .series
                .iter()
                .map(|(name, s)| (name.clone(), s.restricted(domain)))
                .collect(),
        })
    }

    /// Restrict the store to a caller range, or keep it whole for `None`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::slice`].
    pub fn slice_range(&self, range: Option<YearRange>) -> Result<Self, QueryError> {
        match range {
            Some(r) => self.slice(r.start, r.end),
            None => Ok(self.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prevalence_store() -> IndicatorSeriesStore {
        let domain = YearRange::new(2020, 2023).unwrap();
        IndicatorSeriesStore::from_columns(
            domain,
            [
                ("smoking_prevalence", vec![27.2, 26.8, 26.4, 26.0]),
                ("daily_smokers", vec![22.5, 22.2, 21.9, 21.6]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_points_rejects_gap() {
        let err = IndicatorSeries::from_points("x", [(2000, 1.0), (2002, 2.0)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonContiguousYears {
                name: "x".to_string(),
                previous: 2000,
                found: 2002,
            }
        );
    }

    #[test]
    fn test_from_points_rejects_duplicate_year() {
        let err = IndicatorSeries::from_points("x", [(2000, 1.0), (2000, 2.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::NonContiguousYears { .. }));
    }

    #[test]
    fn test_from_points_rejects_empty_and_nan() {
        let empty: Vec<(i32, f64)> = Vec::new();
        assert!(matches!(
            IndicatorSeries::from_points("x", empty),
            Err(ValidationError::EmptySeries { .. })
        ));
        assert!(matches!(
            IndicatorSeries::from_points("x", [(2000, f64::NAN)]),
            Err(ValidationError::NonFiniteValue { .. })
        ));
        assert!(matches!(
            IndicatorSeries::from_points("  ", [(2000, 1.0)]),
            Err(ValidationError::EmptySeriesName)
        ));
    }

    #[test]
    fn test_from_column_length_mismatch() {
        let domain = YearRange::new(2010, 2012).unwrap();
        let err = IndicatorSeries::from_column("x", domain, vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::SeriesLengthMismatch { expected: 3, actual: 2, .. }
        ));
    }

    #[test]
    fn test_store_rejects_mixed_domains() {
        let a = IndicatorSeries::from_points("a", [(2000, 1.0), (2001, 2.0)]).unwrap();
        let b = IndicatorSeries::from_points("b", [(2010, 1.0), (2011, 2.0)]).unwrap();
        let err = IndicatorSeriesStore::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, ValidationError::DomainMismatch { .. }));
    }

    #[test]
    fn test_store_rejects_duplicate_names() {
        let a = IndicatorSeries::from_points("a", [(2000, 1.0)]).unwrap();
        let err = IndicatorSeriesStore::new(vec![a.clone(), a]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateSeries { name: "a".to_string() });
    }

    #[test]
    fn test_get_series_and_value() {
        let store = prevalence_store();
        let points = store.get_series("smoking_prevalence").unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], SeriesPoint::new(2020, 27.2));
        assert_eq!(store.get_value("daily_smokers", 2023).unwrap(), 21.6);
    }

    #[test]
    fn test_unknown_series() {
        let store = prevalence_store();
        assert_eq!(
            store.get_series("nope").unwrap_err(),
            QueryError::UnknownSeries { name: "nope".to_string() }
        );
    }

    #[test]
    fn test_year_out_of_range() {
        let store = prevalence_store();
        let err = store.get_value("smoking_prevalence", 2019).unwrap_err();
        assert!(matches!(err, QueryError::YearOutOfRange { year: 2019, .. }));
    }

    #[test]
    fn test_slice_inside_domain() {
        let store = prevalence_store();
        let sliced = store.slice(2021, 2022).unwrap();
        assert_eq!(sliced.domain(), Some(YearRange::new(2021, 2022).unwrap()));
        assert_eq!(
            sliced.get_series("smoking_prevalence").unwrap(),
            vec![SeriesPoint::new(2021, 26.8), SeriesPoint::new(2022, 26.4)]
        );
        assert!(sliced.get_value("smoking_prevalence", 2020).is_err());
    }

    #[test]
    fn test_slice_partially_overlapping() {
        let store = prevalence_store();
        let sliced = store.slice(2015, 2021).unwrap();
        assert_eq!(sliced.domain(), Some(YearRange::new(2020, 2021).unwrap()));
        assert_eq!(sliced.get_value("daily_smokers", 2021).unwrap(), 22.2);
    }

    #[test]
    fn test_slice_outside_domain_is_empty() {
        let store = prevalence_store();
        let sliced = store.slice(1990, 1995).unwrap();
        assert!(sliced.is_empty());
        assert!(sliced.get_series("smoking_prevalence").unwrap().is_empty());
        assert!(matches!(
            sliced.get_value("smoking_prevalence", 1990),
            Err(QueryError::YearOutOfRange { .. })
        ));
    }

    #[test]
    fn test_slice_inverted_range() {
        let store = prevalence_store();
        assert_eq!(
            store.slice(2023, 2020).unwrap_err(),
            QueryError::InvalidRange { start: 2023, end: 2020 }
        );
    }

    #[test]
    fn test_change_between() {
        let store = prevalence_store();
        let delta = store.change_between("smoking_prevalence", 2020, 2023).unwrap();
        assert!((delta - (-1.2)).abs() < 1e-9);
    }

    #[test]
    fn test_last_point() {
        let store = prevalence_store();
        let last = store.series("smoking_prevalence").unwrap().last().unwrap();
        assert_eq!(last, SeriesPoint::new(2023, 26.0));
    }

    #[test]
    fn test_series_ending_at_last_representable_year() {
        let series =
            IndicatorSeries::from_points("x", [(i32::MAX - 1, 1.0), (i32::MAX, 2.0)]).unwrap();
        let store = IndicatorSeriesStore::new(vec![series]).unwrap();
        assert_eq!(
            store.domain(),
            Some(YearRange { start: i32::MAX - 1, end: i32::MAX })
        );
        assert_eq!(store.get_value("x", i32::MAX).unwrap(), 2.0);
        assert_eq!(
            store.get_series("x").unwrap(),
            vec![SeriesPoint::new(i32::MAX - 1, 1.0), SeriesPoint::new(i32::MAX, 2.0)]
        );
        assert_eq!(
            store.series("x").unwrap().last(),
            Some(SeriesPoint::new(i32::MAX, 2.0))
        );
        assert!(store.slice(i32::MAX, i32::MAX).unwrap().get_value("x", i32::MAX).is_ok());
    }

    #[test]
    fn test_single_point_at_last_representable_year() {
        let store = IndicatorSeriesStore::new(vec![
            IndicatorSeries::from_points("x", [(i32::MAX, 1.0)]).unwrap(),
        ])
        .unwrap();
        assert_eq!(store.get_series("x").unwrap().len(), 1);
    }
}
