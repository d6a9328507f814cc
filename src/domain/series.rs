//! Time series representation and input normalization.
//!
//! A [`Series`] is always ordered by strictly increasing date and holds only
//! finite values. Raw rows from a data source arrive as [`RawObservation`]s and
//! go through [`preprocess`] to become a `Series`.

use crate::domain::error::AnalyticsError;
use chrono::NaiveDate;
use std::collections::HashMap;

/// A single row as delivered by a data source. Missing cells are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<TimePoint>,
}

impl Series {
    /// Build a series from points that must already be ordered and finite.
    pub fn from_points(points: Vec<TimePoint>) -> Result<Self, AnalyticsError> {
        for (index, point) in points.iter().enumerate() {
            if !point.value.is_finite() {
                return Err(AnalyticsError::NonFiniteInput { index });
            }
            if index > 0 && points[index - 1].date >= point.date {
                return Err(AnalyticsError::DataSource {
                    reason: format!("dates not strictly increasing at index {}", index),
                });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }
}

/// Normalize raw rows into a [`Series`].
///
/// Duplicate dates keep the later row, rows are sorted by date, and everything
/// before the first finite value is trimmed. Fails with `InsufficientData` when
/// no finite value exists or fewer than `min_len` points survive the trim.
pub fn preprocess(raw: Vec<RawObservation>, min_len: usize) -> Result<Series, AnalyticsError> {
    let mut last_seen: HashMap<NaiveDate, usize> = HashMap::with_capacity(raw.len());
    for (i, obs) in raw.iter().enumerate() {
        last_seen.insert(obs.date, i);
    }

    let mut rows: Vec<RawObservation> = raw
        .iter()
        .enumerate()
        .filter(|(i, obs)| last_seen.get(&obs.date) == Some(i))
        .map(|(_, obs)| *obs)
        .collect();
    rows.sort_by_key(|obs| obs.date);

    let first_finite = rows
        .iter()
        .position(|obs| obs.value.is_finite())
        .ok_or(AnalyticsError::InsufficientData {
            have: 0,
            need: min_len.max(1),
        })?;

    let trimmed = &rows[first_finite..];
    if trimmed.len() < min_len {
        return Err(AnalyticsError::InsufficientData {
            have: trimmed.len(),
            need: min_len,
        });
    }

    let points = trimmed
        .iter()
        .map(|obs| TimePoint {
            date: obs.date,
            value: obs.value,
        })
        .collect();
    Series::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn obs(d: u32, value: f64) -> RawObservation {
        RawObservation {
            date: day(d),
            value,
        }
    }

    #[test]
    fn sorts_by_date() {
        let series = preprocess(vec![obs(3, 3.0), obs(1, 1.0), obs(2, 2.0)], 1).unwrap();
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.dates(), vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn duplicate_dates_keep_later_row() {
        let series = preprocess(vec![obs(1, 1.0), obs(2, 2.0), obs(1, 9.0)], 1).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), vec![9.0, 2.0]);
    }

    #[test]
    fn trims_leading_non_finite() {
        let series = preprocess(
            vec![obs(1, f64::NAN), obs(2, f64::INFINITY), obs(3, 5.0), obs(4, 6.0)],
            1,
        )
        .unwrap();
        assert_eq!(series.first().unwrap().date, day(3));
        assert_eq!(series.values(), vec![5.0, 6.0]);
    }

    #[test]
    fn all_non_finite_is_insufficient() {
        let err = preprocess(vec![obs(1, f64::NAN), obs(2, f64::NAN)], 1).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { have: 0, .. }));
    }

    #[test]
    fn empty_input_is_insufficient() {
        let err = preprocess(vec![], 0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }

    #[test]
    fn too_short_after_trim() {
        let err = preprocess(vec![obs(1, f64::NAN), obs(2, 1.0), obs(3, 2.0)], 5).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData { have: 2, need: 5 }
        ));
    }

    #[test]
    fn interior_gap_is_rejected() {
        let err = preprocess(vec![obs(1, 1.0), obs(2, f64::NAN), obs(3, 2.0)], 1).unwrap_err();
        assert!(matches!(err, AnalyticsError::NonFiniteInput { index: 1 }));
    }

    #[test]
    fn from_points_rejects_unordered_dates() {
        let points = vec![
            TimePoint {
                date: day(2),
                value: 1.0,
            },
            TimePoint {
                date: day(1),
                value: 2.0,
            },
        ];
        assert!(Series::from_points(points).is_err());
    }
}
