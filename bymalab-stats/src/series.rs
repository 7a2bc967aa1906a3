//! Date-indexed numeric series.
//!
//! Missing observations are strict NaN, the same convention used for
//! aligned frames. Aggregates skip NaN.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// A series keyed by date, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateSeries {
    values: BTreeMap<NaiveDate, f64>,
}

/// Mean, minimum and maximum of one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl DateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        self.values.insert(date, value);
    }

    /// Value at `date`; NaN when absent.
    pub fn get(&self, date: NaiveDate) -> f64 {
        self.values.get(&date).copied().unwrap_or(f64::NAN)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.values.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.values.keys().next_back().copied()
    }

    /// Last finite value.
    pub fn last_valid(&self) -> Option<(NaiveDate, f64)> {
        self.values
            .iter()
            .rev()
            .find(|(_, v)| v.is_finite())
            .map(|(d, v)| (*d, *v))
    }

    /// Element-wise `self / other` over the union of both date sets.
    /// Missing on either side, or a non-finite quotient, gives NaN.
    pub fn div(&self, other: &DateSeries) -> DateSeries {
        let mut out = BTreeMap::new();
        for date in self.values.keys().chain(other.values.keys()) {
            out.entry(*date).or_insert_with(|| {
                let q = self.get(*date) / other.get(*date);
                if q.is_finite() {
                    q
                } else {
                    f64::NAN
                }
            });
        }
        DateSeries { values: out }
    }

    /// Replace NaN with the last finite value seen. Leading NaN stays.
    pub fn ffill(&self) -> DateSeries {
        let mut last = f64::NAN;
        let values = self
            .values
            .iter()
            .map(|(d, v)| {
                if v.is_finite() {
                    last = *v;
                }
                (*d, last)
            })
            .collect();
        DateSeries { values }
    }

    /// Drop NaN entries.
    pub fn dropna(&self) -> DateSeries {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| (*d, *v))
            .collect()
    }

    /// Entries on or after `start`.
    pub fn since(&self, start: NaiveDate) -> DateSeries {
        self.values
            .range(start..)
            .map(|(d, v)| (*d, *v))
            .collect()
    }

    /// Multiply every value by `factor`.
    pub fn scale(&self, factor: f64) -> DateSeries {
        self.values.iter().map(|(d, v)| (*d, v * factor)).collect()
    }

    pub fn max(&self) -> Option<f64> {
        self.finite().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.finite().reduce(f64::min)
    }

    /// Per-year mean/min/max of the finite values. Years with no finite
    /// value are omitted.
    pub fn resample_yearly(&self) -> BTreeMap<i32, YearStats> {
        let mut acc: BTreeMap<i32, (f64, f64, f64, usize)> = BTreeMap::new();
        for (date, v) in self.values.iter().filter(|(_, v)| v.is_finite()) {
            let e = acc
                .entry(date.year())
                .or_insert((0.0, f64::INFINITY, f64::NEG_INFINITY, 0));
            e.0 += v;
            e.1 = e.1.min(*v);
            e.2 = e.2.max(*v);
            e.3 += 1;
        }
        acc.into_iter()
            .map(|(year, (sum, min, max, count))| {
                (
                    year,
                    YearStats {
                        mean: sum / count as f64,
                        min,
                        max,
                        count,
                    },
                )
            })
            .collect()
    }

    fn finite(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied().filter(|v| v.is_finite())
    }
}

impl FromIterator<(NaiveDate, f64)> for DateSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        DateSeries {
            values: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<NaiveDate, f64>> for DateSeries {
    fn from(values: BTreeMap<NaiveDate, f64>) -> Self {
        DateSeries { values }
    }
}
