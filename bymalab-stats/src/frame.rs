//! Multi-ticker time alignment.
//!
//! Columns are aligned to the union of their dates. A ticker without a row
//! on some date gets strict NaN there (no forward-fill of price data).

use crate::series::DateSeries;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Named columns on a common date axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFrame {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Column names, in insertion order.
    pub names: Vec<String>,
    /// One vector per column, each the same length as `dates`.
    pub columns: Vec<Vec<f64>>,
}

impl PriceFrame {
    /// Align named series on the union of their dates.
    pub fn align(series: Vec<(String, DateSeries)>) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, s)| s.dates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut names = Vec::with_capacity(series.len());
        let mut columns = Vec::with_capacity(series.len());
        for (name, s) in series {
            columns.push(dates.iter().map(|d| s.get(*d)).collect());
            names.push(name);
        }
        Self {
            dates,
            names,
            columns,
        }
    }

    pub fn height(&self) -> usize {
        self.dates.len()
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// One column back as a series.
    pub fn series(&self, name: &str) -> Option<DateSeries> {
        self.column(name)
            .map(|col| self.dates.iter().copied().zip(col.iter().copied()).collect())
    }

    /// Values of row `i` across all columns.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[i]).collect()
    }

    /// True when row `i` has no NaN.
    pub fn is_complete(&self, i: usize) -> bool {
        self.columns.iter().all(|c| !c[i].is_nan())
    }

    /// Rows dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        let from = self.dates.partition_point(|d| *d < start);
        Self {
            dates: self.dates[from..].to_vec(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[from..].to_vec()).collect(),
        }
    }

    /// Index of the first complete row dated on or after `date`.
    pub fn first_complete_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let from = self.dates.partition_point(|d| *d < date);
        (from..self.height()).find(|i| self.is_complete(*i))
    }

    /// Index of the latest complete row.
    pub fn last_complete(&self) -> Option<usize> {
        (0..self.height()).rev().find(|i| self.is_complete(*i))
    }

    /// Apply `f` to every value of every column.
    pub fn map_columns(&self, mut f: impl FnMut(usize, f64) -> f64) -> Self {
        Self {
            dates: self.dates.clone(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .enumerate()
                .map(|(j, c)| c.iter().map(|v| f(j, *v)).collect())
                .collect(),
        }
    }

    /// Per-column maximum, skipping NaN. NaN for an all-missing column.
    pub fn column_max(&self) -> Vec<f64> {
        self.columns
            .iter()
            .map(|c| finite(c).reduce(f64::max).unwrap_or(f64::NAN))
            .collect()
    }

    /// Per-column minimum, skipping NaN. NaN for an all-missing column.
    pub fn column_min(&self) -> Vec<f64> {
        self.columns
            .iter()
            .map(|c| finite(c).reduce(f64::min).unwrap_or(f64::NAN))
            .collect()
    }

    /// Remove a column, returning whether it was present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(i) => {
                self.names.remove(i);
                self.columns.remove(i);
                true
            }
            None => false,
        }
    }
}

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}
