//! Percent change since a reference point: `100 * (S / R - 1)`.

use crate::error::StatsError;
use crate::frame::PriceFrame;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which reference point a ranking is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinceKind {
    /// Column maximum over the window.
    Max,
    /// Column minimum over the window.
    Min,
    /// First complete row on or after the reference date.
    Reference,
}

impl SinceKind {
    pub const ALL: [SinceKind; 3] = [SinceKind::Max, SinceKind::Min, SinceKind::Reference];

    pub fn as_str(&self) -> &'static str {
        match self {
            SinceKind::Max => "max",
            SinceKind::Min => "min",
            SinceKind::Reference => "ref",
        }
    }

    /// Parse a metric name, also accepting the configured reference label.
    pub fn parse(name: &str, reference_label: &str) -> Result<Self, StatsError> {
        if !reference_label.is_empty() && name.eq_ignore_ascii_case(reference_label) {
            return Ok(SinceKind::Reference);
        }
        name.parse().map_err(|_| StatsError::UnknownKind {
            name: name.to_string(),
            label: if reference_label.is_empty() {
                "ref".to_string()
            } else {
                reference_label.to_string()
            },
        })
    }
}

impl fmt::Display for SinceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinceKind {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" => Ok(SinceKind::Max),
            "min" => Ok(SinceKind::Min),
            "ref" | "reference" | "paso" => Ok(SinceKind::Reference),
            _ => Err(StatsError::UnknownKind {
                name: s.to_string(),
                label: "ref".to_string(),
            }),
        }
    }
}

/// Latest percent change per ticker, sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub kind: SinceKind,
    /// Date of the row the values were taken from.
    pub date: NaiveDate,
    pub entries: Vec<(String, f64)>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, v)| *v)
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }
}

/// Percent change of every column relative to `kind`'s reference point.
///
/// The frame is first restricted to dates `>= since`. Rows with any missing
/// value are dropped and the latest remaining row is ranked.
pub fn var_since(
    usd: &PriceFrame,
    kind: SinceKind,
    since: NaiveDate,
    reference_date: NaiveDate,
) -> Result<Ranking, StatsError> {
    let window = usd.since(since);
    let reference = match kind {
        SinceKind::Max => window.column_max(),
        SinceKind::Min => window.column_min(),
        SinceKind::Reference => {
            let i = window
                .first_complete_on_or_after(reference_date)
                .ok_or(StatsError::NoCompleteRows { kind })?;
            window.row(i)
        }
    };

    let change = window.map_columns(|j, v| 100.0 * (v / reference[j] - 1.0));
    let last = change
        .last_complete()
        .ok_or(StatsError::NoCompleteRows { kind })?;

    let mut entries: Vec<(String, f64)> = change
        .names
        .iter()
        .cloned()
        .zip(change.row(last))
        .collect();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));

    Ok(Ranking {
        kind,
        date: change.dates[last],
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::DateSeries;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn col(values: &[(NaiveDate, f64)]) -> DateSeries {
        values.iter().copied().collect()
    }

    fn frame() -> PriceFrame {
        PriceFrame::align(vec![
            (
                "GGAL".into(),
                col(&[
                    (d(2016, 6, 1), 50.0),
                    (d(2018, 1, 2), 20.0),
                    (d(2019, 8, 12), 10.0),
                    (d(2020, 1, 2), 5.0),
                ]),
            ),
            (
                "BMA".into(),
                col(&[
                    (d(2018, 1, 2), 10.0),
                    (d(2019, 8, 12), 8.0),
                    (d(2020, 1, 2), 12.0),
                    (d(2020, 1, 3), 13.0),
                ]),
            ),
        ])
    }

    #[test]
    fn since_max_uses_window_maximum() {
        let r = var_since(&frame(), SinceKind::Max, d(2017, 1, 1), d(2019, 8, 11)).unwrap();
        // the 2016 peak falls outside the window
        assert_eq!(r.get("GGAL"), Some(-75.0));
        assert!((r.get("BMA").unwrap() - 100.0 * (12.0 / 13.0 - 1.0)).abs() < 1e-12);
        assert_eq!(r.date, d(2020, 1, 2));
        assert_eq!(r.entries[0].0, "GGAL");
    }

    #[test]
    fn since_min_is_non_negative() {
        let r = var_since(&frame(), SinceKind::Min, d(2017, 1, 1), d(2019, 8, 11)).unwrap();
        assert_eq!(r.get("GGAL"), Some(0.0));
        assert_eq!(r.get("BMA"), Some(50.0));
    }

    #[test]
    fn reference_uses_first_complete_row_after_date() {
        let r = var_since(
            &frame(),
            SinceKind::Reference,
            d(2017, 1, 1),
            d(2019, 8, 11),
        )
        .unwrap();
        assert_eq!(r.get("GGAL"), Some(-50.0));
        assert_eq!(r.get("BMA"), Some(50.0));
        assert_eq!(r.values(), vec![-50.0, 50.0]);
    }

    #[test]
    fn no_complete_rows_is_an_error() {
        let f = PriceFrame::align(vec![
            ("A".into(), col(&[(d(2020, 1, 1), 1.0)])),
            ("B".into(), col(&[(d(2020, 1, 2), 1.0)])),
        ]);
        let err = var_since(&f, SinceKind::Max, d(2017, 1, 1), d(2019, 8, 11)).unwrap_err();
        assert!(matches!(
            err,
            StatsError::NoCompleteRows {
                kind: SinceKind::Max
            }
        ));
        assert!(var_since(&f, SinceKind::Reference, d(2017, 1, 1), d(2019, 8, 11)).is_err());
    }

    #[test]
    fn kind_names() {
        assert_eq!("MAX".parse::<SinceKind>().unwrap(), SinceKind::Max);
        assert_eq!("paso".parse::<SinceKind>().unwrap(), SinceKind::Reference);
        assert_eq!(
            SinceKind::parse("elecciones", "elecciones").unwrap(),
            SinceKind::Reference
        );
        assert!(matches!(
            SinceKind::parse("median", "paso"),
            Err(StatsError::UnknownKind { .. })
        ));
    }
}
