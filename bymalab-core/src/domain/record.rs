//! One cached row per ticker per trading date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily price record as stored in a ticker table.
///
/// Field names follow market terms; the cache columns keep the legacy
/// names (`start`, `max`, `min`, `volnom`, ... and `*_h` for adjusted).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    /// Nominal volume (shares traded).
    pub volnom: Option<f64>,
    /// Traded volume (currency amount).
    pub vol: Option<f64>,
    pub open_adj: Option<f64>,
    pub high_adj: Option<f64>,
    pub low_adj: Option<f64>,
    pub close_adj: Option<f64>,
    pub volnom_adj: Option<f64>,
    pub vol_adj: Option<f64>,
}

impl PriceRecord {
    /// A record carrying only a close value (FX series).
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: finite(close),
            ..Default::default()
        }
    }

    pub fn get(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volnom => self.volnom,
            PriceField::Vol => self.vol,
            PriceField::OpenAdj => self.open_adj,
            PriceField::HighAdj => self.high_adj,
            PriceField::LowAdj => self.low_adj,
            PriceField::CloseAdj => self.close_adj,
            PriceField::VolnomAdj => self.volnom_adj,
            PriceField::VolAdj => self.vol_adj,
        }
    }
}

/// Non-date columns of a ticker table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volnom,
    Vol,
    OpenAdj,
    HighAdj,
    LowAdj,
    CloseAdj,
    VolnomAdj,
    VolAdj,
}

impl PriceField {
    /// Column order of the cache schema (after `date`).
    pub const ALL: [PriceField; 12] = [
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volnom,
        PriceField::Vol,
        PriceField::Open,
        PriceField::OpenAdj,
        PriceField::HighAdj,
        PriceField::LowAdj,
        PriceField::VolnomAdj,
        PriceField::VolAdj,
        PriceField::CloseAdj,
    ];

    /// Column name in the cache schema.
    pub fn column(&self) -> &'static str {
        match self {
            PriceField::Open => "start",
            PriceField::High => "max",
            PriceField::Low => "min",
            PriceField::Close => "close",
            PriceField::Volnom => "volnom",
            PriceField::Vol => "vol",
            PriceField::OpenAdj => "start_h",
            PriceField::HighAdj => "max_h",
            PriceField::LowAdj => "min_h",
            PriceField::CloseAdj => "close_h",
            PriceField::VolnomAdj => "volnom_h",
            PriceField::VolAdj => "vol_h",
        }
    }
}

/// `None` for NaN and infinities.
pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_only_drops_non_finite() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(PriceRecord::close_only(d, 59.8).close, Some(59.8));
        assert_eq!(PriceRecord::close_only(d, f64::NAN).close, None);
        assert_eq!(PriceRecord::close_only(d, 1.0).high, None);
    }

    #[test]
    fn column_names_match_legacy_schema() {
        let cols: Vec<&str> = PriceField::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(
            cols,
            [
                "max", "min", "close", "volnom", "vol", "start", "start_h", "max_h", "min_h",
                "volnom_h", "vol_h", "close_h"
            ]
        );
    }
}
