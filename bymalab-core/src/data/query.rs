//! Query results: a ticker's price history as a date-ordered table.

use crate::domain::{PriceField, PriceRecord};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Rows of one ticker table, sorted by date ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub ticker: String,
    pub rows: Vec<PriceRecord>,
}

impl PriceTable {
    pub fn new(ticker: impl Into<String>, rows: Vec<PriceRecord>) -> Self {
        Self {
            ticker: ticker.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Date-indexed view of the rows.
    pub fn by_date(&self) -> BTreeMap<NaiveDate, &PriceRecord> {
        self.rows.iter().map(|r| (r.date, r)).collect()
    }

    /// Non-null values of one column, keyed by date.
    pub fn column(&self, field: PriceField) -> BTreeMap<NaiveDate, f64> {
        self.rows
            .iter()
            .filter_map(|r| r.get(field).map(|v| (r.date, v)))
            .collect()
    }

    pub fn closes(&self) -> BTreeMap<NaiveDate, f64> {
        self.column(PriceField::Close)
    }

    pub fn adj_closes(&self) -> BTreeMap<NaiveDate, f64> {
        self.column(PriceField::CloseAdj)
    }

    /// Convert to a polars DataFrame with the cache column names.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let dates: Vec<i32> = self
            .rows
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect();

        let mut columns = vec![Column::new("date".into(), dates).cast(&DataType::Date)?];
        for field in PriceField::ALL {
            let values: Vec<Option<f64>> = self.rows.iter().map(|r| r.get(field)).collect();
            columns.push(Column::new(field.column().into(), values));
        }
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriceTable {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        PriceTable::new(
            "GGAL",
            vec![
                PriceRecord {
                    date: d(2),
                    close: Some(10.0),
                    close_adj: Some(9.0),
                    ..Default::default()
                },
                PriceRecord {
                    date: d(3),
                    close: None,
                    close_adj: Some(9.5),
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn column_skips_nulls() {
        let t = table();
        assert_eq!(t.closes().len(), 1);
        assert_eq!(t.adj_closes().len(), 2);
        assert_eq!(t.by_date().len(), 2);
        assert_eq!(t.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn dataframe_has_legacy_columns() {
        let df = table().to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 13);
        assert!(df.column("close_h").is_ok());
        assert_eq!(df.column("close").unwrap().null_count(), 1);
    }
}
