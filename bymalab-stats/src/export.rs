//! CSV and Parquet export of price tables and derived series.
//!
//! - **CSV**: rankings, aligned frames, single series, price tables and
//!   equity history
//! - **Parquet**: price tables, via polars
//!
//! Missing values are written as empty CSV fields.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bymalab_core::data::PriceTable;
use bymalab_core::domain::PriceField;
use polars::prelude::*;

use crate::equity::EquityHistory;
use crate::frame::PriceFrame;
use crate::series::DateSeries;
use crate::since::Ranking;

// ─── CSV export ─────────────────────────────────────────────────────

/// Ranking as `ticker,<kind>` rows in ranking order.
pub fn export_ranking_csv(ranking: &Ranking) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", ranking.kind.as_str()])?;
    for (ticker, value) in &ranking.entries {
        wtr.write_record([ticker.clone(), fmt_value(*value)])?;
    }
    finish(wtr)
}

/// Aligned frame with a `date` column followed by one column per ticker.
pub fn export_frame_csv(frame: &PriceFrame) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date".to_string()];
    header.extend(frame.names.iter().cloned());
    wtr.write_record(&header)?;
    for (i, date) in frame.dates.iter().enumerate() {
        let mut row = vec![date.to_string()];
        row.extend(frame.row(i).into_iter().map(fmt_value));
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

pub fn export_series_csv(series: &DateSeries, name: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", name])?;
    for (date, value) in series.iter() {
        wtr.write_record([date.to_string(), fmt_value(value)])?;
    }
    finish(wtr)
}

/// Price table with the cache column names.
pub fn export_prices_csv(table: &PriceTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date"];
    header.extend(PriceField::ALL.iter().map(|f| f.column()));
    wtr.write_record(&header)?;
    for r in &table.rows {
        let mut row = vec![r.date.to_string()];
        row.extend(
            PriceField::ALL
                .iter()
                .map(|f| r.get(*f).map(fmt_value).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

pub fn export_equity_csv(history: &EquityHistory) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "year", "capital", "mean", "min", "max", "mean_adj", "min_adj", "max_adj",
    ])?;
    for y in &history.years {
        wtr.write_record([
            y.year.to_string(),
            fmt_value(y.capital),
            fmt_value(y.mean),
            fmt_value(y.min),
            fmt_value(y.max),
            fmt_value(y.mean_adj),
            fmt_value(y.min_adj),
            fmt_value(y.max_adj),
        ])?;
    }
    finish(wtr)
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write `content` to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    create_parent(path)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Write a price table as Parquet.
pub fn write_prices_parquet(table: &PriceTable, path: &Path) -> Result<()> {
    let mut df = table
        .to_dataframe()
        .with_context(|| format!("failed to build frame for {}", table.ticker))?;
    create_parent(path)?;
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("failed to write parquet {}", path.display()))?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir: {}", parent.display()))?;
    }
    Ok(())
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{v:.6}")
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::since::SinceKind;
    use bymalab_core::domain::PriceRecord;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn ranking_csv_keeps_order() {
        let r = Ranking {
            kind: SinceKind::Max,
            date: d(2),
            entries: vec![("GGAL".into(), -75.0), ("BMA".into(), -7.5)],
        };
        let csv = export_ranking_csv(&r).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ticker,max");
        assert_eq!(lines[1], "GGAL,-75.000000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn frame_csv_leaves_missing_empty() {
        let f = PriceFrame::align(vec![
            ("A".into(), [(d(2), 1.0), (d(3), 2.0)].into_iter().collect()),
            ("B".into(), [(d(3), 3.0)].into_iter().collect()),
        ]);
        let csv = export_frame_csv(&f).unwrap();
        assert_eq!(csv.lines().next(), Some("date,A,B"));
        assert_eq!(csv.lines().nth(1), Some("2024-01-02,1.000000,"));
    }

    #[test]
    fn prices_csv_has_cache_columns() {
        let t = PriceTable::new("GGAL", vec![PriceRecord::close_only(d(2), 10.0)]);
        let csv = export_prices_csv(&t).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("date,max,min,close"));
        assert!(header.ends_with("close_h"));
        assert_eq!(csv.lines().nth(1).unwrap().split(',').count(), 13);
    }

    #[test]
    fn parquet_written_to_new_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ggal.parquet");
        let t = PriceTable::new("GGAL", vec![PriceRecord::close_only(d(2), 10.0)]);
        write_prices_parquet(&t, &path).unwrap();
        assert!(path.exists());

        let csv_path = dir.path().join("csv").join("ggal.csv");
        write_output(&csv_path, &export_prices_csv(&t).unwrap()).unwrap();
        assert!(fs::read_to_string(csv_path).unwrap().contains("2024-01-02"));
    }
}
