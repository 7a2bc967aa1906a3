//! Official exchange-rate series from the BCRA (Argentine central bank).
//!
//! The "Comunicación A 3500" wholesale dollar is published as a legacy `.xls`
//! spreadsheet. The sheet layout is assumed stable: a header block ending at
//! row 4, then one row per business day with the date in column 2 and the
//! rate in column 3.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::config::HttpConfig;
use crate::domain::{PriceRecord, Ticker};
use calamine::{Data, Reader, Xls};
use chrono::{Duration, NaiveDate};
use std::io::Cursor;
use std::str::FromStr;
use tracing::{debug, info};

/// Last header row of the spreadsheet (0-based).
pub const HEADER_ROW: usize = 4;
pub const DATE_COLUMN: usize = 2;
pub const RATE_COLUMN: usize = 3;

/// FX series the BCRA adapter knows how to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxSource {
    A3500,
}

impl FxSource {
    pub const ALL: [FxSource; 1] = [FxSource::A3500];

    /// Ticker under which the series is cached.
    pub fn ticker(&self) -> &'static str {
        match self {
            FxSource::A3500 => "dolar_bcra_a3500",
        }
    }

    fn options() -> String {
        Self::ALL
            .iter()
            .map(|s| s.ticker())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for FxSource {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dolar_bcra_a3500" | "a3500" => Ok(FxSource::A3500),
            other => Err(DataError::UnknownSource {
                name: other.to_string(),
                options: Self::options(),
            }),
        }
    }
}

/// Downloads and parses the BCRA dollar spreadsheet.
pub struct BcraProvider {
    client: reqwest::blocking::Client,
    url: String,
}

impl BcraProvider {
    pub fn new(http: &HttpConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(http.timeout_secs))
            .user_agent(http.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            url: http.bcra_url.clone(),
        })
    }

    fn download(&self) -> Result<Vec<u8>, DataError> {
        info!(url = %self.url, "downloading A3500 data from bcra.gov.ar");
        let resp = self.client.get(&self.url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::Http {
                symbol: FxSource::A3500.ticker().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}

impl DataProvider for BcraProvider {
    fn name(&self) -> &str {
        "bcra"
    }

    fn fetch(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let source: FxSource = ticker.symbol.parse()?;
        let bytes = match source {
            FxSource::A3500 => self.download()?,
        };
        let records = parse_workbook(bytes, start, end)?;
        debug!(ticker = %ticker, rows = records.len(), "parsed FX rows");
        Ok(FetchResult {
            symbol: source.ticker().to_string(),
            records,
            source: DataSource::Bcra,
        })
    }
}

/// Parse an in-memory `.xls` workbook (first sheet) into close-only records.
pub fn parse_workbook(
    bytes: Vec<u8>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceRecord>, DataError> {
    let mut workbook: Xls<_> =
        Xls::new(Cursor::new(bytes)).map_err(|e| DataError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::Spreadsheet("workbook has no sheets".into()))?
        .map_err(|e| DataError::Spreadsheet(e.to_string()))?;

    // Ranges start at the first used cell; rebase to sheet coordinates.
    let (row0, col0) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let rows = range.rows().enumerate().map(|(i, cells)| {
        let cell = |col: usize| col.checked_sub(col0).and_then(|c| cells.get(c));
        (row0 + i, cell(DATE_COLUMN), cell(RATE_COLUMN))
    });

    Ok(parse_rows(rows, start, end))
}

/// Shape `(sheet_row, date_cell, rate_cell)` triples into records.
///
/// Header rows and rows without a parseable date or rate are dropped; the
/// result is restricted to `[start, end]` and sorted by date.
pub fn parse_rows<'a, I>(rows: I, start: NaiveDate, end: NaiveDate) -> Vec<PriceRecord>
where
    I: IntoIterator<Item = (usize, Option<&'a Data>, Option<&'a Data>)>,
{
    let mut records: Vec<PriceRecord> = rows
        .into_iter()
        .filter(|(row, _, _)| *row > HEADER_ROW)
        .filter_map(|(_, date, rate)| Some((cell_date(date?)?, cell_number(rate?)?)))
        .filter(|(date, _)| *date >= start && *date <= end)
        .map(|(date, rate)| PriceRecord::close_only(date, rate))
        .collect();
    records.sort_by_key(|r| r.date);
    records.dedup_by_key(|r| r.date);
    records
}

/// Excel day zero (serial 0) for the 1900 date system.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64))
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => serial_to_date(dt.as_f64()),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::DateTimeIso(s) => NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok(),
        Data::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%d/%m/%Y")
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .ok()
        }
        _ => None,
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    let v = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().replace(',', ".").parse().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sheet() -> Vec<(usize, Data, Data)> {
        vec![
            (0, Data::String("Tipo de Cambio".into()), Data::Empty),
            (4, Data::String("Fecha".into()), Data::String("Tipo de Cambio".into())),
            (5, Data::Float(43831.0), Data::Float(59.8283)),
            (6, Data::String("02/01/2020".into()), Data::String("59,90".into())),
            (7, Data::Float(43833.0), Data::Empty),
            (8, Data::Int(43836), Data::Float(60.01)),
        ]
    }

    fn parse(start: NaiveDate, end: NaiveDate) -> Vec<PriceRecord> {
        let rows = sheet();
        parse_rows(
            rows.iter().map(|(r, a, b)| (*r, Some(a), Some(b))),
            start,
            end,
        )
    }

    #[test]
    fn serial_dates_use_excel_epoch() {
        assert_eq!(serial_to_date(43831.0), Some(d(2020, 1, 1)));
        assert_eq!(serial_to_date(0.0), None);
    }

    #[test]
    fn parses_rows_and_drops_empty_rates() {
        let recs = parse(d(2000, 1, 1), d(2030, 1, 1));
        let dates: Vec<NaiveDate> = recs.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2020, 1, 1), d(2020, 1, 2), d(2020, 1, 6)]);
        assert_eq!(recs[0].close, Some(59.8283));
        assert_eq!(recs[1].close, Some(59.90));
        assert!(recs.iter().all(|r| r.high.is_none() && r.close_adj.is_none()));
    }

    #[test]
    fn range_is_inclusive() {
        let recs = parse(d(2020, 1, 2), d(2020, 1, 6));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].date, d(2020, 1, 2));
        assert_eq!(recs[1].date, d(2020, 1, 6));
    }

    #[test]
    fn unknown_source_is_a_usage_error() {
        let err = "dolar_blue".parse::<FxSource>().unwrap_err();
        assert!(matches!(err, DataError::UnknownSource { .. }));
        assert!(err.to_string().contains("dolar_bcra_a3500"));
        assert_eq!("DOLAR_BCRA_A3500".parse::<FxSource>().unwrap(), FxSource::A3500);
    }

    #[test]
    fn garbage_bytes_are_a_spreadsheet_error() {
        let err = parse_workbook(b"not a workbook".to_vec(), d(2020, 1, 1), d(2020, 12, 31))
            .unwrap_err();
        assert!(matches!(err, DataError::Spreadsheet(_)));
    }
}
