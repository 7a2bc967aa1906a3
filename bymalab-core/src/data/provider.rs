//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the two external sources (Yahoo
//! Finance for equities, the BCRA spreadsheet for the official dollar) so the
//! updater can pick one per category and tests can swap in mocks.

use crate::domain::{finite, PriceRecord, Ticker, TickerError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily OHLCV bar from a price provider, before it is shaped into a
/// cache record. Missing values are NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl From<RawBar> for PriceRecord {
    /// Yahoo rows fill the raw OHLC, the nominal volume and the adjusted
    /// close; traded volume and the other adjusted columns stay empty.
    fn from(bar: RawBar) -> Self {
        PriceRecord {
            date: bar.date,
            open: finite(bar.open),
            high: finite(bar.high),
            low: finite(bar.low),
            close: finite(bar.close),
            volnom: Some(bar.volume as f64),
            vol: None,
            close_adj: finite(bar.adj_close),
            ..Default::default()
        }
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} for {symbol}")]
    Http { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("unknown FX source '{name}' (options: {options})")]
    UnknownSource { name: String, options: String },

    #[error("category error: {0}")]
    Category(#[from] TickerError),

    #[error("data error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        DataError::Network(e.to_string())
    }
}

/// Result of a successful fetch for a single ticker.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub records: Vec<PriceRecord>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Bcra,
    Mock,
}

/// Trait for data providers.
///
/// Providers only fetch and shape rows; the cache layer sits above this
/// trait and providers don't know about it.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily records for a ticker over `[start, end]`.
    fn fetch(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_bar_maps_onto_legacy_columns() {
        let bar = RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 102.0,
            low: 99.0,
            close: 101.0,
            volume: 1000,
            adj_close: f64::NAN,
        };
        let rec = PriceRecord::from(bar);
        assert_eq!(rec.open, Some(100.0));
        assert_eq!(rec.high, Some(102.0));
        assert_eq!(rec.volnom, Some(1000.0));
        assert_eq!(rec.vol, None);
        assert_eq!(rec.close_adj, None);
        assert_eq!(rec.open_adj, None);
    }
}
