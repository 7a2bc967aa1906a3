//! Local prices and their USD-normalized counterpart.

use crate::error::StatsError;
use crate::frame::PriceFrame;
use crate::series::DateSeries;
use bymalab_core::config::AnalysisConfig;
use bymalab_core::data::{CacheError, PriceCache};
use chrono::NaiveDate;
use tracing::warn;

/// Close (or adjusted close) of every ticker in `tickers`, aligned by date.
///
/// Excluded tickers are left out, and tickers whose table is missing or
/// unreadable are skipped, all with a warning. Crop rules blank a column up to and including their
/// date.
pub fn load_local_prices(
    cache: &PriceCache,
    tickers: &[String],
    start: NaiveDate,
    analysis: &AnalysisConfig,
) -> Result<PriceFrame, StatsError> {
    let excluded: Vec<&str> = tickers
        .iter()
        .filter(|t| is_excluded(t, analysis))
        .map(String::as_str)
        .collect();
    if !excluded.is_empty() {
        warn!(tickers = ?excluded, "excluding suspect tickers from the analysis");
    }

    let mut columns = Vec::with_capacity(tickers.len());
    for ticker in tickers.iter().filter(|t| !is_excluded(t, analysis)) {
        let table = match cache.get_prices(ticker, start, None) {
            Ok(t) => t,
            Err(e @ (CacheError::MissingTable { .. } | CacheError::Malformed { .. })) => {
                warn!(%ticker, error = %e, "skipping ticker");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let values = if analysis.adjusted {
            table.adj_closes()
        } else {
            table.closes()
        };
        let mut series = DateSeries::from(values);
        if let Some(rule) = analysis
            .crop
            .iter()
            .find(|r| r.ticker.eq_ignore_ascii_case(ticker))
        {
            series = crop(&series, rule.until);
        }
        columns.push((ticker.clone(), series));
    }
    Ok(PriceFrame::align(columns))
}

/// Divide every column by the rate at the same date. The result spans the
/// union of price and rate dates.
pub fn to_usd(prices: &PriceFrame, rate: &DateSeries) -> PriceFrame {
    let columns = prices
        .names
        .iter()
        .filter_map(|name| prices.series(name).map(|s| (name.clone(), s.div(rate))))
        .collect();
    PriceFrame::align(columns)
}

/// Blank values dated on or before `until`.
fn crop(series: &DateSeries, until: NaiveDate) -> DateSeries {
    series
        .iter()
        .map(|(d, v)| (d, if d <= until { f64::NAN } else { v }))
        .collect()
}

fn is_excluded(ticker: &str, analysis: &AnalysisConfig) -> bool {
    analysis
        .exclude
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ticker))
}
