//! Market value of a company's whole equity, in USD, per year.
//!
//! Yearly mean/min/max of `close / rate` (and of the adjusted close) are
//! multiplied by the share capital of that year, in millions.

use crate::error::StatsError;
use crate::series::{DateSeries, YearStats};
use bymalab_core::data::PriceTable;
use serde::Serialize;
use std::collections::BTreeMap;

/// BBAR share capital (millions of shares) per year.
pub const BBAR_CAPITAL: [(i32, f64); 28] = [
    (1993, 92.959),
    (1994, 111.499),
    (1995, 111.499),
    (1996, 147.454),
    (1997, 147.454),
    (1998, 186.631),
    (1999, 209.631),
    (2000, 209.631),
    (2001, 209.361),
    (2002, 209.631),
    (2003, 209.361),
    (2004, 364.631),
    (2005, 471.361),
    (2006, 471.361),
    (2007, 471.361),
    (2008, 471.361),
    (2009, 536.36),
    (2010, 536.36),
    (2011, 536.878),
    (2012, 536.878),
    (2013, 536.878),
    (2014, 536.878),
    (2015, 536.878),
    (2016, 536.878),
    (2017, 612.659),
    (2018, 612.659),
    (2019, 612.659),
    (2020, 612.659),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityYear {
    pub year: i32,
    pub capital: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Adjusted-close variants; NaN when that year has no adjusted data.
    pub mean_adj: f64,
    pub min_adj: f64,
    pub max_adj: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityHistory {
    pub ticker: String,
    pub years: Vec<EquityYear>,
}

/// Share capital per year for `ticker`. Configured figures win over the
/// built-in table; unknown tickers get an empty table.
pub fn capital_table(
    ticker: &str,
    configured: &BTreeMap<String, BTreeMap<String, f64>>,
) -> BTreeMap<i32, f64> {
    if let Some((_, years)) = configured
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(ticker))
    {
        return years
            .iter()
            .filter_map(|(y, cap)| y.parse().ok().map(|y| (y, *cap)))
            .collect();
    }
    if ticker.eq_ignore_ascii_case("BBAR") {
        return BBAR_CAPITAL.into_iter().collect();
    }
    BTreeMap::new()
}

/// Yearly equity value for one ticker. Years without a capital figure or
/// without any USD close are omitted.
pub fn equity_history(
    prices: &PriceTable,
    rate: &DateSeries,
    capital: &BTreeMap<i32, f64>,
) -> Result<EquityHistory, StatsError> {
    if capital.is_empty() {
        return Err(StatsError::NoCapital {
            ticker: prices.ticker.clone(),
        });
    }
    let close = yearly_usd(prices.closes().into(), rate);
    let adj = yearly_usd(prices.adj_closes().into(), rate);

    let years = capital
        .iter()
        .filter_map(|(year, cap)| {
            let c = close.get(year)?;
            let a = adj.get(year);
            Some(EquityYear {
                year: *year,
                capital: *cap,
                mean: c.mean * cap,
                min: c.min * cap,
                max: c.max * cap,
                mean_adj: a.map_or(f64::NAN, |a| a.mean * cap),
                min_adj: a.map_or(f64::NAN, |a| a.min * cap),
                max_adj: a.map_or(f64::NAN, |a| a.max * cap),
            })
        })
        .collect();

    Ok(EquityHistory {
        ticker: prices.ticker.clone(),
        years,
    })
}

fn yearly_usd(local: DateSeries, rate: &DateSeries) -> BTreeMap<i32, YearStats> {
    local.div(rate).dropna().resample_yearly()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bymalab_core::domain::PriceRecord;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn builtin_and_configured_capital() {
        let none = BTreeMap::new();
        let bbar = capital_table("bbar", &none);
        assert_eq!(bbar.len(), 28);
        assert_eq!(bbar[&1993], 92.959);
        assert_eq!(bbar[&2020], 612.659);
        assert!(capital_table("GGAL", &none).is_empty());

        let mut configured = BTreeMap::new();
        configured.insert(
            "GGAL".to_string(),
            BTreeMap::from([("2019".to_string(), 1426.0)]),
        );
        assert_eq!(capital_table("ggal", &configured)[&2019], 1426.0);
    }

    #[test]
    fn yearly_values_scale_by_capital() {
        let prices = PriceTable::new(
            "BBAR",
            vec![
                PriceRecord {
                    date: d(2019, 3, 1),
                    close: Some(200.0),
                    close_adj: Some(100.0),
                    ..Default::default()
                },
                PriceRecord {
                    date: d(2019, 9, 1),
                    close: Some(400.0),
                    ..Default::default()
                },
                PriceRecord::close_only(d(2021, 1, 4), 500.0),
            ],
        );
        let rate: DateSeries = [
            (d(2019, 3, 1), 20.0),
            (d(2019, 9, 1), 40.0),
            (d(2021, 1, 4), 50.0),
        ]
        .into_iter()
        .collect();
        let capital = BTreeMap::from([(2019, 2.0), (2020, 3.0)]);

        let h = equity_history(&prices, &rate, &capital).unwrap();
        // 2020 has no prices, 2021 no capital figure
        assert_eq!(h.years.len(), 1);
        let y = h.years[0];
        assert_eq!(y.mean, 20.0);
        assert_eq!(y.min, 20.0);
        assert_eq!(y.max, 20.0);
        assert_eq!(y.mean_adj, 10.0);
    }

    #[test]
    fn unknown_ticker_without_capital_is_an_error() {
        let prices = PriceTable::new("GGAL", vec![]);
        let err = equity_history(&prices, &DateSeries::new(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, StatsError::NoCapital { .. }));
    }
}
