//! One analysis run: local prices, implied rate, USD frame and rankings.
//!
//! Derived series are recomputed from the cache on every run.

use crate::ccl::load_implied_rate;
use crate::error::StatsError;
use crate::frame::PriceFrame;
use crate::series::DateSeries;
use crate::since::{var_since, Ranking, SinceKind};
use crate::usd::{load_local_prices, to_usd};
use bymalab_core::config::{AnalysisConfig, Config};
use bymalab_core::data::PriceCache;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Analysis {
    /// Local-currency closes of the tracked local tickers.
    pub prices: PriceFrame,
    /// Implied CCL rate.
    pub rate: DateSeries,
    /// `prices` divided by `rate`.
    pub usd: PriceFrame,
    pub rankings: BTreeMap<SinceKind, Ranking>,
}

impl Analysis {
    /// Load everything from the cache and compute all three rankings.
    pub fn build(cache: &PriceCache, config: &Config) -> Result<Self, StatsError> {
        let start = config.history.equity_start;
        let prices = load_local_prices(cache, &config.universe.local, start, &config.analysis)?;
        let rate = load_implied_rate(cache, &config.ccl, start)?;
        let analysis = Self::from_parts(prices, rate, &config.analysis)?;
        info!(
            tickers = analysis.usd.width(),
            rows = analysis.usd.height(),
            "analysis ready"
        );
        Ok(analysis)
    }

    /// Compute the USD frame and rankings from already-loaded series.
    pub fn from_parts(
        prices: PriceFrame,
        rate: DateSeries,
        analysis: &AnalysisConfig,
    ) -> Result<Self, StatsError> {
        let usd = to_usd(&prices, &rate);
        let mut rankings = BTreeMap::new();
        for kind in SinceKind::ALL {
            let ranking = var_since(&usd, kind, analysis.since, analysis.reference_date)?;
            rankings.insert(kind, ranking);
        }
        Ok(Self {
            prices,
            rate,
            usd,
            rankings,
        })
    }

    pub fn ranking(&self, kind: SinceKind) -> Option<&Ranking> {
        self.rankings.get(&kind)
    }
}
