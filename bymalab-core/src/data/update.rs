//! Update orchestrator: brings every tracked category up to date.
//!
//! Per category: find the earliest "last stored date" across its tickers,
//! fetch from the day after, and upsert. A ticker whose table is missing or
//! whose fetch fails is logged and recorded in the report; it never aborts
//! the rest of the batch.

use super::cache::{PriceCache, UpsertSummary};
use super::provider::DataProvider;
use super::universe::Universe;
use crate::config::HistoryConfig;
use crate::domain::{Category, Ticker};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

/// What happened to one ticker during an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TickerOutcome {
    Updated(UpsertSummary),
    /// The category start is after the end date; nothing was fetched.
    UpToDate,
    /// The cache could not open or create the ticker's table.
    SkippedMissing(String),
    FetchFailed(String),
}

impl TickerOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TickerOutcome::SkippedMissing(_) | TickerOutcome::FetchFailed(_)
        )
    }
}

/// Report for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Tables that were missing or unreadable during start detection.
    pub missing_tables: Vec<String>,
    pub outcomes: Vec<(String, TickerOutcome)>,
}

/// Report for a whole update run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub categories: Vec<CategoryReport>,
}

impl UpdateReport {
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &TickerOutcome)> {
        self.categories
            .iter()
            .flat_map(|c| c.outcomes.iter().map(|(s, o)| (s.as_str(), o)))
    }

    pub fn outcome(&self, symbol: &str) -> Option<&TickerOutcome> {
        self.outcomes().find(|(s, _)| *s == symbol).map(|(_, o)| o)
    }

    pub fn updated(&self) -> usize {
        self.outcomes()
            .filter(|(_, o)| matches!(o, TickerOutcome::Updated(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Summed upsert counters across tickers.
    pub fn rows(&self) -> UpsertSummary {
        self.outcomes().fold(UpsertSummary::default(), |mut acc, (_, o)| {
            if let TickerOutcome::Updated(s) = o {
                acc.inserted += s.inserted;
                acc.updated += s.updated;
                acc.failed += s.failed;
            }
            acc
        })
    }
}

/// Progress callback for update runs.
pub trait UpdateProgress {
    fn on_category(&self, category: Category, start: NaiveDate, end: NaiveDate, tickers: usize);

    fn on_ticker(&self, symbol: &str, index: usize, total: usize, outcome: &TickerOutcome);

    fn on_complete(&self, report: &UpdateReport);
}

/// Prints progress to stdout.
pub struct StdoutProgress;

impl UpdateProgress for StdoutProgress {
    fn on_category(&self, category: Category, start: NaiveDate, end: NaiveDate, tickers: usize) {
        println!("Updating {category} ({tickers} tickers) from {start} to {end}");
    }

    fn on_ticker(&self, symbol: &str, index: usize, total: usize, outcome: &TickerOutcome) {
        let n = index + 1;
        match outcome {
            TickerOutcome::Updated(s) => println!(
                "  [{n}/{total}] {symbol}: {} inserted, {} updated, {} failed",
                s.inserted, s.updated, s.failed
            ),
            TickerOutcome::UpToDate => println!("  [{n}/{total}] {symbol}: up to date"),
            TickerOutcome::SkippedMissing(why) => {
                println!("  [{n}/{total}] {symbol}: SKIPPED ({why})")
            }
            TickerOutcome::FetchFailed(why) => println!("  [{n}/{total}] {symbol}: FAIL ({why})"),
        }
    }

    fn on_complete(&self, report: &UpdateReport) {
        let rows = report.rows();
        println!(
            "\nUpdate complete: {} tickers updated, {} failed; {} rows inserted, {} updated",
            report.updated(),
            report.failed(),
            rows.inserted,
            rows.updated
        );
    }
}

/// Reports nothing.
pub struct SilentProgress;

impl UpdateProgress for SilentProgress {
    fn on_category(&self, _: Category, _: NaiveDate, _: NaiveDate, _: usize) {}
    fn on_ticker(&self, _: &str, _: usize, _: usize, _: &TickerOutcome) {}
    fn on_complete(&self, _: &UpdateReport) {}
}

/// First date to fetch when a category has no usable history.
pub fn full_history_start(history: &HistoryConfig, category: Category) -> NaiveDate {
    match category {
        Category::Local | Category::LocalUsdListed => history.equity_start,
        Category::FxRate => history.fx_start,
    }
}

/// Drives fetch → upsert for each tracked category.
pub struct Updater<'a> {
    cache: &'a mut PriceCache,
    prices: &'a dyn DataProvider,
    rates: &'a dyn DataProvider,
    universe: &'a Universe,
    history: &'a HistoryConfig,
    progress: &'a dyn UpdateProgress,
}

impl<'a> Updater<'a> {
    /// `prices` serves the equity categories, `rates` the FX series.
    pub fn new(
        cache: &'a mut PriceCache,
        prices: &'a dyn DataProvider,
        rates: &'a dyn DataProvider,
        universe: &'a Universe,
        history: &'a HistoryConfig,
    ) -> Self {
        Self {
            cache,
            prices,
            rates,
            universe,
            history,
            progress: &SilentProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn UpdateProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Update every category. An explicit `start` bypasses detection.
    pub fn update_all(&mut self, start: Option<NaiveDate>, end: NaiveDate) -> UpdateReport {
        let mut report = UpdateReport::default();
        for category in Category::ALL {
            report
                .categories
                .push(self.run_category(category, start, end));
        }
        self.progress.on_complete(&report);
        report
    }

    /// Update a single category.
    pub fn update_category(
        &mut self,
        category: Category,
        start: Option<NaiveDate>,
        end: NaiveDate,
    ) -> UpdateReport {
        let report = UpdateReport {
            categories: vec![self.run_category(category, start, end)],
        };
        self.progress.on_complete(&report);
        report
    }

    /// Day after the earliest last-stored date across the category.
    ///
    /// A missing, unreadable or empty table means that ticker needs its full
    /// history, which pulls the start back to the configured history start.
    /// Returns the start and the tickers whose tables were missing.
    pub fn detect_start(&self, category: Category) -> (NaiveDate, Vec<String>) {
        let full = full_history_start(self.history, category);
        let mut earliest: Option<NaiveDate> = None;
        let mut needs_full = false;
        let mut missing = Vec::new();

        for ticker in self.universe.tickers(category) {
            match self.cache.last_date(&ticker.symbol) {
                Ok(Some(last)) => {
                    earliest = Some(earliest.map_or(last, |e| e.min(last)));
                }
                Ok(None) => {
                    info!(ticker = %ticker, "table is empty, fetching full history");
                    needs_full = true;
                }
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "table not found in price cache");
                    missing.push(ticker.symbol.clone());
                    needs_full = true;
                }
            }
        }

        let start = match earliest {
            Some(last) if !needs_full => last + Duration::days(1),
            _ => full,
        };
        (start, missing)
    }

    fn run_category(
        &mut self,
        category: Category,
        start: Option<NaiveDate>,
        end: NaiveDate,
    ) -> CategoryReport {
        let (start, missing_tables) = match start {
            Some(s) => (s, Vec::new()),
            None => self.detect_start(category),
        };
        let tickers = self.universe.tickers(category);
        let total = tickers.len();

        info!(%category, %start, %end, tickers = total, "updating category");
        self.progress.on_category(category, start, end, total);

        let mut outcomes = Vec::with_capacity(total);
        for (i, ticker) in tickers.iter().enumerate() {
            let outcome = if start > end {
                TickerOutcome::UpToDate
            } else {
                self.update_ticker(ticker, start, end)
            };
            self.progress.on_ticker(&ticker.symbol, i, total, &outcome);
            outcomes.push((ticker.symbol.clone(), outcome));
        }

        CategoryReport {
            category,
            start,
            end,
            missing_tables,
            outcomes,
        }
    }

    fn provider_for(&self, category: Category) -> &'a dyn DataProvider {
        match category {
            Category::Local | Category::LocalUsdListed => self.prices,
            Category::FxRate => self.rates,
        }
    }

    /// Fetch → upsert for one ticker.
    fn update_ticker(&mut self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> TickerOutcome {
        let provider = self.provider_for(ticker.category);
        info!(ticker = %ticker, provider = provider.name(), "fetching");

        let fetched = match provider.fetch(ticker, start, end) {
            Ok(f) => f,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "fetch failed");
                return TickerOutcome::FetchFailed(e.to_string());
            }
        };

        info!(ticker = %ticker, rows = fetched.records.len(), "upserting values");
        match self.cache.upsert(&ticker.symbol, &fetched.records) {
            Ok(summary) => TickerOutcome::Updated(summary),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "could not update ticker");
                TickerOutcome::SkippedMissing(e.to_string())
            }
        }
    }
}
