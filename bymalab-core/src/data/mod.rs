//! Data ingestion, caching and retrieval

pub mod bcra;
pub mod cache;
pub mod provider;
pub mod query;
pub mod universe;
pub mod update;
pub mod yahoo;

pub use bcra::{BcraProvider, FxSource};
pub use cache::{CacheError, PriceCache, TableStatus, UpsertSummary};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use query::PriceTable;
pub use universe::Universe;
pub use update::{
    CategoryReport, SilentProgress, StdoutProgress, TickerOutcome, UpdateProgress, UpdateReport,
    Updater,
};
pub use yahoo::YahooProvider;
