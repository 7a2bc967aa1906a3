//! BymaLab Stats: derived series computed from the price cache.
//!
//! - Date series and multi-ticker alignment (NaN for missing rows)
//! - Implied CCL rate from a dual-listed pair
//! - USD-normalized price frame
//! - Percent change since max, min or a reference date
//! - Yearly equity value history
//! - CSV and Parquet export

pub mod analysis;
pub mod ccl;
pub mod equity;
pub mod error;
pub mod export;
pub mod frame;
pub mod series;
pub mod since;
pub mod usd;

pub use analysis::Analysis;
pub use ccl::{implied_rate, load_implied_rate};
pub use equity::{capital_table, equity_history, EquityHistory, EquityYear};
pub use error::StatsError;
pub use frame::PriceFrame;
pub use series::{DateSeries, YearStats};
pub use since::{var_since, Ranking, SinceKind};
pub use usd::{load_local_prices, to_usd};
