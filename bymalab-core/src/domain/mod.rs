//! Domain types shared by the adapters, the cache and the statistics layer.

pub mod record;
pub mod ticker;

pub use record::{finite, PriceField, PriceRecord};
pub use ticker::{table_name, Category, Ticker, TickerError, BYMA_SUFFIX, USA_SUFFIX};
