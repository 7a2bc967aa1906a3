//! Tickers and the categories that decide how they are fetched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Suffix marking the NYSE-listed twin of a local ticker (`GGAL_usa`).
pub const USA_SUFFIX: &str = "_usa";

/// Yahoo suffix for Buenos Aires listings.
pub const BYMA_SUFFIX: &str = ".BA";

/// Which market a ticker belongs to. Selects the adapter and the
/// provider-symbol transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Listed on the local exchange (BYMA).
    Local,
    /// US-listed twin of a local stock (ADR).
    LocalUsdListed,
    /// Official exchange-rate series published by the central bank.
    FxRate,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Local, Category::LocalUsdListed, Category::FxRate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Local => "local",
            Category::LocalUsdListed => "local_usd_listed",
            Category::FxRate => "fx_rate",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TickerError {
    #[error("unknown category '{0}' (expected local, local_usd_listed or fx_rate)")]
    UnknownCategory(String),

    #[error("invalid ticker symbol '{0}'")]
    InvalidSymbol(String),

    #[error("category {category} has no price-provider symbol for '{symbol}'")]
    NoProviderSymbol { symbol: String, category: Category },
}

impl FromStr for Category {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "y" => Ok(Category::Local),
            "local_usd_listed" | "local-usd-listed" | "yusa" => Ok(Category::LocalUsdListed),
            "fx_rate" | "fx-rate" | "bcra" => Ok(Category::FxRate),
            other => Err(TickerError::UnknownCategory(other.to_string())),
        }
    }
}

/// A tracked symbol and its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub category: Category,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, category: Category) -> Self {
        Self {
            symbol: symbol.into(),
            category,
        }
    }

    /// Symbol as the price provider expects it.
    ///
    /// Local tickers get the `.BA` suffix, US-listed twins lose their `_usa`
    /// suffix. FX series are not served by the price provider.
    pub fn provider_symbol(&self) -> Result<String, TickerError> {
        match self.category {
            Category::Local => Ok(format!("{}{BYMA_SUFFIX}", self.symbol.to_ascii_uppercase())),
            Category::LocalUsdListed => {
                let lower = self.symbol.to_ascii_lowercase();
                let base = lower.strip_suffix(USA_SUFFIX).unwrap_or(&lower);
                Ok(base.to_ascii_uppercase())
            }
            Category::FxRate => Err(TickerError::NoProviderSymbol {
                symbol: self.symbol.clone(),
                category: self.category,
            }),
        }
    }

    /// Cache table name for this ticker.
    pub fn table_name(&self) -> Result<String, TickerError> {
        table_name(&self.symbol)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Lower-cased table name for a symbol. Dots become underscores; anything
/// outside `[a-z0-9_]` is rejected so the name can be spliced into SQL.
pub fn table_name(symbol: &str) -> Result<String, TickerError> {
    if symbol.is_empty() {
        return Err(TickerError::InvalidSymbol(symbol.to_string()));
    }
    let name: String = symbol
        .chars()
        .map(|c| if c == '.' { '_' } else { c.to_ascii_lowercase() })
        .collect();
    let valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(TickerError::InvalidSymbol(symbol.to_string()));
    }
    Ok(name)
}
