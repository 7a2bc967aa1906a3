//! Universe configuration: category-organized ticker lists.
//!
//! Stored in the `[universe]` table of the TOML config. There are more
//! tickers in a long-lived database than listed here; the universe only holds
//! those that can still be refreshed from the providers.

use crate::domain::{Category, Ticker};
use serde::{Deserialize, Serialize};

const LOCAL: &[&str] = &[
    "ALUA", "BMA", "BYMA", "CEPU", "COME", "CRES", "CVH", "EDN", "GGAL", "MIRG", "PAMP", "SUPV",
    "TECO2", "TGNO4", "TGSU2", "TRAN", "TXAR", "VALO", "YPFD", "DOME", "AGRO", "AUSO", "BBAR",
    "BHIP", "BOLT", "BPAT", "BRIO", "CADO", "CAPX", "CARC", "CECO2", "CELU", "CGPA2", "CTIO",
    "EDSH", "DGCU2", "DYCA", "EDLH", "ESME", "FERR", "FIPL", "GAMI", "GARO", "GBAN", "GCLA",
    "GRIM", "HARG", "HAVA", "INTR", "INVJ", "IRCP", "IRSA", "LEDE", "LOMA", "LONG", "METR",
    "MOLA", "MOLI", "MORI", "OEST", "PATA", "PGR", "POLL", "RICH", "RIGO", "ROSE", "SAMI",
    "SEMI", "TGLT",
];

const LOCAL_USD_LISTED: &[&str] = &[
    "BBAR_usa", "BMA_usa", "GGAL_usa", "TGS_usa", "IRS_usa", "CRESY_usa", "SUPV_usa", "PAM_usa",
    "YPF_usa", "CEPU_usa", "EDN_usa",
];

const FX_RATE: &[&str] = &["dolar_bcra_a3500"];

/// The complete universe configuration. A category left out of the TOML
/// keeps its default list; `fx_rate = []` disables one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Universe {
    pub local: Vec<String>,
    pub local_usd_listed: Vec<String>,
    pub fx_rate: Vec<String>,
}

impl Universe {
    /// Symbols tracked for a category.
    pub fn symbols(&self, category: Category) -> &[String] {
        match category {
            Category::Local => &self.local,
            Category::LocalUsdListed => &self.local_usd_listed,
            Category::FxRate => &self.fx_rate,
        }
    }

    /// Tickers tracked for a category.
    pub fn tickers(&self, category: Category) -> Vec<Ticker> {
        self.symbols(category)
            .iter()
            .map(|s| Ticker::new(s.clone(), category))
            .collect()
    }

    /// Every tracked ticker, category by category.
    pub fn all_tickers(&self) -> Vec<Ticker> {
        Category::ALL
            .iter()
            .flat_map(|c| self.tickers(*c))
            .collect()
    }

    /// Category of a symbol, matched case-insensitively.
    pub fn category_of(&self, symbol: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| {
            self.symbols(*c)
                .iter()
                .any(|s| s.eq_ignore_ascii_case(symbol))
        })
    }

    /// Total number of tickers.
    pub fn ticker_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.symbols(*c).len()).sum()
    }

    /// BYMA equities, their NYSE twins and the BCRA A3500 dollar.
    pub fn default_byma() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            local: owned(LOCAL),
            local_usd_listed: owned(LOCAL_USD_LISTED),
            fx_rate: owned(FX_RATE),
        }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_byma()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_all_categories() {
        let u = Universe::default_byma();
        assert_eq!(u.local.len(), 69);
        assert_eq!(u.local_usd_listed.len(), 11);
        assert_eq!(u.fx_rate, vec!["dolar_bcra_a3500".to_string()]);
        assert_eq!(u.ticker_count(), 81);
    }

    #[test]
    fn toml_roundtrip() {
        let u = Universe::default_byma();
        let toml_str = toml::to_string_pretty(&u).unwrap();
        let parsed: Universe = toml::from_str(&toml_str).unwrap();
        assert_eq!(u, parsed);
    }

    #[test]
    fn omitted_categories_keep_defaults() {
        let u: Universe = toml::from_str("local = [\"GGAL\", \"YPFD\"]\nfx_rate = []\n").unwrap();
        assert_eq!(u.local, vec!["GGAL", "YPFD"]);
        assert!(u.local_usd_listed.iter().any(|s| s == "YPF_usa"));
        assert_eq!(u.local_usd_listed.len(), 11);
        assert!(u.fx_rate.is_empty());
    }

    #[test]
    fn category_lookup_ignores_case() {
        let u = Universe::default_byma();
        assert_eq!(u.category_of("ggal"), Some(Category::Local));
        assert_eq!(u.category_of("YPF_USA"), Some(Category::LocalUsdListed));
        assert_eq!(u.category_of("DOLAR_BCRA_A3500"), Some(Category::FxRate));
        assert_eq!(u.category_of("AAPL"), None);
    }

    #[test]
    fn tickers_carry_their_category() {
        let u = Universe::default_byma();
        let usa = u.tickers(Category::LocalUsdListed);
        assert!(usa.iter().all(|t| t.category == Category::LocalUsdListed));
        assert_eq!(u.all_tickers().len(), 81);
    }
}
