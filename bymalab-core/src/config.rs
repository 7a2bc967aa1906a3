//! TOML configuration: database location, tracked universe, history
//! defaults, the dual-listed pair behind the implied rate, and analysis
//! parameters.
//!
//! Every section has defaults, so an empty or missing file is a valid config.

use crate::data::universe::Universe;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "bymalab.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub universe: Universe,
    pub history: HistoryConfig,
    pub ccl: CclPair,
    pub analysis: AnalysisConfig,
    pub http: HttpConfig,
    /// Share capital in millions per year, keyed by ticker then year.
    pub equity: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            universe: Universe::default_byma(),
            history: HistoryConfig::default(),
            ccl: CclPair::default(),
            analysis: AnalysisConfig::default(),
            http: HttpConfig::default(),
            equity: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to disk, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ccl.local.is_empty() || self.ccl.foreign.is_empty() {
            return Err(ConfigError::Invalid("ccl pair needs both tickers".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be > 0".into()));
        }
        for (ticker, years) in &self.equity {
            for year in years.keys() {
                if year.parse::<i32>().is_err() {
                    return Err(ConfigError::Invalid(format!(
                        "equity.{ticker}: '{year}' is not a year"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .map(|d| d.join("bymalab").join("dbprices.db"))
            .unwrap_or_else(|| PathBuf::from("db").join("dbprices.db"));
        Self { path }
    }
}

/// Start dates used when a category has to be fetched from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub equity_start: NaiveDate,
    pub fx_start: NaiveDate,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            equity_start: date(1990, 1, 1),
            fx_start: date(2002, 3, 4),
        }
    }
}

/// Dual-listed pair whose close ratio gives the implied (CCL) rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CclPair {
    pub local: String,
    pub foreign: String,
}

impl Default for CclPair {
    fn default() -> Self {
        Self {
            local: "YPFD".into(),
            foreign: "YPF_usa".into(),
        }
    }
}

/// Blank a ticker's prices up to and including `until`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRule {
    pub ticker: String,
    pub until: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First date of the var-since window.
    pub since: NaiveDate,
    pub reference_date: NaiveDate,
    pub reference_label: String,
    /// Use adjusted closes for the USD frame.
    pub adjusted: bool,
    /// Tickers dropped from the USD frame (suspect data).
    pub exclude: Vec<String>,
    pub crop: Vec<CropRule>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            since: date(2017, 1, 1),
            reference_date: date(2019, 8, 11),
            reference_label: "paso".into(),
            adjusted: true,
            exclude: vec!["GAMI".into(), "GCLA".into(), "CGPA2".into()],
            // VALO before the BYMA spin-off
            crop: vec![CropRule {
                ticker: "VALO".into(),
                until: date(2017, 8, 7),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub bcra_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            bcra_url: "http://www.bcra.gov.ar/Pdfs/PublicacionesEstadisticas/com3500.xls".into(),
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
