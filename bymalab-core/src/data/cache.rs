//! SQLite price cache, one table per ticker keyed by date.
//!
//! Layout: table `{lowercase ticker}` with columns
//! `date (PK), max, min, close, volnom, vol, start, start_h, max_h, min_h,
//! volnom_h, vol_h, close_h`. Dates are `YYYY-MM-DD` text, so databases
//! written by earlier tools load unchanged.
//!
//! Features:
//! - Lazy table creation on first write
//! - Atomic insert-or-update per record, one transaction per batch
//! - Per-record failures are logged and counted, never abort the batch
//! - Missing or malformed tables surface as typed errors for per-ticker skip

use super::query::PriceTable;
use crate::domain::{table_name, PriceField, PriceRecord, TickerError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("table for ticker '{ticker}' not found in the price cache")]
    MissingTable { ticker: String },

    #[error("table for ticker '{ticker}' is malformed: {reason}")]
    Malformed { ticker: String, reason: String },

    #[error(transparent)]
    InvalidTicker(#[from] TickerError),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cache I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to a ticker's physical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerTable {
    pub ticker: String,
    pub name: String,
    /// True when this call created the table.
    pub created: bool,
}

/// Outcome of upserting one batch of records into a ticker table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Row count and date range of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table: String,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// The price cache client. Construct one per database file and pass it to
/// whoever needs it.
pub struct PriceCache {
    conn: Connection,
    path: Option<PathBuf>,
}

impl PriceCache {
    /// Open (or create) the cache file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory cache, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    /// Backing file, `None` for in-memory caches.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has_table(&self, ticker: &str) -> Result<bool, CacheError> {
        let name = table_name(ticker)?;
        table_exists(&self.conn, &name)
    }

    /// Return the ticker's table, creating it if it doesn't exist.
    pub fn get_table(&self, ticker: &str) -> Result<TickerTable, CacheError> {
        let name = table_name(ticker)?;
        let created = if table_exists(&self.conn, &name)? {
            normalize_dates(&self.conn, ticker, &name)?;
            false
        } else {
            info!(%ticker, table = %name, "creating table for ticker");
            self.conn.execute_batch(&create_table_sql(&name))?;
            true
        };
        Ok(TickerTable {
            ticker: ticker.to_string(),
            name,
            created,
        })
    }

    /// Names of all ticker tables, sorted.
    pub fn tables(&self) -> Result<Vec<String>, CacheError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn row_count(&self, ticker: &str) -> Result<usize, CacheError> {
        let name = self.existing_table(ticker)?;
        count_rows(&self.conn, &name)
    }

    /// Most recent stored date; `None` for an empty table.
    pub fn last_date(&self, ticker: &str) -> Result<Option<NaiveDate>, CacheError> {
        Ok(self.date_range(ticker)?.map(|(_, last)| last))
    }

    /// First and last stored dates; `None` for an empty table.
    pub fn date_range(&self, ticker: &str) -> Result<Option<(NaiveDate, NaiveDate)>, CacheError> {
        let name = self.existing_table(ticker)?;
        let bounds: (Option<String>, Option<String>) = self
            .conn
            .query_row(
                &format!("SELECT MIN(date), MAX(date) FROM \"{name}\""),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| malformed(ticker, e))?;
        match bounds {
            (Some(first), Some(last)) => Ok(Some((
                parse_date(ticker, &first)?,
                parse_date(ticker, &last)?,
            ))),
            _ => Ok(None),
        }
    }

    /// Insert each record whose date is absent, overwrite every non-date
    /// field of those already present.
    ///
    /// The whole batch runs in one transaction. A record the database rejects
    /// is logged, counted in `failed` and skipped.
    pub fn upsert(
        &mut self,
        ticker: &str,
        records: &[PriceRecord],
    ) -> Result<UpsertSummary, CacheError> {
        let table = self.get_table(ticker)?;
        let name = table.name;

        let tx = self.conn.transaction()?;
        let before = count_rows(&tx, &name)?;
        let mut applied = 0;
        let mut failed = 0;
        {
            let mut stmt = tx
                .prepare(&upsert_sql(&name))
                .map_err(|e| malformed(ticker, e))?;
            for r in records {
                let date = r.date.format(DATE_FORMAT).to_string();
                let result = stmt.execute(params![
                    date,
                    r.high,
                    r.low,
                    r.close,
                    r.volnom,
                    r.vol,
                    r.open,
                    r.open_adj,
                    r.high_adj,
                    r.low_adj,
                    r.volnom_adj,
                    r.vol_adj,
                    r.close_adj,
                ]);
                match result {
                    Ok(_) => applied += 1,
                    Err(e) => {
                        warn!(%ticker, %date, error = %e, "could not upsert record");
                        failed += 1;
                    }
                }
            }
        }
        let after = count_rows(&tx, &name)?;
        tx.commit()?;

        let inserted = after.saturating_sub(before);
        Ok(UpsertSummary {
            inserted,
            updated: applied - inserted.min(applied),
            failed,
        })
    }

    /// All rows with `start <= date <= end`, sorted by date. `end` defaults
    /// to today.
    pub fn get_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PriceTable, CacheError> {
        let name = self.existing_table(ticker)?;
        let end = end.unwrap_or_else(|| chrono::Local::now().date_naive());

        let mut stmt = self
            .conn
            .prepare(&select_sql(&name))
            .map_err(|e| malformed(ticker, e))?;
        let raw = stmt
            .query_map(
                params![
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string()
                ],
                read_row,
            )
            .map_err(|e| malformed(ticker, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(ticker, e))?;

        let mut rows = Vec::with_capacity(raw.len());
        for (date, mut record) in raw {
            record.date = parse_date(ticker, &date)?;
            rows.push(record);
        }
        // Text order equals date order only for well-formed dates.
        rows.sort_by_key(|r| r.date);

        Ok(PriceTable::new(ticker, rows))
    }

    /// Row count and date range for every table.
    pub fn status(&self) -> Result<Vec<TableStatus>, CacheError> {
        let mut out = Vec::new();
        for table in self.tables()? {
            match self.date_range(&table) {
                Ok(range) => out.push(TableStatus {
                    rows: count_rows(&self.conn, &table)?,
                    first_date: range.map(|r| r.0),
                    last_date: range.map(|r| r.1),
                    table,
                }),
                Err(e) => warn!(%table, error = %e, "skipping unreadable table"),
            }
        }
        Ok(out)
    }

    fn existing_table(&self, ticker: &str) -> Result<String, CacheError> {
        let name = table_name(ticker)?;
        if table_exists(&self.conn, &name)? {
            normalize_dates(&self.conn, ticker, &name)?;
            Ok(name)
        } else {
            Err(CacheError::MissingTable {
                ticker: ticker.to_string(),
            })
        }
    }
}

// ── SQL helpers ─────────────────────────────────────────────────────

fn table_exists(conn: &Connection, name: &str) -> Result<bool, CacheError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Truncate timestamp-style dates to `YYYY-MM-DD`. When a plain row for the
/// same day already exists it wins and the timestamped one is dropped.
fn normalize_dates(conn: &Connection, ticker: &str, name: &str) -> Result<(), CacheError> {
    let rewritten = conn
        .execute(
            &format!(
                "UPDATE OR IGNORE \"{name}\" SET date = substr(date, 1, 10) WHERE length(date) > 10"
            ),
            [],
        )
        .map_err(|e| malformed(ticker, e))?;
    let dropped = conn
        .execute(
            &format!("DELETE FROM \"{name}\" WHERE length(date) > 10"),
            [],
        )
        .map_err(|e| malformed(ticker, e))?;
    if rewritten + dropped > 0 {
        info!(%ticker, rewritten, dropped, "normalized legacy timestamp dates");
    }
    Ok(())
}

fn count_rows(conn: &Connection, name: &str) -> Result<usize, CacheError> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM \"{name}\""), [], |row| {
        row.get(0)
    })?;
    Ok(n as usize)
}

fn value_columns() -> Vec<&'static str> {
    PriceField::ALL.iter().map(|f| f.column()).collect()
}

fn create_table_sql(name: &str) -> String {
    let cols: Vec<String> = value_columns()
        .iter()
        .map(|c| format!("{c} REAL"))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS \"{name}\" (date TEXT NOT NULL PRIMARY KEY, {})",
        cols.join(", ")
    )
}

fn upsert_sql(name: &str) -> String {
    let cols = value_columns();
    let placeholders: Vec<String> = (1..=cols.len() + 1).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = cols.iter().map(|c| format!("{c} = excluded.{c}")).collect();
    format!(
        "INSERT INTO \"{name}\" (date, {}) VALUES ({}) ON CONFLICT(date) DO UPDATE SET {}",
        cols.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

fn select_sql(name: &str) -> String {
    format!(
        "SELECT date, {} FROM \"{name}\" WHERE date BETWEEN ?1 AND ?2 ORDER BY date",
        value_columns().join(", ")
    )
}

/// Column order matches `PriceField::ALL`.
fn read_row(row: &Row<'_>) -> rusqlite::Result<(String, PriceRecord)> {
    let date: String = row.get(0)?;
    let record = PriceRecord {
        date: NaiveDate::default(),
        high: row.get(1)?,
        low: row.get(2)?,
        close: row.get(3)?,
        volnom: row.get(4)?,
        vol: row.get(5)?,
        open: row.get(6)?,
        open_adj: row.get(7)?,
        high_adj: row.get(8)?,
        low_adj: row.get(9)?,
        volnom_adj: row.get(10)?,
        vol_adj: row.get(11)?,
        close_adj: row.get(12)?,
    };
    Ok((date, record))
}

fn parse_date(ticker: &str, s: &str) -> Result<NaiveDate, CacheError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| CacheError::Malformed {
        ticker: ticker.to_string(),
        reason: format!("bad date '{s}': {e}"),
    })
}

fn malformed(ticker: &str, e: rusqlite::Error) -> CacheError {
    CacheError::Malformed {
        ticker: ticker.to_string(),
        reason: e.to_string(),
    }
}
