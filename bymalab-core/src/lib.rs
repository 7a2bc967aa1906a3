//! BymaLab Core: price cache, providers, update orchestration.
//!
//! - Domain types (tickers, categories, price records)
//! - SQLite price cache with one table per ticker
//! - Yahoo Finance and BCRA providers behind a mockable trait
//! - Update orchestrator with per-category start detection
//! - TOML configuration

pub mod config;
pub mod data;
pub mod domain;
