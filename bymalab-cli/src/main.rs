//! BymaLab CLI: cache updates, queries, statistics and charts.
//!
//! Commands:
//! - `update`: bring every tracked category up to date
//! - `status`: row count and date range per table
//! - `prices`: print or export one ticker's history
//! - `ccl`: print or export the implied rate
//! - `since`: percent change since max, min or the reference date
//! - `chart`: bar and density charts of the rankings
//! - `equity`: yearly equity value of one company
//! - `config init`: write a default config file

use anyhow::{bail, Context, Result};
use bymalab_core::config::{Config, DEFAULT_CONFIG_FILE};
use bymalab_core::data::{
    BcraProvider, PriceCache, SilentProgress, StdoutProgress, TickerOutcome, UpdateProgress,
    UpdateReport, Updater, YahooProvider,
};
use bymalab_core::domain::Category;
use bymalab_report::{render, BarChart, DensityChart, EquityChart};
use bymalab_stats::export::{
    export_equity_csv, export_prices_csv, export_ranking_csv, export_series_csv, write_output,
    write_prices_parquet,
};
use bymalab_stats::{capital_table, equity_history, load_implied_rate, Analysis, SinceKind};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "bymalab",
    about = "BymaLab CLI: BYMA price cache and USD statistics"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Price database. Overrides `database.path` from the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new prices for every tracked ticker and upsert them.
    Update {
        /// Start date (YYYY-MM-DD). Defaults to the day after each category's last stored date.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Only this category: local, local_usd_listed or fx_rate.
        #[arg(long)]
        category: Option<String>,

        /// Print the update report as JSON instead of progress lines.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Report row count and date range per table.
    Status,
    /// Print one ticker's price history.
    Prices {
        ticker: String,

        /// Start date (YYYY-MM-DD). Defaults to the configured history start.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Write the rows as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the rows as Parquet.
        #[arg(long)]
        parquet: Option<PathBuf>,
    },
    /// Print the implied CCL rate.
    Ccl {
        /// Write the full series as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Rank tickers by USD percent change since max, min or the reference date.
    Since {
        /// max, min, ref or the configured reference label.
        kind: String,

        /// Update the cache first.
        #[arg(long, default_value_t = false)]
        update: bool,

        /// Write the ranking as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Render charts of the rankings.
    Chart {
        #[command(subcommand)]
        action: ChartAction,
    },
    /// Yearly USD market value of a company's whole equity.
    Equity {
        ticker: String,

        /// Chart output (.svg or .png).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the yearly values as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Config file management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ChartAction {
    /// Horizontal bar chart of one ranking.
    Barh {
        kind: String,

        /// Output file (.svg or .png).
        #[arg(long)]
        out: PathBuf,
    },
    /// Density of all three rankings.
    Dist {
        /// Output file (.svg or .png).
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config to `--config`.
    Init {
        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        return run_config_init(&cli.config, *force);
    }

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    match cli.command {
        Commands::Update {
            start,
            end,
            category,
            json,
        } => {
            let report = run_update(&config, start, end, category, json)?;
            let failed = failures(&report);
            if !failed.is_empty() {
                for (symbol, why) in failed {
                    eprintln!("Error for {symbol}: {why}");
                }
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Status => run_status(&config),
        Commands::Prices {
            ticker,
            start,
            end,
            csv,
            parquet,
        } => run_prices(&config, &ticker, start, end, csv, parquet),
        Commands::Ccl { csv } => run_ccl(&config, csv),
        Commands::Since { kind, update, csv } => run_since(&config, &kind, update, csv),
        Commands::Chart { action } => match action {
            ChartAction::Barh { kind, out } => run_chart_barh(&config, &kind, &out),
            ChartAction::Dist { out } => run_chart_dist(&config, &out),
        },
        Commands::Equity { ticker, out, csv } => run_equity(&config, &ticker, out, csv),
        Commands::Config { .. } => Ok(()),
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
        })
        .transpose()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn open_cache(config: &Config) -> Result<PriceCache> {
    let path = &config.database.path;
    PriceCache::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn run_update(
    config: &Config,
    start: Option<String>,
    end: Option<String>,
    category: Option<String>,
    json: bool,
) -> Result<UpdateReport> {
    let start = parse_date(start.as_deref())?;
    let end = parse_date(end.as_deref())?.unwrap_or_else(today);
    let category = category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;

    let mut cache = open_cache(config)?;
    let prices = YahooProvider::new(&config.http)?;
    let rates = BcraProvider::new(&config.http)?;
    let progress: &dyn UpdateProgress = if json { &SilentProgress } else { &StdoutProgress };

    let mut updater = Updater::new(
        &mut cache,
        &prices,
        &rates,
        &config.universe,
        &config.history,
    )
    .with_progress(progress);
    let report = match category {
        Some(c) => updater.update_category(c, start, end),
        None => updater.update_all(start, end),
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize update report")?
        );
    }

    Ok(report)
}

/// Tickers whose update failed, with the reason.
fn failures(report: &UpdateReport) -> Vec<(&str, &str)> {
    report
        .outcomes()
        .filter_map(|(symbol, outcome)| match outcome {
            TickerOutcome::FetchFailed(why) | TickerOutcome::SkippedMissing(why) => {
                Some((symbol, why.as_str()))
            }
            _ => None,
        })
        .collect()
}

fn run_status(config: &Config) -> Result<()> {
    let cache = open_cache(config)?;
    let tables = cache.status()?;
    println!("Database: {}", config.database.path.display());
    println!("Tables: {}", tables.len());
    if tables.is_empty() {
        return Ok(());
    }
    println!();
    println!("{:<20} {:>8}  {:<10}  {:<10}", "Table", "Rows", "First", "Last");
    println!("{}", "-".repeat(54));
    for t in &tables {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:<20} {:>8}  {:<10}  {:<10}",
            t.table,
            t.rows,
            fmt(t.first_date),
            fmt(t.last_date)
        );
    }
    Ok(())
}

fn run_prices(
    config: &Config,
    ticker: &str,
    start: Option<String>,
    end: Option<String>,
    csv: Option<PathBuf>,
    parquet: Option<PathBuf>,
) -> Result<()> {
    let start = parse_date(start.as_deref())?.unwrap_or(config.history.equity_start);
    let end = parse_date(end.as_deref())?;
    let cache = open_cache(config)?;
    let table = cache.get_prices(ticker, start, end)?;

    if let Some(path) = &csv {
        write_output(path, &export_prices_csv(&table)?)?;
        info!(path = %path.display(), rows = table.len(), "prices written");
    }
    if let Some(path) = &parquet {
        write_prices_parquet(&table, path)?;
        info!(path = %path.display(), rows = table.len(), "prices written");
    }
    if csv.is_some() || parquet.is_some() {
        return Ok(());
    }

    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into());
    println!(
        "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Adj close"
    );
    for r in &table.rows {
        println!(
            "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12}",
            r.date.to_string(),
            fmt(r.open),
            fmt(r.high),
            fmt(r.low),
            fmt(r.close),
            fmt(r.close_adj)
        );
    }
    println!("{} rows", table.len());
    Ok(())
}

fn run_ccl(config: &Config, csv: Option<PathBuf>) -> Result<()> {
    let cache = open_cache(config)?;
    let rate = load_implied_rate(&cache, &config.ccl, config.history.equity_start)?;

    if let Some(path) = csv {
        write_output(&path, &export_series_csv(&rate, "ccl")?)?;
        info!(path = %path.display(), points = rate.len(), "implied rate written");
        return Ok(());
    }

    let points: Vec<_> = rate.iter().collect();
    let tail = &points[points.len().saturating_sub(10)..];
    println!("CCL = {} / {}", config.ccl.local, config.ccl.foreign);
    for (date, value) in tail {
        println!("{date}  {value:>10.2}");
    }
    Ok(())
}

fn run_since(config: &Config, kind: &str, update: bool, csv: Option<PathBuf>) -> Result<()> {
    let kind = SinceKind::parse(kind, &config.analysis.reference_label)?;
    if update {
        let report = run_update(config, None, None, None, false)?;
        for (symbol, why) in failures(&report) {
            warn!(%symbol, reason = %why, "update failed, using cached prices");
        }
    } else {
        warn!("price cache not updated");
    }

    let cache = open_cache(config)?;
    let analysis = Analysis::build(&cache, config)?;
    let ranking = analysis
        .ranking(kind)
        .context("ranking missing from analysis")?;

    if let Some(path) = csv {
        write_output(&path, &export_ranking_csv(ranking)?)?;
        info!(path = %path.display(), tickers = ranking.len(), "ranking written");
        return Ok(());
    }

    println!(
        "{} (as of {})",
        bymalab_report::barh::title(kind, &config.analysis.reference_label),
        ranking.date
    );
    for (ticker, value) in &ranking.entries {
        println!("{ticker:<10} {value:>8.1}");
    }
    Ok(())
}

fn run_chart_barh(config: &Config, kind: &str, out: &Path) -> Result<()> {
    let kind = SinceKind::parse(kind, &config.analysis.reference_label)?;
    let cache = open_cache(config)?;
    let analysis = Analysis::build(&cache, config)?;
    let ranking = analysis
        .ranking(kind)
        .context("ranking missing from analysis")?;

    let chart = BarChart::from_ranking(ranking, &config.analysis.reference_label);
    render(&chart, out)?;
    println!("Chart saved to: {}", out.display());
    Ok(())
}

fn run_chart_dist(config: &Config, out: &Path) -> Result<()> {
    let cache = open_cache(config)?;
    let analysis = Analysis::build(&cache, config)?;
    let rankings: Vec<_> = SinceKind::ALL
        .iter()
        .filter_map(|k| analysis.ranking(*k))
        .collect();

    let chart = DensityChart::from_rankings(&rankings, &config.analysis.reference_label);
    render(&chart, out)?;
    println!("Chart saved to: {}", out.display());
    Ok(())
}

fn run_equity(
    config: &Config,
    ticker: &str,
    out: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let start = config.history.equity_start;
    let cache = open_cache(config)?;
    let rate = load_implied_rate(&cache, &config.ccl, start)?;
    let prices = cache.get_prices(ticker, start, None)?;
    let capital = capital_table(ticker, &config.equity);
    let history = equity_history(&prices, &rate, &capital)?;

    if let Some(path) = &csv {
        write_output(path, &export_equity_csv(&history)?)?;
        info!(path = %path.display(), years = history.years.len(), "equity history written");
    }
    if let Some(path) = &out {
        render(&EquityChart::from_history(&history), path)?;
        println!("Chart saved to: {}", path.display());
    }
    if csv.is_some() || out.is_some() {
        return Ok(());
    }

    println!(
        "{:<6} {:>10} {:>12} {:>12} {:>12}",
        "Year", "Capital", "Mean", "Min", "Max"
    );
    for y in &history.years {
        println!(
            "{:<6} {:>10.3} {:>12.1} {:>12.1} {:>12.1}",
            y.year, y.capital, y.mean, y.min, y.max
        );
    }
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().write(path)?;
    println!("Config written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bymalab_core::data::{CategoryReport, UpsertSummary};

    #[test]
    fn failures_lists_only_failed_tickers() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let report = UpdateReport {
            categories: vec![CategoryReport {
                category: Category::Local,
                start: day,
                end: day,
                missing_tables: vec![],
                outcomes: vec![
                    ("BMA".into(), TickerOutcome::Updated(UpsertSummary::default())),
                    ("GGAL".into(), TickerOutcome::FetchFailed("delisted".into())),
                    ("PAMP".into(), TickerOutcome::UpToDate),
                    ("BAD;NAME".into(), TickerOutcome::SkippedMissing("invalid".into())),
                ],
            }],
        };
        assert_eq!(
            failures(&report),
            vec![("GGAL", "delisted"), ("BAD;NAME", "invalid")]
        );
        assert!(failures(&UpdateReport::default()).is_empty());
    }
}
