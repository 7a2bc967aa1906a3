//! End-to-end analysis runs against a populated in-memory cache.

use bymalab_core::config::{CclPair, Config};
use bymalab_core::data::{PriceCache, Universe};
use bymalab_core::domain::PriceRecord;
use bymalab_stats::{Analysis, SinceKind, StatsError};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn record(date: NaiveDate, close: f64) -> PriceRecord {
    PriceRecord {
        date,
        close: Some(close),
        close_adj: Some(close),
        ..Default::default()
    }
}

fn config() -> Config {
    Config {
        universe: Universe {
            local: vec!["GGAL".into(), "BMA".into(), "FOO".into()],
            local_usd_listed: vec!["YPF_usa".into()],
            fx_rate: vec![],
        },
        ccl: CclPair::default(),
        ..Default::default()
    }
}

#[test]
fn dual_listed_rows_normalize_local_prices() {
    let mut cache = PriceCache::open_in_memory().unwrap();
    let day = d(2020, 1, 1);
    cache.upsert("YPFD", &[record(day, 100.0)]).unwrap();
    cache.upsert("YPF_usa", &[record(day, 5.0)]).unwrap();
    cache.upsert("GGAL", &[record(day, 200.0)]).unwrap();
    cache.upsert("BMA", &[record(day, 300.0)]).unwrap();

    let analysis = Analysis::build(&cache, &config()).unwrap();
    assert_eq!(analysis.rate.get(day), 20.0);
    assert_eq!(analysis.usd.series("GGAL").unwrap().get(day), 10.0);
    assert_eq!(analysis.usd.series("BMA").unwrap().get(day), 15.0);
    // FOO has no table
    assert_eq!(analysis.usd.names, vec!["GGAL", "BMA"]);
}

#[test]
fn rankings_over_a_short_history() {
    let mut cache = PriceCache::open_in_memory().unwrap();
    let days = [d(2019, 8, 9), d(2019, 8, 12), d(2020, 1, 2)];
    for day in days {
        cache.upsert("YPFD", &[record(day, 100.0)]).unwrap();
        cache.upsert("YPF_usa", &[record(day, 10.0)]).unwrap();
    }
    cache
        .upsert(
            "GGAL",
            &[
                record(days[0], 400.0),
                record(days[1], 200.0),
                record(days[2], 100.0),
            ],
        )
        .unwrap();
    cache
        .upsert(
            "BMA",
            &[
                record(days[0], 100.0),
                record(days[1], 100.0),
                record(days[2], 150.0),
            ],
        )
        .unwrap();

    let analysis = Analysis::build(&cache, &config()).unwrap();

    let max = analysis.ranking(SinceKind::Max).unwrap();
    assert_eq!(max.get("GGAL"), Some(-75.0));
    assert_eq!(max.get("BMA"), Some(0.0));
    assert_eq!(max.entries[0].0, "GGAL");

    let min = analysis.ranking(SinceKind::Min).unwrap();
    assert_eq!(min.get("BMA"), Some(50.0));

    let paso = analysis.ranking(SinceKind::Reference).unwrap();
    assert_eq!(paso.get("GGAL"), Some(-50.0));
    assert_eq!(paso.date, d(2020, 1, 2));
}

#[test]
fn missing_ccl_leg_fails_the_run() {
    let mut cache = PriceCache::open_in_memory().unwrap();
    cache.upsert("GGAL", &[record(d(2020, 1, 1), 1.0)]).unwrap();
    let err = Analysis::build(&cache, &config()).unwrap_err();
    assert!(matches!(err, StatsError::Cache(_)));
}
