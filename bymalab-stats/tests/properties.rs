//! Property tests for derived-series invariants.
//!
//! 1. Forward-filled implied rate has no gaps after its first value
//! 2. USD price equals local close divided by the rate
//! 3. Percent change since max is never positive, since min never negative

use bymalab_core::data::PriceTable;
use bymalab_core::domain::PriceRecord;
use bymalab_stats::{implied_rate, to_usd, var_since, DateSeries, PriceFrame, SinceKind};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// ── Strategies ───────────────────────────────────────────────────────

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// Prices on a random subset of 120 consecutive days.
fn arb_closes() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::btree_map(0..120i64, arb_price(), 1..80)
        .prop_map(|m| m.into_iter().collect())
}

fn table(name: &str, closes: &[(i64, f64)]) -> PriceTable {
    PriceTable::new(
        name,
        closes
            .iter()
            .map(|(o, c)| PriceRecord::close_only(base() + Duration::days(*o), *c))
            .collect(),
    )
}

fn series(closes: &[(i64, f64)]) -> DateSeries {
    closes
        .iter()
        .map(|(o, c)| (base() + Duration::days(*o), *c))
        .collect()
}

proptest! {
    #[test]
    fn implied_rate_has_no_gaps(local in arb_closes(), foreign in arb_closes()) {
        let rate = implied_rate(&table("YPFD", &local), &table("YPF_usa", &foreign));
        prop_assert!(rate.iter().all(|(_, v)| v.is_finite() && v > 0.0));

        // every union date from the first valid quotient on is present
        if let Some(first) = rate.first_date() {
            let union: std::collections::BTreeSet<_> = local
                .iter()
                .chain(foreign.iter())
                .map(|(o, _)| base() + Duration::days(*o))
                .filter(|d| *d >= first)
                .collect();
            prop_assert_eq!(rate.len(), union.len());
        }
    }

    #[test]
    fn usd_is_close_over_rate(closes in arb_closes(), rates in arb_closes()) {
        let prices = PriceFrame::align(vec![("GGAL".into(), series(&closes))]);
        let rate = series(&rates);
        let usd = to_usd(&prices, &rate).series("GGAL").unwrap();
        for (o, close) in &closes {
            let date = base() + Duration::days(*o);
            let r = rate.get(date);
            if r.is_finite() {
                prop_assert!((usd.get(date) - close / r).abs() < 1e-9);
            } else {
                prop_assert!(usd.get(date).is_nan());
            }
        }
    }

    #[test]
    fn since_max_non_positive_and_since_min_non_negative(
        a in arb_closes(),
        b in arb_closes(),
    ) {
        let frame = PriceFrame::align(vec![("A".into(), series(&a)), ("B".into(), series(&b))]);
        let reference = base() + Duration::days(60);
        if let Ok(r) = var_since(&frame, SinceKind::Max, base(), reference) {
            prop_assert!(r.values().iter().all(|v| *v <= 1e-9));
        }
        if let Ok(r) = var_since(&frame, SinceKind::Min, base(), reference) {
            prop_assert!(r.values().iter().all(|v| *v >= -1e-9));
        }
    }

    #[test]
    fn ranking_is_sorted(a in arb_closes(), b in arb_closes()) {
        let frame = PriceFrame::align(vec![("A".into(), series(&a)), ("B".into(), series(&b))]);
        if let Ok(r) = var_since(&frame, SinceKind::Max, base(), base()) {
            let v = r.values();
            prop_assert!(v.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
