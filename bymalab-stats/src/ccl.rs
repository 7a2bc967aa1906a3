//! Implied "contado con liquidación" rate from a dual-listed pair.

use crate::error::StatsError;
use crate::series::DateSeries;
use bymalab_core::config::CclPair;
use bymalab_core::data::{PriceCache, PriceTable};
use chrono::NaiveDate;
use tracing::debug;

/// `close(local) / close(foreign)` on the union of both sides' dates,
/// forward-filled. Dates before the first valid quotient are dropped, so the
/// result has no gaps.
pub fn implied_rate(local: &PriceTable, foreign: &PriceTable) -> DateSeries {
    let local = DateSeries::from(local.closes());
    let foreign = DateSeries::from(foreign.closes());
    local.div(&foreign).ffill().dropna()
}

/// Load both legs from the cache and compute the implied rate.
pub fn load_implied_rate(
    cache: &PriceCache,
    pair: &CclPair,
    start: NaiveDate,
) -> Result<DateSeries, StatsError> {
    let local = cache.get_prices(&pair.local, start, None)?;
    let foreign = cache.get_prices(&pair.foreign, start, None)?;
    let rate = implied_rate(&local, &foreign);
    if rate.is_empty() {
        return Err(StatsError::EmptyRate {
            local: pair.local.clone(),
            foreign: pair.foreign.clone(),
        });
    }
    debug!(
        local = %pair.local,
        foreign = %pair.foreign,
        points = rate.len(),
        "implied rate computed"
    );
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bymalab_core::domain::PriceRecord;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn table(name: &str, closes: &[(u32, f64)]) -> PriceTable {
        PriceTable::new(
            name,
            closes
                .iter()
                .map(|(day, c)| PriceRecord::close_only(d(*day), *c))
                .collect(),
        )
    }

    #[test]
    fn ratio_of_closes() {
        let rate = implied_rate(
            &table("YPFD", &[(1, 100.0)]),
            &table("YPF_usa", &[(1, 5.0)]),
        );
        assert_eq!(rate.get(d(1)), 20.0);
    }

    #[test]
    fn stale_side_is_forward_filled() {
        // local trades on the 3rd, foreign doesn't; foreign trades on the 6th alone
        let rate = implied_rate(
            &table("YPFD", &[(2, 100.0), (3, 120.0), (7, 130.0)]),
            &table("YPF_usa", &[(1, 4.0), (2, 5.0), (6, 6.0), (7, 6.5)]),
        );
        assert_eq!(rate.first_date(), Some(d(2)));
        assert_eq!(rate.get(d(3)), 20.0);
        assert_eq!(rate.get(d(6)), 20.0);
        assert_eq!(rate.get(d(7)), 20.0);
        assert!(rate.iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn missing_leg_is_an_error() {
        let mut cache = PriceCache::open_in_memory().unwrap();
        cache
            .upsert("YPFD", &[PriceRecord::close_only(d(1), 100.0)])
            .unwrap();
        let err = load_implied_rate(&cache, &CclPair::default(), d(1)).unwrap_err();
        assert!(matches!(err, StatsError::Cache(_)));
    }
}
