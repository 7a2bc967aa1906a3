//! Property tests for chart models.

use bymalab_report::kde::GRID_POINTS;
use bymalab_report::{render, BarChart, EquityChart, Kde, ReportError};
use bymalab_stats::{Ranking, SinceKind};
use chrono::NaiveDate;
use proptest::prelude::*;

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0..400.0_f64, 2..40)
}

proptest! {
    #[test]
    fn density_is_non_negative_on_the_grid(values in arb_values()) {
        if let Some(kde) = Kde::estimate(&values, GRID_POINTS) {
            prop_assert_eq!(kde.xs.len(), GRID_POINTS);
            prop_assert!(kde.ys.iter().all(|y| y.is_finite() && *y >= 0.0));
            prop_assert!(kde.xs.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn bars_sorted_with_annotations_past_the_bar(values in arb_values()) {
        let ranking = Ranking {
            kind: SinceKind::Min,
            date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            entries: values.iter().enumerate().map(|(i, v)| (format!("T{i}"), *v)).collect(),
        };
        let chart = BarChart::from_ranking(&ranking, "paso");
        prop_assert!(chart.bars.windows(2).all(|w| w[0].value <= w[1].value));
        for bar in &chart.bars {
            prop_assert!(bar.annotation_x.abs() >= bar.value.abs());
        }
        let (lo, hi) = chart.x_range();
        prop_assert!(lo < 0.0 && hi > 0.0);
    }
}

#[test]
fn empty_charts_are_typed_errors() {
    let dir = tempfile::tempdir().unwrap();
    let ranking = Ranking {
        kind: SinceKind::Max,
        date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
        entries: vec![],
    };
    let bars = BarChart::from_ranking(&ranking, "paso");
    let err = render(&bars, &dir.path().join("max.svg")).unwrap_err();
    assert!(matches!(err, ReportError::Empty("ranking has no entries")));

    let equity = EquityChart {
        title: "BBAR".into(),
        years: vec![],
        mean: vec![],
        min: vec![],
        max: vec![],
        mean_adj: vec![],
    };
    let err = render(&equity, &dir.path().join("equity.png")).unwrap_err();
    assert!(matches!(err, ReportError::Empty(_)));
}
