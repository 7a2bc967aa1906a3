//! Overlaid density curves of the three rankings.

use crate::barh::title;
use crate::kde::{Kde, GRID_POINTS};
use crate::error::DrawError;
use crate::render::{err, Chart};
use bymalab_stats::{Ranking, SinceKind};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::warn;

/// Fill opacity under each curve.
pub const FILL_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub kind: SinceKind,
    pub label: String,
    pub color: RGBColor,
    pub kde: Kde,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityChart {
    pub title: String,
    pub curves: Vec<DensityCurve>,
}

impl DensityChart {
    /// One curve per ranking. Rankings too small to estimate a density
    /// for are left out with a warning.
    pub fn from_rankings(rankings: &[&Ranking], reference_label: &str) -> Self {
        let curves = rankings
            .iter()
            .filter_map(|r| match Kde::estimate(&r.values(), GRID_POINTS) {
                Some(kde) => Some(DensityCurve {
                    kind: r.kind,
                    label: legend(r.kind, reference_label),
                    color: color(r.kind),
                    kde,
                }),
                None => {
                    warn!(kind = %r.kind, entries = r.len(), "not enough spread for a density");
                    None
                }
            })
            .collect();
        Self {
            title: "USD return distribution".to_string(),
            curves,
        }
    }

    fn bounds(&self) -> (f64, f64, f64) {
        let lo = self
            .curves
            .iter()
            .filter_map(|c| c.kde.xs.first().copied())
            .fold(f64::INFINITY, f64::min);
        let hi = self
            .curves
            .iter()
            .filter_map(|c| c.kde.xs.last().copied())
            .fold(f64::NEG_INFINITY, f64::max);
        let top = self
            .curves
            .iter()
            .map(|c| c.kde.max_density())
            .fold(0.0, f64::max);
        (lo, hi, top)
    }
}

pub fn legend(kind: SinceKind, reference_label: &str) -> String {
    match kind {
        SinceKind::Max => "Since highs".to_string(),
        SinceKind::Min => "Since lows".to_string(),
        SinceKind::Reference => format!("Since {reference_label}"),
    }
}

pub fn color(kind: SinceKind) -> RGBColor {
    match kind {
        SinceKind::Max => RGBColor(31, 119, 180),
        SinceKind::Min => RGBColor(255, 127, 14),
        SinceKind::Reference => RGBColor(44, 160, 44),
    }
}

impl Chart for DensityChart {
    fn size(&self) -> (u32, u32) {
        (1000, 600)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawError> {
        if self.curves.is_empty() {
            return Err(DrawError::Empty("no density to draw"));
        }
        root.fill(&WHITE).map_err(err)?;
        let (lo, hi, top) = self.bounds();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, 0.0..top * 1.1)
            .map_err(err)?;
        chart
            .configure_mesh()
            .y_desc("Density")
            .draw()
            .map_err(err)?;

        for curve in &self.curves {
            let c = curve.color;
            chart
                .draw_series(
                    AreaSeries::new(curve.kde.points(), 0.0, c.mix(FILL_ALPHA)).border_style(c),
                )
                .map_err(err)?
                .label(curve.label.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], c.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ranking(kind: SinceKind, values: &[f64]) -> Ranking {
        Ranking {
            kind,
            date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            entries: values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("T{i}"), *v))
                .collect(),
        }
    }

    #[test]
    fn one_curve_per_ranking() {
        let max = ranking(SinceKind::Max, &[-80.0, -50.0, -10.0]);
        let min = ranking(SinceKind::Min, &[10.0, 200.0, 350.0]);
        let paso = ranking(SinceKind::Reference, &[-60.0, -20.0, 5.0]);
        let chart = DensityChart::from_rankings(&[&max, &min, &paso], "paso");

        assert_eq!(chart.curves.len(), 3);
        assert_eq!(chart.curves[2].label, "Since paso");
        assert_eq!(chart.curves[0].color, color(SinceKind::Max));
        assert!(chart.curves.iter().all(|c| c.kde.xs.len() == GRID_POINTS));

        let (lo, hi, top) = chart.bounds();
        assert_eq!(lo, -80.0 - 35.0);
        assert!((hi - (350.0 + 170.0)).abs() < 1e-9);
        assert!(top > 0.0);
    }

    #[test]
    fn flat_ranking_is_skipped() {
        let flat = ranking(SinceKind::Max, &[0.0, 0.0]);
        let min = ranking(SinceKind::Min, &[1.0, 2.0]);
        let chart = DensityChart::from_rankings(&[&flat, &min], "paso");
        assert_eq!(chart.curves.len(), 1);
        assert_eq!(chart.curves[0].kind, SinceKind::Min);
    }
}
