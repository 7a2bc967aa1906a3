//! Horizontal bar chart of one ranking.

use crate::error::DrawError;
use crate::render::{err, Chart};
use bymalab_stats::{Ranking, SinceKind};
use plotters::coord::Shift;
use plotters::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Value rounded to one decimal.
    pub annotation: String,
    /// X position of the annotation.
    pub annotation_x: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    /// Bottom to top, ascending by value.
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn from_ranking(ranking: &Ranking, reference_label: &str) -> Self {
        let mut bars: Vec<Bar> = ranking
            .entries
            .iter()
            .map(|(label, value)| Bar {
                label: label.clone(),
                value: *value,
                annotation: format!("{value:.1}"),
                annotation_x: value * 1.05,
            })
            .collect();
        bars.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self {
            title: title(ranking.kind, reference_label),
            bars,
        }
    }

    /// X extent covering bars, annotations and zero, padded by 10%.
    pub fn x_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .bars
            .iter()
            .flat_map(|b| [b.value, b.annotation_x])
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let pad = ((hi - lo) * 0.1).max(1.0);
        (lo - pad, hi + pad)
    }
}

pub fn title(kind: SinceKind, reference_label: &str) -> String {
    match kind {
        SinceKind::Max => "USD drop since highs (%)".to_string(),
        SinceKind::Min => "USD rise since lows (%)".to_string(),
        SinceKind::Reference => format!("USD change since {reference_label} (%)"),
    }
}

impl Chart for BarChart {
    fn size(&self) -> (u32, u32) {
        (800, 1600)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawError> {
        if self.bars.is_empty() {
            return Err(DrawError::Empty("ranking has no entries"));
        }
        root.fill(&WHITE).map_err(err)?;
        let n = self.bars.len() as i32;
        let (x0, x1) = self.x_range();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, (0..n).into_segmented())
            .map_err(err)?;

        let label_of = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(i) => self
                .bars
                .get(*i as usize)
                .map(|b| b.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .y_labels(self.bars.len())
            .y_label_formatter(&label_of)
            .draw()
            .map_err(err)?;

        chart
            .draw_series(self.bars.iter().enumerate().map(|(i, b)| {
                let i = i as i32;
                let (from, to) = if b.value < 0.0 {
                    (b.value, 0.0)
                } else {
                    (0.0, b.value)
                };
                let mut rect = Rectangle::new(
                    [(from, SegmentValue::Exact(i)), (to, SegmentValue::Exact(i + 1))],
                    BLUE.mix(0.8).filled(),
                );
                rect.set_margin(2, 2, 0, 0);
                rect
            }))
            .map_err(err)?;

        chart
            .draw_series(self.bars.iter().enumerate().map(|(i, b)| {
                Text::new(
                    b.annotation.clone(),
                    (b.annotation_x, SegmentValue::CenterOf(i as i32)),
                    ("sans-serif", 12),
                )
            }))
            .map_err(err)?;
        Ok(())
    }
}
