//! Yearly equity value: mean line over a min–max band.

use crate::error::DrawError;
use crate::render::{err, Chart};
use bymalab_stats::EquityHistory;
use plotters::coord::Shift;
use plotters::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityChart {
    pub title: String,
    pub years: Vec<i32>,
    pub mean: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub mean_adj: Vec<f64>,
}

impl EquityChart {
    pub fn from_history(history: &EquityHistory) -> Self {
        let first = history.years.first().map(|y| y.year);
        let title = match first {
            Some(year) => format!("{}: market value of the whole equity since {year}", history.ticker),
            None => format!("{}: market value of the whole equity", history.ticker),
        };
        Self {
            title,
            years: history.years.iter().map(|y| y.year).collect(),
            mean: history.years.iter().map(|y| y.mean).collect(),
            min: history.years.iter().map(|y| y.min).collect(),
            max: history.years.iter().map(|y| y.max).collect(),
            mean_adj: history.years.iter().map(|y| y.mean_adj).collect(),
        }
    }

    fn top(&self) -> f64 {
        self.max
            .iter()
            .chain(self.mean_adj.iter())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }
}

impl Chart for EquityChart {
    fn size(&self) -> (u32, u32) {
        (1000, 600)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawError> {
        let (Some(first), Some(last)) = (self.years.first(), self.years.last()) else {
            return Err(DrawError::Empty("no yearly values"));
        };
        root.fill(&WHITE).map_err(err)?;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(*first..*last + 1, 0.0..self.top() * 1.1)
            .map_err(err)?;
        chart
            .configure_mesh()
            .y_desc("USD millions")
            .draw()
            .map_err(err)?;

        let band: Vec<(i32, f64)> = self
            .years
            .iter()
            .copied()
            .zip(self.max.iter().copied())
            .chain(
                self.years
                    .iter()
                    .copied()
                    .zip(self.min.iter().copied())
                    .rev(),
            )
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(band, BLUE.mix(0.3))))
            .map_err(err)?;

        chart
            .draw_series(LineSeries::new(
                self.years.iter().copied().zip(self.mean.iter().copied()),
                BLUE.stroke_width(2),
            ))
            .map_err(err)?
            .label("Mean")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .draw_series(LineSeries::new(
                self.years
                    .iter()
                    .copied()
                    .zip(self.mean_adj.iter().copied())
                    .filter(|(_, v)| v.is_finite()),
                RED.stroke_width(1),
            ))
            .map_err(err)?
            .label("Mean (adjusted)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(err)?;
        Ok(())
    }
}
