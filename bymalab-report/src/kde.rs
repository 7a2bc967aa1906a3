//! Gaussian kernel density estimate with Silverman's bandwidth.

/// Points on the evaluation grid.
pub const GRID_POINTS: usize = 1000;

/// Evaluated density curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Kde {
    pub bandwidth: f64,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Kde {
    /// Estimate the density of `data` on a grid of `points` values.
    ///
    /// `None` for fewer than two finite samples or zero spread.
    pub fn estimate(data: &[f64], points: usize) -> Option<Self> {
        let samples: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
        let bandwidth = silverman_bandwidth(&samples)?;
        let xs = grid(&samples, points);
        let norm = 1.0 / (samples.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        let ys = xs
            .iter()
            .map(|x| {
                norm * samples
                    .iter()
                    .map(|s| {
                        let z = (x - s) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum::<f64>()
            })
            .collect();
        Some(Self { bandwidth, xs, ys })
    }

    pub fn max_density(&self) -> f64 {
        self.ys.iter().copied().fold(0.0, f64::max)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// `std * (n * 3/4)^(-1/5)`, with the sample standard deviation.
pub fn silverman_bandwidth(samples: &[f64]) -> Option<f64> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std.is_nan() || std <= 0.0 {
        return None;
    }
    Some(std * (n as f64 * 0.75).powf(-0.2))
}

/// Evenly spaced grid from `min - range/2` to `max + range/2`.
pub fn grid(samples: &[f64], points: usize) -> Vec<f64> {
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let (lo, hi) = (min - range / 2.0, max + range / 2.0);
    match points {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (points - 1) as f64;
            (0..points).map(|i| lo + step * i as f64).collect()
        }
    }
}
