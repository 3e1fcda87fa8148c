use std::path::{Path, PathBuf};

use image::RgbImage;
use market_data_ingestor::io::sink::{DataSink, SinkError};
use tracing::info;

use crate::charts::{Scale, blank_chart, colors, draw_filled_rect, save_png};
use crate::models::DerivedBar;

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 500;
pub const BINS: usize = 30;

/// Counts `values` into `bins` equal-width bins spanning their range.
///
/// The maximum falls into the last bin. A zero-width range is widened around
/// its value, so identical values share the middle bin.
pub fn bin_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(scale), Some(last)) = (Scale::fit(finite.iter().copied()), bins.checked_sub(1)) else {
        return counts;
    };
    if finite.iter().all(|v| *v == finite[0]) {
        counts[bins / 2] = finite.len();
        return counts;
    }
    for v in finite {
        let idx = (scale.fraction(v) * bins as f64).floor() as usize;
        counts[idx.min(last)] += 1;
    }
    counts
}

/// Distribution of the defined daily volatility values.
pub fn render(bars: &[DerivedBar]) -> RgbImage {
    let (mut img, area) = blank_chart(WIDTH, HEIGHT);
    let values: Vec<f64> = bars.iter().filter_map(|b| b.volatility).collect();
    let counts = bin_counts(&values, BINS);
    let Some(&tallest) = counts.iter().max().filter(|m| **m > 0) else {
        return img;
    };

    for (i, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x0 = area.x_at(i as f64 / BINS as f64);
        let x1 = area.x_at((i + 1) as f64 / BINS as f64);
        let top = area.y_at(count as f64 / tallest as f64);
        // one pixel gap between neighbouring bars
        let width = x1.saturating_sub(x0).saturating_sub(1).max(1);
        draw_filled_rect(&mut img, x0 + 1, top, width, area.bottom() - top, colors::STEEL);
    }
    img
}

#[derive(Debug, Clone)]
pub struct VolatilityHistogramSink {
    path: PathBuf,
}

impl VolatilityHistogramSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSink<[DerivedBar]> for VolatilityHistogramSink {
    type Output = PathBuf;

    fn write(&self, data: &[DerivedBar]) -> Result<PathBuf, SinkError> {
        save_png(&render(data), &self.path)?;
        info!(bins = BINS, path = %self.path.display(), "wrote volatility histogram");
        Ok(self.path.clone())
    }
}
