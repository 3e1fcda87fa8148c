use std::path::{Path, PathBuf};

use image::RgbImage;
use market_data_ingestor::io::sink::{DataSink, SinkError};
use tracing::info;

use crate::charts::{
    PlotArea, Scale, blank_chart, colors, draw_filled_rect, draw_horizontal_line, draw_legend,
    draw_marker, draw_vertical_line, regime_color,
};
use crate::models::{DerivedBar, Regime};
use crate::quantile::{quantile_sorted, sorted_finite};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 500;
/// Whiskers reach the most extreme value within this many IQRs of the box.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary plus the values beyond the whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when there are no finite values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let sorted = sorted_finite(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let reach = WHISKER_IQR * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

        let inside = || sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
        Some(Self {
            q1,
            median,
            q3,
            lower_whisker: inside().next().unwrap_or(q1),
            upper_whisker: inside().last().unwrap_or(q3),
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| !(lo_fence..=hi_fence).contains(v))
                .collect(),
        })
    }
}

/// Daily returns of each present regime, one box per regime in label order.
pub fn render(bars: &[DerivedBar]) -> RgbImage {
    let (mut img, area) = blank_chart(WIDTH, HEIGHT);

    let boxes: Vec<(Regime, BoxStats)> = Regime::ALL
        .into_iter()
        .filter_map(|regime| {
            let returns = bars
                .iter()
                .filter(|b| b.regime == Some(regime))
                .filter_map(|b| b.ret);
            BoxStats::from_values(returns).map(|stats| (regime, stats))
        })
        .collect();

    let Some(scale) = Scale::fit(boxes.iter().flat_map(|(_, s)| {
        [s.lower_whisker, s.upper_whisker]
            .into_iter()
            .chain(s.outliers.iter().copied())
    })) else {
        return img;
    };

    if (scale.min..=scale.max).contains(&0.0) {
        let zero = area.y_at(scale.fraction(0.0));
        draw_horizontal_line(&mut img, zero, area.left + 1, area.right() - 1, colors::GRID);
    }

    let slots = boxes.len() as f64;
    for (slot, (regime, stats)) in boxes.iter().enumerate() {
        let center = area.x_at((slot as f64 + 0.5) / slots);
        draw_box(&mut img, &area, &scale, center, stats, regime_color(*regime));
    }

    let present: Vec<Regime> = boxes.iter().map(|(r, _)| *r).collect();
    draw_legend(&mut img, &present);
    img
}

fn draw_box(
    img: &mut RgbImage,
    area: &PlotArea,
    scale: &Scale,
    center: u32,
    stats: &BoxStats,
    fill: image::Rgb<u8>,
) {
    let half = (area.width / 8).max(2);
    let cap = half / 2;
    let y = |v: f64| area.y_at(scale.fraction(v));
    let (left, right) = (center.saturating_sub(half), center + half);

    draw_vertical_line(img, center, y(stats.lower_whisker), y(stats.q1), colors::BLACK);
    draw_vertical_line(img, center, y(stats.q3), y(stats.upper_whisker), colors::BLACK);
    draw_horizontal_line(img, y(stats.lower_whisker), center - cap, center + cap, colors::BLACK);
    draw_horizontal_line(img, y(stats.upper_whisker), center - cap, center + cap, colors::BLACK);

    let (top, bottom) = (y(stats.q3), y(stats.q1));
    draw_filled_rect(img, left, top, right - left + 1, bottom - top + 1, fill);
    draw_horizontal_line(img, top, left, right, colors::BLACK);
    draw_horizontal_line(img, bottom, left, right, colors::BLACK);
    draw_vertical_line(img, left, top, bottom, colors::BLACK);
    draw_vertical_line(img, right, top, bottom, colors::BLACK);
    draw_horizontal_line(img, y(stats.median), left, right, colors::BLACK);

    for outlier in &stats.outliers {
        draw_marker(img, center, y(*outlier), 2, colors::BLACK);
    }
}

#[derive(Debug, Clone)]
pub struct ReturnBoxplotSink {
    path: PathBuf,
}

impl ReturnBoxplotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSink<[DerivedBar]> for ReturnBoxplotSink {
    type Output = PathBuf;

    fn write(&self, data: &[DerivedBar]) -> Result<PathBuf, SinkError> {
        crate::charts::save_png(&render(data), &self.path)?;
        info!(path = %self.path.display(), "wrote return boxplot");
        Ok(self.path.clone())
    }
}
