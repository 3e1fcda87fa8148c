use std::path::{Path, PathBuf};

use image::RgbImage;
use market_data_ingestor::io::sink::{DataSink, SinkError};
use tracing::info;

use crate::charts::{
    Scale, blank_chart, colors, draw_legend, draw_line, draw_marker, regime_color,
    regimes_present, save_png,
};
use crate::models::DerivedBar;

pub const WIDTH: u32 = 1600;
pub const HEIGHT: u32 = 600;
const MARKER_RADIUS: u32 = 3;

/// Close price over time with one marker per labeled day in its regime's color.
pub fn render(bars: &[DerivedBar]) -> RgbImage {
    let (mut img, area) = blank_chart(WIDTH, HEIGHT);
    let Some(scale) = Scale::fit(bars.iter().map(|b| b.bar.close)) else {
        return img;
    };

    let last = bars.len().saturating_sub(1);
    let point = |i: usize, close: f64| {
        let x = if last == 0 { 0.5 } else { i as f64 / last as f64 };
        (area.x_at(x), area.y_at(scale.fraction(close)))
    };

    for (i, pair) in bars.windows(2).enumerate() {
        let from = point(i, pair[0].bar.close);
        let to = point(i + 1, pair[1].bar.close);
        draw_line(&mut img, from, to, colors::LINE);
    }

    for (i, bar) in bars.iter().enumerate() {
        if let Some(regime) = bar.regime {
            let (x, y) = point(i, bar.bar.close);
            draw_marker(&mut img, x, y, MARKER_RADIUS, regime_color(regime));
        }
    }
    draw_legend(&mut img, &regimes_present(bars));
    img
}

#[derive(Debug, Clone)]
pub struct PriceChartSink {
    path: PathBuf,
}

impl PriceChartSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSink<[DerivedBar]> for PriceChartSink {
    type Output = PathBuf;

    fn write(&self, data: &[DerivedBar]) -> Result<PathBuf, SinkError> {
        save_png(&render(data), &self.path)?;
        info!(points = data.len(), path = %self.path.display(), "wrote price chart");
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::PlotArea;
    use crate::classifier::classify;
    use crate::models::Regime;
    use chrono::NaiveDate;
    use market_data_ingestor::models::bar::DailyBar;

    fn bar(day: u32, low: f64, high: f64, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    fn three_regimes() -> Vec<DerivedBar> {
        // volatilities 0.02, 0.1, 0.2
        classify(&[
            bar(1, 99.0, 101.0, 100.0),
            bar(2, 104.5, 115.5, 110.0),
            bar(3, 108.0, 132.0, 120.0),
        ])
        .bars
    }

    #[test]
    fn markers_sit_on_the_close_in_regime_color() {
        let bars = three_regimes();
        assert_eq!(regimes_present(&bars), Regime::ALL);

        let img = render(&bars);
        let area = PlotArea::for_image(WIDTH, HEIGHT);
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(*img.get_pixel(area.x_at(0.0), area.y_at(0.0)), colors::BLUE);
        assert_eq!(*img.get_pixel(area.x_at(0.5), area.y_at(0.5)), colors::GRAY);
        assert_eq!(*img.get_pixel(area.x_at(1.0), area.y_at(1.0)), colors::RED);
    }

    #[test]
    fn absent_regimes_leave_no_color() {
        let bars: Vec<DerivedBar> = three_regimes()
            .into_iter()
            .map(|mut b| {
                b.regime = Some(Regime::LowVol);
                b
            })
            .collect();
        let img = render(&bars);
        assert!(img.pixels().all(|p| *p != colors::RED && *p != colors::GRAY));
    }

    #[test]
    fn empty_series_is_a_blank_chart() {
        let img = render(&[]);
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
    }

    #[test]
    fn rewriting_produces_identical_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = PriceChartSink::new(tmp.path().join("output/price.png"));
        let bars = three_regimes();
        let path = sink.write(&bars).unwrap();
        let first = std::fs::read(&path).unwrap();
        sink.write(&bars).unwrap();
        assert_eq!(first, std::fs::read(&path).unwrap());
    }
}
