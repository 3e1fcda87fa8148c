//! PNG chart sinks over a classified series.
//!
//! Charts are plain raster plots drawn straight onto an [`RgbImage`]: axes,
//! grid lines, data marks and a swatch legend, no text. Every chart is a
//! [`DataSink`](market_data_ingestor::io::sink::DataSink) over `[DerivedBar]`
//! and renders deterministically, so rewriting yields identical bytes.

pub mod boxplot;
pub mod histogram;
pub mod price;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{Rgb, RgbImage};
use market_data_ingestor::io::sink::{RenderSnafu, SinkError, WriteSnafu, ensure_parent_dir};
use snafu::ResultExt;

use crate::models::{DerivedBar, Regime};

pub use boxplot::ReturnBoxplotSink;
pub use histogram::VolatilityHistogramSink;
pub use price::PriceChartSink;

pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);
    pub const LINE: Rgb<u8> = Rgb([60, 60, 60]);
    pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
    pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
    pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
    pub const STEEL: Rgb<u8> = Rgb([70, 130, 180]);
}

pub fn regime_color(regime: Regime) -> Rgb<u8> {
    match regime {
        Regime::LowVol => colors::BLUE,
        Regime::MidVol => colors::GRAY,
        Regime::HighVol => colors::RED,
    }
}

/// Regimes carried by at least one bar, in label order.
pub fn regimes_present(bars: &[DerivedBar]) -> Vec<Regime> {
    Regime::ALL
        .into_iter()
        .filter(|r| bars.iter().any(|b| b.regime == Some(*r)))
        .collect()
}

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 40;
const GRID_LINES: u32 = 5;

/// Linear mapping of a value range onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// Spans the finite values given; a zero-width range is padded around its value.
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min > max {
            return None;
        }
        if min == max {
            let pad = if min == 0.0 { 0.5 } else { min.abs() * 0.05 };
            return Some(Self { min: min - pad, max: max + pad });
        }
        Some(Self { min, max })
    }

    pub fn fraction(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// The rectangle inside the margins where data is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PlotArea {
    pub fn for_image(width: u32, height: u32) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: width.saturating_sub(MARGIN_LEFT + MARGIN_RIGHT).max(1),
            height: height.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM).max(1),
        }
    }

    pub fn right(&self) -> u32 {
        self.left + self.width - 1
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height - 1
    }

    /// Pixel column for a horizontal fraction in `[0, 1]`.
    pub fn x_at(&self, fraction: f64) -> u32 {
        self.left + (fraction.clamp(0.0, 1.0) * f64::from(self.width - 1)).round() as u32
    }

    /// Pixel row for a vertical fraction in `[0, 1]`, 0 at the bottom.
    pub fn y_at(&self, fraction: f64) -> u32 {
        self.bottom() - (fraction.clamp(0.0, 1.0) * f64::from(self.height - 1)).round() as u32
    }
}

/// A white canvas with horizontal grid lines and a framed plot area.
pub fn blank_chart(width: u32, height: u32) -> (RgbImage, PlotArea) {
    let mut img = RgbImage::from_pixel(width, height, colors::WHITE);
    let area = PlotArea::for_image(width, height);
    for i in 1..GRID_LINES {
        let y = area.y_at(f64::from(i) / f64::from(GRID_LINES));
        draw_horizontal_line(&mut img, y, area.left, area.right(), colors::GRID);
        draw_horizontal_line(&mut img, y, area.left.saturating_sub(5), area.left, colors::BLACK);
    }
    draw_frame(&mut img, &area, colors::BLACK);
    (img, area)
}

pub fn draw_frame(img: &mut RgbImage, area: &PlotArea, color: Rgb<u8>) {
    draw_horizontal_line(img, area.top, area.left, area.right(), color);
    draw_horizontal_line(img, area.bottom(), area.left, area.right(), color);
    draw_vertical_line(img, area.left, area.top, area.bottom(), color);
    draw_vertical_line(img, area.right(), area.top, area.bottom(), color);
}

/// One filled swatch per regime, right-aligned in the top margin.
pub fn draw_legend(img: &mut RgbImage, regimes: &[Regime]) {
    const SWATCH: u32 = 14;
    const GAP: u32 = 10;
    let mut x = img
        .width()
        .saturating_sub(MARGIN_RIGHT + regimes.len() as u32 * (SWATCH + GAP));
    let y = (MARGIN_TOP - SWATCH) / 2;
    for regime in regimes {
        draw_filled_rect(img, x, y, SWATCH, SWATCH, regime_color(*regime));
        x += SWATCH + GAP;
    }
}

pub fn draw_filled_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(img.width());
    let y_end = y.saturating_add(height).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

pub fn draw_vertical_line(img: &mut RgbImage, x: u32, y1: u32, y2: u32, color: Rgb<u8>) {
    if x >= img.width() || img.height() == 0 {
        return;
    }
    let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    for y in start..=end.min(img.height() - 1) {
        img.put_pixel(x, y, color);
    }
}

pub fn draw_horizontal_line(img: &mut RgbImage, y: u32, x1: u32, x2: u32, color: Rgb<u8>) {
    if y >= img.height() || img.width() == 0 {
        return;
    }
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    for x in start..=end.min(img.width() - 1) {
        img.put_pixel(x, y, color);
    }
}

/// Bresenham segment; pixels outside the image are skipped.
pub fn draw_line(img: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    let (x1, y1) = (i64::from(from.0), i64::from(from.1));
    let (x2, y2) = (i64::from(to.0), i64::from(to.1));
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (x1, y1);

    loop {
        put_checked(img, x, y, color);
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Filled disc centred on `(x, y)`.
pub fn draw_marker(img: &mut RgbImage, x: u32, y: u32, radius: u32, color: Rgb<u8>) {
    let r = i64::from(radius);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_checked(img, i64::from(x) + dx, i64::from(y) + dy, color);
            }
        }
    }
}

fn put_checked(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(img.width()) && y < i64::from(img.height()) {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Encodes `img` as PNG at `path`, creating parent directories first.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), SinkError> {
    ensure_parent_dir(path)?;
    let file = File::create(path).context(WriteSnafu { path })?;
    let mut writer = BufWriter::new(file);
    img.write_with_encoder(PngEncoder::new(&mut writer))
        .map_err(|e| {
            RenderSnafu {
                path,
                message: e.to_string(),
            }
            .build()
        })?;
    writer.flush().context(WriteSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_pads_a_single_value() {
        let s = Scale::fit([2.0, 2.0]).unwrap();
        assert!(s.min < 2.0 && s.max > 2.0);
        assert!((s.fraction(2.0) - 0.5).abs() < 1e-12);
        assert_eq!(Scale::fit([0.0]).unwrap(), Scale { min: -0.5, max: 0.5 });
    }

    #[test]
    fn scale_of_nothing_is_none() {
        assert_eq!(Scale::fit(std::iter::empty()), None);
        assert_eq!(Scale::fit([f64::NAN]), None);
    }

    #[test]
    fn plot_area_maps_fractions_to_corners() {
        let area = PlotArea::for_image(200, 100);
        assert_eq!(area.x_at(0.0), area.left);
        assert_eq!(area.x_at(1.0), area.right());
        assert_eq!(area.y_at(0.0), area.bottom());
        assert_eq!(area.y_at(1.0), area.top);
    }

    #[test]
    fn line_reaches_both_endpoints() {
        let mut img = RgbImage::new(20, 20);
        draw_line(&mut img, (2, 15), (17, 3), colors::RED);
        assert_eq!(*img.get_pixel(2, 15), colors::RED);
        assert_eq!(*img.get_pixel(17, 3), colors::RED);
    }

    #[test]
    fn drawing_clips_at_the_border() {
        let mut img = RgbImage::new(10, 10);
        draw_marker(&mut img, 0, 9, 3, colors::BLUE);
        draw_filled_rect(&mut img, 8, 8, 10, 10, colors::GRAY);
        draw_horizontal_line(&mut img, 5, 3, 50, colors::BLACK);
        assert_eq!(*img.get_pixel(0, 9), colors::BLUE);
        assert_eq!(*img.get_pixel(9, 9), colors::GRAY);
        assert_eq!(*img.get_pixel(9, 5), colors::BLACK);
    }

    #[test]
    fn png_is_written_under_new_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("charts/nested/blank.png");
        let (img, _) = blank_chart(120, 90);
        save_png(&img, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
