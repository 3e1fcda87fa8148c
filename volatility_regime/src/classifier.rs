//! Volatility regime classification.
//!
//! Classification is inherently two-pass: the cut points are quantiles of the
//! whole window's volatility distribution, so no bar can be labeled before
//! every bar has been seen.

use market_data_ingestor::models::bar::DailyBar;
use tracing::{debug, warn};

use crate::models::{Classification, DerivedBar, Regime, RegimeThresholds};
use crate::quantile::{quantile_sorted, sorted_finite};

/// Quantile separating `LowVol` from `MidVol`.
pub const LOW_QUANTILE: f64 = 0.30;
/// Quantile separating `MidVol` from `HighVol`.
pub const HIGH_QUANTILE: f64 = 0.70;

/// Intraday range normalized by the close.
pub fn daily_volatility(bar: &DailyBar) -> Option<f64> {
    (bar.close > 0.0).then(|| (bar.high - bar.low) / bar.close)
}

/// Close-to-close simple return.
pub fn daily_return(prev: &DailyBar, current: &DailyBar) -> Option<f64> {
    (prev.close != 0.0).then(|| (current.close - prev.close) / prev.close)
}

/// Computes volatility and return for every bar, leaving `regime` unset.
pub fn derive(bars: &[DailyBar]) -> Vec<DerivedBar> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| DerivedBar {
            bar: bar.clone(),
            volatility: daily_volatility(bar),
            ret: i
                .checked_sub(1)
                .and_then(|prev| daily_return(&bars[prev], bar)),
            regime: None,
        })
        .collect()
}

/// The 30% / 70% quantiles of all defined volatility values.
///
/// With a single defined value both thresholds collapse onto it; with none
/// there are no thresholds.
pub fn thresholds(derived: &[DerivedBar]) -> Option<RegimeThresholds> {
    let sorted = sorted_finite(derived.iter().filter_map(|b| b.volatility));
    Some(RegimeThresholds {
        low: quantile_sorted(&sorted, LOW_QUANTILE)?,
        high: quantile_sorted(&sorted, HIGH_QUANTILE)?,
    })
}

/// Derives, thresholds and labels a complete ascending bar sequence.
///
/// Every bar with a defined volatility gets exactly one label; bars without
/// one get none. When fewer than two volatility values are defined the
/// window cannot be split and every labeled bar is `MidVol`.
pub fn classify(bars: &[DailyBar]) -> Classification {
    let mut derived = derive(bars);
    let thresholds = thresholds(&derived);
    let defined = derived.iter().filter(|b| b.volatility.is_some()).count();

    let splitter = match thresholds {
        Some(t) if defined >= 2 => {
            debug!(low = t.low, high = t.high, defined, "volatility thresholds");
            Some(t)
        }
        _ => {
            if !bars.is_empty() {
                warn!(
                    bars = bars.len(),
                    defined, "too few volatility values to split the window; labeling MID_VOL"
                );
            }
            None
        }
    };

    for bar in &mut derived {
        bar.regime = bar.volatility.map(|v| match &splitter {
            Some(t) => t.label(v),
            None => Regime::MidVol,
        });
    }

    Classification {
        bars: derived,
        thresholds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, low: f64, high: f64, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn volatility_is_range_over_close() {
        let v = daily_volatility(&bar(1, 95.0, 105.0, 100.0)).unwrap();
        assert!((v - 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_close_has_no_volatility() {
        assert_eq!(daily_volatility(&bar(1, 0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn returns_skip_the_first_bar_and_zero_predecessors() {
        let bars = vec![
            bar(1, 9.0, 11.0, 10.0),
            bar(2, 10.0, 12.0, 11.0),
            bar(3, 0.0, 0.0, 0.0),
            bar(4, 4.0, 6.0, 5.0),
        ];
        let derived = derive(&bars);
        assert_eq!(derived[0].ret, None);
        assert!((derived[1].ret.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(derived[2].ret, Some(-1.0));
        assert_eq!(derived[3].ret, None);
        assert_eq!(derived[2].volatility, None);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let c = classify(&[]);
        assert!(c.bars.is_empty());
        assert_eq!(c.thresholds, None);
    }

    #[test]
    fn single_bar_is_mid_vol_with_collapsed_thresholds() {
        let c = classify(&[bar(1, 95.0, 105.0, 100.0)]);
        assert_eq!(c.bars.len(), 1);
        assert_eq!(c.bars[0].ret, None);
        assert_eq!(c.bars[0].regime, Some(Regime::MidVol));
        let t = c.thresholds.unwrap();
        assert_eq!(t.low, t.high);
    }

    #[test]
    fn single_zero_close_bar_stays_unlabeled() {
        let c = classify(&[bar(1, 0.0, 0.0, 0.0)]);
        assert_eq!(c.bars[0].volatility, None);
        assert_eq!(c.bars[0].regime, None);
        assert_eq!(c.thresholds, None);
    }

    #[test]
    fn one_defined_value_among_many_bars_is_mid_vol() {
        let c = classify(&[bar(1, 0.0, 0.0, 0.0), bar(2, 9.0, 11.0, 10.0), bar(3, 0.0, 0.0, 0.0)]);
        assert_eq!(c.bars[1].regime, Some(Regime::MidVol));
        assert_eq!(c.unlabeled(), 2);
    }

    #[test]
    fn degenerate_distribution_is_all_low_vol() {
        // Every volatility equals both thresholds; the low check wins.
        let bars: Vec<DailyBar> = (1..=6).map(|d| bar(d, 98.0, 102.0, 100.0)).collect();
        let c = classify(&bars);
        let t = c.thresholds.unwrap();
        assert_eq!(t.low, t.high);
        assert_eq!(c.count(Regime::LowVol), 6);
    }

    #[test]
    fn ten_distinct_values_split_three_four_three() {
        let bars: Vec<DailyBar> = (1..=10)
            .map(|d| bar(d, 100.0 - f64::from(d), 100.0, 100.0))
            .collect();
        let c = classify(&bars);
        assert_eq!(c.count(Regime::LowVol), 3);
        assert_eq!(c.count(Regime::MidVol), 4);
        assert_eq!(c.count(Regime::HighVol), 3);
    }

    #[test]
    fn classification_is_deterministic() {
        let bars: Vec<DailyBar> = (1..=20)
            .map(|d| bar(d, 100.0 - f64::from((d * 7) % 11), 101.0, 100.0 + f64::from(d)))
            .collect();
        assert_eq!(classify(&bars), classify(&bars));
    }
}
