//! Canonical in-memory representation of a daily OHLCV bar.
//!
//! This struct is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! implementation, regardless of the exchange it talks to.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single trading day of aggregated market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Calendar date of the candle (exchange-local).
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price of the day.
    pub high: f64,

    /// Lowest price of the day.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Base-asset volume traded during the day.
    pub volume: f64,
}

/// A complete, ascending set of daily bars for one market.
///
/// A series returned by a provider is treated as a final snapshot for the run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarSeries {
    /// The market this data represents (e.g., "KRW-BTC").
    pub market: String,
    /// The bars, strictly ascending by date.
    pub bars: Vec<DailyBar>,
}

impl BarSeries {
    pub fn new(market: impl Into<String>, bars: Vec<DailyBar>) -> Self {
        Self {
            market: market.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Checks the structural invariants every consumer relies on.
    ///
    /// Dates must be strictly increasing, prices and volume finite and non-negative,
    /// and `high >= low`. Returns a human-readable description of the first violation.
    pub fn check_shape(&self) -> Result<(), String> {
        for (i, bar) in self.bars.iter().enumerate() {
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ];
            if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
                return Err(format!("{}: {name} is {value} on {}", self.market, bar.date));
            }
            if bar.high < bar.low {
                return Err(format!(
                    "{}: high {} below low {} on {}",
                    self.market, bar.high, bar.low, bar.date
                ));
            }
            if i > 0 && self.bars[i - 1].date >= bar.date {
                return Err(format!(
                    "{}: dates not strictly increasing ({} then {})",
                    self.market,
                    self.bars[i - 1].date,
                    bar.date
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, low: f64, high: f64, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn well_formed_series_passes() {
        let series = BarSeries::new("KRW-BTC", vec![bar(1, 9.0, 11.0, 10.0), bar(2, 9.5, 12.0, 11.0)]);
        assert!(series.check_shape().is_ok());
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn empty_series_passes() {
        assert!(BarSeries::new("KRW-BTC", vec![]).check_shape().is_ok());
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let series = BarSeries::new("KRW-BTC", vec![bar(1, 9.0, 11.0, 10.0), bar(1, 9.0, 11.0, 10.0)]);
        let msg = series.check_shape().unwrap_err();
        assert!(msg.contains("strictly increasing"), "{msg}");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let series = BarSeries::new("KRW-BTC", vec![bar(1, 12.0, 11.0, 11.5)]);
        assert!(series.check_shape().unwrap_err().contains("below low"));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut b = bar(1, 9.0, 11.0, 10.0);
        b.volume = f64::NAN;
        let msg = BarSeries::new("KRW-BTC", vec![b]).check_shape().unwrap_err();
        assert!(msg.contains("volume"), "{msg}");
    }
}
