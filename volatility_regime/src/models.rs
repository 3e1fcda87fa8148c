//! Types produced by the classifier and the aggregator.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use market_data_ingestor::models::bar::DailyBar;
use serde::{Deserialize, Serialize};

/// Relative volatility of a day versus the whole observed window.
///
/// The declaration order is the materialization order everywhere
/// (`LOW_VOL`, `MID_VOL`, `HIGH_VOL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    LowVol,
    MidVol,
    HighVol,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::LowVol, Regime::MidVol, Regime::HighVol];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowVol => "LOW_VOL",
            Self::MidVol => "MID_VOL",
            Self::HighVol => "HIGH_VOL",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`DailyBar`] with the values derived from it and its neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedBar {
    pub bar: DailyBar,
    /// `(high - low) / close`; `None` when the close is not positive.
    pub volatility: Option<f64>,
    /// Close-to-close return; `None` for the first bar or after a zero close.
    pub ret: Option<f64>,
    /// `None` until thresholds are known, and forever for bars without a volatility.
    pub regime: Option<Regime>,
}

impl DerivedBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

/// The 30% / 70% volatility cut points of one window. `low <= high` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeThresholds {
    pub low: f64,
    pub high: f64,
}

impl RegimeThresholds {
    /// Labels a volatility value.
    ///
    /// Both bounds are inclusive and the low side is checked first, so a value
    /// sitting on coinciding thresholds is `LowVol`.
    pub fn label(&self, volatility: f64) -> Regime {
        if volatility <= self.low {
            Regime::LowVol
        } else if volatility >= self.high {
            Regime::HighVol
        } else {
            Regime::MidVol
        }
    }
}

/// Output of [`classify`](crate::classifier::classify).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    /// Same length and order as the input bars.
    pub bars: Vec<DerivedBar>,
    /// `None` when no bar has a defined volatility.
    pub thresholds: Option<RegimeThresholds>,
}

impl Classification {
    pub fn count(&self, regime: Regime) -> usize {
        self.bars.iter().filter(|b| b.regime == Some(regime)).count()
    }

    pub fn unlabeled(&self) -> usize {
        self.bars.iter().filter(|b| b.regime.is_none()).count()
    }
}

/// Per-regime means over the defined values of each column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegimeSummary {
    /// Number of bars carrying the label.
    pub days: usize,
    pub mean_return: Option<f64>,
    pub mean_volatility: Option<f64>,
    pub mean_volume: Option<f64>,
}

/// Summaries keyed by regime, holding only regimes with at least one member.
///
/// Iteration follows [`Regime`] order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegimeStats(BTreeMap<Regime, RegimeSummary>);

impl RegimeStats {
    pub fn get(&self, regime: Regime) -> Option<&RegimeSummary> {
        self.0.get(&regime)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Regime, &RegimeSummary)> {
        self.0.iter().map(|(r, s)| (*r, s))
    }

    pub fn regimes(&self) -> Vec<Regime> {
        self.0.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Regime, RegimeSummary)> for RegimeStats {
    fn from_iter<I: IntoIterator<Item = (Regime, RegimeSummary)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_render_in_screaming_case() {
        let rendered: Vec<String> = Regime::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["LOW_VOL", "MID_VOL", "HIGH_VOL"]);
    }

    #[test]
    fn ordering_is_label_order_not_alphabetical() {
        let mut regimes = vec![Regime::HighVol, Regime::LowVol, Regime::MidVol];
        regimes.sort();
        assert_eq!(regimes, Regime::ALL);
    }

    #[test]
    fn threshold_boundaries_favor_the_extremes() {
        let t = RegimeThresholds { low: 0.02, high: 0.05 };
        assert_eq!(t.label(0.01), Regime::LowVol);
        assert_eq!(t.label(0.02), Regime::LowVol);
        assert_eq!(t.label(0.03), Regime::MidVol);
        assert_eq!(t.label(0.05), Regime::HighVol);
        assert_eq!(t.label(0.09), Regime::HighVol);
    }

    #[test]
    fn coinciding_thresholds_resolve_low() {
        let t = RegimeThresholds { low: 0.04, high: 0.04 };
        assert_eq!(t.label(0.04), Regime::LowVol);
        assert_eq!(t.label(0.0400001), Regime::HighVol);
    }

    #[test]
    fn stats_iterate_in_label_order() {
        let stats: RegimeStats = [
            (Regime::HighVol, RegimeSummary::default()),
            (Regime::LowVol, RegimeSummary::default()),
        ]
        .into_iter()
        .collect();
        assert_eq!(stats.regimes(), vec![Regime::LowVol, Regime::HighVol]);
        assert!(stats.get(Regime::MidVol).is_none());
    }
}
