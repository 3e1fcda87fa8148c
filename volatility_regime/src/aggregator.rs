//! Per-regime summary statistics.

use std::collections::BTreeMap;

use crate::models::{DerivedBar, Regime, RegimeStats, RegimeSummary};

#[derive(Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.n += 1;
        }
    }

    fn finish(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

#[derive(Default)]
struct Accumulator {
    days: usize,
    ret: Mean,
    volatility: Mean,
    volume: Mean,
}

/// Groups labeled bars by regime and averages return, volatility and volume.
///
/// Unlabeled bars are skipped. Each mean only covers the defined values of its
/// column, so the first bar of a window adds to its regime's volatility and
/// volume means but never to the return mean.
pub fn aggregate(bars: &[DerivedBar]) -> RegimeStats {
    let mut groups: BTreeMap<Regime, Accumulator> = BTreeMap::new();
    for bar in bars {
        let Some(regime) = bar.regime else {
            continue;
        };
        let acc = groups.entry(regime).or_default();
        acc.days += 1;
        acc.ret.push(bar.ret);
        acc.volatility.push(bar.volatility);
        acc.volume.push(Some(bar.bar.volume));
    }

    groups
        .into_iter()
        .map(|(regime, acc)| {
            (
                regime,
                RegimeSummary {
                    days: acc.days,
                    mean_return: acc.ret.finish(),
                    mean_volatility: acc.volatility.finish(),
                    mean_volume: acc.volume.finish(),
                },
            )
        })
        .collect()
}
