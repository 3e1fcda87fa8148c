//! Run configuration: market, window length and one destination per output.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! reproduces the stock run: 365 daily KRW-BTC candles written under
//! `data/` and `output/`.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]

use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use market_data_ingestor::models::request_params::CandleRequest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKET: &str = "KRW-BTC";
pub const DEFAULT_COUNT: u32 = 365;

/// Everything a run needs to know, passed explicitly into [`crate::pipeline::run`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegimeConfig {
    /// Exchange market code (QUOTE-BASE).
    pub market: String,
    /// Lookback window in daily candles.
    pub count: u32,
    /// Output destinations.
    pub outputs: OutputPaths,
}

/// One path per sink. Each is independently overridable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    /// Raw fetched bars.
    pub bars: PathBuf,
    /// Bars with volatility, return and regime columns.
    pub derived: PathBuf,
    /// Per-regime means.
    pub stats: PathBuf,
    pub price_chart: PathBuf,
    pub volatility_histogram: PathBuf,
    pub return_boxplot: PathBuf,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            market: DEFAULT_MARKET.to_string(),
            count: DEFAULT_COUNT,
            outputs: OutputPaths::default(),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            bars: PathBuf::from("data/btc_data.csv"),
            derived: PathBuf::from("output/regime_bars.csv"),
            stats: PathBuf::from("output/regime_stats.csv"),
            price_chart: PathBuf::from("output/price_with_regimes.png"),
            volatility_histogram: PathBuf::from("output/volatility_hist.png"),
            return_boxplot: PathBuf::from("output/regime_boxplot.png"),
        }
    }
}

impl OutputPaths {
    /// All destinations in the order the pipeline writes them.
    pub fn all(&self) -> [&Path; 6] {
        [
            &self.bars,
            &self.derived,
            &self.stats,
            &self.price_chart,
            &self.volatility_histogram,
            &self.return_boxplot,
        ]
    }
}

impl RegimeConfig {
    /// Rejects configurations no run could satisfy.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.market.trim().is_empty(), "market must not be empty");
        ensure!(self.count >= 1, "count must be at least 1");
        for path in self.outputs.all() {
            ensure!(
                !path.as_os_str().is_empty(),
                "output paths must not be empty"
            );
        }
        Ok(())
    }

    /// The data request this configuration implies: the latest `count` candles.
    pub fn request(&self) -> CandleRequest {
        CandleRequest::latest(self.market.trim(), self.count)
    }
}

/// Parse and validate a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<RegimeConfig> {
    let config: RegimeConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Read a configuration TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<RegimeConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
