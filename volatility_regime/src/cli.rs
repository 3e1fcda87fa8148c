use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{RegimeConfig, load_config_path};

/// Classify daily volatility regimes for a market and write tables and charts.
#[derive(Parser, Debug, Default)]
#[command(name = "volatility-regime", author, version, about)]
pub struct Cli {
    /// Path to a TOML config file; built-in defaults are used without one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Market code, QUOTE-BASE (default "KRW-BTC")
    #[arg(long)]
    pub market: Option<String>,

    /// Lookback window in daily candles (default 365)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Raw bar table destination
    #[arg(long)]
    pub bars_out: Option<PathBuf>,

    /// Derived bar table destination
    #[arg(long)]
    pub derived_out: Option<PathBuf>,

    /// Regime statistics table destination
    #[arg(long)]
    pub stats_out: Option<PathBuf>,

    /// Price chart destination (PNG)
    #[arg(long)]
    pub price_chart: Option<PathBuf>,

    /// Volatility histogram destination (PNG)
    #[arg(long)]
    pub volatility_hist: Option<PathBuf>,

    /// Return boxplot destination (PNG)
    #[arg(long)]
    pub return_boxplot: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file (if any) and applies command-line overrides on top.
    pub fn resolve(&self) -> anyhow::Result<RegimeConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_path(path)?,
            None => RegimeConfig::default(),
        };

        if let Some(market) = &self.market {
            config.market = market.clone();
        }
        if let Some(count) = self.count {
            config.count = count;
        }

        let outputs = &mut config.outputs;
        let overrides = [
            (&self.bars_out, &mut outputs.bars),
            (&self.derived_out, &mut outputs.derived),
            (&self.stats_out, &mut outputs.stats),
            (&self.price_chart, &mut outputs.price_chart),
            (&self.volatility_hist, &mut outputs.volatility_histogram),
            (&self.return_boxplot, &mut outputs.return_boxplot),
        ];
        for (value, slot) in overrides {
            if let Some(path) = value {
                *slot = path.clone();
            }
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_is_the_default_config() {
        let cli = Cli::try_parse_from(["volatility-regime"]).unwrap();
        assert_eq!(cli.resolve().unwrap(), RegimeConfig::default());
    }

    #[test]
    fn flags_override_file_values() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("c.toml");
        std::fs::write(&file, "market = \"KRW-ETH\"\ncount = 100\n").unwrap();

        let cli = Cli::try_parse_from([
            "volatility-regime",
            "--config",
            file.to_str().unwrap(),
            "--count",
            "50",
            "--stats-out",
            "elsewhere/stats.csv",
        ])
        .unwrap();
        let config = cli.resolve().unwrap();

        assert_eq!(config.market, "KRW-ETH");
        assert_eq!(config.count, 50);
        assert_eq!(config.outputs.stats, PathBuf::from("elsewhere/stats.csv"));
        assert_eq!(config.outputs.bars, PathBuf::from("data/btc_data.csv"));
    }

    #[test]
    fn blank_market_override_is_rejected() {
        let cli = Cli {
            market: Some(String::new()),
            ..Default::default()
        };
        assert!(cli.resolve().is_err());
    }

    #[test]
    fn zero_count_flag_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["volatility-regime", "--count", "0"]).is_err());
    }
}
