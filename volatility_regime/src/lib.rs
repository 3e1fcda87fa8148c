//! Daily volatility regimes.
//!
//! Bars come in from a [`DataProvider`](market_data_ingestor::providers::DataProvider),
//! [`classifier`] derives volatility and returns and labels each day against
//! whole-window quantiles, [`aggregator`] summarizes each regime, and the
//! [`sinks`] and [`charts`] write the results out. [`pipeline`] wires the
//! stages together under a [`RegimeConfig`](config::RegimeConfig).

pub mod aggregator;
pub mod charts;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod quantile;
pub mod sinks;

pub use aggregator::aggregate;
pub use classifier::classify;
pub use config::{OutputPaths, RegimeConfig};
pub use models::{Classification, DerivedBar, Regime, RegimeStats, RegimeSummary, RegimeThresholds};
pub use pipeline::{PipelineError, RunReport, Stage};
