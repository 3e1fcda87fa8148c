use std::path::{Path, PathBuf};

use market_data_ingestor::io::dataframe::write_dataframe;
use market_data_ingestor::io::sink::{DataSink, FrameSnafu, SinkError};
use polars::prelude::*;
use snafu::ResultExt;
use tracing::info;

use crate::models::RegimeStats;

pub const STATS_COLUMNS: [&str; 4] = ["regime", "mean_return", "mean_volatility", "mean_volume"];

/// One row per present regime, in label order.
pub fn stats_to_dataframe(stats: &RegimeStats) -> PolarsResult<DataFrame> {
    df!(
        STATS_COLUMNS[0] => stats.iter().map(|(r, _)| r.as_str()).collect::<Vec<_>>(),
        STATS_COLUMNS[1] => stats.iter().map(|(_, s)| s.mean_return).collect::<Vec<Option<f64>>>(),
        STATS_COLUMNS[2] => stats.iter().map(|(_, s)| s.mean_volatility).collect::<Vec<Option<f64>>>(),
        STATS_COLUMNS[3] => stats.iter().map(|(_, s)| s.mean_volume).collect::<Vec<Option<f64>>>(),
    )
}

/// Writes the regime statistics table.
#[derive(Debug, Clone)]
pub struct StatsSink {
    path: PathBuf,
}

impl StatsSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSink<RegimeStats> for StatsSink {
    type Output = PathBuf;

    fn write(&self, data: &RegimeStats) -> Result<PathBuf, SinkError> {
        let mut df = stats_to_dataframe(data).context(FrameSnafu { path: &self.path })?;
        write_dataframe(&mut df, &self.path)?;
        info!(regimes = data.len(), path = %self.path.display(), "wrote regime stats");
        Ok(self.path.clone())
    }
}
