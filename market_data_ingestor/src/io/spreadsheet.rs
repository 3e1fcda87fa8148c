use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tracing::info;

use crate::io::dataframe::{bars_to_dataframe, write_dataframe};
use crate::io::sink::{DataSink, FrameSnafu, SinkError};
use crate::models::bar::BarSeries;

/// Writes a fetched series as a flat table, one row per bar.
#[derive(Debug, Clone)]
pub struct BarSpreadsheetSink {
    path: PathBuf,
}

impl BarSpreadsheetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSink<BarSeries> for BarSpreadsheetSink {
    type Output = PathBuf;

    fn write(&self, data: &BarSeries) -> Result<PathBuf, SinkError> {
        let mut df = bars_to_dataframe(&data.bars).context(FrameSnafu { path: &self.path })?;
        write_dataframe(&mut df, &self.path)?;
        info!(market = %data.market, rows = data.len(), path = %self.path.display(), "wrote bar spreadsheet");
        Ok(self.path.clone())
    }
}
