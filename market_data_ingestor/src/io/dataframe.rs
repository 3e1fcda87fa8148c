use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::*;
use polars_io::SerWriter;
use polars_io::csv::write::CsvWriter;
use polars_io::ipc::IpcWriter;
use snafu::ResultExt;

use crate::io::sink::{FrameSnafu, SinkError, WriteSnafu, ensure_parent_dir};
use crate::models::bar::DailyBar;

/// On-disk table encodings, chosen from the destination's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    /// Arrow IPC (Feather v2).
    ArrowIpc,
}

impl TableFormat {
    /// `.feather`, `.arrow` and `.ipc` select Arrow IPC; anything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("feather" | "arrow" | "ipc") => Self::ArrowIpc,
            _ => Self::Csv,
        }
    }
}

/// Column names of the raw bar table, in order.
pub const BAR_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Builds a DataFrame with one row per bar and the [`BAR_COLUMNS`] layout.
///
/// Dates are rendered as `YYYY-MM-DD` strings so CSV and IPC outputs agree.
pub fn bars_to_dataframe(bars: &[DailyBar]) -> PolarsResult<DataFrame> {
    df!(
        BAR_COLUMNS[0] => bars.iter().map(|b| b.date.to_string()).collect::<Vec<_>>(),
        BAR_COLUMNS[1] => bars.iter().map(|b| b.open).collect::<Vec<_>>(),
        BAR_COLUMNS[2] => bars.iter().map(|b| b.high).collect::<Vec<_>>(),
        BAR_COLUMNS[3] => bars.iter().map(|b| b.low).collect::<Vec<_>>(),
        BAR_COLUMNS[4] => bars.iter().map(|b| b.close).collect::<Vec<_>>(),
        BAR_COLUMNS[5] => bars.iter().map(|b| b.volume).collect::<Vec<_>>(),
    )
}

/// Writes `df` to `path`, creating parent directories as needed.
///
/// The file is truncated first; nothing time-dependent is embedded, so the
/// same frame always produces the same bytes.
pub fn write_dataframe(df: &mut DataFrame, path: &Path) -> Result<(), SinkError> {
    ensure_parent_dir(path)?;

    let file = File::create(path).context(WriteSnafu { path })?;
    let mut writer = BufWriter::new(file);

    match TableFormat::from_path(path) {
        TableFormat::Csv => CsvWriter::new(&mut writer)
            .include_header(true)
            .finish(df)
            .context(FrameSnafu { path })?,
        TableFormat::ArrowIpc => IpcWriter::new(&mut writer)
            .finish(df)
            .context(FrameSnafu { path })?,
    }

    std::io::Write::flush(&mut writer).context(WriteSnafu { path })
}
