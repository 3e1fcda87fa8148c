use std::path::{Path, PathBuf};

use market_data_ingestor::io::dataframe::{BAR_COLUMNS, write_dataframe};
use market_data_ingestor::io::sink::{DataSink, FrameSnafu, SinkError};
use polars::prelude::*;
use snafu::ResultExt;
use tracing::info;

use crate::models::DerivedBar;

/// Column names of the derived bar table, in order.
pub const DERIVED_COLUMNS: [&str; 9] = [
    BAR_COLUMNS[0],
    BAR_COLUMNS[1],
    BAR_COLUMNS[2],
    BAR_COLUMNS[3],
    BAR_COLUMNS[4],
    BAR_COLUMNS[5],
    "volatility",
    "return",
    "regime",
];

/// Builds the derived table; undefined values become nulls.
pub fn derived_to_dataframe(bars: &[DerivedBar]) -> PolarsResult<DataFrame> {
    df!(
        DERIVED_COLUMNS[0] => bars.iter().map(|b| b.date().to_string()).collect::<Vec<_>>(),
        DERIVED_COLUMNS[1] => bars.iter().map(|b| b.bar.open).collect::<Vec<_>>(),
        DERIVED_COLUMNS[2] => bars.iter().map(|b| b.bar.high).collect::<Vec<_>>(),
        DERIVED_COLUMNS[3] => bars.iter().map(|b| b.bar.low).collect::<Vec<_>>(),
        DERIVED_COLUMNS[4] => bars.iter().map(|b| b.bar.close).collect::<Vec<_>>(),
        DERIVED_COLUMNS[5] => bars.iter().map(|b| b.bar.volume).collect::<Vec<_>>(),
        DERIVED_COLUMNS[6] => bars.iter().map(|b| b.volatility).collect::<Vec<Option<f64>>>(),
        DERIVED_COLUMNS[7] => bars.iter().map(|b| b.ret).collect::<Vec<Option<f64>>>(),
        DERIVED_COLUMNS[8] => bars
            .iter()
            .map(|b| b.regime.map(|r| r.as_str()))
            .collect::<Vec<Option<&str>>>(),
    )
}

/// Writes every derived bar, labeled or not, one row per day.
#[derive(Debug, Clone)]
pub struct DerivedBarSink {
    path: PathBuf,
}

impl DerivedBarSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSink<[DerivedBar]> for DerivedBarSink {
    type Output = PathBuf;

    fn write(&self, data: &[DerivedBar]) -> Result<PathBuf, SinkError> {
        let mut df = derived_to_dataframe(data).context(FrameSnafu { path: &self.path })?;
        write_dataframe(&mut df, &self.path)?;
        info!(rows = data.len(), path = %self.path.display(), "wrote derived bars");
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use chrono::NaiveDate;
    use market_data_ingestor::models::bar::DailyBar;

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
    fn header_and_empty_cells() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/derived.csv");
        let classification = classify(&[bar(1, 0.0, 0.0, 0.0), bar(2, 9.0, 11.0, 10.0)]);

        DerivedBarSink::new(&path).write(&classification.bars).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,open,high,low,close,volume,volatility,return,regime"
        );
        // zero close: no volatility, no label; first bar: no return
        assert_eq!(lines[1], "2025-03-01,0.0,0.0,0.0,0.0,1.0,,,");
        // return after a zero close is undefined too
        assert!(lines[2].starts_with("2025-03-02,"));
        assert!(lines[2].ends_with(",0.2,,MID_VOL"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn rewriting_produces_identical_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("derived.csv");
        let bars: Vec<DailyBar> = (1..=6)
            .map(|d| bar(d, 95.0, 100.0 + f64::from(d), 98.0 + f64::from(d)))
            .collect();
        let classification = classify(&bars);
        let sink = DerivedBarSink::new(&path);

        sink.write(&classification.bars).unwrap();
        let first = std::fs::read(&path).unwrap();
        sink.write(&classification.bars).unwrap();
        assert_eq!(first, std::fs::read(&path).unwrap());
    }

    #[test]
    fn empty_series_writes_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("derived.csv");
        DerivedBarSink::new(&path).write(&[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
