//! One end-to-end run: fetch, export the raw bars, classify, aggregate,
//! then fan out to the remaining sinks in order.
//!
//! Sinks run sequentially, so when one fails everything written before it
//! stays on disk and the error names the failing stage.

use std::fmt;
use std::path::PathBuf;

use market_data_ingestor::io::sink::{DataSink, SinkError};
use market_data_ingestor::io::spreadsheet::BarSpreadsheetSink;
use market_data_ingestor::models::bar::DailyBar;
use market_data_ingestor::providers::{DataProvider, ProviderError};
use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::aggregator::aggregate;
use crate::charts::{PriceChartSink, ReturnBoxplotSink, VolatilityHistogramSink};
use crate::classifier::classify;
use crate::config::RegimeConfig;
use crate::models::{Classification, Regime, RegimeStats, RegimeThresholds};
use crate::sinks::{DerivedBarSink, StatsSink};

/// A named step of the run, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    RawBars,
    DerivedBars,
    Stats,
    PriceChart,
    VolatilityHistogram,
    ReturnBoxplot,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::RawBars => "export raw bars",
            Self::DerivedBars => "export derived bars",
            Self::Stats => "export regime stats",
            Self::PriceChart => "render price chart",
            Self::VolatilityHistogram => "render volatility histogram",
            Self::ReturnBoxplot => "render return boxplot",
        })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PipelineError {
    #[snafu(display("fetch failed for {market}: {source}"))]
    Fetch {
        market: String,
        source: ProviderError,
    },

    #[snafu(display("{stage} failed: {source}"))]
    Export { stage: Stage, source: SinkError },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Fetch { .. } => Stage::Fetch,
            Self::Export { stage, .. } => *stage,
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub market: String,
    pub bars: usize,
    /// Bars left without a label because their volatility is undefined.
    pub unlabeled: usize,
    pub thresholds: Option<RegimeThresholds>,
    pub stats: RegimeStats,
    /// Every file written, in write order.
    pub outputs: Vec<PathBuf>,
}

/// Classifies `bars` and summarizes each regime. Pure; no I/O.
pub fn analyze(bars: &[DailyBar]) -> (Classification, RegimeStats) {
    let classification = classify(bars);
    let stats = aggregate(&classification.bars);
    (classification, stats)
}

pub async fn run<P>(config: &RegimeConfig, provider: &P) -> Result<RunReport, PipelineError>
where
    P: DataProvider + Sync + ?Sized,
{
    let request = config.request();
    let outputs = &config.outputs;

    info!(market = %request.market, count = request.count, "[STEP 1] fetching daily candles");
    let series = provider
        .fetch_daily_bars(&request)
        .await
        .context(FetchSnafu {
            market: &request.market,
        })?;

    info!(bars = series.len(), "[STEP 2] saving raw bars");
    let mut written = Vec::with_capacity(outputs.all().len());
    written.push(export(Stage::RawBars, &BarSpreadsheetSink::new(&outputs.bars), &series)?);

    info!("[STEP 3] classifying volatility regimes");
    let (classification, stats) = analyze(&series.bars);
    if let Some(t) = classification.thresholds {
        info!(low = t.low, high = t.high, "volatility thresholds");
    }
    for regime in Regime::ALL {
        info!(regime = %regime, days = classification.count(regime), "regime size");
    }

    info!("[STEP 4] writing derived bars and regime stats");
    let derived = classification.bars.as_slice();
    written.push(export(Stage::DerivedBars, &DerivedBarSink::new(&outputs.derived), derived)?);
    written.push(export(Stage::Stats, &StatsSink::new(&outputs.stats), &stats)?);

    info!("[STEP 5] rendering charts");
    written.push(export(Stage::PriceChart, &PriceChartSink::new(&outputs.price_chart), derived)?);
    written.push(export(
        Stage::VolatilityHistogram,
        &VolatilityHistogramSink::new(&outputs.volatility_histogram),
        derived,
    )?);
    written.push(export(
        Stage::ReturnBoxplot,
        &ReturnBoxplotSink::new(&outputs.return_boxplot),
        derived,
    )?);

    Ok(RunReport {
        market: series.market,
        bars: classification.bars.len(),
        unlabeled: classification.unlabeled(),
        thresholds: classification.thresholds,
        stats,
        outputs: written,
    })
}

fn export<T, S>(stage: Stage, sink: &S, data: &T) -> Result<PathBuf, PipelineError>
where
    T: ?Sized,
    S: DataSink<T, Output = PathBuf>,
{
    sink.write(data).context(ExportSnafu { stage })
}
