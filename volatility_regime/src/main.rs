use anyhow::Context;
use clap::Parser;
use market_data_ingestor::providers::upbit_rest::UpbitProvider;
use tracing::info;
use tracing_subscriber::EnvFilter;
use volatility_regime::cli::Cli;
use volatility_regime::pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().resolve()?;
    let provider = UpbitProvider::new().context("failed to set up the Upbit client")?;

    let report = pipeline::run(&config, &provider).await?;

    for (regime, summary) in report.stats.iter() {
        info!(
            regime = %regime,
            days = summary.days,
            mean_return = ?summary.mean_return,
            mean_volatility = ?summary.mean_volatility,
            mean_volume = ?summary.mean_volume,
            "regime summary"
        );
    }
    if report.unlabeled > 0 {
        info!(unlabeled = report.unlabeled, "bars without a defined volatility");
    }
    info!(market = %report.market, bars = report.bars, "analysis complete; outputs:");
    for path in &report.outputs {
        info!("  {}", path.display());
    }
    Ok(())
}
