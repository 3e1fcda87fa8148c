use anyhow::Context;
use clap::Parser;
use market_data_ingestor::{
    cli::commands::Cli,
    io::{sink::DataSink, spreadsheet::BarSpreadsheetSink},
    providers::{DataProvider, upbit_rest::UpbitProvider},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let request = cli.request();

    let provider = UpbitProvider::new().context("failed to set up the Upbit client")?;
    info!(market = %request.market, count = request.count, "fetching daily candles");
    let series = provider
        .fetch_daily_bars(&request)
        .await
        .with_context(|| format!("fetch failed for {}", request.market))?;

    let path = BarSpreadsheetSink::new(&cli.output)
        .write(&series)
        .context("failed to save candles")?;

    // The saved path goes to stdout so scripts can pick it up.
    println!("{}", path.display());
    Ok(())
}
