use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::models::request_params::CandleRequest;

/// Fetch daily candles for one market and save them as a table.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Market code, QUOTE-BASE (e.g. "KRW-BTC")
    #[arg(long, default_value = "KRW-BTC")]
    pub market: String,

    /// Number of most recent daily candles to fetch
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Exclusive upper bound in ISO8601 format (e.g. "2025-01-30T00:00:00Z"); defaults to now
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,

    /// Destination file; ".feather"/".arrow" write Arrow IPC, anything else CSV
    #[arg(short, long, default_value = "btc_data.csv")]
    pub output: PathBuf,
}

impl Cli {
    pub fn request(&self) -> CandleRequest {
        CandleRequest {
            market: self.market.clone(),
            count: self.count,
            to: self.to,
        }
    }
}
