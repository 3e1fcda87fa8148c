//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single interface the rest of
//! the workspace uses to obtain daily candles. Each concrete exchange (currently
//! Upbit) implements it and maps its own payloads into [`BarSeries`].
//!
//! The trait is async and object safe, so callers can hold a `Box<dyn DataProvider>`
//! and swap in a fake in tests.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{bar::BarSeries, request_params::CandleRequest};
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl DataProvider for EmptyProvider {
//!     async fn fetch_daily_bars(
//!         &self,
//!         request: &CandleRequest,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(request.market.clone(), vec![]))
//!     }
//! }
//! ```

pub mod upbit_rest;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::BarSeries, request_params::CandleRequest};

/// Trait for fetching daily bars from a market data provider.
#[async_trait]
pub trait DataProvider {
    /// Fetches the most recent `request.count` daily bars, ascending by date.
    ///
    /// Implementations must either return the complete window or fail; a partially
    /// fetched window is never returned.
    async fn fetch_daily_bars(&self, request: &CandleRequest) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The configured base URL could not be parsed.
    #[snafu(display("Invalid base URL {url:?}: {source}"))]
    InvalidBaseUrl {
        url: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The API answered with a non-success status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The API answered, but the payload is malformed or violates bar invariants.
    #[snafu(display("Malformed market data: {message}"))]
    DataShape {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl ProviderError {
    /// Network or HTTP-status failure: the remote side did not deliver.
    pub fn is_remote_fetch(&self) -> bool {
        matches!(self, Self::Reqwest { .. } | Self::Api { .. })
    }

    /// The remote side delivered something we cannot use.
    pub fn is_data_shape(&self) -> bool {
        matches!(self, Self::DataShape { .. })
    }
}
