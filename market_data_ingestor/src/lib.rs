//! Daily candle ingestion: a vendor-agnostic bar model, the [`DataProvider`]
//! abstraction with an Upbit REST implementation, and tabular sinks.
//!
//! [`DataProvider`]: providers::DataProvider

#[cfg(feature = "cli")]
pub mod cli;
pub mod io;
pub mod models;
pub mod providers;
