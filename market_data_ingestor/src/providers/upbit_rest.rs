//! Upbit quotation API (`/v1/candles/days`). Public endpoint, no credentials.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::UpbitProvider;
