//! Tabular sinks for the analysis results.
//!
//! Both write through the same DataFrame writer as the raw bar spreadsheet,
//! so the destination extension picks CSV or Arrow IPC.

pub mod derived;
pub mod stats;

pub use derived::DerivedBarSink;
pub use stats::StatsSink;
