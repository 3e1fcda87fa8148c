//! Output side of the ingestor: the [`DataSink`](sink::DataSink) contract and
//! the DataFrame-backed tabular writers built on it.

pub mod dataframe;
pub mod sink;
pub mod spreadsheet;
