//! pxfetch core: fetch a daily price history, reshape it, export it as CSV.
//!
//! - Connectivity probe
//! - Provider trait with Yahoo Finance and synthetic implementations
//! - Reshape into `Date, Open, High, Low, Close, Adj Close, Volume`
//! - `<SYMBOL>.csv` export, read-back and delete
//! - TOML configuration

pub mod config;
pub mod data;
pub mod probe;

pub use config::{FetchConfig, YahooConfig};
pub use data::{
    delete_export, export_history, load_export, DataError, DataProvider, ExportSummary,
    HistoryRequest, Period,
};
pub use probe::check_connection;
